//! Explorer feature - container structure exploration.
//!
//! This module provides the tree pane cursor over the session's visible
//! rows and the details pane rendering.

pub mod details;
pub mod tree;

use crate::session::TreeRow;

/// Explorer state - cursor and scrolling over the visible tree rows.
#[derive(Debug, Default)]
pub struct ExplorerState {
    /// All tree rows in display order (only visible rows).
    items: Vec<TreeRow>,
    /// Cursor position (index into items).
    cursor: usize,
    /// Scroll offset for the tree view.
    scroll_offset: usize,
    /// Details pane scroll offset.
    pub details_scroll: u16,
}

impl ExplorerState {
    /// Create a new explorer state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows, keeping the cursor on the same path when possible.
    pub fn refresh(&mut self, rows: Vec<TreeRow>) {
        let current = self.current_node_path().map(str::to_string);
        self.items = rows;
        match current {
            Some(path) => self.goto_node(&path),
            None => self.cursor = 0,
        }
        if self.cursor >= self.items.len() {
            self.cursor = self.items.len().saturating_sub(1);
        }
    }

    /// Drop every row.
    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = 0;
        self.scroll_offset = 0;
        self.details_scroll = 0;
    }

    /// Move the cursor up one position.
    pub fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.details_scroll = 0;
        }
    }

    /// Move the cursor down one position.
    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
            self.details_scroll = 0;
        }
    }

    /// Adjust scroll to keep cursor visible.
    pub fn adjust_scroll(&mut self, viewport_height: usize) {
        if viewport_height == 0 {
            return;
        }

        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        }

        if self.cursor >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor.saturating_sub(viewport_height - 1);
        }
    }

    /// Get the current scroll offset.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Go to the first item.
    pub fn goto_first(&mut self) {
        self.cursor = 0;
    }

    /// Go to the last visible item.
    pub fn goto_last(&mut self) {
        if !self.items.is_empty() {
            self.cursor = self.items.len() - 1;
        }
    }

    /// Get all currently visible rows.
    pub fn visible_items(&self) -> &[TreeRow] {
        &self.items
    }

    /// Get the current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get the row under the cursor.
    pub fn current_row(&self) -> Option<&TreeRow> {
        self.items.get(self.cursor)
    }

    fn current_node_path(&self) -> Option<&str> {
        self.current_row().map(|row| row.node.path.as_str())
    }

    /// Move the cursor to a node with the given path.
    pub fn goto_node(&mut self, target_path: &str) {
        if let Some(i) = self
            .items
            .iter()
            .position(|item| item.node.path == target_path)
        {
            self.cursor = i;
        }
    }

    /// Move the cursor to the parent of the current row.
    pub fn goto_parent(&mut self) {
        let Some(depth) = self.current_row().map(|row| row.depth) else {
            return;
        };
        if let Some(i) = self.items[..self.cursor]
            .iter()
            .rposition(|item| item.depth < depth)
        {
            self.cursor = i;
        }
    }

    /// Scroll details down.
    pub fn scroll_down(&mut self) {
        self.details_scroll = self.details_scroll.saturating_add(5);
    }

    /// Scroll details up.
    pub fn scroll_up(&mut self) {
        self.details_scroll = self.details_scroll.saturating_sub(5);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Node, NodeKind};

    fn row(path: &str, depth: usize) -> TreeRow {
        TreeRow {
            node: Node::from_path(path, NodeKind::Group),
            depth,
            expanded: false,
            pending: false,
            error: None,
        }
    }

    #[test]
    fn test_refresh_keeps_cursor_on_path() {
        let mut explorer = ExplorerState::new();
        explorer.refresh(vec![row("/", 0), row("/a", 1), row("/b", 1)]);
        explorer.goto_node("/b");
        explorer.refresh(vec![row("/", 0), row("/a", 1), row("/a/x", 2), row("/b", 1)]);
        assert_eq!(explorer.cursor(), 3);

        explorer.refresh(vec![row("/", 0)]);
        assert_eq!(explorer.cursor(), 0);
    }

    #[test]
    fn test_goto_parent() {
        let mut explorer = ExplorerState::new();
        explorer.refresh(vec![row("/", 0), row("/a", 1), row("/a/x", 2), row("/b", 1)]);
        explorer.goto_node("/a/x");
        explorer.goto_parent();
        assert_eq!(explorer.current_row().map(|r| r.node.path.as_str()), Some("/a"));
    }

    #[test]
    fn test_adjust_scroll() {
        let mut explorer = ExplorerState::new();
        explorer.refresh((0..10).map(|i| row(&format!("/n{}", i), 1)).collect());
        explorer.goto_last();
        explorer.adjust_scroll(4);
        assert_eq!(explorer.scroll_offset(), 6);
        explorer.goto_first();
        explorer.adjust_scroll(4);
        assert_eq!(explorer.scroll_offset(), 0);
    }
}
