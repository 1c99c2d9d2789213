//! Tree panel UI rendering.

use super::ExplorerState;
use crate::ui::ThemeColors;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Draw the tree panel UI.
pub fn draw_tree(
    f: &mut Frame<'_>,
    explorer: &mut ExplorerState,
    file_name: Option<&str>,
    focused: bool,
    area: Rect,
    colors: &ThemeColors,
) {
    let Some(file_name) = file_name else {
        draw_welcome(f, area, colors);
        return;
    };

    // Adjust scroll to keep cursor visible (subtract 2 for borders)
    let viewport_height = area.height.saturating_sub(2) as usize;
    explorer.adjust_scroll(viewport_height);

    let cursor = explorer.cursor();
    let scroll_offset = explorer.scroll_offset();

    let items: Vec<ListItem<'_>> = explorer
        .visible_items()
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(viewport_height)
        .map(|(idx, item)| {
            let indent = "  ".repeat(item.depth);
            let expand_icon = if !item.node.is_group() {
                "  "
            } else if item.pending {
                "⋯ "
            } else if item.expanded {
                "▼ "
            } else {
                "▶ "
            };

            let mut line = if idx == cursor {
                let text = format!("{}{}{}", indent, expand_icon, item.node.display_name());
                let style = if focused {
                    Style::default()
                        .fg(colors.bg0)
                        .bg(colors.yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg0).bg(colors.bg2)
                };
                Line::from(text).style(style)
            } else if let Some(meta) = item.node.dataset() {
                // Color datasets by element type
                let dtype = meta.dtype.to_lowercase();
                let var_color = if dtype.contains("float") || dtype.starts_with('f') {
                    colors.aqua
                } else if dtype.contains("int") {
                    colors.blue
                } else if dtype.contains("char") || dtype.contains("string") {
                    colors.purple
                } else {
                    colors.green
                };

                let display = item.node.display_name();
                let (name_part, meta_part) = match display.find(" (") {
                    Some(pos) => display.split_at(pos),
                    None => (display.as_str(), ""),
                };

                Line::from(vec![
                    Span::raw(indent),
                    Span::raw(expand_icon),
                    Span::styled(
                        name_part.to_string(),
                        Style::default()
                            .fg(var_color)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(meta_part.to_string(), Style::default().fg(colors.gray)),
                ])
            } else {
                let text = format!("{}{}{}", indent, expand_icon, item.node.display_name());
                Line::from(text).style(Style::default().fg(colors.fg0))
            };

            // One terminal line per row keeps the scroll maths exact.
            if let Some(error) = &item.error {
                line.spans.push(Span::styled(
                    format!("  ⚠ {}", error),
                    Style::default().fg(colors.red),
                ));
            }
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(format!(" {} ", file_name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused { colors.yellow } else { colors.bg2 }))
            .style(Style::default().bg(colors.bg0)),
    );

    f.render_widget(list, area);
}

/// Draw the welcome screen.
pub fn draw_welcome(f: &mut Frame<'_>, area: Rect, colors: &ThemeColors) {
    let lines = vec![
        Line::from(Span::styled(
            "Welcome to Stokes!",
            Style::default()
                .fg(colors.yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Open an HDF5 or netCDF file to get started"),
        Line::from(""),
        Line::from("Usage: stokes <file.h5>"),
        Line::from(""),
        Line::from("Keyboard shortcuts:"),
        Line::from("  o           - Open file"),
        Line::from("  j/k or ↓/↑  - Navigate"),
        Line::from("  h/l or ←/→  - Collapse/Expand"),
        Line::from("  Tab         - Switch to attributes"),
        Line::from("  p           - Plot dataset"),
        Line::from("  T           - Cycle theme"),
        Line::from("  q           - Quit"),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Stokes ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.bg2))
                .style(Style::default().bg(colors.bg0)),
        )
        .style(Style::default().fg(colors.fg0));

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::data::{Node, NodeKind};
    use crate::session::TreeRow;
    use ratatui::{backend::TestBackend, Terminal};

    fn failed_group(i: usize) -> TreeRow {
        TreeRow {
            node: Node::from_path(format!("/G{}", i), NodeKind::Group),
            depth: 1,
            expanded: false,
            pending: false,
            error: Some("permission denied".to_string()),
        }
    }

    #[test]
    fn test_error_stays_on_its_row() {
        let mut explorer = ExplorerState::new();
        explorer.refresh((0..6).map(failed_group).collect());
        for _ in 0..5 {
            explorer.cursor_down();
        }

        let colors = ThemeColors::from_theme(Theme::GruvboxDark);
        let mut terminal = Terminal::new(TestBackend::new(50, 5)).unwrap();
        terminal
            .draw(|f| draw_tree(f, &mut explorer, Some("scan.h5"), true, f.area(), &colors))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row = |y: u16| -> String {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol())
                .collect()
        };
        // Three inner lines; the cursor row is the last of them.
        assert!(row(1).contains("G3"));
        assert!(row(3).contains("G5"));
        assert!(row(3).contains("⚠ permission denied"));
    }
}
