//! Application state and logic.
//!
//! Backend work is queued on the [`App`] and executed one job per UI tick
//! by [`App::run_pending`], so key presses are handled between jobs.

use std::collections::VecDeque;
use std::path::Path;

use crate::attributes::Bucket;
use crate::config::{Theme, ViewerConfig};
use crate::data::ContainerOpener;
use crate::error::Result;
use crate::explorer::ExplorerState;
use crate::inspect::{AttributePanel, Inspection};
use crate::plot::ui::PlotPane;
use crate::plot::{ColorScale, Visualization};
use crate::session::{SelectionTicket, Session};

/// Pane receiving navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Container tree.
    #[default]
    Tree,
    /// Attribute list of the details pane.
    Attributes,
}

#[derive(Debug)]
struct OpenRequest {
    name: String,
    bytes: Vec<u8>,
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Viewer session.
    pub session: Session,
    opener: Box<dyn ContainerOpener>,
    /// Viewer settings.
    pub config: ViewerConfig,
    /// Current theme.
    pub theme: Theme,
    /// Color scale for new heatmaps.
    pub color_scale: ColorScale,
    /// Tree cursor and scrolling.
    pub explorer: ExplorerState,
    /// Details of the selected node.
    pub inspection: Option<Inspection>,
    /// Attribute tab and cursor.
    pub attribute_panel: AttributePanel,
    /// Plot state of the selected dataset.
    pub visualization: Option<Visualization>,
    /// Plot overlay.
    pub plot: PlotPane,
    /// Focused pane.
    pub focus: Focus,
    /// Text of the open-file prompt, when shown.
    pub prompt: Option<String>,
    /// Status message.
    pub status: String,
    pending_open: Option<OpenRequest>,
    expansions: VecDeque<(u64, String)>,
    pending_inspect: Option<SelectionTicket>,
    pending_plot: Option<SelectionTicket>,
}

impl App {
    /// Create a new application instance.
    pub fn new(opener: Box<dyn ContainerOpener>, config: ViewerConfig) -> Self {
        Self {
            session: Session::new(),
            opener,
            config,
            theme: config.theme,
            color_scale: config.color_scale,
            explorer: ExplorerState::new(),
            inspection: None,
            attribute_panel: AttributePanel::default(),
            visualization: None,
            plot: PlotPane::new(),
            focus: Focus::Tree,
            prompt: None,
            status: "Ready".to_string(),
            pending_open: None,
            expansions: VecDeque::new(),
            pending_inspect: None,
            pending_plot: None,
        }
    }

    /// Queue opening `bytes` as container `name`.
    ///
    /// Supersedes any queued open and drops every queued job of the
    /// current container.
    pub fn request_open(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        self.status = format!("Loading {}...", name);
        self.expansions.clear();
        self.pending_inspect = None;
        self.pending_plot = None;
        self.pending_open = Some(OpenRequest { name, bytes });
    }

    /// Read a file from disk and queue it for opening.
    pub fn open_path(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        self.request_open(name, bytes);
        Ok(())
    }

    /// Check if any job is queued.
    pub fn has_pending(&self) -> bool {
        self.pending_open.is_some()
            || !self.expansions.is_empty()
            || self.pending_inspect.is_some()
            || self.pending_plot.is_some()
    }

    /// Run one queued job. Returns `false` when the queue was empty.
    pub fn run_pending(&mut self) -> bool {
        if let Some(request) = self.pending_open.take() {
            self.finish_open(request);
            return true;
        }

        if let Some((epoch, path)) = self.expansions.pop_front() {
            if epoch == self.session.epoch() {
                self.finish_expand(&path);
            } else {
                tracing::debug!(path, epoch, "dropping expansion for a closed container");
            }
            return true;
        }

        if let Some(ticket) = self.pending_inspect.take() {
            self.finish_inspect(ticket);
            return true;
        }

        if let Some(ticket) = self.pending_plot.take() {
            self.finish_plot(ticket);
            return true;
        }

        false
    }

    fn finish_open(&mut self, request: OpenRequest) {
        self.explorer.clear();
        self.inspection = None;
        self.visualization = None;
        self.plot.close();
        self.attribute_panel = AttributePanel::default();
        self.focus = Focus::Tree;

        match self.session.open(&*self.opener, &request.name, &request.bytes) {
            Ok(_) => {
                self.status = format!("Loaded {}", request.name);
                self.refresh_tree();
                self.select_current();
            },
            Err(e) => {
                self.status = format!("Error: {}", e);
            },
        }
    }

    fn finish_expand(&mut self, path: &str) {
        if let Err(e) = self.session.expand(path) {
            self.status = format!("Error: {}", e);
        }
        self.refresh_tree();

        if self.session.selection() == Some(path) {
            if let (Some(inspection), Some(tree)) = (self.inspection.as_mut(), self.session.tree()) {
                inspection.refresh_members(tree);
            }
        }
    }

    fn finish_inspect(&mut self, ticket: SelectionTicket) {
        let limits = self.config.preview;
        let fetched = self.session.fetch(ticket, |backend, node, tree| {
            Inspection::gather(backend, node, tree, &limits)
        });
        if let Some(inspection) = fetched.and_then(|f| self.session.accept(f)) {
            self.inspection = Some(inspection);
        }
    }

    fn finish_plot(&mut self, ticket: SelectionTicket) {
        let limits = self.config.plot;
        let scale = self.color_scale;
        let fetched = self.session.fetch(ticket, |backend, node, _| {
            node.dataset().map(|meta| {
                Visualization::load(backend, &node.path, &node.name, meta, &limits, scale)
            })
        });
        if let Some(Some(vis)) = fetched.and_then(|f| self.session.accept(f)) {
            vis.dispatch(&mut self.plot);
            self.visualization = Some(vis);
        }
    }

    fn refresh_tree(&mut self) {
        self.explorer.refresh(self.session.visible_rows());
    }

    /// Select the node under the tree cursor and queue its inspection.
    pub fn select_current(&mut self) {
        let Some(path) = self.explorer.current_row().map(|row| row.node.path.clone()) else {
            return;
        };
        if self.session.selection() == Some(path.as_str()) && self.inspection.is_some() {
            return;
        }
        match self.session.select(&path) {
            Ok(ticket) => {
                self.inspection = None;
                self.visualization = None;
                self.attribute_panel.cursor = 0;
                self.pending_plot = None;
                self.pending_inspect = Some(ticket);
            },
            Err(e) => self.status = format!("Error: {}", e),
        }
    }

    /// Check if an inspection of the selection is queued.
    pub fn inspect_pending(&self) -> bool {
        self.pending_inspect.is_some()
    }

    /// Move the tree cursor up.
    pub fn cursor_up(&mut self) {
        self.explorer.cursor_up();
        self.select_current();
    }

    /// Move the tree cursor down.
    pub fn cursor_down(&mut self) {
        self.explorer.cursor_down();
        self.select_current();
    }

    /// Go to the first row.
    pub fn goto_first(&mut self) {
        self.explorer.goto_first();
        self.select_current();
    }

    /// Go to the last row.
    pub fn goto_last(&mut self) {
        self.explorer.goto_last();
        self.select_current();
    }

    /// Expand the group under the cursor.
    ///
    /// Cached groups expand immediately; others are queued.
    pub fn expand_current(&mut self) {
        let Some(row) = self.explorer.current_row() else {
            return;
        };
        if !row.node.is_group() || row.expanded || row.pending {
            return;
        }
        let path = row.node.path.clone();

        let cached = self
            .session
            .tree()
            .is_some_and(|tree| tree.cached_children(&path).is_some());
        if cached {
            self.finish_expand(&path);
        } else {
            self.session.mark_expanding(&path);
            self.expansions.push_back((self.session.epoch(), path));
            self.refresh_tree();
        }
    }

    /// Collapse the group under the cursor, or move to its parent.
    pub fn collapse_current(&mut self) {
        let Some(row) = self.explorer.current_row() else {
            return;
        };
        if row.node.is_group() && row.expanded {
            let path = row.node.path.clone();
            self.session.collapse(&path);
            self.refresh_tree();
        } else {
            self.explorer.goto_parent();
            self.select_current();
        }
    }

    /// Toggle the group under the cursor.
    pub fn toggle_current(&mut self) {
        match self.explorer.current_row() {
            Some(row) if row.expanded => self.collapse_current(),
            Some(_) => self.expand_current(),
            None => {},
        }
    }

    /// Switch focus between the tree and the attribute list.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tree => Focus::Attributes,
            Focus::Attributes => Focus::Tree,
        };
    }

    /// Show an attribute bucket.
    pub fn set_tab(&mut self, bucket: Bucket) {
        self.attribute_panel.set_tab(bucket);
    }

    /// Move the attribute cursor down.
    pub fn attribute_down(&mut self) {
        let rows = self
            .inspection
            .as_ref()
            .map(|i| i.attribute_rows(self.attribute_panel.tab).len())
            .unwrap_or(0);
        self.attribute_panel.cursor_down(rows);
    }

    /// Move the attribute cursor up.
    pub fn attribute_up(&mut self) {
        self.attribute_panel.cursor_up();
    }

    /// Expand or collapse the structured node under the attribute cursor.
    pub fn toggle_attribute(&mut self) {
        let panel = self.attribute_panel;
        if let Some(inspection) = self.inspection.as_mut() {
            inspection.toggle(panel.tab, panel.cursor);
        }
    }

    /// Open the plot overlay for the selected dataset.
    pub fn open_plot(&mut self) {
        let Some(node) = self.session.selected_node() else {
            self.status = "Nothing selected".to_string();
            return;
        };
        if node.dataset().is_none() {
            self.status = "Select a dataset to plot".to_string();
            return;
        }

        self.plot.open();
        match &self.visualization {
            Some(vis) => vis.dispatch(&mut self.plot),
            None => {
                let Some(path) = self.session.selection().map(str::to_string) else {
                    return;
                };
                match self.session.select(&path) {
                    Ok(ticket) => {
                        // Reselecting supersedes a queued inspection.
                        if self.pending_inspect.is_some() {
                            self.pending_inspect = Some(ticket);
                        }
                        self.pending_plot = Some(ticket);
                    },
                    Err(e) => self.status = format!("Error: {}", e),
                }
            },
        }
    }

    /// Close the plot overlay.
    pub fn close_plot(&mut self) {
        self.plot.close();
    }

    /// Switch the plot between heatmap and line.
    pub fn toggle_plot_mode(&mut self) {
        self.update_plot(Visualization::toggle_mode);
    }

    /// Show the next matrix row in line mode.
    pub fn next_plot_row(&mut self) {
        self.update_plot(Visualization::next_row);
    }

    /// Show the previous matrix row in line mode.
    pub fn prev_plot_row(&mut self) {
        self.update_plot(Visualization::prev_row);
    }

    /// Cycle the heatmap color scale.
    pub fn cycle_color_scale(&mut self) {
        self.update_plot(Visualization::cycle_scale);
        if let Some(vis) = &self.visualization {
            self.color_scale = vis.scale();
            self.status = format!("Color scale: {}", self.color_scale.name());
        }
    }

    fn update_plot(&mut self, f: impl FnOnce(&mut Visualization)) {
        if let Some(vis) = self.visualization.as_mut() {
            f(vis);
            vis.dispatch(&mut self.plot);
        }
    }

    /// Cycle through available themes.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.status = format!("Theme: {}", self.theme.name());
    }

    /// Show the open-file prompt.
    pub fn start_prompt(&mut self) {
        self.prompt = Some(String::new());
    }

    /// Append a character to the prompt.
    pub fn prompt_push(&mut self, c: char) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.push(c);
        }
    }

    /// Delete the last prompt character.
    pub fn prompt_pop(&mut self) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.pop();
        }
    }

    /// Hide the prompt without opening anything.
    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Open the path typed into the prompt.
    pub fn submit_prompt(&mut self) {
        let Some(input) = self.prompt.take() else {
            return;
        };
        let input = input.trim();
        if input.is_empty() {
            return;
        }
        if let Err(e) = self.open_path(Path::new(input)) {
            tracing::warn!(path = input, "could not read file: {}", e);
            self.status = format!("Error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AttributeValue, MemoryContainer, ROOT_PATH};
    use crate::plot::PlotStatus;

    fn fixture() -> MemoryContainer {
        MemoryContainer::new("scan.h5")
            .with_group(ROOT_PATH, "Data")
            .with_dataset("/Data", "PSD", &[2, 2], vec![1.0, 2.0, 3.0, 4.0])
            .with_attribute("/Data/PSD", "Measure_Date", AttributeValue::text("today"))
    }

    fn drain(app: &mut App) {
        while app.run_pending() {}
    }

    fn loaded(container: &MemoryContainer) -> App {
        let mut app = App::new(Box::new(container.clone()), ViewerConfig::default());
        app.request_open("scan.h5", b"bytes".to_vec());
        drain(&mut app);
        app
    }

    #[test]
    fn test_open_selects_root() {
        let container = fixture();
        let app = loaded(&container);
        assert_eq!(app.session.selection(), Some(ROOT_PATH));
        let inspection = app.inspection.as_ref().unwrap();
        assert_eq!(inspection.member_count, Some(Err("not loaded".to_string())));
        assert_eq!(container.list_calls(ROOT_PATH), 0);
        assert_eq!(app.status, "Loaded scan.h5");
    }

    #[test]
    fn test_selecting_group_does_not_enumerate() {
        let container = fixture();
        let mut app = loaded(&container);
        app.expand_current();
        drain(&mut app);

        app.cursor_down();
        drain(&mut app);
        assert_eq!(app.session.selection(), Some("/Data"));
        assert!(!app.explorer.current_row().unwrap().expanded);
        assert_eq!(container.list_calls("/Data"), 0);
        assert!(app.session.tree().unwrap().cached_children("/Data").is_none());
    }

    #[test]
    fn test_expand_is_queued() {
        let container = fixture();
        let mut app = loaded(&container);

        app.expand_current();
        assert!(app.has_pending());
        assert!(app.explorer.current_row().unwrap().pending);
        drain(&mut app);
        assert_eq!(app.explorer.visible_items().len(), 2);
        assert_eq!(container.list_calls(ROOT_PATH), 1);
        let inspection = app.inspection.as_ref().unwrap();
        assert_eq!(inspection.member_count, Some(Ok(1)));

        app.collapse_current();
        app.expand_current();
        assert!(!app.has_pending());
        assert_eq!(app.explorer.visible_items().len(), 2);
        assert_eq!(container.list_calls(ROOT_PATH), 1);

        app.cursor_down();
        drain(&mut app);
        app.expand_current();
        drain(&mut app);
        assert_eq!(app.explorer.visible_items().len(), 3);
        assert_eq!(container.list_calls("/Data"), 1);
    }

    #[test]
    fn test_plot_fetched_on_demand() {
        let container = fixture();
        let mut app = loaded(&container);
        app.expand_current();
        drain(&mut app);
        app.cursor_down();
        app.expand_current();
        drain(&mut app);
        app.cursor_down();
        drain(&mut app);
        assert_eq!(app.session.selection(), Some("/Data/PSD"));
        let reads = container.reads().len();

        app.open_plot();
        drain(&mut app);
        assert!(app.plot.visible);
        assert!(matches!(app.plot.status(), Some(PlotStatus::Ready(_))));
        assert_eq!(container.reads().len(), reads + 1);

        app.toggle_plot_mode();
        app.next_plot_row();
        assert_eq!(app.visualization.as_ref().unwrap().row(), 1);
        assert_eq!(container.reads().len(), reads + 1);
    }

    #[test]
    fn test_failed_open_resets() {
        let container = fixture();
        let mut app = loaded(&container);
        app.request_open("empty.h5", Vec::new());
        drain(&mut app);
        assert!(!app.session.is_open());
        assert!(app.inspection.is_none());
        assert!(app.explorer.visible_items().is_empty());
        assert!(app.status.starts_with("Error"));
        assert!(container.is_closed());
    }

    #[test]
    fn test_reopen_drops_queued_expansion() {
        let container = fixture();
        let mut app = loaded(&container);
        app.expand_current();
        assert!(app.has_pending());
        app.request_open("scan.h5", b"again".to_vec());
        drain(&mut app);
        assert_eq!(container.list_calls(ROOT_PATH), 0);
        assert_eq!(app.explorer.visible_items().len(), 1);
    }
}
