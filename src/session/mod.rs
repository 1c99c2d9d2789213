//! Viewer session.
//!
//! A [`Session`] owns at most one open container together with its tree
//! cache and the current selection. Every open or close bumps the session
//! epoch, so results fetched for an earlier container or an earlier
//! selection can be recognised and dropped.

mod selection;
mod tree;

pub use selection::{Fetched, SelectionState, SelectionTicket};
pub use tree::{resolve_root, TreeCache, TreeRow};

use crate::data::{ContainerBackend, ContainerOpener, Node};
use crate::error::{Result, StokesError};

#[derive(Debug)]
struct OpenContainer {
    backend: Box<dyn ContainerBackend>,
    tree: TreeCache,
}

/// State of one viewer window.
#[derive(Debug, Default)]
pub struct Session {
    open: Option<OpenContainer>,
    selection: SelectionState,
    epoch: u64,
}

impl Session {
    /// Create a session with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a container, replacing the current one.
    ///
    /// The previous handle is closed before the new bytes are handed to
    /// the opener. On failure the session is left empty.
    pub fn open(
        &mut self,
        opener: &dyn ContainerOpener,
        name: &str,
        bytes: &[u8],
    ) -> Result<&Node> {
        self.close();

        let backend = opener.open(name, bytes).map_err(|e| {
            tracing::error!("open failed: {}", e);
            e
        })?;

        let tree = TreeCache::new(resolve_root(&*backend));
        self.epoch += 1;
        tracing::info!(name, epoch = self.epoch, "session opened");

        let open = self.open.insert(OpenContainer { backend, tree });
        Ok(open.tree.root())
    }

    /// Close the current container and clear the selection.
    pub fn close(&mut self) {
        if let Some(mut open) = self.open.take() {
            open.backend.close();
            tracing::info!(name = open.backend.file_name(), "session closed");
        }
        self.selection.clear();
        self.epoch += 1;
    }

    /// Check if a container is open.
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// File identifier of the open container.
    pub fn file_name(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.backend.file_name())
    }

    /// Current epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Tree cache of the open container.
    pub fn tree(&self) -> Option<&TreeCache> {
        self.open.as_ref().map(|open| &open.tree)
    }

    /// Root node of the open container.
    pub fn root(&self) -> Option<&Node> {
        self.tree().map(TreeCache::root)
    }

    /// Visible tree rows; empty when nothing is open.
    pub fn visible_rows(&self) -> Vec<TreeRow> {
        self.tree().map(TreeCache::visible_rows).unwrap_or_default()
    }

    /// Expand the group at `path`.
    pub fn expand(&mut self, path: &str) -> Result<&[Node]> {
        let OpenContainer { backend, tree } = self.open.as_mut().ok_or(StokesError::NoContainer)?;
        let node = tree
            .find(path)
            .cloned()
            .ok_or_else(|| StokesError::node_not_found(path))?;
        tree.expand(&**backend, &node)
    }

    /// Collapse the group at `path`.
    pub fn collapse(&mut self, path: &str) {
        if let Some(open) = self.open.as_mut() {
            open.tree.collapse(path);
        }
    }

    /// Show a loading marker on `path` until it is expanded.
    pub fn mark_expanding(&mut self, path: &str) {
        if let Some(open) = self.open.as_mut() {
            open.tree.mark_pending(path);
        }
    }

    /// Select the node at `path`.
    pub fn select(&mut self, path: &str) -> Result<SelectionTicket> {
        let tree = self.tree().ok_or(StokesError::NoContainer)?;
        if tree.find(path).is_none() {
            return Err(StokesError::node_not_found(path));
        }
        Ok(self.selection.select(path, self.epoch))
    }

    /// Path of the selected node.
    pub fn selection(&self) -> Option<&str> {
        self.selection.current()
    }

    /// Selected node.
    pub fn selected_node(&self) -> Option<&Node> {
        let path = self.selection.current()?;
        self.tree()?.find(path)
    }

    /// Check if `ticket` still identifies the current selection.
    pub fn is_current(&self, ticket: SelectionTicket) -> bool {
        self.open.is_some()
            && ticket.epoch == self.epoch
            && ticket.generation == self.selection.generation()
    }

    /// Run a selection-driven fetch against the open container.
    ///
    /// Returns `None` without touching the backend when `ticket` is stale.
    pub fn fetch<T, F>(&self, ticket: SelectionTicket, f: F) -> Option<Fetched<T>>
    where
        F: FnOnce(&dyn ContainerBackend, &Node, &TreeCache) -> T,
    {
        if !self.is_current(ticket) {
            tracing::debug!(?ticket, "skipping fetch for stale selection");
            return None;
        }
        let open = self.open.as_ref()?;
        let node = self.selected_node()?;
        Some(Fetched {
            ticket,
            payload: f(&*open.backend, node, &open.tree),
        })
    }

    /// Unwrap a fetched payload if it still belongs to the current selection.
    pub fn accept<T>(&self, fetched: Fetched<T>) -> Option<T> {
        if self.is_current(fetched.ticket) {
            Some(fetched.payload)
        } else {
            tracing::debug!(ticket = ?fetched.ticket, "discarding stale result");
            None
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(open) = self.open.as_mut() {
            open.backend.close();
        }
    }
}
