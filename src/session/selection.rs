//! Current selection and staleness tickets.

/// Identifies one selection within one open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionTicket {
    /// Session epoch when the selection was made.
    pub epoch: u64,
    /// Selection counter within the epoch.
    pub generation: u64,
}

/// A payload fetched on behalf of a selection.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    /// Selection the payload belongs to.
    pub ticket: SelectionTicket,
    /// The fetched value.
    pub payload: T,
}

/// Single current selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    current: Option<String>,
    generation: u64,
}

impl SelectionState {
    /// Replace the selection and hand out a fresh ticket.
    pub fn select(&mut self, path: impl Into<String>, epoch: u64) -> SelectionTicket {
        self.generation += 1;
        self.current = Some(path.into());
        SelectionTicket {
            epoch,
            generation: self.generation,
        }
    }

    /// Drop the selection; outstanding tickets become stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    /// Path of the selected node.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
