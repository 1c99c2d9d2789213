//! Container backend contract.
//!
//! The viewer never parses container bytes itself. It talks to a backend
//! through [`ContainerOpener`] (bytes in, handle out) and
//! [`ContainerBackend`] (list, attributes, slice reads, close), so the tree
//! builder, the preview sampler and the plot dispatcher can be exercised
//! against any implementation.

use super::{AttributeMap, NodeKind};
use crate::error::Result;
use std::fmt;

/// A child entry as reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRef {
    /// Absolute path of the child.
    pub path: String,
    /// Group or dataset (with array metadata).
    pub kind: NodeKind,
}

/// Half-open range `[start, start + count)` along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    /// First index.
    pub start: usize,
    /// Number of indices.
    pub count: usize,
}

/// Per-axis description of the region to fetch.
///
/// An empty axis list reads the whole dataset (and is the only valid
/// request for a scalar).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SliceSpec {
    axes: Vec<AxisRange>,
}

impl SliceSpec {
    /// Read everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Read an explicit region.
    pub fn ranges(axes: Vec<AxisRange>) -> Self {
        Self { axes }
    }

    /// Check if this reads the whole dataset.
    pub fn is_all(&self) -> bool {
        self.axes.is_empty()
    }

    /// Axis ranges; empty when reading everything.
    pub fn axes(&self) -> &[AxisRange] {
        &self.axes
    }

    /// Number of source elements touched, given the dataset shape.
    pub fn element_count(&self, shape: &[usize]) -> usize {
        if self.is_all() {
            return shape.iter().fold(1usize, |acc, &d| acc.saturating_mul(d));
        }
        self.axes
            .iter()
            .fold(1usize, |acc, axis| acc.saturating_mul(axis.count))
    }

    /// Short description such as `[0:5, 0:1]`.
    pub fn describe(&self) -> String {
        if self.is_all() {
            return "full".to_string();
        }
        let parts: Vec<String> = self
            .axes
            .iter()
            .map(|a| format!("{}:{}", a.start, a.start + a.count))
            .collect();
        format!("[{}]", parts.join(", "))
    }
}

/// An open container.
pub trait ContainerBackend: fmt::Debug {
    /// File identifier the container was opened from.
    fn file_name(&self) -> &str;

    /// Children of the group at `path`, in enumeration order.
    fn list_children(&self, path: &str) -> Result<Vec<ChildRef>>;

    /// Attributes of the node at `path`, in enumeration order.
    fn attributes(&self, path: &str) -> Result<AttributeMap>;

    /// Read a region of the dataset at `path`, flattened row-major.
    fn read_slice(&self, path: &str, slice: &SliceSpec) -> Result<Vec<f64>>;

    /// Release the handle. Later calls may fail.
    fn close(&mut self);
}

/// Turns file bytes into an open container.
pub trait ContainerOpener: fmt::Debug {
    /// Open `bytes`, remembering `name` as the file identifier.
    fn open(&self, name: &str, bytes: &[u8]) -> Result<Box<dyn ContainerBackend>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_describe() {
        assert_eq!(SliceSpec::all().describe(), "full");
        let spec = SliceSpec::ranges(vec![
            AxisRange { start: 0, count: 5 },
            AxisRange { start: 0, count: 1 },
        ]);
        assert_eq!(spec.describe(), "[0:5, 0:1]");
        assert_eq!(spec.element_count(&[1000, 30]), 5);
    }
}
