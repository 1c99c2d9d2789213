//! Bounded data preview.
//!
//! A preview never reads a whole large array: small datasets are fetched
//! in full, larger ones through a leading-corner slice.

use crate::data::{AxisRange, ContainerBackend, DatasetMeta, SliceSpec};
use crate::ui::formatters::format_stat_value;

/// Size limits of a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimits {
    /// Datasets up to this many elements are fetched in full.
    pub max_elements: usize,
    /// Number of values kept for display.
    pub display_cap: usize,
    /// Rows taken along the first axis of a large dataset.
    pub leading_rows: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            max_elements: 100,
            display_cap: 20,
            leading_rows: 5,
        }
    }
}

/// What a preview fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewPayload {
    /// Values kept for display, row-major.
    pub elements: Vec<f64>,
    /// Whether values were dropped by the display cap.
    pub truncated: bool,
    /// `scalar`, `full` or per-axis ranges such as `[0:5, 0:1]`.
    pub slice_description: String,
}

impl PreviewPayload {
    /// Comma-separated values, with a trailing `...` when truncated.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self.elements.iter().map(|&v| format_stat_value(v)).collect();
        if self.truncated {
            parts.push("...".to_string());
        }
        parts.join(", ")
    }
}

/// Result of [`preview`].
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    /// Values were read.
    Ready(PreviewPayload),
    /// Reading failed; holds the message to display.
    Unavailable(String),
}

/// Slice to fetch for a dataset of `shape`.
pub fn plan(shape: &[usize], limits: &PreviewLimits) -> SliceSpec {
    if shape.is_empty() {
        return SliceSpec::all();
    }
    let total = shape.iter().fold(1usize, |acc, &d| acc.saturating_mul(d));
    if total <= limits.max_elements {
        return SliceSpec::all();
    }

    let mut axes = Vec::with_capacity(shape.len());
    axes.push(AxisRange {
        start: 0,
        count: shape[0].min(limits.leading_rows),
    });
    for &len in &shape[1..] {
        axes.push(AxisRange {
            start: 0,
            count: len.min(1),
        });
    }
    SliceSpec::ranges(axes)
}

/// Sample the dataset at `path`.
pub fn preview(
    backend: &dyn ContainerBackend,
    path: &str,
    meta: &DatasetMeta,
    limits: &PreviewLimits,
) -> PreviewOutcome {
    let slice = plan(&meta.shape, limits);
    let slice_description = if meta.shape.is_empty() {
        "scalar".to_string()
    } else {
        slice.describe()
    };

    match backend.read_slice(path, &slice) {
        Ok(mut elements) => {
            let truncated = elements.len() > limits.display_cap;
            elements.truncate(limits.display_cap);
            tracing::debug!(path, slice = %slice_description, truncated, "preview read");
            PreviewOutcome::Ready(PreviewPayload {
                elements,
                truncated,
                slice_description,
            })
        },
        Err(e) => {
            tracing::warn!(path, "preview read failed: {}", e);
            PreviewOutcome::Unavailable(format!("Could not read data preview: {}", e))
        },
    }
}
