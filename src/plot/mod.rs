//! Visualization dispatcher.
//!
//! Turns a dataset into a plot request for a [`PlotSink`]. The array is
//! fetched once per selection; mode, row and color scale changes are
//! re-dispatched from the fetched values.

pub mod colormaps;
pub mod ui;

use crate::data::{ContainerBackend, DatasetMeta, SliceSpec};
use crate::ui::formatters::format_number;
use ndarray::{Array2, ArrayView1};

/// Color scale of a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorScale {
    /// Perceptually uniform blue-green-yellow.
    #[default]
    Viridis,
    /// Perceptually uniform purple-orange-yellow.
    Plasma,
    /// Blue-cyan-yellow-red.
    Jet,
    /// Black-red-yellow-white.
    Hot,
    /// Black to white.
    Greys,
    /// Blue-yellow-red.
    Portland,
    /// Black body radiation.
    Blackbody,
}

impl ColorScale {
    /// Get the next scale in the cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Viridis => Self::Plasma,
            Self::Plasma => Self::Jet,
            Self::Jet => Self::Hot,
            Self::Hot => Self::Greys,
            Self::Greys => Self::Portland,
            Self::Portland => Self::Blackbody,
            Self::Blackbody => Self::Viridis,
        }
    }

    /// Get the scale name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Viridis => "Viridis",
            Self::Plasma => "Plasma",
            Self::Jet => "Jet",
            Self::Hot => "Hot",
            Self::Greys => "Greys",
            Self::Portland => "Portland",
            Self::Blackbody => "Blackbody",
        }
    }
}

/// How a 2-D dataset is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotMode {
    /// Whole matrix as colored cells.
    #[default]
    Heatmap,
    /// One row as a line.
    Line,
}

impl PlotMode {
    /// The other mode.
    pub fn toggle(self) -> Self {
        match self {
            PlotMode::Heatmap => PlotMode::Line,
            PlotMode::Line => PlotMode::Heatmap,
        }
    }

    /// Get display name.
    pub fn name(self) -> &'static str {
        match self {
            PlotMode::Heatmap => "Heatmap",
            PlotMode::Line => "Line",
        }
    }
}

/// Display hints sent along with the data.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotHints {
    /// Plot title.
    pub title: String,
    /// Horizontal axis label.
    pub x_label: String,
    /// Vertical axis label.
    pub y_label: String,
    /// Color scale for matrices.
    pub color_scale: Option<ColorScale>,
    /// Draw row 0 at the top.
    pub reverse_y: bool,
}

/// Data of a plot request.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotData {
    /// A 1-D series.
    Series {
        /// Positions.
        x: Vec<f64>,
        /// Values.
        y: Vec<f64>,
    },
    /// A row-major matrix.
    Heatmap {
        /// Values, `rows x cols`.
        z: Array2<f64>,
    },
}

/// A drawable plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    /// What to draw.
    pub data: PlotData,
    /// How to draw it.
    pub hints: PlotHints,
}

/// What the plot area should show.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotStatus {
    /// Something to draw.
    Ready(PlotRequest),
    /// The dataset has no elements.
    Empty,
    /// The dataset rank cannot be plotted.
    Unsupported {
        /// Rank of the dataset.
        rank: usize,
    },
    /// Fetching the array failed.
    Failed(String),
}

impl PlotStatus {
    /// Title and message for statuses without data.
    pub fn message(&self) -> Option<(&'static str, String)> {
        match self {
            PlotStatus::Ready(_) => None,
            PlotStatus::Empty => Some(("Empty Dataset", "No data to display".to_string())),
            PlotStatus::Unsupported { rank } => Some((
                "Unsupported Dimensionality",
                format!("Visualization not available for ND arrays (rank {})", rank),
            )),
            PlotStatus::Failed(reason) => Some(("Visualization Error", reason.clone())),
        }
    }
}

/// Receives plot statuses.
pub trait PlotSink {
    /// Show `status`, replacing whatever was shown before.
    fn present(&mut self, status: PlotStatus);
}

/// Size limits of a plot fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotLimits {
    /// Largest array fetched for plotting.
    pub max_elements: usize,
}

impl Default for PlotLimits {
    fn default() -> Self {
        Self {
            max_elements: 10_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Source {
    Series(Vec<f64>),
    Matrix(Array2<f64>),
    Unsupported(usize),
    Failed(String),
}

/// Plot state of one selected dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Visualization {
    name: String,
    source: Source,
    mode: PlotMode,
    row: usize,
    scale: ColorScale,
}

impl Visualization {
    /// Fetch the dataset at `path` once and prepare it for plotting.
    pub fn load(
        backend: &dyn ContainerBackend,
        path: &str,
        name: &str,
        meta: &DatasetMeta,
        limits: &PlotLimits,
        scale: ColorScale,
    ) -> Self {
        Self {
            name: name.to_string(),
            source: fetch(backend, path, meta, limits),
            mode: PlotMode::default(),
            row: 0,
            scale,
        }
    }

    /// Dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current mode.
    pub fn mode(&self) -> PlotMode {
        self.mode
    }

    /// Check if the dataset offers a heatmap/line choice.
    pub fn has_modes(&self) -> bool {
        matches!(self.source, Source::Matrix(_))
    }

    /// Switch between heatmap and line.
    pub fn toggle_mode(&mut self) {
        if self.has_modes() {
            self.mode = self.mode.toggle();
        }
    }

    /// Row drawn in line mode.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Number of matrix rows.
    pub fn rows(&self) -> Option<usize> {
        match &self.source {
            Source::Matrix(z) => Some(z.nrows()),
            _ => None,
        }
    }

    /// Select the row drawn in line mode, clamped to the matrix.
    pub fn set_row(&mut self, row: usize) {
        let last = self.rows().unwrap_or(0).saturating_sub(1);
        self.row = row.min(last);
    }

    /// Next row.
    pub fn next_row(&mut self) {
        self.set_row(self.row + 1);
    }

    /// Previous row.
    pub fn prev_row(&mut self) {
        self.set_row(self.row.saturating_sub(1));
    }

    /// Current color scale.
    pub fn scale(&self) -> ColorScale {
        self.scale
    }

    /// Advance to the next color scale.
    pub fn cycle_scale(&mut self) {
        self.scale = self.scale.next();
    }

    /// Build the status for the current mode, row and scale.
    pub fn request(&self) -> PlotStatus {
        match &self.source {
            Source::Unsupported(rank) => PlotStatus::Unsupported { rank: *rank },
            Source::Failed(reason) => PlotStatus::Failed(reason.clone()),
            Source::Series(y) if y.is_empty() => PlotStatus::Empty,
            Source::Series(y) => PlotStatus::Ready(PlotRequest {
                data: series(y.iter().copied()),
                hints: PlotHints {
                    title: format!("1D Data Plot: {}", self.name),
                    x_label: "Position".to_string(),
                    y_label: "Value".to_string(),
                    color_scale: None,
                    reverse_y: false,
                },
            }),
            Source::Matrix(z) if z.is_empty() => PlotStatus::Empty,
            Source::Matrix(z) => match self.mode {
                PlotMode::Heatmap => PlotStatus::Ready(PlotRequest {
                    data: PlotData::Heatmap { z: z.clone() },
                    hints: PlotHints {
                        title: "2D Heat Map".to_string(),
                        x_label: "Columns".to_string(),
                        y_label: "Rows".to_string(),
                        color_scale: Some(self.scale),
                        reverse_y: true,
                    },
                }),
                PlotMode::Line => {
                    let row: ArrayView1<'_, f64> = z.row(self.row.min(z.nrows() - 1));
                    PlotStatus::Ready(PlotRequest {
                        data: series(row.iter().copied()),
                        hints: PlotHints {
                            title: format!("Row {} of {}", self.row, self.name),
                            x_label: "Position".to_string(),
                            y_label: "Value".to_string(),
                            color_scale: None,
                            reverse_y: false,
                        },
                    })
                },
            },
        }
    }

    /// Send the current status to `sink`.
    pub fn dispatch(&self, sink: &mut dyn PlotSink) {
        sink.present(self.request());
    }
}

fn series(values: impl Iterator<Item = f64>) -> PlotData {
    let y: Vec<f64> = values.collect();
    let x = (0..y.len()).map(|i| i as f64).collect();
    PlotData::Series { x, y }
}

fn fetch(
    backend: &dyn ContainerBackend,
    path: &str,
    meta: &DatasetMeta,
    limits: &PlotLimits,
) -> Source {
    let rank = meta.rank();
    if rank == 0 || rank > 2 {
        return Source::Unsupported(rank);
    }

    let total = meta.total_elements();
    if total > limits.max_elements {
        return Source::Failed(format!(
            "Array too large to plot ({} elements, limit {})",
            format_number(total),
            format_number(limits.max_elements)
        ));
    }

    let values = match backend.read_slice(path, &SliceSpec::all()) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(path, "plot fetch failed: {}", e);
            return Source::Failed(format!("Could not load data for plotting: {}", e));
        },
    };

    if values.len() != total {
        return Source::Failed(format!(
            "Shape mismatch: expected {} values, got {}",
            total,
            values.len()
        ));
    }

    if rank == 1 {
        return Source::Series(values);
    }
    match Array2::from_shape_vec((meta.shape[0], meta.shape[1]), values) {
        Ok(z) => Source::Matrix(z),
        Err(e) => Source::Failed(format!("Shape mismatch: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MemoryContainer, ROOT_PATH};

    fn load(shape: &[usize], values: Vec<f64>) -> Visualization {
        let backend = MemoryContainer::new("a.h5").with_dataset(ROOT_PATH, "PSD", shape, values);
        let meta = DatasetMeta::new(shape.to_vec(), "f64");
        Visualization::load(
            &backend,
            "/PSD",
            "PSD",
            &meta,
            &PlotLimits::default(),
            ColorScale::default(),
        )
    }

    #[test]
    fn test_series() {
        let vis = load(&[3], vec![5.0, 6.0, 7.0]);
        let PlotStatus::Ready(req) = vis.request() else {
            panic!("expected a plot");
        };
        assert_eq!(req.hints.title, "1D Data Plot: PSD");
        assert_eq!(
            req.data,
            PlotData::Series {
                x: vec![0.0, 1.0, 2.0],
                y: vec![5.0, 6.0, 7.0]
            }
        );
    }

    #[test]
    fn test_heatmap_reshape() {
        let vis = load(&[3, 4], (0..12).map(|i| i as f64).collect());
        let PlotStatus::Ready(req) = vis.request() else {
            panic!("expected a plot");
        };
        let PlotData::Heatmap { z } = req.data else {
            panic!("expected a heatmap");
        };
        assert_eq!(z.dim(), (3, 4));
        assert_eq!(z[[2, 1]], 9.0);
        assert!(req.hints.reverse_y);
        assert_eq!(req.hints.color_scale, Some(ColorScale::Viridis));
        assert_eq!(req.hints.title, "2D Heat Map");
    }

    #[test]
    fn test_line_row() {
        let mut vis = load(&[3, 4], (0..12).map(|i| i as f64).collect());
        vis.toggle_mode();
        vis.set_row(1);
        let PlotStatus::Ready(req) = vis.request() else {
            panic!("expected a plot");
        };
        assert_eq!(req.hints.title, "Row 1 of PSD");
        let PlotData::Series { y, .. } = req.data else {
            panic!("expected a series");
        };
        assert_eq!(y, [4.0, 5.0, 6.0, 7.0]);

        vis.set_row(99);
        assert_eq!(vis.row(), 2);
    }

    #[test]
    fn test_redispatch_does_not_refetch() {
        let backend = MemoryContainer::new("a.h5").with_dataset(
            ROOT_PATH,
            "m",
            &[2, 2],
            vec![1.0, 2.0, 3.0, 4.0],
        );
        let meta = DatasetMeta::new(vec![2, 2], "f64");
        let mut vis = Visualization::load(
            &backend,
            "/m",
            "m",
            &meta,
            &PlotLimits::default(),
            ColorScale::Jet,
        );
        vis.cycle_scale();
        vis.toggle_mode();
        vis.next_row();
        let _ = vis.request();
        assert_eq!(backend.reads().len(), 1);
        assert_eq!(vis.scale(), ColorScale::Hot);
    }

    #[test]
    fn test_unsupported_ranks() {
        let vis = load(&[2, 2, 2], vec![0.0; 8]);
        assert_eq!(vis.request(), PlotStatus::Unsupported { rank: 3 });
        let vis = load(&[], vec![1.0]);
        assert_eq!(vis.request(), PlotStatus::Unsupported { rank: 0 });
    }

    #[test]
    fn test_failures() {
        let vis = load(&[3, 4], vec![1.0; 5]);
        assert!(matches!(vis.request(), PlotStatus::Failed(_)));

        let backend = MemoryContainer::new("a.h5").with_dataset(ROOT_PATH, "d", &[4], vec![0.0; 4]);
        let meta = DatasetMeta::new(vec![4], "f64");
        let limits = PlotLimits { max_elements: 3 };
        let vis = Visualization::load(&backend, "/d", "d", &meta, &limits, ColorScale::Hot);
        assert!(matches!(vis.request(), PlotStatus::Failed(_)));
        assert!(backend.reads().is_empty());
    }

    #[test]
    fn test_empty() {
        let vis = load(&[0], vec![]);
        assert_eq!(vis.request(), PlotStatus::Empty);
    }
}
