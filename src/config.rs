//! Viewer configuration.

use crate::plot::{ColorScale, PlotLimits};
use crate::preview::PreviewLimits;

/// Application theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Theme {
    /// Gruvbox dark theme.
    #[default]
    #[value(name = "dark")]
    GruvboxDark,
    /// Gruvbox light theme.
    #[value(name = "light")]
    GruvboxLight,
}

impl Theme {
    /// Get the next theme in the cycle.
    pub fn next(self) -> Self {
        match self {
            Theme::GruvboxDark => Theme::GruvboxLight,
            Theme::GruvboxLight => Theme::GruvboxDark,
        }
    }

    /// Get the theme name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::GruvboxDark => "Gruvbox Dark",
            Theme::GruvboxLight => "Gruvbox Light",
        }
    }
}

/// Settings shared by the session host and the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewerConfig {
    /// Initial theme.
    pub theme: Theme,
    /// Color scale of new heatmaps.
    pub color_scale: ColorScale,
    /// Preview sampling limits.
    pub preview: PreviewLimits,
    /// Plot fetch limits.
    pub plot: PlotLimits,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.theme, Theme::GruvboxDark);
        assert_eq!(config.color_scale, ColorScale::Viridis);
        assert_eq!(config.preview.max_elements, 100);
        assert_eq!(config.preview.display_cap, 20);
        assert_eq!(config.preview.leading_rows, 5);
        assert_eq!(config.plot.max_elements, 10_000_000);
    }

    #[test]
    fn test_theme_cycle() {
        assert_eq!(Theme::GruvboxDark.next().next(), Theme::GruvboxDark);
        assert_eq!(Theme::GruvboxLight.name(), "Gruvbox Light");
    }
}
