//! Color mapping functions for heatmaps.

use super::ColorScale;
use ratatui::style::Color;

type Stop = (f64, [u8; 3]);

const VIRIDIS: &[Stop] = &[
    (0.0, [68, 1, 84]),
    (0.25, [59, 82, 139]),
    (0.5, [33, 145, 140]),
    (0.75, [94, 201, 98]),
    (1.0, [253, 231, 37]),
];

const PLASMA: &[Stop] = &[
    (0.0, [13, 8, 135]),
    (0.25, [126, 3, 168]),
    (0.5, [204, 71, 120]),
    (0.75, [248, 149, 64]),
    (1.0, [240, 249, 33]),
];

const JET: &[Stop] = &[
    (0.0, [0, 0, 131]),
    (0.125, [0, 60, 170]),
    (0.375, [5, 255, 255]),
    (0.625, [255, 255, 0]),
    (0.875, [250, 0, 0]),
    (1.0, [128, 0, 0]),
];

const HOT: &[Stop] = &[
    (0.0, [0, 0, 0]),
    (0.3, [230, 0, 0]),
    (0.6, [255, 210, 0]),
    (1.0, [255, 255, 255]),
];

const GREYS: &[Stop] = &[(0.0, [0, 0, 0]), (1.0, [255, 255, 255])];

const PORTLAND: &[Stop] = &[
    (0.0, [12, 51, 131]),
    (0.25, [10, 136, 186]),
    (0.5, [242, 211, 56]),
    (0.75, [242, 143, 56]),
    (1.0, [217, 30, 30]),
];

const BLACKBODY: &[Stop] = &[
    (0.0, [0, 0, 0]),
    (0.2, [230, 0, 0]),
    (0.4, [230, 210, 0]),
    (0.7, [255, 255, 255]),
    (1.0, [160, 200, 255]),
];

impl ColorScale {
    /// Map a normalized value (0.0 to 1.0) to an RGB color.
    pub fn color(self, t: f64) -> Color {
        let [r, g, b] = self.rgb(t);
        Color::Rgb(r, g, b)
    }

    /// Map a normalized value (0.0 to 1.0) to RGB components.
    pub fn rgb(self, t: f64) -> [u8; 3] {
        let stops = match self {
            Self::Viridis => VIRIDIS,
            Self::Plasma => PLASMA,
            Self::Jet => JET,
            Self::Hot => HOT,
            Self::Greys => GREYS,
            Self::Portland => PORTLAND,
            Self::Blackbody => BLACKBODY,
        };
        interpolate(stops, if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) })
    }
}

/// Piecewise linear interpolation between color stops.
fn interpolate(stops: &[Stop], t: f64) -> [u8; 3] {
    let upper = stops
        .iter()
        .position(|&(pos, _)| pos >= t)
        .unwrap_or(stops.len() - 1);
    if upper == 0 {
        return stops[0].1;
    }

    let (p0, c0) = stops[upper - 1];
    let (p1, c1) = stops[upper];
    let span = p1 - p0;
    let f = if span > 0.0 { (t - p0) / span } else { 0.0 };

    let mut out = [0u8; 3];
    for i in 0..3 {
        let v = f64::from(c0[i]) + f * (f64::from(c1[i]) - f64::from(c0[i]));
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}
