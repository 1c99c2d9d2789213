//! Plot overlay - terminal plot sink and rendering.

use super::{ColorScale, PlotData, PlotHints, PlotMode, PlotSink, PlotStatus, Visualization};
use crate::ui::formatters::{format_axis_label, format_stat_value};
use crate::ui::{centered_rect, ThemeColors};
use ndarray::Array2;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

/// Plot sink backed by the terminal overlay.
#[derive(Debug, Default)]
pub struct PlotPane {
    status: Option<PlotStatus>,
    /// Whether the overlay is shown.
    pub visible: bool,
}

impl PlotSink for PlotPane {
    fn present(&mut self, status: PlotStatus) {
        self.status = Some(status);
    }
}

impl PlotPane {
    /// Create a hidden pane.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last presented status.
    pub fn status(&self) -> Option<&PlotStatus> {
        self.status.as_ref()
    }

    /// Show the overlay.
    pub fn open(&mut self) {
        self.visible = true;
    }

    /// Hide the overlay and drop the presented status.
    pub fn close(&mut self) {
        self.visible = false;
        self.status = None;
    }
}

/// Draw the plot overlay.
pub fn draw_plot(
    f: &mut Frame<'_>,
    pane: &PlotPane,
    vis: Option<&Visualization>,
    colors: &ThemeColors,
) {
    if !pane.visible {
        return;
    }

    let area = centered_rect(90, 90, f.area());
    f.render_widget(Clear, area);

    let title = match vis {
        Some(vis) if vis.has_modes() => format!(" Plot - {} ({}) ", vis.name(), vis.mode().name()),
        Some(vis) => format!(" Plot - {} ", vis.name()),
        None => " Plot ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.bg2))
        .style(Style::default().bg(colors.bg0));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(2)])
        .split(inner);

    match pane.status() {
        None => draw_message(f, chunks[0], "Loading", "Fetching data...", colors),
        Some(PlotStatus::Ready(request)) => match &request.data {
            PlotData::Series { x, y } => draw_series(f, chunks[0], x, y, &request.hints, colors),
            PlotData::Heatmap { z } => draw_heatmap(f, chunks[0], z, &request.hints, colors),
        },
        Some(status) => {
            if let Some((title, message)) = status.message() {
                draw_message(f, chunks[0], title, &message, colors);
            }
        },
    }

    draw_footer(f, chunks[1], vis, colors);
}

fn draw_series(
    f: &mut Frame<'_>,
    area: Rect,
    x: &[f64],
    y: &[f64],
    hints: &PlotHints,
    colors: &ThemeColors,
) {
    let points: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(_, v)| v.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();

    if points.is_empty() {
        draw_message(f, area, &hints.title, "No valid data to display", colors);
        return;
    }

    let (min_val, max_val) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &(_, v)| {
            (min.min(v), max.max(v))
        });
    let mut padding = (max_val - min_val).abs() * 0.15;
    if padding == 0.0 {
        padding = 1.0;
    }
    let (y_min, y_max) = (min_val - padding, max_val + padding);
    let x_min = points[0].0;
    let x_max = points[points.len() - 1].0.max(x_min + 1.0);

    // Downsample to fit width
    let mut series = points;
    if area.width > 4 {
        let bins = (area.width as usize).saturating_sub(8).max(1);
        if series.len() > bins {
            let step = (series.len() as f64) / (bins as f64);
            let mut simple = Vec::with_capacity(bins);
            let mut pos = 0.0;
            while (pos as usize) < series.len() {
                simple.push(series[pos as usize]);
                pos += step;
            }
            series = simple;
        }
    }

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(ColorScale::Viridis.color(0.6)))
        .data(&series)];

    let x_axis = Axis::default()
        .title(hints.x_label.as_str())
        .style(Style::default().fg(colors.fg0))
        .bounds([x_min, x_max])
        .labels(vec![
            format_axis_label(x_min),
            format_axis_label((x_min + x_max) / 2.0),
            format_axis_label(x_max),
        ]);

    let y_axis = Axis::default()
        .title(hints.y_label.as_str())
        .style(Style::default().fg(colors.fg0))
        .bounds([y_min, y_max])
        .labels(vec![
            format_axis_label(y_min),
            format_axis_label((y_min + y_max) / 2.0),
            format_axis_label(y_max),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.bg2))
                .title(format!(" {} ", hints.title))
                .title_style(Style::default().fg(colors.yellow)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    f.render_widget(chart, area);
}

fn draw_heatmap(
    f: &mut Frame<'_>,
    area: Rect,
    z: &Array2<f64>,
    hints: &PlotHints,
    colors: &ThemeColors,
) {
    let scale = hints.color_scale.unwrap_or_default();
    let (rows, cols) = z.dim();

    let (min_val, max_val) = z
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
            (min.min(v), max.max(v))
        });
    let mut range = max_val - min_val;
    if !range.is_finite() || range.abs() < 1e-10 {
        range = 1.0;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors.bg2))
        .title(format!(
            " {} | {} x {} | {} ",
            hints.title,
            rows,
            cols,
            scale.name()
        ))
        .title_style(Style::default().fg(colors.yellow));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if inner.width < 12 || inner.height < 4 {
        return;
    }

    // Colorbar row on top, axis label row at the bottom, row labels left.
    let left_margin = 8;
    let heatmap_area = Rect {
        x: inner.x + left_margin,
        y: inner.y + 1,
        width: inner.width.saturating_sub(left_margin),
        height: inner.height.saturating_sub(2),
    };

    let colorbar_width = 40.min((inner.width as usize).saturating_sub(20));
    let colorbar_start = heatmap_area.x
        + ((heatmap_area.width as usize).saturating_sub(colorbar_width) / 2) as u16;
    for i in 0..colorbar_width {
        let t = i as f64 / colorbar_width as f64;
        if let Some(cell) = f.buffer_mut().cell_mut((colorbar_start + i as u16, inner.y)) {
            cell.set_char('█').set_fg(scale.color(t));
        }
    }
    let min_label = format_axis_label(min_val);
    let min_x = colorbar_start.saturating_sub(min_label.len() as u16 + 1);
    put_str(f, min_x, inner.y, &min_label, colors.green, inner.x + inner.width);
    let max_x = colorbar_start + colorbar_width as u16 + 1;
    put_str(f, max_x, inner.y, &format_axis_label(max_val), colors.green, inner.x + inner.width);

    let pixel_width = 2;
    let disp_rows = (heatmap_area.height as usize).min(rows).max(1);
    let disp_cols = (heatmap_area.width as usize / pixel_width).min(cols).max(1);
    let row_step = rows as f64 / disp_rows as f64;
    let col_step = cols as f64 / disp_cols as f64;

    for y in 0..disp_rows {
        let screen_row = if hints.reverse_y { y } else { disp_rows - 1 - y };
        let row_idx = ((y as f64 * row_step).floor() as usize).min(rows - 1);
        for px in 0..disp_cols {
            let col_idx = ((px as f64 * col_step).floor() as usize).min(cols - 1);
            let val = z[[row_idx, col_idx]];
            for i in 0..pixel_width {
                let screen_x = heatmap_area.x + (px * pixel_width + i) as u16;
                let screen_y = heatmap_area.y + screen_row as u16;
                if let Some(cell) = f.buffer_mut().cell_mut((screen_x, screen_y)) {
                    if val.is_finite() {
                        cell.set_char('█')
                            .set_fg(scale.color((val - min_val) / range));
                    } else {
                        cell.set_char('·').set_fg(colors.gray);
                    }
                }
            }
        }
    }

    // Row labels: first, middle and last drawn row.
    for y in [0, disp_rows / 2, disp_rows - 1] {
        let screen_row = if hints.reverse_y { y } else { disp_rows - 1 - y };
        let row_idx = ((y as f64 * row_step).floor() as usize).min(rows - 1);
        let label: String = row_idx.to_string().chars().take(7).collect();
        let x = heatmap_area.x.saturating_sub(label.len() as u16 + 1);
        put_str(f, x, heatmap_area.y + screen_row as u16, &label, colors.green, heatmap_area.x);
    }

    // Column labels under the last drawn row.
    let label_y = heatmap_area.y + disp_rows as u16;
    for px in [0, disp_cols / 2, disp_cols - 1] {
        let col_idx = ((px as f64 * col_step).floor() as usize).min(cols - 1);
        let x = heatmap_area.x + (px * pixel_width) as u16;
        put_str(
            f,
            x,
            label_y,
            &col_idx.to_string(),
            colors.green,
            heatmap_area.x + heatmap_area.width,
        );
    }

    let axis_hint = format!("{} ↓ / {} →", hints.y_label, hints.x_label);
    put_str(f, inner.x, inner.y, &axis_hint, colors.gray, colorbar_start.min(min_x));
}

fn put_str(
    f: &mut Frame<'_>,
    x: u16,
    y: u16,
    text: &str,
    color: ratatui::style::Color,
    limit: u16,
) {
    for (i, ch) in text.chars().enumerate() {
        let cx = x + i as u16;
        if cx >= limit {
            break;
        }
        if let Some(cell) = f.buffer_mut().cell_mut((cx, y)) {
            cell.set_char(ch).set_fg(color);
        }
    }
}

fn draw_message(f: &mut Frame<'_>, area: Rect, title: &str, message: &str, colors: &ThemeColors) {
    let lines = vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(colors.yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(colors.fg0))),
        Line::from(""),
        Line::from("Press Esc to close"),
    ];

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(colors.fg0))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, vis: Option<&Visualization>, colors: &ThemeColors) {
    let help = match vis {
        Some(vis) if vis.has_modes() && vis.mode() == PlotMode::Line => format!(
            "m: Heatmap | +/-: Row {} of {} | c: Scale | Esc: Close",
            vis.row(),
            vis.rows().unwrap_or(0)
        ),
        Some(vis) if vis.has_modes() => format!(
            "m: Line | c: Scale ({}) | Esc: Close",
            vis.scale().name()
        ),
        _ => "Esc: Close".to_string(),
    };
    let readout = match vis.map(Visualization::request) {
        Some(PlotStatus::Ready(request)) => match request.data {
            PlotData::Series { y, .. } => summary(&y),
            PlotData::Heatmap { z } => summary(z.as_slice().unwrap_or(&[])),
        },
        _ => String::new(),
    };

    let lines = vec![
        Line::from(Span::styled(readout, Style::default().fg(colors.aqua))),
        Line::from(Span::styled(help, Style::default().fg(colors.green))),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn summary(values: &[f64]) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return String::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    format!(
        "n={}  min={}  max={}  mean={}",
        values.len(),
        format_stat_value(min),
        format_stat_value(max),
        format_stat_value(mean)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_keeps_last_status() {
        let mut pane = PlotPane::new();
        pane.present(PlotStatus::Empty);
        pane.present(PlotStatus::Unsupported { rank: 3 });
        assert_eq!(pane.status(), Some(&PlotStatus::Unsupported { rank: 3 }));
        pane.close();
        assert!(pane.status().is_none());
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(&[1.0, 3.0, f64::NAN]), "n=3  min=1  max=3  mean=2");
        assert_eq!(summary(&[]), "");
    }
}
