//! Main screen layout.

use super::keymap_bar::{draw_keymap, KeymapMode};
use super::status_bar::draw_status;
use super::{centered_rect, ThemeColors};
use crate::app::{App, Focus};
use crate::explorer::details::{draw_details, DetailsView};
use crate::explorer::tree::draw_tree;
use crate::plot::ui::draw_plot;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Draw the browser UI.
pub(super) fn draw_browser(f: &mut Frame<'_>, app: &mut App) {
    let colors = ThemeColors::from_theme(app.theme);

    // Main layout with status bar and key map bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
        .split(f.area());

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    let file_name = app.session.file_name().map(str::to_string);
    draw_tree(
        f,
        &mut app.explorer,
        file_name.as_deref(),
        app.focus == Focus::Tree,
        content[0],
        &colors,
    );

    let view = DetailsView {
        inspection: app.inspection.as_ref(),
        loading: app.inspect_pending() || (app.has_pending() && !app.session.is_open()),
        panel: &app.attribute_panel,
        scroll: app.explorer.details_scroll,
        focused: app.focus == Focus::Attributes,
    };
    draw_details(f, view, content[1], &colors);

    draw_status(f, chunks[1], &app.status, app.has_pending(), &colors);

    let mode = if app.prompt.is_some() {
        KeymapMode::Prompt
    } else if app.plot.visible {
        KeymapMode::Plot
    } else {
        KeymapMode::Browse(app.focus)
    };
    draw_keymap(f, chunks[2], mode, &colors);

    // Overlays
    draw_plot(f, &app.plot, app.visualization.as_ref(), &colors);
    if let Some(input) = &app.prompt {
        draw_prompt(f, input, &colors);
    }
}

fn draw_prompt(f: &mut Frame<'_>, input: &str, colors: &ThemeColors) {
    let area = centered_rect(60, 20, f.area());
    let area = Rect {
        height: area.height.min(5),
        ..area
    };
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "Path to an HDF5 or netCDF file:",
            Style::default().fg(colors.green),
        )),
        Line::from(vec![
            Span::styled(input.to_string(), Style::default().fg(colors.fg0)),
            Span::styled(
                "█",
                Style::default()
                    .fg(colors.yellow)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Open File ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.yellow))
            .style(Style::default().bg(colors.bg0)),
    );
    f.render_widget(paragraph, area);
}
