//! Details pane: common properties and classified attributes.

use crate::attributes::Bucket;
use crate::inspect::{AttributePanel, AttributeRow, Inspection, RowKind};
use crate::ui::formatters::truncate_to_width;
use crate::ui::ThemeColors;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

/// What the details pane shows.
#[derive(Debug, Clone, Copy)]
pub struct DetailsView<'a> {
    /// Inspection of the selected node, once fetched.
    pub inspection: Option<&'a Inspection>,
    /// Whether a fetch for the selection is queued.
    pub loading: bool,
    /// Attribute tab and cursor.
    pub panel: &'a AttributePanel,
    /// Scroll offset of the property list.
    pub scroll: u16,
    /// Whether the attribute list has focus.
    pub focused: bool,
}

/// Draw the details pane for the current inspection.
pub fn draw_details(f: &mut Frame<'_>, view: DetailsView<'_>, area: Rect, colors: &ThemeColors) {
    let DetailsView {
        inspection,
        loading,
        panel,
        scroll,
        focused,
    } = view;
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { colors.yellow } else { colors.bg2 }))
        .style(Style::default().bg(colors.bg0));

    let Some(inspection) = inspection else {
        let text = if loading {
            "Loading..."
        } else {
            "Select a node to view details"
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            text,
            Style::default().fg(colors.gray),
        )))
        .block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let props = format_properties(inspection, colors);
    let props_height = (props.len() as u16).min(inner.height / 2);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(props_height),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    let paragraph = Paragraph::new(props)
        .style(Style::default().fg(colors.fg0))
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0));
    f.render_widget(paragraph, chunks[0]);

    let titles: Vec<Line<'_>> = Bucket::ALL
        .iter()
        .enumerate()
        .map(|(i, bucket)| Line::from(format!("{}:{}", i + 1, bucket.title())))
        .collect();
    let selected = Bucket::ALL
        .iter()
        .position(|b| *b == panel.tab)
        .unwrap_or_default();
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(colors.gray).bg(colors.bg1))
        .highlight_style(
            Style::default()
                .fg(colors.yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[1]);

    let rows = inspection.attribute_rows(panel.tab);
    draw_attributes(f, &rows, panel, focused, chunks[2], colors);
}

fn format_properties(inspection: &Inspection, colors: &ThemeColors) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        inspection.node.display_name(),
        Style::default()
            .fg(colors.aqua)
            .add_modifier(Modifier::BOLD),
    ))];

    for (label, value) in inspection.common_properties() {
        let value_color = if label == "Brillouin Type" {
            colors.orange
        } else {
            colors.fg0
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", label), Style::default().fg(colors.green)),
            Span::styled(value, Style::default().fg(value_color)),
        ]));
    }
    lines
}

fn draw_attributes(
    f: &mut Frame<'_>,
    rows: &[AttributeRow],
    panel: &AttributePanel,
    focused: bool,
    area: Rect,
    colors: &ThemeColors,
) {
    let height = area.height as usize;
    let offset = if height == 0 {
        0
    } else {
        panel.cursor.saturating_sub(height - 1)
    };
    let width = area.width as usize;

    let items: Vec<ListItem<'_>> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(idx, row)| {
            let indent = "  ".repeat(row.depth);
            let (icon, value_color) = match row.kind {
                RowKind::Message => ("", colors.gray),
                RowKind::Plain => ("", colors.fg0),
                RowKind::Invalid => ("", colors.red),
                RowKind::Composite { expanded: true } => ("▼ ", colors.orange),
                RowKind::Composite { expanded: false } => ("▶ ", colors.orange),
                RowKind::Leaf => ("  ", colors.aqua),
            };

            let mut spans = vec![Span::raw(indent)];
            if !row.label.is_empty() {
                spans.push(Span::styled(
                    format!("{}: ", row.label),
                    Style::default().fg(colors.green),
                ));
            }
            spans.push(Span::raw(icon));
            let used: usize = spans.iter().map(|s| s.width()).sum();
            spans.push(Span::styled(
                truncate_to_width(&row.text, width.saturating_sub(used)),
                Style::default().fg(value_color),
            ));

            let mut line = Line::from(spans);
            if focused && idx == panel.cursor {
                line = line.style(
                    Style::default()
                        .bg(colors.bg2)
                        .add_modifier(Modifier::BOLD),
                );
            }
            ListItem::new(line)
        })
        .collect();

    f.render_widget(List::new(items), area);
}
