use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, List, ListItem, Paragraph},
};

use logdash_types::{AnalyticsSnapshot, LogLevel, NamedCount};

use crate::{
    app::{AnalyticsPanel, AppState},
    ui::{Layout, Theme, components::Banner, truncate},
};

use super::login::pad;

const RANKED_ROWS: usize = 10;

pub(super) fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let panel = &state.analytics;
    let [banner_area, body_area] =
        Layout::rows(area, [Constraint::Length(1), Constraint::Min(3)]);

    if panel.busy {
        let message = format!("{} Loading analytics...", state.spinner());
        frame.render_widget(Banner::info(&message), pad(banner_area));
    } else if let Some(error) = &panel.error {
        frame.render_widget(Banner::error(error), pad(banner_area));
    } else if let Some(at) = panel.loaded_at {
        let line = Line::from(vec![
            Span::styled(
                format!(" {} events", panel.total_events()),
                Theme::text_highlight(),
            ),
            Span::styled(
                format!(" · loaded {}", at.format("%H:%M:%S")),
                Theme::text_dim(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), banner_area);
    }

    match &panel.snapshot {
        Some(snapshot) if !snapshot.is_empty() => render_snapshot(frame, body_area, snapshot),
        Some(_) => render_placeholder(frame, body_area, "No log data yet. Upload a file first."),
        None => render_placeholder(frame, body_area, "Press r to load analytics."),
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(" Analytics ", Theme::label()));
    frame.render_widget(
        Paragraph::new(Span::styled(message, Theme::text_dim())).block(block),
        area,
    );
}

fn render_snapshot(frame: &mut Frame, area: Rect, snapshot: &AnalyticsSnapshot) {
    let [top, bottom] = Layout::rows(area, [Constraint::Percentage(50), Constraint::Percentage(50)]);
    let [levels_area, sources_area] = columns(top);
    let [hourly_area, errors_area] = columns(bottom);

    render_levels(frame, levels_area, &snapshot.levels);
    render_ranked(frame, sources_area, " Sources ", &snapshot.sources, Theme::info());
    render_hourly(frame, hourly_area, snapshot);
    render_ranked(frame, errors_area, " Top errors ", &snapshot.top_errors, Theme::error());
}

fn columns(area: Rect) -> [Rect; 2] {
    RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .areas(area)
}

fn chart_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(title, Theme::title()))
}

fn render_levels(frame: &mut Frame, area: Rect, levels: &[NamedCount]) {
    let bars: Vec<Bar> = levels
        .iter()
        .map(|count| {
            let level = LogLevel::parse(&count.name);
            Bar::default()
                .value(count.value)
                .label(Line::from(level.as_str()))
                .style(Style::default().fg(level.color()))
                .value_style(Theme::row_selected())
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(" Levels "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(6)
        .bar_gap(2);

    frame.render_widget(chart, area);
}

fn render_hourly(frame: &mut Frame, area: Rect, snapshot: &AnalyticsSnapshot) {
    // Only as many hours as fit in the chart
    let inner_width = area.width.saturating_sub(2) as usize;
    let fit = (inner_width / 4).max(1);
    let start = snapshot.hourly.len().saturating_sub(fit);

    let bars: Vec<Bar> = snapshot.hourly[start..]
        .iter()
        .map(|point| {
            let label = point
                .x
                .map(|x| x.with_timezone(&chrono::Local).format("%H").to_string())
                .unwrap_or_default();
            Bar::default()
                .value(point.y)
                .label(Line::from(label))
                .style(Style::default().fg(Theme::PRIMARY))
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(" Events per hour "))
        .data(BarGroup::default().bars(&bars))
        .bar_width(3)
        .bar_gap(1);

    frame.render_widget(chart, area);
}

fn render_ranked(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    counts: &[NamedCount],
    style: Style,
) {
    let name_width = (area.width as usize).saturating_sub(12).max(8);
    let items: Vec<ListItem> = AnalyticsPanel::ranked(counts, RANKED_ROWS)
        .into_iter()
        .map(|count| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>7} ", count.value), style),
                Span::styled(truncate(&count.name, name_width), Theme::text()),
            ]))
        })
        .collect();

    let list = if items.is_empty() {
        List::new([ListItem::new(Span::styled("none", Theme::text_dim()))])
    } else {
        List::new(items)
    };

    frame.render_widget(list.block(chart_block(title)), area);
}
