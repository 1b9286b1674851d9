use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use logdash_types::LogRecord;

use crate::{
    app::{AppState, NO_RESULTS, SearchPanel},
    ui::{
        Layout, Theme,
        components::{Banner, TextInput},
        truncate,
    },
};

use super::login::pad;

pub(super) fn render(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let [filters_area, input_area, banner_area, results_area, summary_area] = Layout::rows(
        area,
        [
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ],
    );

    render_filters(frame, filters_area, &state.search);

    frame.render_widget(
        TextInput::new("Search", &state.search.query)
            .focused(state.ui_state.editing)
            .placeholder("press / to type a search term"),
        input_area,
    );

    let spinner = state.spinner();
    let panel = &mut state.search;

    if panel.busy {
        let message = format!("{spinner} Searching...");
        frame.render_widget(Banner::info(&message), pad(banner_area));
    } else if let Some(error) = &panel.error {
        frame.render_widget(Banner::error(error), pad(banner_area));
    }

    let (table_area, detail_area) = Layout::with_detail(results_area, panel.detail_visible);
    render_results(frame, table_area, panel);
    if let Some(detail_area) = detail_area {
        render_detail(frame, detail_area, panel.selected_record());
    }

    if let Some(summary) = panel.page_summary() {
        let line = Line::from(vec![
            Span::styled(format!(" {summary}"), Theme::text_dim()),
            Span::styled("   [n] next  [p] prev", Theme::text_dim()),
        ]);
        frame.render_widget(Paragraph::new(line), summary_area);
    }
}

fn render_filters(frame: &mut Frame, area: Rect, panel: &SearchPanel) {
    let level = panel.level.map_or("Any", |l| l.as_param());
    let source = panel.source.unwrap_or("Any");
    let time = panel.time_range.label();

    let filter = |key: &'static str, name: &'static str, value: &str, set: bool| {
        let value_style = if set {
            Theme::text_highlight()
        } else {
            Theme::text()
        };
        vec![
            Span::styled(format!(" [{key}] "), Theme::status_bar_key().bg(Theme::BG)),
            Span::styled(format!("{name}: "), Theme::label()),
            Span::styled(value.to_string(), value_style),
            Span::raw("  "),
        ]
    };

    let mut spans = filter("v", "Level", level, panel.level.is_some());
    spans.extend(filter("s", "Source", source, panel.source.is_some()));
    spans.extend(filter(
        "t",
        "Time",
        time,
        panel.time_range.as_duration().is_some(),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_results(frame: &mut Frame, area: Rect, panel: &mut SearchPanel) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(" Results ", Theme::label()));

    let Some(results) = &panel.results else {
        let hint = Paragraph::new(Span::styled(
            "Enter a search term or pick a filter, then press Enter.",
            Theme::text_dim(),
        ))
        .block(block);
        frame.render_widget(hint, area);
        return;
    };

    if results.logs.is_empty() {
        let empty = Paragraph::new(Span::styled(NO_RESULTS, Theme::text_dim()))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let message_width = (area.width as usize).saturating_sub(48).max(10);
    let rows: Vec<Row> = results
        .logs
        .iter()
        .map(|record| record_row(record, message_width))
        .collect();

    let header = Row::new(["Time", "Level", "Source", "Message", "Fields"])
        .style(Theme::table_header());

    let table = Table::new(
        rows,
        [
            Constraint::Length(19),
            Constraint::Length(5),
            Constraint::Length(12),
            Constraint::Fill(3),
            Constraint::Fill(1),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(Theme::row_selected());

    frame.render_stateful_widget(table, area, &mut panel.table_state);
}

fn record_row(record: &LogRecord, message_width: usize) -> Row<'static> {
    let time = record
        .timestamp
        .map(|ts| {
            ts.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string());
    let level_style = Style::default()
        .fg(record.level.color())
        .add_modifier(Modifier::BOLD);

    Row::new(vec![
        Cell::from(Span::styled(time, Theme::text_dim())),
        Cell::from(Span::styled(record.level.as_str(), level_style)),
        Cell::from(Span::styled(record.source.clone(), Theme::text())),
        Cell::from(Span::styled(
            truncate(&record.message, message_width),
            Theme::text(),
        )),
        Cell::from(Span::styled(
            record.fields_summary().unwrap_or_default(),
            Theme::text_dim(),
        )),
    ])
}

fn render_detail(frame: &mut Frame, area: Rect, record: Option<&LogRecord>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border_focused())
        .title(Span::styled(" Detail ", Theme::title()));

    let Some(record) = record else {
        frame.render_widget(
            Paragraph::new(Span::styled("No row selected", Theme::text_dim())).block(block),
            area,
        );
        return;
    };

    let field = |name: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{name:<8}"), Theme::label()),
            Span::styled(value, Theme::text()),
        ])
    };

    let mut lines = vec![
        field(
            "Time",
            record
                .timestamp
                .map(|ts| ts.with_timezone(&Local).to_rfc3339())
                .unwrap_or_else(|| "-".to_string()),
        ),
        field("Level", record.level.as_param().to_string()),
        field("Source", record.source.clone()),
    ];
    if let Some(upload_id) = record.upload_id {
        lines.push(field("Upload", format!("#{upload_id}")));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(record.message.clone(), Theme::text())));

    if let Some(pretty) = record.fields_pretty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Fields", Theme::text_highlight())));
        lines.extend(
            pretty
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Theme::text_dim()))),
        );
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::DashboardTab;
    use crate::ui::testing::{contains, render_lines};
    use logdash_types::{LogLevel, SearchPage, User};
    use serde_json::json;
    use tokio::sync::mpsc;

    fn state() -> AppState {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(tx, "http://localhost:8000".to_string(), 50);
        state.sign_in(User::placeholder("alice"));
        state.select_tab(DashboardTab::Search);
        state
    }

    fn record(message: &str) -> LogRecord {
        LogRecord {
            id: Some(1),
            upload_id: Some(42),
            timestamp: None,
            level: LogLevel::Error,
            source: "Nginx".to_string(),
            message: message.to_string(),
            additional_fields: json!({"status": "504"}).as_object().cloned(),
        }
    }

    fn draw(state: &mut AppState) -> Vec<String> {
        render_lines(120, 24, |f| {
            let area = f.area();
            render(f, area, state)
        })
    }

    #[test]
    fn test_results_table() {
        let mut state = state();
        state.search.apply_results(SearchPage {
            logs: vec![record("upstream timed out")],
            total: 1,
            page: 1,
            per_page: 50,
            total_pages: None,
        });

        let lines = draw(&mut state);
        assert!(contains(&lines, "upstream timed out"));
        assert!(contains(&lines, "ERR"));
        assert!(contains(&lines, "Page 1 of 1 · 1 results"));
        assert!(!contains(&lines, "Detail"));

        state.search.toggle_detail();
        let lines = draw(&mut state);
        assert!(contains(&lines, "Detail"));
        assert!(contains(&lines, "\"status\": \"504\""));
    }

    #[test]
    fn test_empty_results_message() {
        let mut state = state();
        state.search.apply_results(SearchPage {
            logs: vec![],
            total: 0,
            page: 1,
            per_page: 50,
            total_pages: None,
        });

        let lines = draw(&mut state);
        assert!(contains(&lines, "No logs found."));
    }

    #[test]
    fn test_filters_line() {
        let mut state = state();
        state.search.next_level();
        state.search.next_source();
        state.search.error = Some("Please enter a search term or select a filter".to_string());

        let lines = draw(&mut state);
        assert!(contains(&lines, "Level: ERROR"));
        assert!(contains(&lines, "Source: Apache"));
        assert!(contains(&lines, "Time: All time"));
        assert!(contains(&lines, "Please enter a search term"));
    }
}
