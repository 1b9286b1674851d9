use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

use logdash_types::UploadState;

use crate::{
    app::{AppState, UploadPhase},
    ui::{
        Layout, Theme,
        components::{Banner, TextInput},
        format_bytes, truncate,
    },
};

use super::login::pad;

pub(super) fn render(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let [input_area, gauge_area, message_area, recent_area] = Layout::rows(
        area,
        [
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(3),
        ],
    );

    frame.render_widget(
        TextInput::new("Log file", &state.upload.path)
            .focused(state.ui_state.editing)
            .placeholder("press e to enter a path, e.g. /var/log/nginx/access.log"),
        input_area,
    );

    render_gauge(frame, gauge_area, state);
    render_message(frame, pad(message_area), state);
    render_recent(frame, recent_area, state);
}

fn render_gauge(frame: &mut Frame, area: Rect, state: &AppState) {
    let panel = &state.upload;
    let (label, color) = match panel.phase {
        UploadPhase::Idle => ("idle".to_string(), Theme::FG_DIM),
        UploadPhase::Uploading => (format!("{} uploading", state.spinner()), Theme::PRIMARY),
        UploadPhase::Processing { checks, .. } => (
            format!("{} processing (check {checks})", state.spinner()),
            Theme::PRIMARY,
        ),
        UploadPhase::Completed => ("done".to_string(), Theme::SUCCESS),
        UploadPhase::Cancelled => ("stopped".to_string(), Theme::FG_DIM),
        _ => ("failed".to_string(), Theme::ERROR),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Progress ", Theme::label())),
        )
        .gauge_style(Style::default().fg(color))
        .ratio(panel.progress().clamp(0.0, 1.0))
        .label(label);

    frame.render_widget(gauge, area);
}

fn render_message(frame: &mut Frame, area: Rect, state: &AppState) {
    let panel = &state.upload;
    let Some(message) = panel.message.as_deref() else {
        return;
    };

    let banner = if panel.phase.is_error() {
        Banner::error(message)
    } else if panel.phase == UploadPhase::Completed {
        Banner::success(message)
    } else {
        Banner::info(message)
    };
    frame.render_widget(banner, area);
}

fn render_recent(frame: &mut Frame, area: Rect, state: &mut AppState) {
    let panel = &mut state.upload;
    let title = if panel.loading_recent {
        " Recent uploads (loading) "
    } else {
        " Recent uploads "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(Span::styled(title, Theme::label()));

    if panel.recent.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No uploads yet. Press r to refresh.",
            Theme::text_dim(),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let name_width = (area.width as usize).saturating_sub(40).max(12);
    let items: Vec<ListItem> = panel
        .recent
        .iter()
        .map(|upload| {
            let name = upload.filename.as_deref().unwrap_or("(unnamed)");
            let size = upload.size.map(format_bytes).unwrap_or_default();
            let when = upload
                .upload_timestamp
                .map(|ts| {
                    ts.with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                })
                .unwrap_or_default();
            let status_style = match upload.status {
                UploadState::Completed => Theme::success(),
                UploadState::Failed => Theme::error(),
                _ => Theme::info(),
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("#{:<5}", upload.id), Theme::text_dim()),
                Span::styled(
                    format!("{:<width$}", truncate(name, name_width), width = name_width),
                    Theme::text(),
                ),
                Span::styled(format!(" {size:>9} "), Theme::text_dim()),
                Span::styled(format!("{:<11}", upload.status.label()), status_style),
                Span::styled(when, Theme::text_dim()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Theme::row_selected())
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut panel.list_state);
}
