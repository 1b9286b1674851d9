use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Tabs},
};

use crate::{
    app::{AppState, DashboardTab},
    ui::{Layout, Theme, components::StatusBar},
};

use super::{analytics_panel, search_panel, upload_panel};

/// Main screen for a signed-in user
pub struct DashboardScreen;

impl DashboardScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let area = frame.area();
        let (header_area, content_area, status_area) = Layout::main(area);

        Self::render_header(frame, header_area, state);

        let [tabs_area, panel_area] =
            Layout::rows(content_area, [Constraint::Length(3), Constraint::Min(1)]);
        Self::render_tabs(frame, tabs_area, state.tab);

        match state.tab {
            DashboardTab::Upload => upload_panel::render(frame, panel_area, state),
            DashboardTab::Search => search_panel::render(frame, panel_area, state),
            DashboardTab::Analytics => analytics_panel::render(frame, panel_area, state),
        }

        Self::render_status_bar(frame, status_area, state);
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
        let who = state
            .user
            .as_ref()
            .map(|user| format!("{} ({})", user.username, user.role))
            .unwrap_or_default();

        super::render_header(
            frame,
            area,
            vec![
                Span::styled(who, Theme::text_highlight()),
                Span::styled(state.server.as_str(), Theme::text()),
            ],
        );
    }

    fn render_tabs(frame: &mut Frame, area: Rect, selected: DashboardTab) {
        let titles: Vec<Line> = DashboardTab::ALL
            .iter()
            .map(|tab| Line::from(format!("{} {}", tab.index() + 1, tab.title())))
            .collect();

        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            )
            .style(Theme::tab())
            .highlight_style(Theme::tab_selected())
            .select(selected.index())
            .divider(Span::styled("│", Theme::text_dim()));

        frame.render_widget(tabs, area);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let hints: &[(&str, &str)] = if state.ui_state.editing {
            &[("Enter", "Done"), ("Esc", "Cancel"), ("Ctrl+u", "Clear")]
        } else {
            match state.tab {
                DashboardTab::Upload => &[
                    ("e", "Edit path"),
                    ("u", "Upload"),
                    ("r", "Refresh"),
                    ("C", "Stop waiting"),
                    ("?", "Help"),
                    ("x", "Sign out"),
                ],
                DashboardTab::Search => &[
                    ("/", "Search text"),
                    ("Enter", "Search"),
                    ("v/s/t", "Filters"),
                    ("n/p", "Page"),
                    ("d", "Detail"),
                    ("?", "Help"),
                ],
                DashboardTab::Analytics => &[
                    ("r", "Load"),
                    ("1-3", "Tabs"),
                    ("?", "Help"),
                    ("x", "Sign out"),
                    ("q", "Quit"),
                ],
            }
        };

        let status = StatusBar::new()
            .hints(hints.iter().copied())
            .right(state.tab.title());

        frame.render_widget(status, area);
    }
}
