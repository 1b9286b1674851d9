use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    app::{AppState, LoginField},
    ui::{
        Layout, Theme,
        components::{Banner, StatusBar, TextInput},
    },
};

/// Sign-in screen
pub struct LoginScreen;

impl LoginScreen {
    pub fn render(frame: &mut Frame, state: &AppState) {
        let area = frame.area();
        let (header_area, content_area, status_area) = Layout::main(area);

        super::render_header(
            frame,
            header_area,
            vec![
                Span::styled(state.server.as_str(), Theme::text()),
                Span::styled("Sign in", Theme::text_highlight()),
            ],
        );

        Self::render_form(frame, content_area, state);

        let status = StatusBar::new().hints([
            ("Tab", "Next field"),
            ("Enter", "Sign in"),
            ("Ctrl+r", "Register"),
            ("?", "Help"),
            ("Esc", "Quit"),
        ]);
        frame.render_widget(status, status_area);
    }

    fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
        let form = &state.login;
        let box_area = Layout::centered(area, 52, 14);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(" Sign in ", Theme::title()));
        let inner = block.inner(box_area);
        frame.render_widget(block, box_area);

        let [username_area, password_area, banner_area, hint_area] = Layout::rows(
            inner,
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ],
        );

        frame.render_widget(
            TextInput::new("Username", &form.username)
                .focused(form.focus == LoginField::Username)
                .placeholder("your username"),
            username_area,
        );
        frame.render_widget(
            TextInput::new("Password", &form.password)
                .focused(form.focus == LoginField::Password),
            password_area,
        );

        let banner_area = pad(banner_area);
        if let Some(request) = state.auth_pending {
            let message = format!("{} {}", state.spinner(), request.label());
            frame.render_widget(Banner::info(&message), banner_area);
        } else if let Some(error) = &state.auth_error {
            frame.render_widget(Banner::error(error), banner_area);
        }

        let hint = Line::from(vec![
            Span::styled(" No account? Press ", Theme::text_dim()),
            Span::styled("Ctrl+r", Theme::text_highlight()),
            Span::styled(" to register", Theme::text_dim()),
        ]);
        frame.render_widget(Paragraph::new(hint), hint_area);
    }
}

/// Indent a banner row by one column
pub(super) fn pad(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(2),
        ..area
    }
}
