use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use logdash_types::Role;

use crate::{
    app::{AppState, RegisterField},
    ui::{
        Layout, Theme,
        components::{Banner, StatusBar, TextInput},
    },
};

use super::login::pad;

/// Account creation screen
pub struct RegisterScreen;

impl RegisterScreen {
    pub fn render(frame: &mut Frame, state: &AppState) {
        let area = frame.area();
        let (header_area, content_area, status_area) = Layout::main(area);

        super::render_header(
            frame,
            header_area,
            vec![
                Span::styled(state.server.as_str(), Theme::text()),
                Span::styled("Create account", Theme::text_highlight()),
            ],
        );

        Self::render_form(frame, content_area, state);

        let status = StatusBar::new().hints([
            ("Tab", "Next field"),
            ("←/→", "Role"),
            ("Enter", "Register"),
            ("Esc", "Back"),
        ]);
        frame.render_widget(status, status_area);
    }

    fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
        let form = &state.register;
        let box_area = Layout::centered(area, 52, 18);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(" Create account ", Theme::title()));
        let inner = block.inner(box_area);
        frame.render_widget(block, box_area);

        let [username_area, email_area, password_area, role_area, banner_area] = Layout::rows(
            inner,
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(1),
            ],
        );

        frame.render_widget(
            TextInput::new("Username", &form.username)
                .focused(form.focus == RegisterField::Username),
            username_area,
        );
        frame.render_widget(
            TextInput::new("Email", &form.email)
                .focused(form.focus == RegisterField::Email)
                .placeholder("you@example.com"),
            email_area,
        );
        frame.render_widget(
            TextInput::new("Password", &form.password)
                .focused(form.focus == RegisterField::Password),
            password_area,
        );

        Self::render_role(frame, role_area, form.role, form.focus == RegisterField::Role);

        let banner_area = pad(banner_area);
        if let Some(request) = state.auth_pending {
            let message = format!("{} {}", state.spinner(), request.label());
            frame.render_widget(Banner::info(&message), banner_area);
        } else if let Some(error) = &state.auth_error {
            frame.render_widget(Banner::error(error), banner_area);
        }
    }

    fn render_role(frame: &mut Frame, area: Rect, role: Role, focused: bool) {
        let label = if focused {
            Theme::title()
        } else {
            Theme::label()
        };

        let mut spans = vec![Span::styled(" Role: ", label)];
        for option in [Role::Viewer, Role::Admin] {
            let (marker, style) = if option == role {
                ("◉ ", Theme::text_highlight())
            } else {
                ("○ ", Theme::text_dim())
            };
            spans.push(Span::styled(marker, style));
            spans.push(Span::styled(option.as_str(), style));
            spans.push(Span::raw("  "));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Screen;
    use crate::ui::testing::{contains, render_lines};
    use tokio::sync::mpsc;

    #[test]
    fn test_renders_fields_and_role() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(tx, "http://localhost:8000".to_string(), 50);
        state.navigate_to(Screen::Register);
        state.register.email.set("dave@example.com");
        state.register.toggle_role();
        state.auth_error = Some("Username already registered".to_string());

        let lines = render_lines(80, 26, |f| RegisterScreen::render(f, &state));
        assert!(contains(&lines, "dave@example.com"));
        assert!(contains(&lines, "◉ admin"));
        assert!(contains(&lines, "Username already registered"));
    }
}
