use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{DashboardTab, Screen};
use crate::ui::Layout;

/// Help overlay showing keybindings for the current screen
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame, screen: Screen, tab: DashboardTab) {
        let help_text = Self::lines(screen, tab);

        let height = (help_text.len() as u16 + 2).min(frame.area().height.saturating_sub(2));
        let popup_area = Layout::centered(frame.area(), 54, height);

        frame.render_widget(Clear, popup_area);

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn lines(screen: Screen, tab: DashboardTab) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "Keybindings",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        match screen {
            Screen::Login | Screen::Register => {
                lines.push(Self::section("Forms"));
                lines.push(Self::key_line("Tab/↓", "Next field"));
                lines.push(Self::key_line("S-Tab/↑", "Previous field"));
                lines.push(Self::key_line("Enter", "Submit"));
                lines.push(Self::key_line("Ctrl+u", "Clear field"));
                if screen == Screen::Register {
                    lines.push(Self::key_line("←/→", "Change role"));
                    lines.push(Self::key_line("Esc", "Back to sign in"));
                } else {
                    lines.push(Self::key_line("Ctrl+r", "Create an account"));
                    lines.push(Self::key_line("Esc", "Quit"));
                }
            }
            Screen::Dashboard => {
                lines.push(Self::section("Dashboard"));
                lines.push(Self::key_line("1/2/3", "Upload / Search / Analytics"));
                lines.push(Self::key_line("Tab", "Next tab"));
                lines.push(Self::key_line("x", "Sign out"));
                lines.push(Self::key_line("q", "Quit"));
                lines.push(Line::from(""));
                lines.push(Self::section(tab.title()));
                match tab {
                    DashboardTab::Upload => {
                        lines.push(Self::key_line("e or /", "Edit file path"));
                        lines.push(Self::key_line("u/Enter", "Upload file"));
                        lines.push(Self::key_line("C", "Stop waiting for processing"));
                        lines.push(Self::key_line("r", "Refresh recent uploads"));
                        lines.push(Self::key_line("j/k", "Move in recent uploads"));
                    }
                    DashboardTab::Search => {
                        lines.push(Self::key_line("/", "Edit search text"));
                        lines.push(Self::key_line("Enter", "Search"));
                        lines.push(Self::key_line("v/V", "Cycle level"));
                        lines.push(Self::key_line("s/S", "Cycle source"));
                        lines.push(Self::key_line("t/T", "Cycle time range"));
                        lines.push(Self::key_line("c", "Clear filters"));
                        lines.push(Self::key_line("n/p", "Next / previous page"));
                        lines.push(Self::key_line("j/k", "Move between rows"));
                        lines.push(Self::key_line("d", "Toggle detail pane"));
                    }
                    DashboardTab::Analytics => {
                        lines.push(Self::key_line("r", "Load analytics"));
                    }
                }
            }
        }

        lines.push(Line::from(""));
        let help_key = if screen == Screen::Dashboard { "?/F1" } else { "F1" };
        lines.push(Self::key_line(help_key, "Toggle this help"));
        lines
    }

    fn section(title: &str) -> Line<'static> {
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(Color::Yellow),
        ))
    }

    fn key_line(key: &'static str, desc: &'static str) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {key:>8}"), Style::default().fg(Color::Green)),
            Span::styled(format!("  {desc}"), Style::default().fg(Color::White)),
        ])
    }
}
