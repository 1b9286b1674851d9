use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::ui::Theme;

/// One-line status or error message
pub struct Banner<'a> {
    message: &'a str,
    style: Style,
    icon: &'static str,
}

impl<'a> Banner<'a> {
    pub fn error(message: &'a str) -> Self {
        Self {
            message,
            style: Theme::error(),
            icon: "✗ ",
        }
    }

    pub fn success(message: &'a str) -> Self {
        Self {
            message,
            style: Theme::success(),
            icon: "✓ ",
        }
    }

    pub fn info(message: &'a str) -> Self {
        Self {
            message,
            style: Theme::info(),
            icon: "",
        }
    }
}

impl Widget for Banner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled(self.icon, self.style),
            Span::styled(self.message, self.style),
        ]);
        Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
