use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::TextField;
use crate::ui::Theme;

/// Bordered single-line input box
pub struct TextInput<'a> {
    label: &'a str,
    field: &'a TextField,
    focused: bool,
    placeholder: &'a str,
}

impl<'a> TextInput<'a> {
    pub fn new(label: &'a str, field: &'a TextField) -> Self {
        Self {
            label,
            field,
            focused: false,
            placeholder: "",
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (border, title) = if self.focused {
            (Theme::border_focused(), Theme::title())
        } else {
            (Theme::border(), Theme::label())
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(format!(" {} ", self.label), title));

        let shown = self.field.display();
        let mut spans = if shown.is_empty() && !self.focused {
            vec![Span::styled(self.placeholder, Theme::text_dim())]
        } else {
            // Keep the tail visible when the value is wider than the box
            let inner = area.width.saturating_sub(3) as usize;
            let visible = tail(&shown, inner);
            vec![Span::styled(visible, Theme::text())]
        };
        if self.focused {
            spans.push(Span::styled("▏", Theme::text_highlight()));
        }

        Paragraph::new(Line::from(spans))
            .block(block)
            .render(area, buf);
    }
}

/// Last `max_width` columns of `s`
fn tail(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut start = s.len();
    let mut width = 0;
    for (i, c) in s.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        start = i;
    }
    s[start..].to_string()
}
