mod analytics_panel;
mod dashboard;
mod login;
mod register;
mod search_panel;
mod upload_panel;

pub use dashboard::DashboardScreen;
pub use login::LoginScreen;
pub use register::RegisterScreen;

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::ui::Theme;

/// Bordered header line: app name followed by `│`-separated segments
fn render_header(frame: &mut Frame, area: Rect, segments: Vec<Span<'_>>) {
    let mut spans = vec![Span::styled("logdash", Theme::title())];
    for segment in segments {
        spans.push(Span::styled(" │ ", Theme::text_dim()));
        spans.push(segment);
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    frame.render_widget(header, area);
}
