pub mod components;
mod layout;
pub mod screens;
mod text;
mod theme;

pub use layout::Layout;
pub use text::{format_bytes, truncate};
pub use theme::Theme;

#[cfg(test)]
pub(crate) mod testing {
    use ratatui::{Frame, Terminal, backend::TestBackend};

    /// Draw into an in-memory terminal and return the screen as text lines
    pub fn render_lines(width: u16, height: u16, draw: impl FnOnce(&mut Frame)) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(draw).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    pub fn contains(lines: &[String], needle: &str) -> bool {
        lines.iter().any(|line| line.contains(needle))
    }
}
