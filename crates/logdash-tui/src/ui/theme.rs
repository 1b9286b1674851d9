use ratatui::style::{Color, Modifier, Style};

/// Color theme for the application
pub struct Theme;

impl Theme {
    // Base colors
    pub const BG: Color = Color::Reset;
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Accent colors
    pub const PRIMARY: Color = Color::Cyan;
    pub const HIGHLIGHT: Color = Color::Yellow;

    // Status colors
    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;

    // Border styles
    pub fn border() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    // Text styles
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn text_highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    // Tabs
    pub fn tab() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn tab_selected() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    // Table and list rows
    pub fn row_selected() -> Style {
        Style::default()
            .fg(Self::BG)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn table_header() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    // Status bar
    pub fn status_bar() -> Style {
        Style::default().fg(Self::FG_DIM).bg(Color::DarkGray)
    }

    pub fn status_bar_key() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    }

    // Banners
    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default()
            .fg(Self::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    pub fn info() -> Style {
        Style::default().fg(Self::PRIMARY)
    }
}
