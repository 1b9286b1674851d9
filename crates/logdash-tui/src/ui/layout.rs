use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Create the main layout with header, content, and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// A box of fixed size centered in `area`, clamped to fit
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height - height) / 2;
        Rect::new(x, y, width, height)
    }

    /// Split `area` into stacked rows of the given heights
    pub fn rows<const N: usize>(area: Rect, heights: [Constraint; N]) -> [Rect; N] {
        RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(heights)
            .areas(area)
    }

    /// Results table with an optional detail pane on the right
    pub fn with_detail(area: Rect, show_detail: bool) -> (Rect, Option<Rect>) {
        if show_detail {
            let chunks = RatatuiLayout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(area);
            (chunks[0], Some(chunks[1]))
        } else {
            (area, None)
        }
    }
}
