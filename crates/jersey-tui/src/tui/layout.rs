// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Carousel (fill, bordered)                         |
// +--------------------------------------------------+
// | Indicators (1 row)                                |
// +------------------------------+-------------------+
// | Selection panel (60%)        | Votes (40%)       |
// +------------------------------+-------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};

/// Height of the bottom row holding the form/confirmation and the votes.
pub const BOTTOM_HEIGHT: u16 = 10;

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    /// The bordered carousel panel.
    pub carousel: Rect,
    /// Inside of the carousel border: the viewport the slides scroll in.
    pub carousel_viewport: Rect,
    pub indicators: Rect,
    pub selection: Rect,
    pub votes: Rect,
    pub help_bar: Rect,
}

/// Build the layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // status bar
            Constraint::Min(8),                // carousel
            Constraint::Length(1),             // indicators
            Constraint::Length(BOTTOM_HEIGHT), // selection + votes
            Constraint::Length(1),             // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let carousel = vertical[1];
    let indicators = vertical[2];
    let bottom = vertical[3];
    let help_bar = vertical[4];

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(bottom);

    AppLayout {
        status_bar,
        carousel,
        carousel_viewport: carousel.inner(Margin::new(1, 1)),
        indicators,
        selection: horizontal[0],
        votes: horizontal[1],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
