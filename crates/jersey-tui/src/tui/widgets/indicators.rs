// Indicator dots under the carousel, one per slide. Clicking a dot jumps to
// that slide.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Columns per dot: the dot and one space.
const DOT_STRIDE: u16 = 2;

fn row_width(len: usize) -> u16 {
    let len = u16::try_from(len).unwrap_or(u16::MAX / DOT_STRIDE);
    (len * DOT_STRIDE).saturating_sub(1)
}

/// First column of the dot row, centered in `area`.
fn row_start(area: Rect, len: usize) -> u16 {
    area.x + area.width.saturating_sub(row_width(len)) / 2
}

/// Index of the dot at `column`, if any.
pub fn indicator_at(area: Rect, len: usize, column: u16) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let offset = column.checked_sub(row_start(area, len))?;
    if offset % DOT_STRIDE != 0 {
        return None;
    }
    let index = usize::from(offset / DOT_STRIDE);
    (index < len).then_some(index)
}

pub fn render(frame: &mut Frame, area: Rect, len: usize, current: usize) {
    if len == 0 || area.width == 0 {
        return;
    }
    let mut spans = Vec::with_capacity(len * 2);
    for index in 0..len {
        if index > 0 {
            spans.push(Span::raw(" "));
        }
        if index == current {
            spans.push(Span::styled(
                "●",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled("○", Style::default().fg(Color::DarkGray)));
        }
    }

    let x = row_start(area, len);
    let width = row_width(len).min(area.x + area.width - x);
    frame.render_widget(
        Paragraph::new(Line::from(spans)),
        Rect::new(x, area.y, width, 1),
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
