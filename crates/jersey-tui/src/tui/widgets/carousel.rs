// Carousel panel: the slide track scrolled to the engine's offset.
//
// The engine works in abstract units; each terminal column is
// `units_per_cell` units. Slides partially outside the viewport are clipped
// to the visible columns.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use jersey_core::carousel::CarouselEngine;

use super::card::{self, CardProps};
use crate::tui::ViewState;

/// Screen rectangles of the slides visible in `viewport`, with their
/// indices.
pub fn slide_rects(engine: &CarouselEngine, units_per_cell: f64, viewport: Rect) -> Vec<(usize, Rect)> {
    if units_per_cell <= 0.0 || viewport.width == 0 || viewport.height == 0 {
        return Vec::new();
    }
    let metrics = engine.metrics();
    let offset = engine.offset();
    let columns = f64::from(viewport.width);

    (0..engine.len())
        .filter_map(|index| {
            let left = (metrics.slide_left(index) - offset) / units_per_cell;
            let right = left + metrics.slide_width / units_per_cell;
            let start = left.round().max(0.0);
            let end = right.round().min(columns);
            if end <= start {
                return None;
            }
            Some((
                index,
                Rect::new(
                    viewport.x + start as u16,
                    viewport.y,
                    (end - start) as u16,
                    viewport.height,
                ),
            ))
        })
        .collect()
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title_style = if state.carousel.is_dragging() {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" Choose Your Jersey ", title_style));
    let viewport = block.inner(area);
    frame.render_widget(block, area);

    if state.catalog.is_empty() {
        frame.render_widget(
            Paragraph::new("No jerseys available.").style(Style::default().fg(Color::DarkGray)),
            viewport,
        );
        return;
    }

    let current = state.carousel.current_index();
    let selected = state.flow.selected_jersey_id();
    for (index, rect) in slide_rects(&state.carousel, state.units_per_cell, viewport) {
        let Some(jersey) = state.catalog.get(index) else {
            continue;
        };
        card::render(
            frame,
            rect,
            &CardProps {
                jersey,
                face: state.face(index),
                current: index == current,
                selected: selected == Some(jersey.id.as_str()),
                voted: state.is_voted(&jersey.id),
            },
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::test_util::buffer_text;
    use jersey_core::carousel::{CarouselOptions, Direction};
    use jersey_core::catalog::Catalog;
    use std::time::Instant;

    fn engine(viewport_units: f64) -> CarouselEngine {
        let mut engine = CarouselEngine::new(Catalog::reference().unwrap().ids(), CarouselOptions::default());
        engine.resize(viewport_units);
        engine
    }

    fn viewport() -> Rect {
        Rect::new(1, 1, 100, 20)
    }

    #[test]
    fn first_index_shows_leading_slides() {
        let rects = slide_rects(&engine(800.0), 8.0, viewport());
        let indices: Vec<usize> = rects.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        // 320 units = 40 columns, flush with the left edge.
        assert_eq!(rects[0].1, Rect::new(1, 1, 40, 20));
        // Slide 1 starts at 338 units = 42.25 columns.
        assert_eq!(rects[1].1.x, 1 + 42);
    }

    #[test]
    fn middle_index_is_centered() {
        let mut engine = engine(800.0);
        engine.navigate(Direction::Next);
        engine.navigate(Direction::Next);
        let rects = slide_rects(&engine, 8.0, viewport());
        let (_, current) = rects.iter().find(|(i, _)| *i == 2).unwrap();
        // Offset 436 puts slide 2 at 240..560 units = columns 30..70.
        assert_eq!(current.x, 1 + 30);
        assert_eq!(current.width, 40);
    }

    #[test]
    fn last_index_clamps_to_track_end() {
        let mut engine = engine(800.0);
        for _ in 0..4 {
            engine.navigate(Direction::Next);
        }
        assert_eq!(engine.offset(), 872.0);
        let rects = slide_rects(&engine, 8.0, viewport());
        let (_, last) = rects.iter().find(|(i, _)| *i == 4).unwrap();
        // Right edge of the last slide meets the right edge of the viewport.
        assert_eq!(last.x + last.width, 1 + 100);
    }

    #[test]
    fn no_rects_without_viewport() {
        assert!(slide_rects(&engine(800.0), 8.0, Rect::new(0, 0, 0, 10)).is_empty());
        assert!(slide_rects(&engine(800.0), 0.0, viewport()).is_empty());
    }

    #[test]
    fn render_shows_title_and_current_card() {
        let now = Instant::now();
        let mut state = ViewState::new(Catalog::reference().unwrap(), CarouselOptions::default(), 8.0, now);
        state.set_screen(Rect::new(0, 0, 102, 40));
        let backend = ratatui::backend::TestBackend::new(102, 22);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Choose Your Jersey"));
        assert!(text.contains("Design 1"));
        assert!(text.contains("Design 2"));
    }
}
