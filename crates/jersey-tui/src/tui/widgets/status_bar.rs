// Status bar widget: app title, slide position, autoplay state, vote count.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use jersey_core::carousel::CarouselEngine;

use crate::tui::ViewState;

/// Return the autoplay label and its color.
pub fn autoplay_indicator(engine: &CarouselEngine) -> (&'static str, Color) {
    if engine.selection_active() {
        ("off", Color::DarkGray)
    } else if engine.autoplay_running() {
        ("on", Color::Green)
    } else {
        ("paused", Color::Yellow)
    }
}

/// Render the status bar into the given area.
///
/// Layout: [title] | [position + name] | [autoplay] | [votes]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let separator = || Span::styled(" | ", Style::default().fg(Color::Gray));
    let mut spans = vec![Span::styled(
        " Jersey Picker ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];

    let index = state.carousel.current_index();
    if let Some(jersey) = state.catalog.get(index) {
        spans.push(separator());
        spans.push(Span::styled(
            format!("{}/{} {}", index + 1, state.catalog.len(), jersey.name),
            Style::default().fg(Color::White),
        ));
    }

    let (label, color) = autoplay_indicator(&state.carousel);
    spans.push(separator());
    spans.push(Span::raw("Autoplay: "));
    spans.push(Span::styled(label, Style::default().fg(color)));

    spans.push(separator());
    spans.push(Span::raw(format!("Votes: {}", state.votes.len())));

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::widgets::test_util::buffer_text;
    use jersey_core::carousel::CarouselOptions;
    use jersey_core::catalog::Catalog;
    use std::time::Instant;

    #[test]
    fn autoplay_label_tracks_engine() {
        let now = Instant::now();
        let mut engine = CarouselEngine::new(Catalog::reference().unwrap().ids(), CarouselOptions::default());
        assert_eq!(autoplay_indicator(&engine).0, "paused");
        engine.start_autoplay(now);
        assert_eq!(autoplay_indicator(&engine).0, "on");
        engine.set_selection_active(true, now);
        assert_eq!(autoplay_indicator(&engine).0, "off");
    }

    #[test]
    fn render_shows_position() {
        let state = ViewState::new(Catalog::reference().unwrap(), CarouselOptions::default(), 8.0, Instant::now());
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("1/5 Design 1"));
        assert!(text.contains("Autoplay: on"));
        assert!(text.contains("Votes: 0"));
    }
}
