// Help bar: the current notice when there is one, otherwise key hints for
// whatever has focus.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use jersey_app::protocol::NoticeLevel;

use crate::tui::{Focus, ViewState};

const CAROUSEL_HINTS: &str =
    " ←/→ browse | 1-5 jump | Enter select | f flip | v vote | s save | x clear | q quit";
const CONFIRMED_HINTS: &str = " ←/→ browse | Enter pick again | n new selection | v vote | q quit";
const FIELD_HINTS: &str = " Tab next field | Enter next/submit | Ctrl+S submit | Ctrl+R reset | Esc cancel";

pub fn hints(state: &ViewState) -> &'static str {
    match state.focus {
        Focus::Field(_) => FIELD_HINTS,
        Focus::Carousel if state.flow.confirmation().is_some() => CONFIRMED_HINTS,
        Focus::Carousel => CAROUSEL_HINTS,
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match &state.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::Green,
                NoticeLevel::Error => Color::Red,
            };
            Line::from(Span::styled(
                format!(" {}", notice.text),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
        }
        None => Line::from(Span::styled(
            hints(state),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::DIM),
        )),
    };
    let paragraph = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
