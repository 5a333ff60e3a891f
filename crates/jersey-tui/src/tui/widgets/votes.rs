// Votes panel: the jerseys voted for this session, in vote order.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Frame;

use crate::tui::ViewState;

/// Display names for the voted ids. Unknown ids fall back to the raw id.
pub fn vote_names(state: &ViewState) -> Vec<String> {
    state
        .votes
        .iter()
        .map(|id| {
            state
                .catalog
                .find(id)
                .map(|jersey| jersey.name.clone())
                .unwrap_or_else(|| id.clone())
        })
        .collect()
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Votes ({}) ", state.votes.len()))
        .title_bottom(Line::styled(
            " s: save · x: clear ",
            Style::default().fg(Color::DarkGray),
        ));

    let items: Vec<ListItem> = if state.votes.is_empty() {
        vec![ListItem::new(Line::styled(
            "No votes yet. Press v to vote.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        vote_names(state)
            .into_iter()
            .map(|name| {
                ListItem::new(Line::from(vec![
                    Span::styled("♥ ", Style::default().fg(Color::Red)),
                    Span::raw(name),
                ]))
            })
            .collect()
    };

    frame.render_widget(List::new(items).block(block), area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
