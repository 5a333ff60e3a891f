// Selection form: player name and opinion for the chosen jersey. While
// nothing is chosen the panel shows a short prompt instead.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use jersey_core::selection::{EditingState, FormField, PLAYER_NAME_MAX_CHARS};

use crate::tui::{Focus, ViewState};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    match state.flow.editing() {
        Some(editing) => render_editing(frame, area, editing, state.focus),
        None => render_prompt(frame, area),
    }
}

fn render_prompt(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Your Choice ");
    let text = vec![
        Line::raw(""),
        Line::raw("Browse with ←/→ and press Enter (or click a card)"),
        Line::raw("to select the jersey you like."),
    ];
    let paragraph = Paragraph::new(text)
        .block(block)
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_editing(frame: &mut Frame, area: Rect, editing: &EditingState, focus: Focus) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" Selected: {} ", editing.jersey.name),
            Style::default().add_modifier(Modifier::BOLD),
        ));

    let name_len = editing.fields.player_name.chars().count();
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Player name (optional) "),
            Span::styled(
                format!("{name_len}/{PLAYER_NAME_MAX_CHARS}"),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        field_line(
            editing.fields.value(FormField::PlayerName),
            focus == Focus::Field(FormField::PlayerName),
        ),
        Line::raw("Your opinion (optional)"),
        field_line(
            editing.fields.value(FormField::Opinion),
            focus == Focus::Field(FormField::Opinion),
        ),
        Line::raw(""),
    ];

    let status = if editing.submitting {
        Line::styled("Submitting…", Style::default().fg(Color::Yellow))
    } else if let Some(error) = &editing.error {
        Line::styled(error.clone(), Style::default().fg(Color::Red))
    } else {
        Line::styled(
            "Ctrl+S submit · Ctrl+R reset · Esc cancel",
            Style::default().fg(Color::DarkGray),
        )
    };
    lines.push(status);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// One input line; the focused field gets a cursor and highlight.
fn field_line(value: &str, focused: bool) -> Line<'static> {
    if focused {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::styled(
                value.to_string(),
                Style::default().add_modifier(Modifier::UNDERLINED),
            ),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ])
    } else {
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(value.to_string(), Style::default().fg(Color::Gray)),
        ])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
