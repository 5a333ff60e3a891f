// Read-only confirmation shown after a successful submission.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use jersey_core::selection::Selection;

pub fn render(frame: &mut Frame, area: Rect, selection: &Selection) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            " Your Selection ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(vec![
        Span::styled("Jersey:  ", label),
        Span::styled(
            selection.jersey.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])];
    if let Some(player) = &selection.player_name {
        lines.push(Line::from(vec![
            Span::styled("Player:  ", label),
            Span::raw(player.clone()),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Opinion: ", label),
        Span::raw(selection.opinion_display().to_string()),
    ]));
    lines.push(Line::styled(
        format!("Recorded {}", selection.recorded_label()),
        label,
    ));
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "n: choose a different jersey",
        Style::default().fg(Color::Cyan),
    ));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
