// Jersey card: one carousel slide.
//
// Image area (the image reference, or a solid placeholder in the jersey
// color), description, Front/Back toggle, vote marker and the select button.

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use jersey_core::catalog::{ImageFace, JerseyRecord, Rgb};

pub const SELECT_LABEL: &str = "Select This Jersey";
pub const SELECTED_LABEL: &str = "✓ Selected";

pub struct CardProps<'a> {
    pub jersey: &'a JerseyRecord,
    pub face: ImageFace,
    /// The slide the carousel is centered on.
    pub current: bool,
    pub selected: bool,
    pub voted: bool,
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

pub fn select_label(selected: bool) -> &'static str {
    if selected {
        SELECTED_LABEL
    } else {
        SELECT_LABEL
    }
}

/// Text drawn in the image area for the face being shown.
pub fn image_label(jersey: &JerseyRecord, face: ImageFace) -> String {
    match jersey.image(face) {
        Some(path) => format!("[{path}]"),
        None => face.placeholder_label().to_string(),
    }
}

/// Render one card into `area`.
pub fn render(frame: &mut Frame, area: Rect, props: &CardProps) {
    let accent = to_color(props.jersey.placeholder_color(ImageFace::Front));
    let border_style = if props.selected {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else if props.current {
        Style::default().fg(accent)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} ", props.jersey.name),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(inner);

    render_image(frame, rows[0], props);

    let description = Paragraph::new(props.jersey.description.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(description, rows[1]);

    frame.render_widget(Paragraph::new(face_line(props)), rows[2]);

    let button_style = if props.selected {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else if props.current {
        Style::default()
            .fg(Color::Black)
            .bg(accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let button = Paragraph::new(Span::styled(select_label(props.selected), button_style))
        .alignment(Alignment::Center);
    frame.render_widget(button, rows[3]);
}

fn render_image(frame: &mut Frame, area: Rect, props: &CardProps) {
    let style = match props.jersey.image(props.face) {
        Some(_) => Style::default().fg(Color::Gray).bg(Color::Black),
        None => Style::default()
            .fg(Color::White)
            .bg(to_color(props.jersey.placeholder_color(props.face)))
            .add_modifier(Modifier::BOLD),
    };

    let pad = area.height.saturating_sub(1) / 2;
    let mut lines = vec![Line::raw(""); pad as usize];
    lines.push(Line::raw(image_label(props.jersey, props.face)));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(style);
    frame.render_widget(paragraph, area);
}

/// "Front | Back" toggle with the active face highlighted, then the vote
/// marker.
fn face_line(props: &CardProps) -> Line<'static> {
    let face_span = |face: ImageFace| {
        let style = if face == props.face {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!(" {} ", face.toggle_label()), style)
    };

    let vote = if props.voted {
        Span::styled("  ♥ Voted", Style::default().fg(Color::Red))
    } else {
        Span::styled("  ♡ Vote", Style::default().fg(Color::DarkGray))
    };

    Line::from(vec![
        face_span(ImageFace::Front),
        face_span(ImageFace::Back),
        vote,
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
