// Keyboard and mouse input handling.
//
// Translates crossterm events into ViewState mutations (carousel movement,
// form editing, selection) and returns a `UserCommand` when the orchestrator
// has to do I/O (submission, votes, quit).

use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Position;

use jersey_app::protocol::UserCommand;
use jersey_core::carousel::{Direction, DragOutcome};
use jersey_core::selection::FormField;

use super::layout::build_layout;
use super::widgets::indicators;
use super::{Focus, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press must be forwarded to the
/// app orchestrator, `None` when it was handled locally.
pub fn handle_key(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    now: Instant,
) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+C always quits immediately regardless of mode
    if ctrl && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    // Arrows drive the carousel whatever has focus.
    match key_event.code {
        KeyCode::Left => {
            view_state.navigate(Direction::Previous);
            return None;
        }
        KeyCode::Right => {
            view_state.navigate(Direction::Next);
            return None;
        }
        _ => {}
    }

    if ctrl {
        return match key_event.code {
            KeyCode::Char('s') => view_state.submit(now),
            KeyCode::Char('r') => {
                view_state.flow.reset_fields();
                None
            }
            _ => None,
        };
    }

    // A field can only hold focus while its form is open.
    if view_state.flow.editing().is_none() {
        view_state.focus = Focus::Carousel;
    }

    match key_event.code {
        KeyCode::Tab if view_state.flow.editing().is_some() => {
            view_state.focus = view_state.focus.next();
            return None;
        }
        KeyCode::BackTab if view_state.flow.editing().is_some() => {
            view_state.focus = view_state.focus.previous();
            return None;
        }
        _ => {}
    }

    match view_state.focus {
        Focus::Field(field) => handle_field_key(key_event, field, view_state, now),
        Focus::Carousel => handle_carousel_key(key_event, view_state, now),
    }
}

/// Quit confirmation: `y`/`q` confirm, `n`/Esc cancel, everything else is
/// blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Keys while a form field has focus: printable characters edit the field.
fn handle_field_key(
    key_event: KeyEvent,
    field: FormField,
    view_state: &mut ViewState,
    now: Instant,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.deselect(now);
            None
        }
        KeyCode::Enter => match field {
            FormField::PlayerName => {
                view_state.focus = Focus::Field(FormField::Opinion);
                None
            }
            FormField::Opinion => view_state.submit(now),
        },
        KeyCode::Backspace => {
            view_state.backspace(field);
            None
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::ALT) => {
            view_state.type_char(field, c);
            None
        }
        _ => None,
    }
}

/// Keys while the carousel has focus.
fn handle_carousel_key(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    now: Instant,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            view_state.choose_current(now);
            None
        }
        KeyCode::Home => {
            view_state.go_to(0);
            None
        }
        KeyCode::End => {
            view_state.go_to(view_state.carousel.len().saturating_sub(1));
            None
        }
        KeyCode::Char(d @ '1'..='9') => {
            let index = d as usize - '1' as usize;
            view_state.go_to(index);
            None
        }
        KeyCode::Char('f') => {
            let index = view_state.carousel.current_index();
            view_state.flip_face(index);
            None
        }
        KeyCode::Char('v') => view_state.toggle_current_vote(),
        KeyCode::Char('s') => Some(UserCommand::SaveVotes),
        KeyCode::Char('x') => Some(UserCommand::ClearVotes),
        KeyCode::Char('n') | KeyCode::Esc => {
            view_state.deselect(now);
            None
        }
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }
        _ => None,
    }
}

/// Handle a mouse event: hover, drag/swipe, clicks on slides and
/// indicator dots, wheel scrolling.
pub fn handle_mouse(mouse_event: MouseEvent, view_state: &mut ViewState, now: Instant) {
    if view_state.confirm_quit {
        return;
    }

    let layout = build_layout(view_state.screen);
    let position = Position::new(mouse_event.column, mouse_event.row);
    let in_carousel = layout.carousel_viewport.contains(position);
    let x = view_state.column_to_units(mouse_event.column);

    match mouse_event.kind {
        MouseEventKind::Moved => {
            // Motion with no button held means the release was missed.
            view_state.carousel.drag_cancel(now);
            if in_carousel && !view_state.carousel.is_hovering() {
                view_state.carousel.hover_start();
            } else if !in_carousel && view_state.carousel.is_hovering() {
                view_state.carousel.hover_end(now);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            view_state.carousel.drag_cancel(now);
            if in_carousel {
                view_state.carousel.drag_start(x);
            } else if layout.indicators.contains(position) {
                if let Some(index) = indicators::indicator_at(
                    layout.indicators,
                    view_state.carousel.len(),
                    mouse_event.column,
                ) {
                    view_state.go_to(index);
                }
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            view_state.carousel.drag_move(x);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let outcome = view_state.carousel.drag_end(x, now);
            // Press and release in the same column is a click.
            if let DragOutcome::SnappedBack { distance } = outcome {
                if distance.abs() < view_state.units_per_cell {
                    if let Some(index) = view_state.carousel.slide_at(x) {
                        view_state.choose_index(index, now);
                    }
                }
            }
        }
        MouseEventKind::ScrollDown if in_carousel => {
            view_state.navigate(Direction::Next);
        }
        MouseEventKind::ScrollUp if in_carousel => {
            view_state.navigate(Direction::Previous);
        }
        _ => {}
    }
}

/// The terminal lost focus. Terminals report neither the pointer leaving
/// the window nor a release outside it, so hover and drag end here.
pub fn handle_focus_lost(view_state: &mut ViewState, now: Instant) {
    view_state.carousel.pointer_lost(now);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
