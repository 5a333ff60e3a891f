// Terminal UI: layout, input handling and widget rendering.
//
// The TUI owns a `ViewState` holding the carousel engine and the selection
// flow. Work that needs I/O goes to the app orchestrator as `UserCommand`s;
// results come back as `UiUpdate`s. The loop re-renders at ~30 fps and drives
// the carousel autoplay from the same tick, so carousel state is only ever
// touched from this task.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::{Duration, Instant};

use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    EventStream,
};
use crossterm::execute;
use futures_util::StreamExt;
use ratatui::layout::Rect;
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::mpsc;
use tracing::{debug, info};

use jersey_app::protocol::{Notice, UiUpdate, UserCommand};
use jersey_core::carousel::{CarouselEngine, CarouselOptions, Direction};
use jersey_core::catalog::{Catalog, ImageFace};
use jersey_core::selection::{FlowError, FormField, SelectionFlow};

use layout::build_layout;

/// How long a notice stays in the help bar.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

pub const RECORDED_MESSAGE: &str = "✅ Response recorded!";

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// Where keyboard input goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Carousel,
    Field(FormField),
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Carousel => Focus::Field(FormField::PlayerName),
            Focus::Field(FormField::PlayerName) => Focus::Field(FormField::Opinion),
            Focus::Field(FormField::Opinion) => Focus::Carousel,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::Carousel => Focus::Field(FormField::Opinion),
            Focus::Field(FormField::Opinion) => Focus::Field(FormField::PlayerName),
            Focus::Field(FormField::PlayerName) => Focus::Carousel,
        }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state read by `render_frame`.
pub struct ViewState {
    pub catalog: Catalog,
    pub carousel: CarouselEngine,
    pub flow: SelectionFlow,
    pub focus: Focus,
    /// Face shown by each slide, indexed like the catalog.
    pub faces: Vec<ImageFace>,
    /// Voted jersey ids as last reported by the orchestrator.
    pub votes: Vec<String>,
    pub notice: Option<Notice>,
    notice_expires: Option<Instant>,
    pub confirm_quit: bool,
    /// Carousel units per terminal column.
    pub units_per_cell: f64,
    /// Full terminal area, kept for mouse hit testing.
    pub screen: Rect,
}

impl ViewState {
    pub fn new(
        catalog: Catalog,
        options: CarouselOptions,
        units_per_cell: f64,
        now: Instant,
    ) -> Self {
        let mut carousel = CarouselEngine::new(catalog.ids(), options);
        carousel.start_autoplay(now);
        let faces = vec![ImageFace::Front; catalog.len()];
        ViewState {
            catalog,
            carousel,
            flow: SelectionFlow::new(),
            focus: Focus::Carousel,
            faces,
            votes: Vec::new(),
            notice: None,
            notice_expires: None,
            confirm_quit: false,
            units_per_cell,
            screen: Rect::default(),
        }
    }

    /// Record the terminal size and resize the carousel viewport to match.
    pub fn set_screen(&mut self, area: Rect) {
        self.screen = area;
        let viewport = build_layout(area).carousel_viewport;
        self.carousel
            .resize(f64::from(viewport.width) * self.units_per_cell);
    }

    /// Terminal column to carousel units, relative to the viewport's left
    /// edge. Columns left of the viewport map to negative values.
    pub fn column_to_units(&self, column: u16) -> f64 {
        let viewport = build_layout(self.screen).carousel_viewport;
        (f64::from(column) - f64::from(viewport.x)) * self.units_per_cell
    }

    pub fn face(&self, index: usize) -> ImageFace {
        self.faces.get(index).copied().unwrap_or_default()
    }

    pub fn flip_face(&mut self, index: usize) {
        if let Some(face) = self.faces.get_mut(index) {
            *face = face.flipped();
        }
    }

    pub fn is_voted(&self, id: &str) -> bool {
        self.votes.iter().any(|v| v == id)
    }

    pub fn set_notice(&mut self, notice: Notice, now: Instant) {
        self.notice = Some(notice);
        self.notice_expires = Some(now + NOTICE_TTL);
    }

    /// Expire old notices and run the carousel autoplay. Returns whether the
    /// carousel advanced.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.notice_expires.is_some_and(|at| now >= at) {
            self.notice = None;
            self.notice_expires = None;
        }
        self.carousel.tick(now)
    }

    pub fn navigate(&mut self, direction: Direction) {
        if self.carousel.navigate(direction) {
            debug!(index = self.carousel.current_index(), "carousel moved");
        }
    }

    pub fn go_to(&mut self, index: usize) {
        if self.carousel.go_to(index) {
            debug!(index, "carousel jumped");
        }
    }

    /// Choose the rendered slide at `index` and open the form for it.
    pub fn choose_index(&mut self, index: usize, now: Instant) {
        let Some(jersey) = self
            .carousel
            .select_at(index)
            .and_then(|id| self.catalog.find(id))
            .cloned()
        else {
            return;
        };
        let name = jersey.name.clone();
        match self.flow.choose(jersey) {
            Ok(()) => {
                info!("Jersey chosen: {}", name);
                self.carousel.set_selection_active(true, now);
                if self.focus == Focus::Carousel {
                    self.focus = Focus::Field(FormField::PlayerName);
                }
            }
            Err(e) => self.set_notice(flow_error_notice(e), now),
        }
    }

    pub fn choose_current(&mut self, now: Instant) {
        self.choose_index(self.carousel.current_index(), now);
    }

    /// Drop the choice (or the confirmation) and go back to browsing.
    pub fn deselect(&mut self, now: Instant) {
        if !self.flow.is_selection_active() {
            return;
        }
        match self.flow.new_selection() {
            Ok(()) => {
                info!("Selection discarded");
                self.carousel.set_selection_active(false, now);
                self.focus = Focus::Carousel;
            }
            Err(e) => self.set_notice(flow_error_notice(e), now),
        }
    }

    /// Start a submission of the open form.
    pub fn submit(&mut self, now: Instant) -> Option<UserCommand> {
        match self.flow.begin_submit() {
            Ok(payload) => {
                info!("Submitting {}", payload.jersey_name);
                Some(UserCommand::Submit(payload))
            }
            Err(e) => {
                self.set_notice(flow_error_notice(e), now);
                None
            }
        }
    }

    pub fn type_char(&mut self, field: FormField, c: char) {
        if let Some(fields) = self.flow.fields_mut() {
            fields.push_char(field, c);
        }
    }

    pub fn backspace(&mut self, field: FormField) {
        if let Some(fields) = self.flow.fields_mut() {
            fields.pop_char(field);
        }
    }

    pub fn toggle_current_vote(&self) -> Option<UserCommand> {
        self.carousel
            .current_id()
            .map(|id| UserCommand::ToggleVote(id.to_string()))
    }
}

fn flow_error_notice(err: FlowError) -> Notice {
    match err {
        FlowError::NothingSelected => Notice::error("Choose a jersey first."),
        FlowError::AlreadySubmitting => Notice::error("A submission is already in progress."),
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate, now: Instant) {
    match update {
        UiUpdate::VotesChanged(ids) => {
            state.votes = ids;
        }
        UiUpdate::SubmissionSucceeded { recorded_at } => {
            if state.flow.submission_succeeded(recorded_at).is_some() {
                state.focus = Focus::Carousel;
                state.set_notice(Notice::info(RECORDED_MESSAGE), now);
            }
        }
        UiUpdate::SubmissionFailed { message } => {
            state.flow.submission_failed(message);
        }
        UiUpdate::Notice(notice) => {
            state.set_notice(notice, now);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::carousel::render(frame, layout.carousel, state);
    widgets::indicators::render(
        frame,
        layout.indicators,
        state.carousel.len(),
        state.carousel.current_index(),
    );
    match state.flow.confirmation() {
        Some(selection) => widgets::confirmation::render(frame, layout.selection, selection),
        None => widgets::form::render(frame, layout.selection, state),
    }
    widgets::votes::render(frame, layout.votes, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area(), state.flow.is_submitting());
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// Initializes the terminal with mouse capture and focus reporting,
/// installs a panic hook that restores it, runs the select loop until the
/// user quits and restores the terminal on every exit path.
pub async fn run(
    ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    mut view_state: ViewState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = execute!(std::io::stdout(), DisableMouseCapture, DisableFocusChange);
        ratatui::restore();
        previous_hook(panic_info);
    }));

    let result = match execute!(std::io::stdout(), EnableMouseCapture, EnableFocusChange) {
        Ok(()) => event_loop(&mut terminal, ui_rx, cmd_tx, &mut view_state).await,
        Err(e) => Err(anyhow::Error::new(e).context("failed to enable mouse capture")),
    };

    let _ = execute!(std::io::stdout(), DisableMouseCapture, DisableFocusChange);
    ratatui::restore();
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    view_state: &mut ViewState,
) -> anyhow::Result<()> {
    let size = terminal.size()?;
    view_state.set_screen(Rect::new(0, 0, size.width, size.height));

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(view_state, ui_update, Instant::now()),
                    None => {
                        info!("UI channel closed, leaving TUI");
                        break;
                    }
                }
            }

            // Terminal input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, view_state, Instant::now()) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(Event::Mouse(mouse_event))) => {
                        input::handle_mouse(mouse_event, view_state, Instant::now());
                    }
                    Some(Ok(Event::FocusLost)) => {
                        input::handle_focus_lost(view_state, Instant::now());
                    }
                    Some(Ok(Event::Resize(width, height))) => {
                        view_state.set_screen(Rect::new(0, 0, width, height));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Err(e.into());
                    }
                    None => break,
                }
            }

            // Render tick, also drives autoplay
            _ = render_tick.tick() => {
                if view_state.tick(Instant::now()) {
                    debug!(index = view_state.carousel.current_index(), "autoplay advanced");
                }
                terminal.draw(|frame| render_frame(frame, view_state))?;
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use jersey_core::selection::FlowPhase;

    fn view_state(now: Instant) -> ViewState {
        let mut state = ViewState::new(Catalog::reference().unwrap(), CarouselOptions::default(), 8.0, now);
        state.set_screen(Rect::new(0, 0, 102, 40));
        state
    }

    #[test]
    fn new_state_starts_browsing_with_autoplay() {
        let now = Instant::now();
        let state = view_state(now);
        assert_eq!(state.carousel.len(), 5);
        assert_eq!(state.carousel.current_index(), 0);
        assert!(state.carousel.autoplay_running());
        assert_eq!(state.focus, Focus::Carousel);
        assert!(!state.flow.is_selection_active());
        assert_eq!(state.faces, vec![ImageFace::Front; 5]);
    }

    #[test]
    fn set_screen_maps_columns_to_units() {
        let state = view_state(Instant::now());
        // 102 columns minus the border leaves a 100-column viewport.
        assert_eq!(state.carousel.metrics().viewport_width, 800.0);
        assert_eq!(state.carousel.metrics().slide_width, 320.0);
        assert_eq!(state.column_to_units(1), 0.0);
        assert_eq!(state.column_to_units(11), 80.0);
        assert_eq!(state.column_to_units(0), -8.0);
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut focus = Focus::Carousel;
        for _ in 0..3 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Carousel);
        assert_eq!(
            Focus::Carousel.previous(),
            Focus::Field(FormField::Opinion)
        );
    }

    #[test]
    fn choosing_stops_autoplay_and_focuses_form() {
        let now = Instant::now();
        let mut state = view_state(now);
        state.navigate(Direction::Next);
        state.choose_current(now);

        assert_eq!(state.flow.selected_jersey_id(), Some("d2"));
        assert_eq!(state.carousel.current_index(), 1);
        assert!(!state.carousel.autoplay_running());
        assert_eq!(state.focus, Focus::Field(FormField::PlayerName));
    }

    #[test]
    fn deselect_resumes_autoplay() {
        let now = Instant::now();
        let mut state = view_state(now);
        state.choose_current(now);
        state.deselect(now);
        assert!(!state.flow.is_selection_active());
        assert!(state.carousel.autoplay_running());
        assert_eq!(state.focus, Focus::Carousel);
    }

    #[test]
    fn submit_builds_trimmed_payload() {
        let now = Instant::now();
        let mut state = view_state(now);
        state.choose_current(now);
        for c in "  Great design ".chars() {
            state.type_char(FormField::Opinion, c);
        }
        let cmd = state.submit(now);
        match cmd {
            Some(UserCommand::Submit(payload)) => {
                assert_eq!(payload.jersey_name, "Design 1");
                assert_eq!(payload.player_name, "");
                assert_eq!(payload.opinion, "Great design");
            }
            other => panic!("expected Submit, got {other:?}"),
        }
        assert!(state.flow.is_submitting());

        // A second submit is refused while the first is in flight.
        assert!(state.submit(now).is_none());
        assert_eq!(
            state.notice.as_ref().map(|n| n.text.as_str()),
            Some("A submission is already in progress.")
        );
    }

    #[test]
    fn submit_without_selection_sets_notice() {
        let now = Instant::now();
        let mut state = view_state(now);
        assert!(state.submit(now).is_none());
        assert!(state.notice.is_some());
    }

    #[test]
    fn success_update_moves_to_confirmation() {
        let now = Instant::now();
        let mut state = view_state(now);
        state.choose_current(now);
        for c in "Great design".chars() {
            state.type_char(FormField::Opinion, c);
        }
        state.submit(now);
        apply_ui_update(
            &mut state,
            UiUpdate::SubmissionSucceeded {
                recorded_at: Local::now(),
            },
            now,
        );

        let selection = state.flow.confirmation().expect("confirmation");
        assert_eq!(selection.jersey.name, "Design 1");
        assert_eq!(selection.opinion_display(), "Great design");
        assert_eq!(state.focus, Focus::Carousel);
        assert_eq!(
            state.notice.as_ref().map(|n| n.text.as_str()),
            Some(RECORDED_MESSAGE)
        );
        // Still selected: autoplay stays off during the confirmation.
        assert!(!state.carousel.autoplay_running());
    }

    #[test]
    fn failure_update_keeps_form_values() {
        let now = Instant::now();
        let mut state = view_state(now);
        state.choose_current(now);
        for c in "Sam".chars() {
            state.type_char(FormField::PlayerName, c);
        }
        state.submit(now);
        apply_ui_update(
            &mut state,
            UiUpdate::SubmissionFailed {
                message: "There was a problem submitting your response: request timed out".into(),
            },
            now,
        );

        match state.flow.phase() {
            FlowPhase::Editing(editing) => {
                assert!(!editing.submitting);
                assert_eq!(editing.fields.player_name, "Sam");
                assert!(editing.error.as_deref().unwrap().contains("timed out"));
            }
            other => panic!("expected Editing, got {other:?}"),
        }
    }

    #[test]
    fn votes_changed_replaces_vote_list() {
        let now = Instant::now();
        let mut state = view_state(now);
        apply_ui_update(&mut state, UiUpdate::VotesChanged(vec!["d3".into()]), now);
        assert!(state.is_voted("d3"));
        assert!(!state.is_voted("d1"));
    }

    #[test]
    fn notice_expires_after_ttl() {
        let now = Instant::now();
        let mut state = view_state(now);
        apply_ui_update(&mut state, UiUpdate::Notice(Notice::info("hello")), now);
        state.tick(now + Duration::from_secs(1));
        assert!(state.notice.is_some());
        state.tick(now + NOTICE_TTL);
        assert!(state.notice.is_none());
    }

    #[test]
    fn tick_drives_autoplay() {
        let now = Instant::now();
        let mut state = view_state(now);
        assert!(!state.tick(now + Duration::from_millis(3999)));
        assert!(state.tick(now + Duration::from_millis(4000)));
        assert_eq!(state.carousel.current_index(), 1);
    }

    #[test]
    fn flip_face_is_per_slide() {
        let mut state = view_state(Instant::now());
        state.flip_face(2);
        assert_eq!(state.face(2), ImageFace::Back);
        assert_eq!(state.face(1), ImageFace::Front);
        state.flip_face(2);
        assert_eq!(state.face(2), ImageFace::Front);
        state.flip_face(99);
    }

    #[test]
    fn render_frame_does_not_panic() {
        let now = Instant::now();
        let mut state = view_state(now);
        state.choose_current(now);
        state.confirm_quit = true;
        let backend = ratatui::backend::TestBackend::new(102, 40);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_frame(frame, &state))
            .unwrap();
    }

    #[test]
    fn render_frame_survives_tiny_terminal() {
        let now = Instant::now();
        let mut state = ViewState::new(Catalog::reference().unwrap(), CarouselOptions::default(), 8.0, now);
        state.set_screen(Rect::new(0, 0, 20, 6));
        let backend = ratatui::backend::TestBackend::new(20, 6);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_frame(frame, &state))
            .unwrap();
    }
}
