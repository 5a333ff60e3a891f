// Carousel engine: slide sizing, navigation, drag/swipe, hover and autoplay.
//
// All lengths are in abstract "units". The host decides how units map to
// its own coordinates (the TUI maps one terminal column to a configurable
// number of units). Time is passed in explicitly so the autoplay timer is
// deterministic: the host calls `tick(now)` from its event loop and the
// engine advances when the stored deadline has passed.

use std::time::{Duration, Instant};

use tracing::debug;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Viewport width below which the narrow gap is used.
pub const GAP_BREAKPOINT: f64 = 520.0;
pub const GAP_NARROW: f64 = 12.0;
pub const GAP_WIDE: f64 = 18.0;

/// Viewport breakpoints for the slide width tiers.
pub const SMALL_BREAKPOINT: f64 = 420.0;
pub const MEDIUM_BREAKPOINT: f64 = 600.0;

pub const SMALL_FRACTION: f64 = 0.80;
pub const SMALL_CAP: f64 = 200.0;
pub const MEDIUM_FRACTION: f64 = 0.85;
pub const MEDIUM_CAP: f64 = 240.0;
pub const LARGE_CAP: f64 = 320.0;

/// Slides never shrink below this width (unless the viewport itself is
/// narrower).
pub const MIN_SLIDE_WIDTH: f64 = 170.0;

pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(4000);
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 50.0;
pub const DEFAULT_HORIZONTAL_PADDING: f64 = 32.0;

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

/// Gap between adjacent slides for the given viewport width.
pub fn gap_for(viewport_width: f64) -> f64 {
    if viewport_width < GAP_BREAKPOINT {
        GAP_NARROW
    } else {
        GAP_WIDE
    }
}

/// Slide width for the given viewport width and total horizontal padding.
///
/// The tier is picked from the viewport width, floored at
/// [`MIN_SLIDE_WIDTH`], and finally capped at the viewport width so that
/// `0 <= slide_width <= viewport_width` always holds.
pub fn slide_width_for(viewport_width: f64, horizontal_padding: f64) -> f64 {
    if viewport_width <= 0.0 {
        return 0.0;
    }
    let available = (viewport_width - horizontal_padding).max(0.0);
    let tier = if viewport_width < SMALL_BREAKPOINT {
        (available * SMALL_FRACTION).min(SMALL_CAP)
    } else if viewport_width < MEDIUM_BREAKPOINT {
        (available * MEDIUM_FRACTION).min(MEDIUM_CAP)
    } else {
        LARGE_CAP.min(available)
    };
    tier.max(MIN_SLIDE_WIDTH).min(viewport_width)
}

/// Resolved geometry for one viewport width and slide count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideMetrics {
    pub viewport_width: f64,
    pub slide_width: f64,
    pub gap: f64,
    pub len: usize,
}

impl SlideMetrics {
    pub fn compute(viewport_width: f64, horizontal_padding: f64, len: usize) -> Self {
        let viewport_width = viewport_width.max(0.0);
        SlideMetrics {
            viewport_width,
            slide_width: slide_width_for(viewport_width, horizontal_padding),
            gap: gap_for(viewport_width),
            len,
        }
    }

    /// Distance between the left edges of adjacent slides.
    pub fn step(&self) -> f64 {
        self.slide_width + self.gap
    }

    /// Width of the whole track: `slide * N + gap * (N - 1)`.
    pub fn content_width(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        self.slide_width * self.len as f64 + self.gap * (self.len - 1) as f64
    }

    pub fn center_offset(&self) -> f64 {
        ((self.viewport_width - self.slide_width) / 2.0).max(0.0)
    }

    /// Largest offset that still keeps the last slide's right edge inside the
    /// viewport.
    pub fn max_translate(&self) -> f64 {
        (self.step() * self.len as f64 - self.gap - self.viewport_width).max(0.0)
    }

    /// Resting offset for `index`: centered when there is room, never past
    /// either end of the track.
    pub fn offset_for(&self, index: usize) -> f64 {
        let desired = self.step() * index as f64 - self.center_offset();
        desired.max(0.0).min(self.max_translate())
    }

    /// Left edge of slide `index` in track coordinates.
    pub fn slide_left(&self, index: usize) -> f64 {
        self.step() * index as f64
    }
}

// ---------------------------------------------------------------------------
// Direction / outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// What happened when a drag gesture ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// No drag was in progress.
    Ignored,
    /// Movement passed the threshold and the index moved one step.
    Committed { direction: Direction, distance: f64 },
    /// Movement stayed under the threshold, or the step would have left the
    /// valid range; the carousel returns to the current index.
    SnappedBack { distance: f64 },
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarouselOptions {
    pub autoplay_interval: Duration,
    pub swipe_threshold: f64,
    pub horizontal_padding: f64,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        CarouselOptions {
            autoplay_interval: DEFAULT_AUTOPLAY_INTERVAL,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            horizontal_padding: DEFAULT_HORIZONTAL_PADDING,
        }
    }
}

// ---------------------------------------------------------------------------
// CarouselEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragTracking {
    start_x: f64,
}

/// Carousel state: the active index, geometry, drag tracking and the
/// autoplay deadline.
///
/// Autoplay runs only while nothing is selected, the pointer is not hovering
/// and no drag is in progress. Every transition that stops it clears the
/// deadline synchronously, so a later `tick` can never race a drag commit.
#[derive(Debug, Clone)]
pub struct CarouselEngine {
    ids: Vec<String>,
    current_index: usize,
    metrics: SlideMetrics,
    options: CarouselOptions,
    drag: Option<DragTracking>,
    drag_offset: f64,
    hovering: bool,
    selection_active: bool,
    autoplay_deadline: Option<Instant>,
}

impl CarouselEngine {
    /// Create an engine over the given entry ids. Geometry starts at a zero
    /// viewport until the host calls [`resize`](Self::resize), and autoplay
    /// stays stopped until [`start_autoplay`](Self::start_autoplay).
    pub fn new(ids: Vec<String>, options: CarouselOptions) -> Self {
        let metrics = SlideMetrics::compute(0.0, options.horizontal_padding, ids.len());
        CarouselEngine {
            ids,
            current_index: 0,
            metrics,
            options,
            drag: None,
            drag_offset: 0.0,
            hovering: false,
            selection_active: false,
            autoplay_deadline: None,
        }
    }

    // -- accessors --

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_id(&self) -> Option<&str> {
        self.ids.get(self.current_index).map(String::as_str)
    }

    pub fn metrics(&self) -> &SlideMetrics {
        &self.metrics
    }

    pub fn options(&self) -> &CarouselOptions {
        &self.options
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_offset(&self) -> f64 {
        self.drag_offset
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn selection_active(&self) -> bool {
        self.selection_active
    }

    pub fn autoplay_running(&self) -> bool {
        self.autoplay_deadline.is_some()
    }

    pub fn autoplay_deadline(&self) -> Option<Instant> {
        self.autoplay_deadline
    }

    // -- geometry --

    /// Recompute geometry for a new viewport width. No-op when unchanged.
    pub fn resize(&mut self, viewport_width: f64) {
        if (self.metrics.viewport_width - viewport_width.max(0.0)).abs() < f64::EPSILON {
            return;
        }
        self.metrics =
            SlideMetrics::compute(viewport_width, self.options.horizontal_padding, self.ids.len());
        debug!(
            viewport = self.metrics.viewport_width,
            slide = self.metrics.slide_width,
            gap = self.metrics.gap,
            "carousel resized"
        );
    }

    /// Replace the entry list, clamping the index into the new range.
    pub fn set_entries(&mut self, ids: Vec<String>) {
        self.ids = ids;
        self.current_index = self.current_index.min(self.ids.len().saturating_sub(1));
        self.metrics = SlideMetrics::compute(
            self.metrics.viewport_width,
            self.options.horizontal_padding,
            self.ids.len(),
        );
    }

    /// Horizontal offset to apply to the track right now.
    ///
    /// While dragging this is the live offset `step * index + drag`, clamped
    /// to `[0, max_translate]`; otherwise the resting offset of the current
    /// index.
    pub fn offset(&self) -> f64 {
        if self.drag.is_some() {
            let live = self.metrics.step() * self.current_index as f64 + self.drag_offset;
            live.max(0.0).min(self.metrics.max_translate())
        } else {
            self.metrics.offset_for(self.current_index)
        }
    }

    /// Slide under viewport position `x`, or `None` for gaps and empty space.
    pub fn slide_at(&self, x: f64) -> Option<usize> {
        let step = self.metrics.step();
        if step <= 0.0 {
            return None;
        }
        let track_x = self.offset() + x;
        if track_x < 0.0 {
            return None;
        }
        let index = (track_x / step).floor() as usize;
        if index >= self.ids.len() {
            return None;
        }
        let within = track_x - self.metrics.slide_left(index);
        (within <= self.metrics.slide_width).then_some(index)
    }

    // -- navigation --

    /// Move one step. Requests that would leave `[0, N-1]` are ignored.
    /// Returns whether the index changed.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let target = match direction {
            Direction::Previous => self.current_index.checked_sub(1),
            Direction::Next => Some(self.current_index + 1),
        };
        match target {
            Some(index) if index < self.ids.len() => {
                self.current_index = index;
                true
            }
            _ => false,
        }
    }

    /// Jump straight to `index` (indicator dots). Out-of-range is a no-op.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.ids.len() && index != self.current_index {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    // -- selection --

    /// Id of the entry currently shown. Selecting never moves the index.
    pub fn select_current(&self) -> Option<&str> {
        self.current_id()
    }

    /// Id of a rendered entry by position; `None` when out of range.
    pub fn select_at(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// Tell the engine whether the surrounding flow holds a selection.
    /// While it does, autoplay stays off.
    pub fn set_selection_active(&mut self, active: bool, now: Instant) {
        self.selection_active = active;
        if active {
            self.stop_autoplay();
        } else {
            self.start_autoplay(now);
        }
    }

    // -- pointer --

    /// Pointer pressed at viewport position `x`. Autoplay is cancelled
    /// before anything else happens.
    pub fn drag_start(&mut self, x: f64) {
        self.stop_autoplay();
        self.drag = Some(DragTracking { start_x: x });
        self.drag_offset = 0.0;
    }

    /// Pointer moved while pressed. Updates the live offset only.
    pub fn drag_move(&mut self, x: f64) {
        if let Some(drag) = self.drag {
            self.drag_offset = drag.start_x - x;
        }
    }

    /// Pointer released at `x`. Commits at most one step.
    pub fn drag_end(&mut self, x: f64, now: Instant) -> DragOutcome {
        let Some(drag) = self.drag.take() else {
            return DragOutcome::Ignored;
        };
        self.drag_offset = 0.0;

        let distance = x - drag.start_x;
        let outcome = if distance.abs() > self.options.swipe_threshold {
            // Pointer travelling left reveals the next slide.
            let direction = if distance < 0.0 {
                Direction::Next
            } else {
                Direction::Previous
            };
            if self.navigate(direction) {
                debug!(?direction, index = self.current_index, "swipe committed");
                DragOutcome::Committed {
                    direction,
                    distance,
                }
            } else {
                DragOutcome::SnappedBack { distance }
            }
        } else {
            DragOutcome::SnappedBack { distance }
        };

        self.start_autoplay(now);
        outcome
    }

    /// Drop an unfinished drag without committing, as when its release was
    /// never reported. Returns whether a drag was in progress.
    pub fn drag_cancel(&mut self, now: Instant) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.drag_offset = 0.0;
        self.start_autoplay(now);
        true
    }

    /// Pointer tracking lost entirely (terminal lost focus). Clears both
    /// drag and hover so autoplay can resume.
    pub fn pointer_lost(&mut self, now: Instant) {
        self.drag = None;
        self.drag_offset = 0.0;
        self.hovering = false;
        self.start_autoplay(now);
    }

    /// Pointer entered the carousel.
    pub fn hover_start(&mut self) {
        self.hovering = true;
        self.stop_autoplay();
    }

    /// Pointer left the carousel.
    pub fn hover_end(&mut self, now: Instant) {
        self.hovering = false;
        self.start_autoplay(now);
    }

    // -- autoplay --

    /// Arm the autoplay timer if nothing blocks it. Keeps an existing
    /// deadline untouched.
    pub fn start_autoplay(&mut self, now: Instant) {
        if !self.autoplay_allowed() || self.autoplay_deadline.is_some() {
            return;
        }
        self.autoplay_deadline = Some(now + self.options.autoplay_interval);
    }

    pub fn stop_autoplay(&mut self) {
        self.autoplay_deadline = None;
    }

    fn autoplay_allowed(&self) -> bool {
        !self.selection_active && !self.hovering && self.drag.is_none() && !self.ids.is_empty()
    }

    /// Advance one step (wrapping to 0 after the last slide) if the autoplay
    /// deadline has passed. Returns whether the index advanced.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.autoplay_deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }
        if !self.autoplay_allowed() {
            self.stop_autoplay();
            return false;
        }
        self.current_index = (self.current_index + 1) % self.ids.len();
        self.autoplay_deadline = Some(now + self.options.autoplay_interval);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
