#![forbid(unsafe_code)]

//! Pattern recognition: turns one pointer drag over the 3x3 grid into a
//! [`Pattern`].
//!
//! [`PatternRecognizer`] is a stateful processor. Feed it [`Event`]s through
//! [`process`](PatternRecognizer::process) and it returns the
//! [`PatternEvent`]s they produce. Call
//! [`check_cooldown`](PatternRecognizer::check_cooldown) periodically (e.g. on
//! tick) to clear a finished trace once its feedback delay has elapsed.
//!
//! # State Machine
//!
//! ```text
//!          Down                Up (delay > 0)
//!   Idle ───────▶ Tracing ─────────────────────▶ Cooling
//!    ▲              │  ▲  │ Move*                   │
//!    │   Cancel /   │  └──┘                         │ delay elapsed,
//!    │   Up (no     │                               │ Cancel, or Down
//!    └── delay) ────┘◀──────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. The visited sequence never contains a duplicate index.
//! 2. During one gesture the sequence is only appended to.
//! 3. `Completed` fires at most once per gesture, and only when the sequence
//!    reaches `minimum_length`.
//! 4. A `Down` always starts from an empty trace and drops any pending reset,
//!    so a stale reset can never clear a newer gesture.
//! 5. After `Cancel` the recognizer is `Idle` with an empty trace.
//!
//! # Failure Modes
//!
//! There are no errors. `Move`, `Up` and `Cancel` arriving without a preceding
//! `Down` are ignored, and every pointer event is ignored while disabled.
//! Disabling mid-gesture abandons the trace without emitting anything.

use web_time::{Duration, Instant};

use crate::event::{Event, PointerEventKind};
use crate::geometry::{GridLayout, GridTarget, Point, TARGET_COUNT};
use crate::pattern::Pattern;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default detection radius as a fraction of the cell edge.
pub const DEFAULT_DETECTION_RATIO: f32 = 0.95;

/// Default number of unique targets a pattern needs before it is reported.
pub const DEFAULT_MINIMUM_LENGTH: usize = 4;

/// Default time a finished trace stays visible before it is cleared.
pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(400);

/// Thresholds for pattern recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerConfig {
    /// Detection radius relative to the cell edge (default: 0.95).
    ///
    /// Finger contact is much larger than a stylus point, so radii are
    /// deliberately oversized and overlap between neighbours; resolution
    /// always picks the nearest center.
    pub detection_ratio: f32,
    /// Shortest pattern that is reported as `Completed` (default: 4).
    pub minimum_length: usize,
    /// Time the finished trace is kept for display (default: 400ms).
    /// Zero clears immediately on gesture end.
    pub feedback_delay: Duration,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            detection_ratio: DEFAULT_DETECTION_RATIO,
            minimum_length: DEFAULT_MINIMUM_LENGTH,
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Events produced by the recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternEvent {
    /// A target was reached for the first time in this gesture.
    TargetVisited {
        index: u8,
        /// Zero-based position of the target in the pattern.
        position: usize,
    },
    /// The gesture ended with at least `minimum_length` targets.
    Completed { pattern: Pattern },
    /// The gesture ended with too few targets; nothing is reported upstream.
    Rejected { length: usize },
    /// An active gesture was cancelled.
    Cancelled,
    /// The finished trace was cleared after its feedback delay.
    Cleared,
}

/// Gesture lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognizerState {
    #[default]
    Idle,
    Tracing,
    /// Gesture finished; the trace is kept for display until the reset fires.
    Cooling,
}

/// Mutable record of the current (or just finished) gesture.
#[derive(Debug, Clone, Default)]
pub struct GestureTrace {
    visited: Pattern,
    active: bool,
    pointer: Option<Point>,
}

impl GestureTrace {
    /// Targets visited so far, in order.
    #[inline]
    #[must_use]
    pub fn visited(&self) -> &Pattern {
        &self.visited
    }

    /// True between gesture start and gesture end/cancel.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Latest surface-local pointer position, for the trailing connector.
    #[inline]
    #[must_use]
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    fn begin(&mut self, point: Point) {
        self.visited.clear();
        self.active = true;
        self.pointer = Some(point);
    }

    fn clear(&mut self) {
        self.visited.clear();
        self.active = false;
        self.pointer = None;
    }
}

// ---------------------------------------------------------------------------
// PatternRecognizer
// ---------------------------------------------------------------------------

/// Stateful recognizer converting one drag gesture into a [`Pattern`].
pub struct PatternRecognizer {
    config: RecognizerConfig,

    // Geometry
    layout: Option<GridLayout>,
    targets: [GridTarget; TARGET_COUNT],
    detection_radius: f32,
    surface_origin: Point,

    // Gesture tracking
    state: RecognizerState,
    trace: GestureTrace,
    reset_deadline: Option<Instant>,
    enabled: bool,
}

impl std::fmt::Debug for PatternRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRecognizer")
            .field("state", &self.state)
            .field("visited", &self.trace.visited.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl PatternRecognizer {
    /// Create a recognizer whose targets are derived from `layout`.
    #[must_use]
    pub fn new(layout: GridLayout, config: RecognizerConfig) -> Self {
        Self {
            detection_radius: layout.detection_radius(config.detection_ratio),
            targets: layout.targets(),
            layout: Some(layout),
            config,
            surface_origin: Point::ORIGIN,
            state: RecognizerState::Idle,
            trace: GestureTrace::default(),
            reset_deadline: None,
            enabled: true,
        }
    }

    /// Replace the geometry with explicit targets and radius.
    ///
    /// Targets are slotted by their index, so order does not matter; if an
    /// index appears twice the later target wins. Any gesture in progress is
    /// dropped. Custom geometry is not recomputed on [`Event::Resize`].
    pub fn configure(&mut self, targets: [GridTarget; TARGET_COUNT], detection_radius: f32) {
        for target in targets {
            self.targets[usize::from(target.index())] = target;
        }
        self.detection_radius = detection_radius;
        self.layout = None;
        self.clear_to_idle();
    }

    /// Process an event, returning any pattern events produced.
    ///
    /// An expired feedback delay is applied first, so a late event may also
    /// yield `Cleared`.
    pub fn process(&mut self, event: &Event, now: Instant) -> Vec<PatternEvent> {
        let mut out = Vec::with_capacity(2);

        self.expire_cooldown(now, &mut out);

        match event {
            Event::Pointer(pointer) => {
                if !self.enabled {
                    return out;
                }
                let point = pointer.local_position(self.surface_origin);
                match pointer.kind {
                    PointerEventKind::Down => self.on_start(point, &mut out),
                    PointerEventKind::Move => self.on_move(point, &mut out),
                    PointerEventKind::Up => self.on_end(now, &mut out),
                    PointerEventKind::Cancel => self.on_cancel(&mut out),
                }
            }
            Event::Resize { width } => {
                if let Some(layout) = self.layout {
                    self.on_cancel(&mut out);
                    let layout = GridLayout {
                        surface_width: *width,
                        ..layout
                    };
                    self.apply_layout(layout);
                }
            }
            Event::SurfaceMoved { x, y } => {
                self.surface_origin = Point::new(*x, *y);
            }
            Event::Focus(false) => {
                // Losing focus reclaims the contact.
                self.on_cancel(&mut out);
            }
            Event::Focus(true) => {}
        }

        out
    }

    /// Begin a gesture at a surface-local point.
    pub fn gesture_start(&mut self, point: Point, now: Instant) -> Vec<PatternEvent> {
        self.process(&Event::pointer(PointerEventKind::Down, point.x, point.y), now)
    }

    /// Continue the gesture at a surface-local point.
    pub fn gesture_move(&mut self, point: Point, now: Instant) -> Vec<PatternEvent> {
        self.process(&Event::pointer(PointerEventKind::Move, point.x, point.y), now)
    }

    /// End the gesture normally.
    pub fn gesture_end(&mut self, now: Instant) -> Vec<PatternEvent> {
        // Up and Cancel are never resolved against a target; the position
        // only fills the event.
        let at = self.trace.pointer.unwrap_or(Point::ORIGIN);
        self.process(&Event::pointer(PointerEventKind::Up, at.x, at.y), now)
    }

    /// Abort the gesture. Idempotent with [`gesture_end`](Self::gesture_end).
    pub fn gesture_cancel(&mut self, now: Instant) -> Vec<PatternEvent> {
        // Position is ignored, as in `gesture_end`.
        let at = self.trace.pointer.unwrap_or(Point::ORIGIN);
        self.process(&Event::pointer(PointerEventKind::Cancel, at.x, at.y), now)
    }

    /// Clear a finished trace once its feedback delay has elapsed. Call
    /// periodically (e.g., on tick).
    pub fn check_cooldown(&mut self, now: Instant) -> Option<PatternEvent> {
        let deadline = self.reset_deadline?;
        if now < deadline {
            return None;
        }
        self.clear_to_idle();
        Some(PatternEvent::Cleared)
    }

    /// Resolve a surface-local point to the nearest target within the
    /// detection radius.
    ///
    /// Candidates must be strictly closer than the radius. Among candidates
    /// the smallest distance wins; an exact tie goes to the lower index.
    #[must_use]
    pub fn resolve(&self, point: Point) -> Option<u8> {
        let radius_sq = self.detection_radius * self.detection_radius;
        let mut best: Option<(u8, f32)> = None;
        for target in &self.targets {
            let dist_sq = point.distance_squared(target.center());
            if dist_sq < radius_sq && best.is_none_or(|(_, closest)| dist_sq < closest) {
                best = Some((target.index(), dist_sq));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Stop accepting pointer input. A gesture in progress is abandoned
    /// silently.
    pub fn disable(&mut self) {
        self.enabled = false;
        if self.state == RecognizerState::Tracing {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                visited = self.trace.visited.len(),
                "recognizer disabled mid-gesture"
            );
            self.clear_to_idle();
        }
    }

    /// Resume accepting pointer input.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> RecognizerState {
        self.state
    }

    /// Whether a gesture is currently being traced.
    #[inline]
    #[must_use]
    pub fn is_tracing(&self) -> bool {
        self.state == RecognizerState::Tracing
    }

    #[inline]
    #[must_use]
    pub fn trace(&self) -> &GestureTrace {
        &self.trace
    }

    /// Visited indices of the current trace, in order.
    #[inline]
    #[must_use]
    pub fn visited(&self) -> &[u8] {
        self.trace.visited.as_slice()
    }

    #[inline]
    #[must_use]
    pub fn targets(&self) -> &[GridTarget; TARGET_COUNT] {
        &self.targets
    }

    #[inline]
    #[must_use]
    pub fn detection_radius(&self) -> f32 {
        self.detection_radius
    }

    /// Last measured absolute origin of the surface on screen.
    #[inline]
    #[must_use]
    pub fn surface_origin(&self) -> Point {
        self.surface_origin
    }

    pub fn set_surface_origin(&mut self, origin: Point) {
        self.surface_origin = origin;
    }

    /// Layout the targets were derived from, if any.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> Option<&GridLayout> {
        self.layout.as_ref()
    }

    /// Line segments between consecutive visited targets.
    pub fn connectors(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.trace.visited.as_slice().windows(2).map(|pair| {
            (
                self.targets[usize::from(pair[0])].center(),
                self.targets[usize::from(pair[1])].center(),
            )
        })
    }

    /// Segment from the last visited target to the pointer, while tracing.
    #[must_use]
    pub fn trailing_connector(&self) -> Option<(Point, Point)> {
        if !self.is_tracing() {
            return None;
        }
        let last = self.trace.visited.last()?;
        let pointer = self.trace.pointer?;
        Some((self.targets[usize::from(last)].center(), pointer))
    }

    /// Reset all gesture state to idle. Geometry and enablement are kept.
    pub fn reset(&mut self) {
        self.clear_to_idle();
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Update the configuration. The detection radius is recomputed when the
    /// targets come from a layout.
    pub fn set_config(&mut self, config: RecognizerConfig) {
        if let Some(layout) = self.layout {
            self.detection_radius = layout.detection_radius(config.detection_ratio);
        }
        self.config = config;
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl PatternRecognizer {
    fn on_start(&mut self, point: Point, out: &mut Vec<PatternEvent>) {
        // A new gesture pre-empts any pending reset.
        self.reset_deadline = None;
        self.trace.begin(point);
        self.state = RecognizerState::Tracing;

        if let Some(index) = self.resolve(point) {
            self.visit(index, out);
        }
    }

    fn on_move(&mut self, point: Point, out: &mut Vec<PatternEvent>) {
        if self.state != RecognizerState::Tracing {
            return;
        }
        self.trace.pointer = Some(point);

        if let Some(index) = self.resolve(point) {
            self.visit(index, out);
        }
    }

    fn on_end(&mut self, now: Instant, out: &mut Vec<PatternEvent>) {
        if self.state != RecognizerState::Tracing {
            return;
        }
        self.trace.active = false;

        let length = self.trace.visited.len();
        if length >= self.config.minimum_length {
            #[cfg(feature = "tracing")]
            tracing::debug!(length, "pattern completed");
            out.push(PatternEvent::Completed {
                pattern: self.trace.visited.clone(),
            });
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                length,
                minimum = self.config.minimum_length,
                "pattern too short"
            );
            out.push(PatternEvent::Rejected { length });
        }

        if self.config.feedback_delay.is_zero() {
            self.clear_to_idle();
        } else {
            self.state = RecognizerState::Cooling;
            // Without a representable deadline the trace holds until the
            // next gesture or cancel.
            self.reset_deadline = now.checked_add(self.config.feedback_delay);
        }
    }

    fn on_cancel(&mut self, out: &mut Vec<PatternEvent>) {
        match self.state {
            RecognizerState::Tracing => {
                self.clear_to_idle();
                out.push(PatternEvent::Cancelled);
            }
            RecognizerState::Cooling => {
                self.clear_to_idle();
                out.push(PatternEvent::Cleared);
            }
            RecognizerState::Idle => {}
        }
    }

    fn visit(&mut self, index: u8, out: &mut Vec<PatternEvent>) {
        if self.trace.visited.push_unique(index) {
            let position = self.trace.visited.len() - 1;
            #[cfg(feature = "tracing")]
            tracing::trace!(index, position, "target visited");
            out.push(PatternEvent::TargetVisited { index, position });
        }
    }

    fn expire_cooldown(&mut self, now: Instant, out: &mut Vec<PatternEvent>) {
        if let Some(event) = self.check_cooldown(now) {
            out.push(event);
        }
    }

    fn apply_layout(&mut self, layout: GridLayout) {
        self.targets = layout.targets();
        self.detection_radius = layout.detection_radius(self.config.detection_ratio);
        self.layout = Some(layout);
    }

    fn clear_to_idle(&mut self) {
        self.trace.clear();
        self.state = RecognizerState::Idle;
        self.reset_deadline = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PointerEvent;

    // 180px grid, 60px cells, centers at 30 / 90 / 150, radius 57.
    fn layout() -> GridLayout {
        GridLayout::new(200.0).with_padding(10.0)
    }

    fn recognizer() -> PatternRecognizer {
        PatternRecognizer::new(layout(), RecognizerConfig::default())
    }

    fn instant_recognizer() -> PatternRecognizer {
        PatternRecognizer::new(
            layout(),
            RecognizerConfig {
                feedback_delay: Duration::ZERO,
                ..RecognizerConfig::default()
            },
        )
    }

    fn center(index: u8) -> Point {
        layout().targets()[usize::from(index)].center()
    }

    fn down(p: Point) -> Event {
        Event::pointer(PointerEventKind::Down, p.x, p.y)
    }

    fn mv(p: Point) -> Event {
        Event::pointer(PointerEventKind::Move, p.x, p.y)
    }

    fn up() -> Event {
        Event::pointer(PointerEventKind::Up, 0.0, 0.0)
    }

    fn cancel() -> Event {
        Event::pointer(PointerEventKind::Cancel, 0.0, 0.0)
    }

    /// Down on the first index, move through the rest, return all events
    /// including the final Up.
    fn draw(gr: &mut PatternRecognizer, indices: &[u8], t: Instant) -> Vec<PatternEvent> {
        let mut events = Vec::new();
        let (first, rest) = indices.split_first().expect("non-empty path");
        events.extend(gr.process(&down(center(*first)), t));
        for &i in rest {
            events.extend(gr.process(&mv(center(i)), t));
        }
        events.extend(gr.process(&up(), t));
        events
    }

    fn completed(events: &[PatternEvent]) -> Vec<&Pattern> {
        events
            .iter()
            .filter_map(|e| match e {
                PatternEvent::Completed { pattern } => Some(pattern),
                _ => None,
            })
            .collect()
    }

    const MS_100: Duration = Duration::from_millis(100);
    const MS_500: Duration = Duration::from_millis(500);

    // --- Start / move ---

    #[test]
    fn start_on_target_appends_immediately() {
        let mut gr = recognizer();
        let events = gr.process(&down(center(4)), Instant::now());
        assert_eq!(
            events,
            vec![PatternEvent::TargetVisited {
                index: 4,
                position: 0
            }]
        );
        assert_eq!(gr.visited(), &[4]);
        assert!(gr.is_tracing());
        assert!(gr.trace().is_active());
    }

    #[test]
    fn start_off_grid_begins_empty() {
        let mut gr = recognizer();
        let events = gr.process(&down(Point::new(500.0, 500.0)), Instant::now());
        assert!(events.is_empty());
        assert!(gr.is_tracing());
        assert!(gr.visited().is_empty());
    }

    #[test]
    fn moves_append_in_visit_order() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(6)), t);
        gr.process(&mv(center(3)), t);
        let events = gr.process(&mv(center(4)), t);
        assert_eq!(
            events,
            vec![PatternEvent::TargetVisited {
                index: 4,
                position: 2
            }]
        );
        assert_eq!(gr.visited(), &[6, 3, 4]);
    }

    #[test]
    fn revisit_is_ignored() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);
        gr.process(&mv(center(1)), t);
        let events = gr.process(&mv(center(0)), t);
        assert!(events.is_empty());
        assert_eq!(gr.visited(), &[0, 1]);
    }

    #[test]
    fn move_between_targets_does_not_change_trace() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);
        // Far outside every radius.
        let events = gr.process(&mv(Point::new(-200.0, -200.0)), t);
        assert!(events.is_empty());
        assert_eq!(gr.visited(), &[0]);
        assert_eq!(gr.trace().pointer(), Some(Point::new(-200.0, -200.0)));
    }

    // --- Completion ---

    #[test]
    fn l_shape_completes() {
        let mut gr = recognizer();
        let events = draw(&mut gr, &[0, 1, 2, 5, 8], Instant::now());
        let done = completed(&events);
        assert_eq!(done.len(), 1);
        assert_eq!(*done[0], [0, 1, 2, 5, 8]);
    }

    #[test]
    fn short_pattern_is_rejected() {
        let mut gr = recognizer();
        let events = draw(&mut gr, &[0, 1, 2], Instant::now());
        assert!(completed(&events).is_empty());
        assert_eq!(events.last(), Some(&PatternEvent::Rejected { length: 3 }));
    }

    #[test]
    fn exactly_minimum_length_completes() {
        let mut gr = recognizer();
        let events = draw(&mut gr, &[0, 1, 2, 5], Instant::now());
        assert_eq!(completed(&events).len(), 1);
    }

    #[test]
    fn revisit_collapses_in_emitted_pattern() {
        let mut gr = recognizer();
        let events = draw(&mut gr, &[0, 1, 0, 2, 5, 8], Instant::now());
        let done = completed(&events);
        assert_eq!(done.len(), 1);
        assert_eq!(*done[0], [0, 1, 2, 5, 8]);
    }

    #[test]
    fn tap_on_empty_space_is_rejected_with_zero_length() {
        let mut gr = instant_recognizer();
        let t = Instant::now();
        gr.process(&down(Point::new(-300.0, 0.0)), t);
        let events = gr.process(&up(), t);
        assert_eq!(events, vec![PatternEvent::Rejected { length: 0 }]);
    }

    #[test]
    fn custom_minimum_length() {
        let mut gr = PatternRecognizer::new(
            layout(),
            RecognizerConfig {
                minimum_length: 2,
                ..RecognizerConfig::default()
            },
        );
        let events = draw(&mut gr, &[4, 8], Instant::now());
        assert_eq!(completed(&events).len(), 1);
    }

    #[test]
    fn second_end_does_not_complete_again() {
        let mut gr = recognizer();
        let t = Instant::now();
        let events = draw(&mut gr, &[0, 1, 2, 5, 8], t);
        assert_eq!(completed(&events).len(), 1);
        let again = gr.process(&up(), t + MS_100);
        assert!(again.is_empty());
    }

    // --- Out-of-order input ---

    #[test]
    fn move_without_start_is_noop() {
        let mut gr = recognizer();
        let events = gr.process(&mv(center(0)), Instant::now());
        assert!(events.is_empty());
        assert_eq!(gr.state(), RecognizerState::Idle);
        assert!(gr.visited().is_empty());
    }

    #[test]
    fn end_without_start_is_noop() {
        let mut gr = recognizer();
        assert!(gr.process(&up(), Instant::now()).is_empty());
        assert_eq!(gr.state(), RecognizerState::Idle);
    }

    #[test]
    fn cancel_without_start_is_noop() {
        let mut gr = recognizer();
        assert!(gr.process(&cancel(), Instant::now()).is_empty());
    }

    #[test]
    fn second_start_discards_unfinished_trace() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);
        gr.process(&mv(center(1)), t);
        gr.process(&down(center(8)), t);
        assert_eq!(gr.visited(), &[8]);
    }

    // --- Cancel ---

    #[test]
    fn cancel_clears_without_completion() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);
        gr.process(&mv(center(1)), t);
        gr.process(&mv(center(2)), t);
        gr.process(&mv(center(5)), t);

        let events = gr.process(&cancel(), t);
        assert_eq!(events, vec![PatternEvent::Cancelled]);
        assert_eq!(gr.state(), RecognizerState::Idle);
        assert!(gr.visited().is_empty());
        assert!(gr.trace().pointer().is_none());

        // Late Up after cancel is ignored.
        assert!(gr.process(&up(), t).is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);
        assert_eq!(gr.process(&cancel(), t), vec![PatternEvent::Cancelled]);
        assert!(gr.process(&cancel(), t).is_empty());
    }

    #[test]
    fn cancel_during_cooling_clears_immediately() {
        let mut gr = recognizer();
        let t = Instant::now();
        draw(&mut gr, &[0, 1, 2, 5], t);
        assert_eq!(gr.state(), RecognizerState::Cooling);

        let events = gr.process(&cancel(), t);
        assert_eq!(events, vec![PatternEvent::Cleared]);
        assert_eq!(gr.state(), RecognizerState::Idle);
        assert!(gr.check_cooldown(t + MS_500).is_none());
    }

    #[test]
    fn start_after_cancel_has_no_stale_indices() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);
        gr.process(&mv(center(1)), t);
        gr.process(&cancel(), t);

        gr.process(&down(center(7)), t);
        assert_eq!(gr.visited(), &[7]);
    }

    #[test]
    fn focus_loss_cancels_gesture() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);
        assert_eq!(gr.process(&Event::Focus(false), t), vec![PatternEvent::Cancelled]);
        assert!(gr.process(&Event::Focus(true), t).is_empty());
    }

    // --- Cooling ---

    #[test]
    fn trace_is_kept_until_delay_elapses() {
        let mut gr = recognizer();
        let t = Instant::now();
        draw(&mut gr, &[0, 1, 2, 5], t);

        assert_eq!(gr.state(), RecognizerState::Cooling);
        assert_eq!(gr.visited(), &[0, 1, 2, 5]);
        assert!(!gr.trace().is_active());

        assert!(gr.check_cooldown(t + MS_100).is_none());
        assert_eq!(gr.check_cooldown(t + MS_500), Some(PatternEvent::Cleared));
        assert_eq!(gr.state(), RecognizerState::Idle);
        assert!(gr.visited().is_empty());
        assert!(gr.check_cooldown(t + MS_500).is_none());
    }

    #[test]
    fn rejected_trace_also_cools() {
        let mut gr = recognizer();
        let t = Instant::now();
        draw(&mut gr, &[0, 1], t);
        assert_eq!(gr.state(), RecognizerState::Cooling);
        assert_eq!(gr.check_cooldown(t + MS_500), Some(PatternEvent::Cleared));
    }

    #[test]
    fn zero_delay_clears_on_end() {
        let mut gr = instant_recognizer();
        let events = draw(&mut gr, &[0, 1, 2, 5], Instant::now());
        assert_eq!(completed(&events).len(), 1);
        assert_eq!(gr.state(), RecognizerState::Idle);
        assert!(gr.visited().is_empty());
    }

    #[test]
    fn huge_feedback_delay_holds_trace_without_panicking() {
        let mut gr = PatternRecognizer::new(
            layout(),
            RecognizerConfig {
                feedback_delay: Duration::MAX,
                ..RecognizerConfig::default()
            },
        );
        let t = Instant::now();
        let events = draw(&mut gr, &[0, 1, 2, 5], t);
        assert_eq!(completed(&events).len(), 1);
        assert_eq!(gr.state(), RecognizerState::Cooling);
        assert!(gr.check_cooldown(t + Duration::from_secs(3600)).is_none());

        let events = gr.process(&down(center(8)), t + MS_500);
        assert_eq!(
            events,
            vec![PatternEvent::TargetVisited {
                index: 8,
                position: 0
            }]
        );
    }

    #[test]
    fn gesture_end_ignores_pointer_position() {
        let mut gr = instant_recognizer();
        let t = Instant::now();
        gr.gesture_start(center(0), t);
        for i in [1, 2, 5] {
            gr.gesture_move(center(i), t);
        }
        gr.trace.pointer = None;
        let events = gr.gesture_end(t);
        assert_eq!(
            completed(&events),
            vec![&Pattern::from_indices(&[0, 1, 2, 5]).unwrap()]
        );
    }

    #[test]
    fn late_event_flushes_expired_cooldown_first() {
        let mut gr = recognizer();
        let t = Instant::now();
        draw(&mut gr, &[0, 1, 2, 5], t);
        let events = gr.process(&down(center(8)), t + MS_500);
        assert_eq!(
            events,
            vec![
                PatternEvent::Cleared,
                PatternEvent::TargetVisited {
                    index: 8,
                    position: 0
                },
            ]
        );
    }

    #[test]
    fn new_start_preempts_pending_reset() {
        let mut gr = recognizer();
        let t = Instant::now();
        draw(&mut gr, &[0, 1, 2, 5], t);

        // New gesture before the 400ms reset fires.
        gr.process(&down(center(8)), t + MS_100);
        gr.process(&mv(center(7)), t + MS_100);

        // The old deadline must not clear the new trace.
        assert!(gr.check_cooldown(t + MS_500).is_none());
        assert_eq!(gr.visited(), &[8, 7]);
        assert!(gr.is_tracing());
    }

    // --- Disable ---

    #[test]
    fn disable_mid_gesture_suppresses_completion() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);
        gr.process(&mv(center(1)), t);
        gr.process(&mv(center(2)), t);
        gr.process(&mv(center(5)), t);

        gr.disable();
        assert!(gr.process(&mv(center(8)), t).is_empty());
        assert!(gr.process(&up(), t).is_empty());
        assert_eq!(gr.state(), RecognizerState::Idle);
        assert!(gr.visited().is_empty());
    }

    #[test]
    fn disabled_ignores_new_gestures() {
        let mut gr = recognizer();
        gr.disable();
        gr.disable();
        let events = draw(&mut gr, &[0, 1, 2, 5, 8], Instant::now());
        assert!(events.is_empty());
        assert!(!gr.is_enabled());
    }

    #[test]
    fn enable_restores_recognition() {
        let mut gr = recognizer();
        gr.disable();
        gr.enable();
        let events = draw(&mut gr, &[0, 1, 2, 5, 8], Instant::now());
        assert_eq!(completed(&events).len(), 1);
    }

    // --- Resolution ---

    #[test]
    fn nearest_target_wins_when_radii_overlap() {
        let gr = recognizer();
        // 31 from target 0, 29 from target 1; both inside radius 57.
        assert_eq!(gr.resolve(Point::new(61.0, 30.0)), Some(1));
        assert_eq!(gr.resolve(Point::new(59.0, 30.0)), Some(0));
    }

    #[test]
    fn near_tie_resolves_to_strictly_closer() {
        let p = Point::new(60.004, 30.0);
        for _ in 0..16 {
            assert_eq!(recognizer().resolve(p), Some(1));
        }
    }

    #[test]
    fn exact_tie_prefers_lower_index() {
        let gr = recognizer();
        assert_eq!(gr.resolve(Point::new(60.0, 30.0)), Some(0));
        // Equidistant from 0, 1, 3 and 4.
        assert_eq!(gr.resolve(Point::new(60.0, 60.0)), Some(0));
    }

    #[test]
    fn radius_boundary_is_exclusive() {
        let mut gr = recognizer();
        gr.configure(layout().targets(), 20.0);
        // Exactly 20 from target 0's center.
        assert_eq!(gr.resolve(Point::new(30.0, 10.0)), None);
        assert_eq!(gr.resolve(Point::new(30.0, 10.5)), Some(0));
    }

    #[test]
    fn nan_point_resolves_to_nothing() {
        let gr = recognizer();
        assert_eq!(gr.resolve(Point::new(f32::NAN, 30.0)), None);
    }

    // --- Coordinate frames ---

    #[test]
    fn screen_frame_is_translated_by_surface_origin() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&Event::SurfaceMoved { x: 100.0, y: 200.0 }, t);
        assert_eq!(gr.surface_origin(), Point::new(100.0, 200.0));

        let screen_down = PointerEvent::screen(PointerEventKind::Down, 130.0, 230.0);
        gr.process(&Event::Pointer(screen_down), t);
        assert_eq!(gr.visited(), &[0]);
        assert_eq!(gr.trace().pointer(), Some(Point::new(30.0, 30.0)));
    }

    #[test]
    fn untranslated_screen_point_misses() {
        let gr = recognizer();
        // The same raw coordinates, read as surface-local, hit nothing.
        assert_eq!(gr.resolve(Point::new(130.0, 230.0)), None);
    }

    #[test]
    fn mixed_frames_within_one_gesture() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.set_surface_origin(Point::new(0.0, 500.0));
        gr.process(&down(center(0)), t);
        let screen_move = PointerEvent::screen(PointerEventKind::Move, 90.0, 530.0);
        gr.process(&Event::Pointer(screen_move), t);
        assert_eq!(gr.visited(), &[0, 1]);
    }

    // --- Geometry changes ---

    #[test]
    fn resize_recomputes_targets_and_cancels() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);

        let events = gr.process(&Event::Resize { width: 380.0 }, t);
        assert_eq!(events, vec![PatternEvent::Cancelled]);

        let resized = layout().with_max_grid_width(280.0);
        let expected = GridLayout {
            surface_width: 380.0,
            ..resized
        };
        assert_eq!(gr.targets()[8].center(), expected.targets()[8].center());
        assert_eq!(gr.detection_radius(), expected.detection_radius(0.95));
    }

    #[test]
    fn configure_replaces_geometry() {
        let mut gr = recognizer();
        let custom = GridLayout::new(400.0).with_padding(0.0).with_max_grid_width(300.0);
        let mut targets = custom.targets();
        targets.reverse();
        gr.configure(targets, 80.0);

        assert_eq!(gr.detection_radius(), 80.0);
        assert!(gr.layout().is_none());
        for (i, t) in gr.targets().iter().enumerate() {
            assert_eq!(usize::from(t.index()), i);
        }
        assert_eq!(gr.resolve(Point::new(150.0, 150.0)), Some(4));

        // Custom geometry ignores resize.
        gr.process(&Event::Resize { width: 100.0 }, Instant::now());
        assert_eq!(gr.detection_radius(), 80.0);
    }

    #[test]
    fn set_config_recomputes_radius() {
        let mut gr = recognizer();
        gr.set_config(RecognizerConfig {
            detection_ratio: 0.5,
            ..RecognizerConfig::default()
        });
        assert_eq!(gr.detection_radius(), 30.0);
        assert_eq!(gr.config().detection_ratio, 0.5);
    }

    // --- Rendering support ---

    #[test]
    fn connectors_follow_visit_order() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.process(&down(center(0)), t);
        gr.process(&mv(center(1)), t);
        gr.process(&mv(center(2)), t);

        let segments: Vec<_> = gr.connectors().collect();
        assert_eq!(
            segments,
            vec![(center(0), center(1)), (center(1), center(2))]
        );

        let finger = Point::new(170.0, 60.0);
        gr.process(&mv(finger), t);
        assert_eq!(gr.trailing_connector(), Some((center(2), finger)));
    }

    #[test]
    fn no_trailing_connector_when_not_tracing() {
        let mut gr = recognizer();
        assert!(gr.trailing_connector().is_none());
        draw(&mut gr, &[0, 1, 2, 5], Instant::now());
        // Cooling: connectors remain, trailing line does not.
        assert_eq!(gr.connectors().count(), 3);
        assert!(gr.trailing_connector().is_none());
    }

    // --- Wrappers and misc ---

    #[test]
    fn explicit_gesture_methods() {
        let mut gr = recognizer();
        let t = Instant::now();
        gr.gesture_start(center(0), t);
        for i in [1, 2, 5, 8] {
            gr.gesture_move(center(i), t);
        }
        let events = gr.gesture_end(t);
        assert_eq!(completed(&events).len(), 1);

        gr.gesture_start(center(4), t + MS_500);
        assert_eq!(gr.gesture_cancel(t + MS_500), vec![PatternEvent::Cancelled]);
    }

    #[test]
    fn reset_clears_all_state() {
        let mut gr = recognizer();
        let t = Instant::now();
        draw(&mut gr, &[0, 1, 2, 5], t);
        gr.reset();
        assert_eq!(gr.state(), RecognizerState::Idle);
        assert!(gr.visited().is_empty());
        assert!(gr.check_cooldown(t + MS_500).is_none());
    }

    #[test]
    fn debug_format() {
        let gr = recognizer();
        let dbg = format!("{gr:?}");
        assert!(dbg.contains("PatternRecognizer"));
        assert!(dbg.contains("Idle"));
    }

    #[test]
    fn default_config_values() {
        let config = RecognizerConfig::default();
        assert_eq!(config.detection_ratio, 0.95);
        assert_eq!(config.minimum_length, 4);
        assert_eq!(config.feedback_delay, Duration::from_millis(400));
    }
}
