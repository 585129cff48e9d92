#![forbid(unsafe_code)]

//! Pointer storm generator for fault injection.
//!
//! Generates deterministic, seeded event sequences for stress testing the
//! recognizer. Storms mix well-formed strokes with the malformed input real
//! platforms deliver: moves with no contact, lifts without a down, duplicate
//! downs, resizes and focus loss mid-gesture.
//!
//! # Burst Patterns
//!
//! | Pattern | Description |
//! |---------|-------------|
//! | [`BurstPattern::PointerFlood`] | One long held contact wandering the surface |
//! | [`BurstPattern::Scribble`] | Many short well-formed strokes |
//! | [`BurstPattern::OutOfOrder`] | Pointer kinds in random order |
//! | [`BurstPattern::RapidResize`] | Resizes interleaved with strokes |
//! | [`BurstPattern::FocusFlap`] | Focus lost and regained mid-stroke |
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"storm_start","pattern":"scribble","event_count":1000,"seed":42}
//! {"event":"storm_inject","idx":0,"event_type":"pointer_down","ts_ms":0}
//! {"event":"storm_complete","total_events":1000,"completed":12,"rejected":30,"violations":0}
//! ```

use plock_core::{
    Event, GestureTrace, PatternEvent, PatternRecognizer, PointerEvent, PointerEventKind,
    RecognizerState, TARGET_COUNT,
};
use serde::Serialize;
use web_time::{Duration, Instant};

// ============================================================================
// Configuration
// ============================================================================

/// Pattern type for storm generation.
#[derive(Debug, Clone, PartialEq)]
pub enum BurstPattern {
    /// A single contact held down for `count` moves.
    PointerFlood { count: usize },
    /// `strokes` well-formed strokes of up to `max_moves` moves each.
    Scribble { strokes: usize, max_moves: usize },
    /// `count` pointer events of random kind.
    OutOfOrder { count: usize },
    /// `count` events, roughly one in five a resize.
    RapidResize { count: usize },
    /// `count` events with focus lost and regained at random.
    FocusFlap { count: usize },
}

impl BurstPattern {
    /// Pattern name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PointerFlood { .. } => "pointer_flood",
            Self::Scribble { .. } => "scribble",
            Self::OutOfOrder { .. } => "out_of_order",
            Self::RapidResize { .. } => "rapid_resize",
            Self::FocusFlap { .. } => "focus_flap",
        }
    }
}

/// Configuration for a pointer storm.
#[derive(Debug, Clone)]
pub struct InputStormConfig {
    pub pattern: BurstPattern,
    /// Random seed for deterministic generation.
    pub seed: u64,
    /// Surface the pointer wanders over (square).
    pub surface_width: f32,
    /// Timestamp spacing between events.
    pub step_ms: u64,
}

impl InputStormConfig {
    pub fn new(pattern: BurstPattern, seed: u64, surface_width: f32) -> Self {
        Self {
            pattern,
            seed,
            surface_width,
            step_ms: 8,
        }
    }
}

// ============================================================================
// Event Generation
// ============================================================================

/// Deterministic PRNG (xorshift64) for reproducible storms.
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn below(&mut self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }
        self.next() % max
    }

    /// Uniform in `[0, max)`.
    fn coord(&mut self, max: f32) -> f32 {
        (self.next() % 10_000) as f32 / 10_000.0 * max
    }
}

/// Generated storm with timestamps in milliseconds.
pub struct InputStorm {
    pub events: Vec<(Event, u64)>,
    pub pattern_name: &'static str,
    pub seed: u64,
}

/// Generate a deterministic storm from config.
pub fn generate_storm(config: &InputStormConfig) -> InputStorm {
    let mut generator = Generator {
        rng: Rng::new(config.seed),
        width: config.surface_width.max(1.0),
        step_ms: config.step_ms,
        ts: 0,
        x: config.surface_width / 2.0,
        y: config.surface_width / 2.0,
        out: Vec::new(),
    };

    match config.pattern {
        BurstPattern::PointerFlood { count } => generator.pointer_flood(count),
        BurstPattern::Scribble { strokes, max_moves } => generator.scribble(strokes, max_moves),
        BurstPattern::OutOfOrder { count } => generator.out_of_order(count),
        BurstPattern::RapidResize { count } => generator.rapid_resize(count),
        BurstPattern::FocusFlap { count } => generator.focus_flap(count),
    }

    InputStorm {
        events: generator.out,
        pattern_name: config.pattern.name(),
        seed: config.seed,
    }
}

struct Generator {
    rng: Rng,
    width: f32,
    step_ms: u64,
    ts: u64,
    x: f32,
    y: f32,
    out: Vec<(Event, u64)>,
}

impl Generator {
    fn push(&mut self, event: Event) {
        self.out.push((event, self.ts));
        self.ts += self.step_ms;
    }

    fn pointer(&mut self, kind: PointerEventKind) {
        self.push(Event::Pointer(PointerEvent::new(kind, self.x, self.y)));
    }

    /// Random walk of up to a fifth of the surface per step, clamped.
    fn wander(&mut self) {
        let reach = self.width / 5.0;
        self.x = (self.x + self.rng.coord(2.0 * reach) - reach).clamp(0.0, self.width);
        self.y = (self.y + self.rng.coord(2.0 * reach) - reach).clamp(0.0, self.width);
    }

    fn jump(&mut self) {
        self.x = self.rng.coord(self.width);
        self.y = self.rng.coord(self.width);
    }

    fn stroke(&mut self, moves: usize) {
        self.jump();
        self.pointer(PointerEventKind::Down);
        for _ in 0..moves {
            self.wander();
            self.pointer(PointerEventKind::Move);
        }
        self.pointer(PointerEventKind::Up);
    }

    fn pointer_flood(&mut self, count: usize) {
        self.pointer(PointerEventKind::Down);
        for _ in 0..count {
            self.wander();
            self.pointer(PointerEventKind::Move);
        }
        self.pointer(PointerEventKind::Up);
    }

    fn scribble(&mut self, strokes: usize, max_moves: usize) {
        for _ in 0..strokes {
            let moves = self.rng.below(max_moves as u64 + 1) as usize;
            self.stroke(moves);
            // Occasionally wait out the feedback delay between strokes.
            if self.rng.below(4) == 0 {
                self.ts += 500;
            }
        }
    }

    fn out_of_order(&mut self, count: usize) {
        for _ in 0..count {
            let kind = match self.rng.below(10) {
                0..=1 => PointerEventKind::Down,
                2..=6 => PointerEventKind::Move,
                7..=8 => PointerEventKind::Up,
                _ => PointerEventKind::Cancel,
            };
            if kind == PointerEventKind::Down {
                self.jump();
            } else {
                self.wander();
            }
            self.pointer(kind);
        }
    }

    fn rapid_resize(&mut self, count: usize) {
        let base = self.width;
        while self.out.len() < count {
            if self.rng.below(5) == 0 {
                let width = base * 0.5 + self.rng.coord(base);
                self.push(Event::Resize { width });
            } else {
                let moves = self.rng.below(6) as usize;
                self.stroke(moves);
            }
        }
        self.out.truncate(count);
    }

    fn focus_flap(&mut self, count: usize) {
        let mut held = false;
        for _ in 0..count {
            match self.rng.below(8) {
                0 => self.push(Event::Focus(false)),
                1 => self.push(Event::Focus(true)),
                2 if !held => {
                    self.jump();
                    self.pointer(PointerEventKind::Down);
                    held = true;
                }
                3 if held => {
                    self.pointer(PointerEventKind::Up);
                    held = false;
                }
                _ => {
                    self.wander();
                    self.pointer(PointerEventKind::Move);
                }
            }
        }
    }
}

/// Classify an event for logging.
pub fn event_type_name(event: &Event) -> &'static str {
    match event {
        Event::Pointer(p) => match p.kind {
            PointerEventKind::Down => "pointer_down",
            PointerEventKind::Move => "pointer_move",
            PointerEventKind::Up => "pointer_up",
            PointerEventKind::Cancel => "pointer_cancel",
        },
        Event::Resize { .. } => "resize",
        Event::SurfaceMoved { .. } => "surface_moved",
        Event::Focus(_) => "focus",
    }
}

// ============================================================================
// Running a storm
// ============================================================================

/// JSONL record for storm logging.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StormLogEntry {
    StormStart {
        pattern: &'static str,
        event_count: usize,
        seed: u64,
    },
    StormInject {
        idx: usize,
        event_type: &'static str,
        ts_ms: u64,
    },
    Violation {
        idx: usize,
        detail: String,
    },
    StormComplete {
        total_events: usize,
        completed: usize,
        rejected: usize,
        cancelled: usize,
        max_visited: usize,
        violations: usize,
    },
}

/// Tally of a storm run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StormReport {
    pub events_processed: usize,
    pub completed: usize,
    pub rejected: usize,
    pub cancelled: usize,
    pub cleared: usize,
    pub max_visited: usize,
    /// Invariant violations observed, with the offending event index.
    pub violations: Vec<(usize, String)>,
}

/// Drive `recognizer` with a storm, checking invariants after every event.
///
/// Returns the report and the JSONL log (every 100th injection is sampled).
pub fn run_storm_with_logging(
    storm: &InputStorm,
    recognizer: &mut PatternRecognizer,
) -> (StormReport, Vec<String>) {
    let epoch = Instant::now();
    let minimum = recognizer.config().minimum_length;
    let mut report = StormReport::default();
    let mut log = Vec::new();

    push_log(
        &mut log,
        &StormLogEntry::StormStart {
            pattern: storm.pattern_name,
            event_count: storm.events.len(),
            seed: storm.seed,
        },
    );

    for (idx, (event, ts_ms)) in storm.events.iter().enumerate() {
        if idx % 100 == 0 || idx + 1 == storm.events.len() {
            push_log(
                &mut log,
                &StormLogEntry::StormInject {
                    idx,
                    event_type: event_type_name(event),
                    ts_ms: *ts_ms,
                },
            );
        }

        let now = epoch + Duration::from_millis(*ts_ms);
        for output in recognizer.process(event, now) {
            match output {
                PatternEvent::Completed { pattern } => {
                    report.completed += 1;
                    if pattern.len() < minimum {
                        report
                            .violations
                            .push((idx, format!("completed with {} < {minimum}", pattern.len())));
                    }
                }
                PatternEvent::Rejected { length } => {
                    report.rejected += 1;
                    if length >= minimum {
                        report
                            .violations
                            .push((idx, format!("rejected with {length} >= {minimum}")));
                    }
                }
                PatternEvent::Cancelled => report.cancelled += 1,
                PatternEvent::Cleared => report.cleared += 1,
                PatternEvent::TargetVisited { .. } => {}
            }
        }

        if let Some(detail) = check_trace(recognizer.state(), recognizer.trace()) {
            report.violations.push((idx, detail));
        }
        report.max_visited = report.max_visited.max(recognizer.visited().len());
        report.events_processed += 1;
    }

    for (idx, detail) in &report.violations {
        tracing::warn!(idx, %detail, "storm invariant violated");
        push_log(
            &mut log,
            &StormLogEntry::Violation {
                idx: *idx,
                detail: detail.clone(),
            },
        );
    }

    push_log(
        &mut log,
        &StormLogEntry::StormComplete {
            total_events: report.events_processed,
            completed: report.completed,
            rejected: report.rejected,
            cancelled: report.cancelled,
            max_visited: report.max_visited,
            violations: report.violations.len(),
        },
    );

    (report, log)
}

fn check_trace(state: RecognizerState, trace: &GestureTrace) -> Option<String> {
    let visited = trace.visited();
    if visited.len() > TARGET_COUNT {
        return Some(format!("trace holds {} targets", visited.len()));
    }
    let mut seen = 0u16;
    for index in visited.iter() {
        if usize::from(index) >= TARGET_COUNT || seen & (1 << index) != 0 {
            return Some(format!("bad or repeated index {index}"));
        }
        seen |= 1 << index;
    }
    match state {
        RecognizerState::Tracing if !trace.is_active() => Some("tracing without contact".into()),
        RecognizerState::Idle if !visited.is_empty() => Some("idle with residue".into()),
        _ => None,
    }
}

fn push_log(log: &mut Vec<String>, entry: &StormLogEntry) {
    match serde_json::to_string(entry) {
        Ok(line) => log.push(line),
        Err(err) => tracing::error!(%err, "failed to encode storm log entry"),
    }
}

// ============================================================================
// Tests
// ============================================================================
