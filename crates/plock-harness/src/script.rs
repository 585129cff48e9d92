#![forbid(unsafe_code)]

//! Deterministic gesture scripts.
//!
//! A [`GestureScript`] turns a list of target indices into the pointer events
//! a finger would produce dragging through those targets: a `Down` on the
//! first center, interpolated `Move`s along each straight segment, and an
//! `Up` on the last center. Timestamps are milliseconds from an arbitrary
//! epoch and advance by a fixed step per event.
//!
//! With [`with_screen_origin`](GestureScript::with_screen_origin) the script
//! emits a `SurfaceMoved` first and reports positions in the screen frame,
//! the way a host that only knows absolute touch coordinates would.
//!
//! Straight segments can pass through intermediate targets (0 to 2 crosses
//! 1); the recognizer visits those too, so scripts should list them.

use plock_core::{Event, GridLayout, GridTarget, Point, PointerEvent, PointerEventKind, TARGET_COUNT};

/// Default spacing between scripted events.
pub const DEFAULT_STEP_MS: u64 = 16;

/// How a scripted gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ending {
    /// Finger lifted.
    #[default]
    Lift,
    /// Contact reclaimed by the platform.
    Cancel,
    /// No terminating event; the gesture stays open.
    Open,
}

/// Builder for scripted drag gestures over a grid.
#[derive(Debug, Clone)]
pub struct GestureScript {
    targets: [GridTarget; TARGET_COUNT],
    screen_origin: Option<Point>,
    interpolation: usize,
    step_ms: u64,
    start_ms: u64,
}

impl GestureScript {
    #[must_use]
    pub fn new(layout: &GridLayout) -> Self {
        Self {
            targets: layout.targets(),
            screen_origin: None,
            interpolation: 0,
            step_ms: DEFAULT_STEP_MS,
            start_ms: 0,
        }
    }

    /// Report positions in the screen frame for a surface placed at `origin`.
    #[must_use]
    pub fn with_screen_origin(mut self, origin: Point) -> Self {
        self.screen_origin = Some(origin);
        self
    }

    /// Insert `steps` intermediate moves on each segment.
    #[must_use]
    pub fn with_interpolation(mut self, steps: usize) -> Self {
        self.interpolation = steps;
        self
    }

    #[must_use]
    pub fn with_step_ms(mut self, step_ms: u64) -> Self {
        self.step_ms = step_ms;
        self
    }

    #[must_use]
    pub fn starting_at(mut self, start_ms: u64) -> Self {
        self.start_ms = start_ms;
        self
    }

    /// Drag through `indices` and lift.
    ///
    /// # Panics
    ///
    /// Panics if an index is outside `0..9`.
    #[must_use]
    pub fn draw(&self, indices: &[u8]) -> Vec<(Event, u64)> {
        self.draw_with(indices, Ending::Lift)
    }

    /// Drag through `indices` and end the gesture as `ending` says.
    ///
    /// # Panics
    ///
    /// Panics if an index is outside `0..9`.
    #[must_use]
    pub fn draw_with(&self, indices: &[u8], ending: Ending) -> Vec<(Event, u64)> {
        let centers: Vec<Point> = indices
            .iter()
            .map(|&i| self.targets[usize::from(i)].center())
            .collect();
        self.trace_path(&centers, ending)
    }

    /// Drag along arbitrary surface-local points.
    #[must_use]
    pub fn trace_path(&self, points: &[Point], ending: Ending) -> Vec<(Event, u64)> {
        let Some((&first, rest)) = points.split_first() else {
            return Vec::new();
        };

        let mut out = Vec::with_capacity(2 + rest.len() * (self.interpolation + 1));
        let mut ts = self.start_ms;
        if let Some(origin) = self.screen_origin {
            out.push((
                Event::SurfaceMoved {
                    x: origin.x,
                    y: origin.y,
                },
                ts,
            ));
        }

        out.push((self.pointer(PointerEventKind::Down, first), ts));
        let mut from = first;
        for &to in rest {
            let segments = self.interpolation + 1;
            for step in 1..=segments {
                let t = step as f32 / segments as f32;
                let at = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
                ts += self.step_ms;
                out.push((self.pointer(PointerEventKind::Move, at), ts));
            }
            from = to;
        }

        let kind = match ending {
            Ending::Lift => PointerEventKind::Up,
            Ending::Cancel => PointerEventKind::Cancel,
            Ending::Open => return out,
        };
        ts += self.step_ms;
        out.push((self.pointer(kind, from), ts));
        out
    }

    /// Center of a target in surface-local coordinates.
    #[must_use]
    pub fn center(&self, index: u8) -> Point {
        self.targets[usize::from(index)].center()
    }

    fn pointer(&self, kind: PointerEventKind, local: Point) -> Event {
        match self.screen_origin {
            Some(origin) => {
                let at = local.offset(origin.x, origin.y);
                Event::Pointer(PointerEvent::screen(kind, at.x, at.y))
            }
            None => Event::pointer(kind, local.x, local.y),
        }
    }
}
