#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Pointer sources disagree about reference frames: some report positions
//! relative to the touch surface, others relative to the screen. Every
//! [`PointerEvent`] therefore carries its [`CoordinateFrame`], and the
//! recognizer converts to surface-local coordinates exactly once, at the
//! boundary, using the last measured surface origin.
//!
//! # Design Notes
//!
//! - Surface-local is the canonical frame; target centers live there.
//! - `Screen` positions are translated by subtracting the surface origin
//!   delivered through [`Event::SurfaceMoved`].
//! - A single contact point is assumed: `Down → Move* → Up | Cancel`.

use crate::geometry::Point;

/// Reference frame of a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CoordinateFrame {
    /// Relative to the grid surface's top-left corner.
    #[default]
    Local,
    /// Relative to the screen; needs the surface origin subtracted.
    Screen,
}

/// Phase of a pointer contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerEventKind {
    /// Contact began.
    Down,
    /// Contact moved while held.
    Move,
    /// Contact lifted normally.
    Up,
    /// The platform reclaimed the contact (or the view was torn down).
    Cancel,
}

/// A pointer event with its position and reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub x: f32,
    pub y: f32,
    pub frame: CoordinateFrame,
}

impl PointerEvent {
    /// Create a pointer event in the surface-local frame.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            frame: CoordinateFrame::Local,
        }
    }

    /// Create a pointer event in the screen frame.
    #[must_use]
    pub const fn screen(kind: PointerEventKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            frame: CoordinateFrame::Screen,
        }
    }

    /// Position as reported, in this event's own frame.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Position in surface-local coordinates, given the surface's absolute
    /// origin on screen.
    #[must_use]
    pub fn local_position(&self, surface_origin: Point) -> Point {
        match self.frame {
            CoordinateFrame::Local => self.position(),
            CoordinateFrame::Screen => self.position() - surface_origin,
        }
    }
}

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A pointer contact event.
    Pointer(PointerEvent),

    /// The hosting surface was resized; targets are recomputed.
    Resize {
        /// New surface width.
        width: f32,
    },

    /// The surface's absolute on-screen origin was (re)measured.
    SurfaceMoved {
        x: f32,
        y: f32,
    },

    /// Focus gained or lost.
    ///
    /// `true` = focus gained, `false` = focus lost.
    Focus(bool),
}

impl Event {
    /// Shorthand for a surface-local pointer event.
    #[must_use]
    pub const fn pointer(kind: PointerEventKind, x: f32, y: f32) -> Self {
        Self::Pointer(PointerEvent::new(kind, x, y))
    }
}

impl From<PointerEvent> for Event {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}
