#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: grid geometry, pointer events, and pattern-lock recognition.
//!
//! # Role in plock
//! `plock-core` is the input layer. It owns the 3x3 target geometry, the
//! normalized pointer event types, and the [`PatternRecognizer`] state machine
//! that turns a drag gesture into an ordered, duplicate-free [`Pattern`].
//!
//! # Primary responsibilities
//! - **GridLayout / GridTarget**: target centers derived from surface size.
//! - **Event**: canonical pointer events tagged with their coordinate frame.
//! - **Pattern**: the committed sequence of visited target indices.
//! - **PatternRecognizer**: `Idle` / `Tracing` / `Cooling` gesture state.
//!
//! # How it fits in the system
//! `plock-gate` owns the unlock policy and consumes the
//! [`PatternEvent`](gesture::PatternEvent)s produced here. Nothing in this
//! crate performs I/O or blocks, so it can be driven headlessly from tests,
//! a replay harness, or any UI toolkit's event loop.
//!
//! [`PatternRecognizer`]: gesture::PatternRecognizer
//! [`Pattern`]: pattern::Pattern

pub mod event;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod pattern;

pub use event::{CoordinateFrame, Event, PointerEvent, PointerEventKind};
pub use geometry::{GridLayout, GridTarget, Point, TARGET_COUNT};
pub use gesture::{GestureTrace, PatternEvent, PatternRecognizer, RecognizerConfig, RecognizerState};
pub use pattern::{Pattern, PatternParseError};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, info_span, trace, warn};
