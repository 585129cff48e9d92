#![forbid(unsafe_code)]

//! Test harness for plock.
//!
//! - [`script`]: deterministic drag gestures through named targets.
//! - [`storm`]: seeded pointer storms with invariant checking.
//! - [`replay`]: JSONL trace recording and replay through a gate.
//! - [`cli`]: the `plock-replay` binary.

pub mod cli;
pub mod error;
pub mod replay;
pub mod script;
pub mod storm;

pub use error::{ReplayError, Result};
pub use replay::{ReplayOutput, TraceFile, TraceRecord, TraceReplayer, TraceStep, TraceWriter};
pub use script::{Ending, GestureScript};
pub use storm::{BurstPattern, InputStormConfig, StormReport, generate_storm};
