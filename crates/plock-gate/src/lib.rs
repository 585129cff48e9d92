#![forbid(unsafe_code)]

//! Unlock policy for the plock pattern lock.
//!
//! # Role in plock
//! `plock-gate` sits between the input layer (`plock-core`) and the screen.
//! It decides what a completed pattern means and keeps the failed-attempt
//! ledger.
//!
//! # Primary responsibilities
//! - **UnlockPredicate**: candidate sequence to yes/no; [`ExactSequence`] is
//!   the stock implementation and any `Fn(&[u8]) -> bool` also qualifies.
//! - **AttemptTracker**: counts consecutive failures and holds lockouts.
//! - **LockGate**: wires a recognizer to a predicate and a tracker, emitting
//!   [`GateEvent`]s the screen renders.
//! - **GateConfig**: every tunable as TOML/JSON data with validation.

pub mod attempts;
pub mod config;
pub mod error;
pub mod gate;
pub mod predicate;

pub use attempts::{AttemptOutcome, AttemptPolicy, AttemptTracker};
pub use config::GateConfig;
pub use error::{GateError, Result};
pub use gate::{GateEvent, LockGate, Role};
pub use predicate::{ExactSequence, UnlockPredicate};
