#![forbid(unsafe_code)]

//! The lock gate: the calling screen's side of the pattern contract.
//!
//! [`LockGate`] owns a [`PatternRecognizer`], forwards input to it, and
//! decides what each completed pattern means: unlock, a counted failure, or
//! a lockout. Patterns shorter than the recognizer's minimum are reported as
//! [`GateEvent::TooShort`] and never count as attempts.
//!
//! While locked out the recognizer is disabled, so drawing does nothing.
//! Call [`tick`](LockGate::tick) periodically to lift timed lockouts and to
//! clear finished traces.
//!
//! Reference patterns are secrets: logs carry lengths and counts, never the
//! indices themselves.

use std::fmt;

use plock_core::{Event, Pattern, PatternEvent, PatternRecognizer};
use serde::{Deserialize, Serialize};
use web_time::{Duration, Instant};

use crate::attempts::{AttemptOutcome, AttemptPolicy, AttemptTracker};
use crate::config::GateConfig;
use crate::error::Result;
use crate::predicate::{ExactSequence, UnlockPredicate};

/// Privilege granted by a successful unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Elder,
    General,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elder => f.write_str("elder"),
            Self::General => f.write_str("general"),
        }
    }
}

/// Outcomes surfaced to the screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GateEvent {
    /// A target joined the pattern being drawn.
    Progress { index: u8, position: usize },
    /// The pattern matched.
    Unlocked { role: Role },
    /// The pattern was wrong; `remaining` failures left before lockout.
    Incorrect { remaining: u32 },
    /// The pattern was too short to count.
    TooShort { length: usize },
    /// Attempt limit reached. `retry_after` is `None` for an indefinite lock.
    LockedOut {
        #[serde(skip_serializing_if = "Option::is_none", with = "opt_millis")]
        retry_after: Option<Duration>,
    },
    /// A timed lockout lifted; input is accepted again.
    LockoutExpired,
    /// The gesture was cancelled.
    Cancelled,
    /// The finished trace was cleared from display.
    Cleared,
}

impl fmt::Display for GateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progress { index, position } => {
                write!(f, "Target {index} selected ({} so far).", position + 1)
            }
            Self::Unlocked { role } => write!(f, "Unlocked as {role}."),
            Self::Incorrect { remaining: 1 } => {
                f.write_str("Incorrect pattern. 1 attempt remaining.")
            }
            Self::Incorrect { remaining } => {
                write!(f, "Incorrect pattern. {remaining} attempts remaining.")
            }
            Self::TooShort { length } => {
                write!(f, "Pattern too short ({length} targets). Connect more dots.")
            }
            Self::LockedOut { .. } => f.write_str("Too many attempts. Please try again later."),
            Self::LockoutExpired => f.write_str("You can try again now."),
            Self::Cancelled => f.write_str("Pattern cancelled."),
            Self::Cleared => f.write_str(""),
        }
    }
}

/// Pattern gate: recognizer plus unlock policy.
pub struct LockGate<P = ExactSequence> {
    recognizer: PatternRecognizer,
    predicate: P,
    attempts: AttemptTracker,
    role: Role,
    granted: Option<Role>,
}

impl<P> fmt::Debug for LockGate<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGate")
            .field("recognizer", &self.recognizer)
            .field("failures", &self.attempts.failures())
            .field("granted", &self.granted)
            .finish()
    }
}

impl LockGate<ExactSequence> {
    /// Build the stock gate from a configuration, validating it first.
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        let config = config.clone().validated()?;
        let recognizer = PatternRecognizer::new(config.layout, config.recognizer_config());
        Ok(Self::new(
            recognizer,
            ExactSequence::new(config.unlock.pattern.clone()),
            config.attempt_policy(),
            config.unlock.role,
        ))
    }
}

impl<P: UnlockPredicate> LockGate<P> {
    #[must_use]
    pub fn new(
        recognizer: PatternRecognizer,
        predicate: P,
        policy: AttemptPolicy,
        role: Role,
    ) -> Self {
        Self {
            recognizer,
            predicate,
            attempts: AttemptTracker::new(policy),
            role,
            granted: None,
        }
    }

    /// Feed one input event.
    pub fn handle(&mut self, event: &Event, now: Instant) -> Vec<GateEvent> {
        let mut out = Vec::with_capacity(2);
        self.refresh_lockout(now, &mut out);
        for pattern_event in self.recognizer.process(event, now) {
            self.on_pattern_event(pattern_event, now, &mut out);
        }
        out
    }

    /// Advance timers: lift an expired lockout and clear a cooled trace.
    pub fn tick(&mut self, now: Instant) -> Vec<GateEvent> {
        let mut out = Vec::new();
        self.refresh_lockout(now, &mut out);
        if let Some(pattern_event) = self.recognizer.check_cooldown(now) {
            self.on_pattern_event(pattern_event, now, &mut out);
        }
        out
    }

    #[must_use]
    pub fn is_locked(&self, now: Instant) -> bool {
        self.attempts.is_locked(now)
    }

    /// Failures left before lockout.
    #[must_use]
    pub fn remaining_attempts(&self) -> u32 {
        self.attempts.remaining()
    }

    /// Role granted by the last successful unlock, if still signed in.
    #[must_use]
    pub fn granted(&self) -> Option<Role> {
        self.granted
    }

    /// Drop the granted role.
    pub fn logout(&mut self) {
        if let Some(role) = self.granted.take() {
            tracing::info!(%role, "gate signed out");
        }
    }

    /// Clear attempts, lockout, granted role, and any gesture in progress.
    pub fn reset(&mut self) {
        self.attempts.reset();
        self.granted = None;
        self.recognizer.reset();
        self.recognizer.enable();
    }

    #[must_use]
    pub fn recognizer(&self) -> &PatternRecognizer {
        &self.recognizer
    }

    /// Mutable access for geometry updates made outside the event stream.
    pub fn recognizer_mut(&mut self) -> &mut PatternRecognizer {
        &mut self.recognizer
    }

    fn on_pattern_event(&mut self, event: PatternEvent, now: Instant, out: &mut Vec<GateEvent>) {
        match event {
            PatternEvent::TargetVisited { index, position } => {
                out.push(GateEvent::Progress { index, position });
            }
            PatternEvent::Completed { pattern } => self.evaluate(&pattern, now, out),
            PatternEvent::Rejected { length } => out.push(GateEvent::TooShort { length }),
            PatternEvent::Cancelled => out.push(GateEvent::Cancelled),
            PatternEvent::Cleared => out.push(GateEvent::Cleared),
        }
    }

    fn evaluate(&mut self, pattern: &Pattern, now: Instant, out: &mut Vec<GateEvent>) {
        if self.predicate.matches(pattern.as_slice()) {
            self.attempts.record_success();
            self.granted = Some(self.role);
            tracing::info!(role = %self.role, "gate unlocked");
            out.push(GateEvent::Unlocked { role: self.role });
            return;
        }

        match self.attempts.record_failure(now) {
            AttemptOutcome::Remaining(remaining) => {
                tracing::info!(length = pattern.len(), remaining, "pattern rejected");
                out.push(GateEvent::Incorrect { remaining });
            }
            AttemptOutcome::LockedOut { .. } => {
                self.recognizer.disable();
                out.push(GateEvent::LockedOut {
                    retry_after: self.attempts.retry_after(now),
                });
            }
        }
    }

    fn refresh_lockout(&mut self, now: Instant, out: &mut Vec<GateEvent>) {
        if self.attempts.refresh(now) {
            self.recognizer.enable();
            tracing::info!("lockout expired");
            out.push(GateEvent::LockoutExpired);
        }
    }
}

mod opt_millis {
    use serde::Serializer;
    use web_time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_u64(duration.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }
}
