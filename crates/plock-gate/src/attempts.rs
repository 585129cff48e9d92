#![forbid(unsafe_code)]

//! Failed-attempt counting and temporary lockout.
//!
//! Only patterns long enough to be reported count as attempts. After
//! `max_attempts` consecutive failures the gate locks; with a lockout
//! duration the lock lifts on its own, without one it holds until
//! [`AttemptTracker::reset`].

use web_time::{Duration, Instant};

/// Default number of failures allowed before locking.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default lockout duration.
pub const DEFAULT_LOCKOUT: Duration = Duration::from_secs(30);

/// Attempt limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    /// Consecutive failures that trigger a lockout (default: 3).
    pub max_attempts: u32,
    /// How long the lockout lasts; `None` means until reset (default: 30s).
    pub lockout: Option<Duration>,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lockout: Some(DEFAULT_LOCKOUT),
        }
    }
}

/// Result of recording a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Failures left before the lockout.
    Remaining(u32),
    /// The limit was reached. `until` is `None` for an indefinite lockout.
    LockedOut { until: Option<Instant> },
}

/// Counts consecutive failures against an [`AttemptPolicy`].
#[derive(Debug, Clone)]
pub struct AttemptTracker {
    policy: AttemptPolicy,
    failures: u32,
    locked: bool,
    locked_until: Option<Instant>,
}

impl AttemptTracker {
    #[must_use]
    pub fn new(policy: AttemptPolicy) -> Self {
        Self {
            policy,
            failures: 0,
            locked: false,
            locked_until: None,
        }
    }

    /// Record a wrong pattern.
    ///
    /// Failures recorded while already locked extend nothing and report the
    /// current lock.
    pub fn record_failure(&mut self, now: Instant) -> AttemptOutcome {
        if self.locked {
            return AttemptOutcome::LockedOut {
                until: self.locked_until,
            };
        }
        self.failures = self.failures.saturating_add(1);
        if self.failures >= self.policy.max_attempts {
            self.locked = true;
            // A deadline past the clock's range locks until reset.
            self.locked_until = self.policy.lockout.and_then(|d| now.checked_add(d));
            tracing::warn!(
                failures = self.failures,
                lockout_ms = self.policy.lockout.map(|d| d.as_millis() as u64),
                "attempt limit reached"
            );
            AttemptOutcome::LockedOut {
                until: self.locked_until,
            }
        } else {
            AttemptOutcome::Remaining(self.remaining())
        }
    }

    /// Record a correct pattern; clears the failure count.
    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    /// Lift a timed lockout whose deadline has passed. Returns `true` if the
    /// lock was lifted by this call.
    pub fn refresh(&mut self, now: Instant) -> bool {
        match self.locked_until {
            Some(until) if self.locked && now >= until => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Whether the gate is locked at `now`. Does not lift expired locks; see
    /// [`refresh`](Self::refresh).
    #[must_use]
    pub fn is_locked(&self, now: Instant) -> bool {
        self.locked && self.locked_until.is_none_or(|until| now < until)
    }

    /// Failures left before the lockout.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.policy.max_attempts.saturating_sub(self.failures)
    }

    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Time until a timed lockout lifts.
    #[must_use]
    pub fn retry_after(&self, now: Instant) -> Option<Duration> {
        if !self.locked {
            return None;
        }
        self.locked_until
            .map(|until| until.saturating_duration_since(now))
    }

    /// Clear failures and any lockout.
    pub fn reset(&mut self) {
        self.failures = 0;
        self.locked = false;
        self.locked_until = None;
    }

    #[must_use]
    pub fn policy(&self) -> &AttemptPolicy {
        &self.policy
    }
}
