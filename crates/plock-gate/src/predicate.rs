#![forbid(unsafe_code)]

//! Unlock predicates: decide whether a completed pattern opens the gate.

use plock_core::Pattern;

/// A boolean test over a candidate sequence of target indices.
pub trait UnlockPredicate {
    fn matches(&self, candidate: &[u8]) -> bool;
}

impl<F> UnlockPredicate for F
where
    F: Fn(&[u8]) -> bool,
{
    fn matches(&self, candidate: &[u8]) -> bool {
        self(candidate)
    }
}

/// Exact positional equality against a fixed reference pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactSequence {
    reference: Pattern,
}

impl ExactSequence {
    #[must_use]
    pub fn new(reference: Pattern) -> Self {
        Self { reference }
    }

    #[must_use]
    pub fn reference(&self) -> &Pattern {
        &self.reference
    }
}

impl UnlockPredicate for ExactSequence {
    fn matches(&self, candidate: &[u8]) -> bool {
        let reference = self.reference.as_slice();
        candidate.len() == reference.len()
            && candidate.iter().zip(reference).all(|(a, b)| a == b)
    }
}
