#![forbid(unsafe_code)]

//! The committed result of one gesture: an ordered, duplicate-free sequence
//! of target indices.
//!
//! A [`Pattern`] never holds more than [`TARGET_COUNT`] entries, so it is
//! stored inline. The text form joins indices with `-` (`"0-1-2-5-8"`), which
//! is also what configuration files use.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use thiserror::Error;

use crate::geometry::TARGET_COUNT;

/// Why a sequence of indices is not a valid pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternParseError {
    #[error("pattern is empty")]
    Empty,

    #[error("invalid target index: {token:?}")]
    Invalid { token: String },

    #[error("target index {index} is outside the 3x3 grid")]
    OutOfRange { index: u8 },

    #[error("target index {index} appears more than once")]
    Duplicate { index: u8 },
}

/// Ordered, duplicate-free sequence of target indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<u8>", into = "Vec<u8>")
)]
pub struct Pattern {
    indices: SmallVec<[u8; TARGET_COUNT]>,
}

impl Pattern {
    /// An empty pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pattern from explicit indices, validating range and
    /// uniqueness.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is empty, contains an index outside
    /// `0..9`, or repeats an index.
    pub fn from_indices(indices: &[u8]) -> Result<Self, PatternParseError> {
        if indices.is_empty() {
            return Err(PatternParseError::Empty);
        }
        let mut pattern = Self::new();
        for &index in indices {
            if usize::from(index) >= TARGET_COUNT {
                return Err(PatternParseError::OutOfRange { index });
            }
            if !pattern.push_unique(index) {
                return Err(PatternParseError::Duplicate { index });
            }
        }
        Ok(pattern)
    }

    /// Append `index` unless it is already present. Returns whether it was
    /// appended.
    pub(crate) fn push_unique(&mut self, index: u8) -> bool {
        if self.contains(index) {
            return false;
        }
        self.indices.push(index);
        true
    }

    pub(crate) fn clear(&mut self) {
        self.indices.clear();
    }

    /// Indices in visit order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, index: u8) -> bool {
        self.indices.contains(&index)
    }

    /// First visited index.
    #[must_use]
    pub fn first(&self) -> Option<u8> {
        self.indices.first().copied()
    }

    /// Most recently visited index.
    #[must_use]
    pub fn last(&self) -> Option<u8> {
        self.indices.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.indices.iter().copied()
    }
}

impl AsRef<[u8]> for Pattern {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq<[u8]> for Pattern {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_slice() == other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for Pattern {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl From<Pattern> for Vec<u8> {
    fn from(pattern: Pattern) -> Self {
        pattern.indices.into_vec()
    }
}

impl TryFrom<Vec<u8>> for Pattern {
    type Error = PatternParseError;

    fn try_from(indices: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(&indices)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = PatternParseError;

    /// Parse `"0-1-2-5-8"`. Commas are accepted as separators too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PatternParseError::Empty);
        }
        let mut indices: SmallVec<[u8; TARGET_COUNT]> = SmallVec::new();
        for token in trimmed.split(['-', ',']) {
            let token = token.trim();
            let index = token.parse::<u8>().map_err(|_| PatternParseError::Invalid {
                token: token.to_owned(),
            })?;
            indices.push(index);
        }
        Self::from_indices(&indices)
    }
}
