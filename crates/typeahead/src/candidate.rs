//! Candidates: key/value pairs eligible for selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A key/value pair eligible for selection.
///
/// `key` is the stable identifier carried in the hidden field; `value` is the
/// text shown to the user and matched against queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable identifier.
    pub key: String,
    /// Display and search text.
    pub value: String,
}

impl Candidate {
    /// Creates a candidate.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns true if both key and value are non-empty.
    ///
    /// Defaults and programmatic values missing either part are skipped.
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.key)
    }
}

/// Builds candidates from `(key, value)` pairs.
pub fn candidates<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Vec<Candidate>
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| Candidate::new(key, value))
        .collect()
}
