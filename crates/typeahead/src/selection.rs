//! The ordered selection store and the public selection shapes.

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;

/// Ordered, capacity-bounded list of selected candidates.
///
/// Insertion order is preserved. The store never holds more than its
/// capacity; in single mode the capacity is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionStore {
    items: Vec<Candidate>,
    capacity: usize,
}

impl SelectionStore {
    /// Creates an empty store. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Appends a candidate. Returns false (and changes nothing) when full.
    pub fn add(&mut self, candidate: Candidate) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(candidate);
        true
    }

    /// Replaces the whole selection with a single candidate.
    pub fn replace(&mut self, candidate: Candidate) {
        self.items.clear();
        self.items.push(candidate);
    }

    /// Removes the candidate at `index`, shifting later entries left.
    pub fn remove_at(&mut self, index: usize) -> Option<Candidate> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Empties the store.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The selected candidates in insertion order.
    pub fn items(&self) -> &[Candidate] {
        &self.items
    }

    /// The selected keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|c| c.key.as_str())
    }

    /// Returns true if a candidate with `key` is selected.
    pub fn contains_key(&self, key: &str) -> bool {
        self.items.iter().any(|c| c.key == key)
    }

    /// Number of selections.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if the store is at capacity.
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Maximum number of selections.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recent selection.
    pub fn last(&self) -> Option<&Candidate> {
        self.items.last()
    }
}

/// Selected key(s) of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keys {
    /// Single mode: the selected key, or an empty string.
    Single(String),
    /// Multi mode: the selected keys in order.
    Multi(Vec<String>),
}

/// The full selection of one instance.
///
/// Also the shape accepted by `Autocomplete::set_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionValue {
    /// Single mode: the selected candidate, if any.
    Single(Option<Candidate>),
    /// Multi mode: the selected candidates in order.
    Multi(Vec<Candidate>),
}

impl SelectionValue {
    /// Shorthand for a single-mode selection.
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        SelectionValue::Single(Some(Candidate::new(key, value)))
    }

    /// The candidates contained in this value.
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            SelectionValue::Single(Some(c)) => std::slice::from_ref(c),
            SelectionValue::Single(None) => &[],
            SelectionValue::Multi(list) => list,
        }
    }
}
