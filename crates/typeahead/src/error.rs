//! Error types for the autocomplete widget.
//!
//! None of these errors ever escape a user interaction: construction
//! failures and rejected retrievals are logged and the widget carries on.
//! They are returned from the fallible building blocks so callers that
//! drive those pieces directly can react.

use thiserror::Error;

/// Errors raised while binding the widget to a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutocompleteError {
    /// The selector matched no elements.
    #[error("element(s) with selector '{selector}' not found")]
    NoElements {
        /// The normalized selector.
        selector: String,
    },

    /// The selector could not be parsed.
    #[error(transparent)]
    Selector(#[from] domtea::DomError),
}

/// A candidate retrieval that failed.
///
/// Stores the message as a `String` to keep `Clone` and `PartialEq`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The retrieval function rejected.
    #[error("fetch rejected: {0}")]
    Rejected(String),
}

impl FetchError {
    /// Creates a rejection with the given message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// A hidden-field value that does not decode to a key set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The multi-mode value is not a JSON array of strings.
    #[error("invalid key array: {0}")]
    InvalidKeyArray(String),
}

/// A specialized [`Result`] type for widget construction.
pub type Result<T> = std::result::Result<T, AutocompleteError>;
