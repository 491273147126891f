//! Error types for form submission.

use thiserror::Error;

/// Errors raised while binding a form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// No element carries the requested id.
    #[error("element with id '{id}' not found")]
    FormNotFound {
        /// The requested form id.
        id: String,
    },

    /// The element with the requested id is not a form.
    #[error("element with id '{id}' is not a form")]
    NotAForm {
        /// The requested form id.
        id: String,
    },

    /// A field selector could not be parsed.
    #[error(transparent)]
    Selector(#[from] domtea::DomError),
}

/// A submission that did not produce a usable response.
///
/// Messages are stored as strings to keep `Clone` and `PartialEq`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never completed.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with something that is not a response object.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// A specialized [`Result`] type for form binding.
pub type Result<T> = std::result::Result<T, FormError>;
