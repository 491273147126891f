//! The JSON object a submission endpoint answers with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// A submission response.
///
/// Every field is optional on the wire; a missing `success` means failure.
///
/// ```rust
/// use ajaxform::SubmitResponse;
///
/// let r = SubmitResponse::from_json(r#"{"invalid": {"email": "Required"}}"#).unwrap();
/// assert!(!r.success);
/// assert_eq!(r.invalid_message("email").as_deref(), Some("Required"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitResponse {
    /// Whether the submission was accepted.
    pub success: bool,
    /// Where to navigate after a successful submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Field name to validation message.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub invalid: BTreeMap<String, Value>,
    /// Field names that passed validation. Values are ignored.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub valid: BTreeMap<String, Value>,
    /// Diagnostic text to surface to the developer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_msg: Option<String>,
}

impl SubmitResponse {
    /// Parses a response body.
    pub fn from_json(body: &str) -> Result<Self, TransportError> {
        Ok(serde_json::from_str(body)?)
    }

    /// A successful response.
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Sets the redirect target.
    #[must_use]
    pub fn redirect_to(mut self, url: impl Into<String>) -> Self {
        self.redirect = Some(url.into());
        self
    }

    /// Marks a field invalid.
    #[must_use]
    pub fn with_invalid(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.invalid.insert(field.into(), Value::String(message.into()));
        self
    }

    /// Marks a field valid.
    #[must_use]
    pub fn with_valid(mut self, field: impl Into<String>) -> Self {
        self.valid.insert(field.into(), Value::Bool(true));
        self
    }

    /// The validation message for `field` as display text.
    ///
    /// Strings are used as-is; other JSON values are rendered compactly.
    pub fn invalid_message(&self, field: &str) -> Option<String> {
        self.invalid.get(field).map(message_text)
    }
}

/// Display text of a validation message.
pub(crate) fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
