//! Form serialization.
//!
//! [`FormData`] is the ordered list of name/value pairs a form submits.
//! Names may repeat (`tags[]`), so it is a list, not a map.

use std::fmt;

use domtea::{Document, ElementId, ElementKind, InputType};

/// Ordered name/value pairs of a form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the successful controls inside `form`, in document order.
    ///
    /// A control is an `input` with a non-empty name that is not disabled.
    /// Checkboxes count only when checked. Hidden inputs are included.
    pub fn from_form(doc: &Document, form: ElementId) -> Self {
        let entries = doc
            .descendants(form)
            .into_iter()
            .map(|id| doc.get(id))
            .filter(|el| el.kind == ElementKind::Input && !el.disabled)
            .filter(|el| el.input_type != InputType::Checkbox || el.checked)
            .filter_map(|el| {
                let name = el.name.as_deref().filter(|n| !n.is_empty())?;
                let value = match el.input_type {
                    InputType::Checkbox if el.value.is_empty() => "on".to_string(),
                    _ => el.value.clone(),
                };
                Some((name.to_string(), value))
            })
            .collect();
        Self { entries }
    }

    /// Appends a pair.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// The first value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value submitted under `name`.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// All pairs in submission order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is submitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders an `application/x-www-form-urlencoded` body.
    pub fn to_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.entries.iter())
            .finish()
    }
}

impl fmt::Display for FormData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_urlencoded())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
