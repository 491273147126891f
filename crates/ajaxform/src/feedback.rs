//! Inline validation feedback.
//!
//! A field key addresses every element whose id is the key or whose name is
//! the key, the key with `[]`, or starts with the key followed by `[`. Each
//! matched element's feedback slot is the first `.invalid-feedback` inside
//! its closest `.form-group`, falling back to its parent.

use domtea::{Document, ElementId};

use crate::error::Result;

/// Class added to an invalid field.
pub const INVALID_CLASS: &str = "is-invalid";

/// Class of the element that displays a field's message.
pub const FEEDBACK_CLASS: &str = "invalid-feedback";

/// Class of the container grouping a field with its feedback.
pub const GROUP_CLASS: &str = "form-group";

/// The selector addressing every element of field `key`.
pub fn field_selector(key: &str) -> String {
    format!(r#"#{key}, [name="{key}"], [name="{key}[]"], [name^="{key}["]"#)
}

/// The feedback slot of `field`, if any.
pub fn feedback_slot(doc: &Document, field: ElementId) -> Option<ElementId> {
    let scope = doc
        .closest(field, |el| el.has_class(GROUP_CLASS))
        .or_else(|| doc.get(field).parent())?;
    doc.descendants(scope)
        .into_iter()
        .find(|&id| doc.get(id).has_class(FEEDBACK_CLASS))
}

/// Marks every element of `key` invalid and shows `message`.
///
/// Returns the number of elements marked.
pub fn show_invalid(doc: &mut Document, key: &str, message: &str) -> Result<usize> {
    let fields = doc.query_selector_all(&field_selector(key))?;
    let mut marked = 0;
    for field in fields {
        if doc.get(field).parent().is_none() {
            continue;
        }
        let slot = feedback_slot(doc, field);
        doc.get_mut(field).add_class(INVALID_CLASS);
        if let Some(slot) = slot {
            let el = doc.get_mut(slot);
            el.text = message.to_string();
            el.hidden = false;
        }
        marked += 1;
    }
    Ok(marked)
}

/// Removes the invalid mark of every element of `key` and hides its message.
///
/// Returns the number of elements cleared.
pub fn clear_invalid(doc: &mut Document, key: &str) -> Result<usize> {
    let fields = doc.query_selector_all(&field_selector(key))?;
    let mut cleared = 0;
    for field in fields {
        if doc.get(field).parent().is_none() {
            continue;
        }
        let slot = feedback_slot(doc, field);
        doc.get_mut(field).remove_class(INVALID_CLASS);
        if let Some(slot) = slot {
            let el = doc.get_mut(slot);
            el.text = "\u{00a0}".to_string();
            el.hidden = true;
        }
        cleared += 1;
    }
    Ok(cleared)
}
