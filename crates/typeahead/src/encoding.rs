//! Hidden-field encoding of the selected keys.
//!
//! Single mode stores the raw key. Multi mode stores a JSON array of keys in
//! selection order. A cleared selection is the empty string in both modes.
//! Removing the last tag leaves `[]` instead; [`decode`] accepts both.

use crate::config::SelectionMode;
use crate::error::EncodingError;
use crate::selection::SelectionStore;

/// Encodes the store's keys for the hidden field.
pub fn encode(store: &SelectionStore, mode: SelectionMode) -> String {
    if store.is_empty() {
        return String::new();
    }
    match mode {
        SelectionMode::Single => store.keys().next().unwrap_or_default().to_string(),
        SelectionMode::Multi { .. } => {
            let keys: Vec<&str> = store.keys().collect();
            serde_json::to_string(&keys).unwrap_or_default()
        }
    }
}

/// Encodes the keys left after a tag removal. Multi mode writes `[]` for an
/// emptied store rather than the empty string.
pub fn encode_remaining(store: &SelectionStore, mode: SelectionMode) -> String {
    match mode {
        SelectionMode::Multi { .. } if store.is_empty() => "[]".to_string(),
        _ => encode(store, mode),
    }
}

/// Decodes a hidden-field value back to the ordered key list.
pub fn decode(raw: &str, mode: SelectionMode) -> Result<Vec<String>, EncodingError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    match mode {
        SelectionMode::Single => Ok(vec![raw.to_string()]),
        SelectionMode::Multi { .. } => serde_json::from_str::<Vec<String>>(raw)
            .map_err(|e| EncodingError::InvalidKeyArray(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;

    const MULTI: SelectionMode = SelectionMode::Multi { max: 3 };

    #[test]
    fn test_single_raw_key() {
        let mut store = SelectionStore::new(1);
        store.add(Candidate::new("42", "Berlin"));
        assert_eq!(encode(&store, SelectionMode::Single), "42");
        assert_eq!(decode("42", SelectionMode::Single).unwrap(), vec!["42"]);
    }

    #[test]
    fn test_multi_json_array() {
        let mut store = SelectionStore::new(3);
        store.add(Candidate::new("1", "Apple"));
        store.add(Candidate::new("2", "Banana"));
        assert_eq!(encode(&store, MULTI), r#"["1","2"]"#);
        assert_eq!(decode(r#"["1","2"]"#, MULTI).unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn test_key_with_quotes_is_escaped() {
        let mut store = SelectionStore::new(3);
        store.add(Candidate::new(r#"a"b"#, "Quote"));
        let encoded = encode(&store, MULTI);
        assert_eq!(encoded, r#"["a\"b"]"#);
        assert_eq!(decode(&encoded, MULTI).unwrap(), vec![r#"a"b"#]);
    }

    #[test]
    fn test_empty_is_empty_string_in_both_modes() {
        let store = SelectionStore::new(3);
        assert_eq!(encode(&store, MULTI), "");
        assert_eq!(encode(&SelectionStore::new(1), SelectionMode::Single), "");
        assert!(decode("", MULTI).unwrap().is_empty());
        assert!(decode("[]", MULTI).unwrap().is_empty());
    }

    #[test]
    fn test_remaining_after_removal() {
        let mut store = SelectionStore::new(3);
        assert_eq!(encode_remaining(&store, MULTI), "[]");
        assert_eq!(encode_remaining(&SelectionStore::new(1), SelectionMode::Single), "");
        store.add(Candidate::new("2", "Banana"));
        assert_eq!(encode_remaining(&store, MULTI), r#"["2"]"#);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode("not json", MULTI).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidKeyArray(_)));
    }
}
