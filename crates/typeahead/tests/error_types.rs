//! Unit tests for typeahead error types.
//!
//! Tests verify:
//! - Display formatting
//! - Clone and `PartialEq` derives
//! - Conversion from selector errors
//! - Result type alias

use std::error::Error as StdError;

use typeahead::{AutocompleteError, EncodingError, FetchError, Result};

mod display_tests {
    use super::*;

    #[test]
    fn test_no_elements_display() {
        let e = AutocompleteError::NoElements {
            selector: "#city".into(),
        };
        assert_eq!(e.to_string(), "element(s) with selector '#city' not found");
    }

    #[test]
    fn test_fetch_error_display() {
        let e = FetchError::rejected("HTTP 500");
        assert_eq!(e.to_string(), "fetch rejected: HTTP 500");
    }

    #[test]
    fn test_encoding_error_display() {
        let e = EncodingError::InvalidKeyArray("expected value at line 1 column 1".into());
        assert!(e.to_string().starts_with("invalid key array: "));
    }

    #[test]
    fn test_selector_error_is_transparent() {
        let dom = domtea::DomError::InvalidSelector {
            selector: "div > input".into(),
            reason: "combinators are not supported".into(),
        };
        let e = AutocompleteError::from(dom.clone());
        assert_eq!(e.to_string(), dom.to_string());
    }
}

mod trait_tests {
    use super::*;

    #[test]
    fn test_errors_are_std_errors() {
        fn assert_error<E: StdError>() {}
        assert_error::<AutocompleteError>();
        assert_error::<FetchError>();
        assert_error::<EncodingError>();
    }

    #[test]
    fn test_clone_and_eq() {
        let e = FetchError::rejected("timeout");
        assert_eq!(e.clone(), e);
        assert_ne!(e, FetchError::rejected("other"));
    }

    #[test]
    fn test_no_source_for_leaf_variants() {
        let e = AutocompleteError::NoElements {
            selector: ".x".into(),
        };
        assert!(e.source().is_none());
    }
}

mod result_tests {
    use super::*;

    fn lookup(found: bool) -> Result<usize> {
        if found {
            Ok(1)
        } else {
            Err(AutocompleteError::NoElements {
                selector: ".autocomplete".into(),
            })
        }
    }

    #[test]
    fn test_result_alias() {
        assert_eq!(lookup(true).unwrap(), 1);
        assert!(matches!(
            lookup(false),
            Err(AutocompleteError::NoElements { .. })
        ));
    }
}
