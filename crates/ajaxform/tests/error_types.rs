//! Unit tests for ajaxform error types.
//!
//! Tests verify:
//! - Display formatting
//! - Clone and `PartialEq` derives
//! - Conversions from selector and JSON errors
//! - Result type alias

use std::error::Error as StdError;

use ajaxform::{FormError, Result, SubmitResponse, TransportError};

mod display_tests {
    use super::*;

    #[test]
    fn test_form_not_found_display() {
        let e = FormError::FormNotFound {
            id: "signup".into(),
        };
        assert_eq!(e.to_string(), "element with id 'signup' not found");
    }

    #[test]
    fn test_not_a_form_display() {
        let e = FormError::NotAForm { id: "card".into() };
        assert_eq!(e.to_string(), "element with id 'card' is not a form");
    }

    #[test]
    fn test_transport_display() {
        assert_eq!(
            TransportError::network("timeout").to_string(),
            "network error: timeout"
        );
        assert_eq!(
            TransportError::InvalidResponse("eof".into()).to_string(),
            "invalid response: eof"
        );
    }

    #[test]
    fn test_selector_error_is_transparent() {
        let dom = domtea::DomError::InvalidSelector {
            selector: "a b".into(),
            reason: "descendant combinators are not supported".into(),
        };
        let e = FormError::from(dom.clone());
        assert_eq!(e.to_string(), dom.to_string());
    }
}

mod trait_tests {
    use super::*;

    #[test]
    fn test_errors_are_std_errors() {
        fn assert_error<E: StdError>(_: &E) {}
        assert_error(&FormError::FormNotFound { id: "x".into() });
        assert_error(&TransportError::network("x"));
    }

    #[test]
    fn test_clone_and_eq() {
        let e = TransportError::network("refused");
        assert_eq!(e.clone(), e);
        assert_ne!(e, TransportError::InvalidResponse("refused".into()));
    }

    #[test]
    fn test_json_error_converts() {
        let e = SubmitResponse::from_json("[1, 2").unwrap_err();
        assert!(matches!(e, TransportError::InvalidResponse(_)));
    }
}

mod result_tests {
    use super::*;

    fn lookup(id: &str) -> Result<u32> {
        if id == "ok" {
            Ok(1)
        } else {
            Err(FormError::FormNotFound { id: id.into() })
        }
    }

    #[test]
    fn test_result_alias() {
        assert_eq!(lookup("ok"), Ok(1));
        assert!(lookup("missing").is_err());
    }
}
