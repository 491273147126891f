//! The seam between the form and the network.
//!
//! The form never performs I/O itself: it hands a [`SubmitRequest`] to a
//! [`Transport`] and receives the parsed [`SubmitResponse`] back as a
//! future. Nothing cancels a request once sent.

use futures::future::LocalBoxFuture;

use crate::error::TransportError;
use crate::form_data::FormData;
use crate::response::SubmitResponse;

/// One form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    /// The form's `action` URL.
    pub action: String,
    /// Upper-cased HTTP method.
    pub method: String,
    /// The request body.
    pub data: FormData,
}

/// Result of a submission as delivered by a transport.
pub type TransportFuture = LocalBoxFuture<'static, Result<SubmitResponse, TransportError>>;

/// Sends submissions.
pub trait Transport {
    /// Sends `request` and resolves to the server's response.
    fn send(&self, request: SubmitRequest) -> TransportFuture;
}

impl<F> Transport for F
where
    F: Fn(SubmitRequest) -> TransportFuture,
{
    fn send(&self, request: SubmitRequest) -> TransportFuture {
        self(request)
    }
}
