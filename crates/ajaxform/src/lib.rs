#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Ajaxform
//!
//! Background form submission with inline validation feedback. A bound form
//! is serialized on `submit`, sent through a pluggable [`Transport`], and the
//! JSON answer either redirects the page or marks the offending fields.
//!
//! - **form_data** - form serialization and urlencoded bodies
//! - **transport** - the request type and the network seam
//! - **response** - the server's answer
//! - **feedback** - `is-invalid` marks and `.invalid-feedback` messages
//! - **options** - extra parameters, loader and hooks
//! - **form** - the [`AjaxForm`] model
//!
//! ## Example
//!
//! ```rust
//! use ajaxform::prelude::*;
//! use domtea::simulator::ProgramSimulator;
//! use domtea::{Document, Element};
//! use futures::FutureExt;
//!
//! let doc = Document::shared();
//! let form = {
//!     let mut d = doc.borrow_mut();
//!     let body = d.body();
//!     let form = d.insert(body, Element::form("/api/contact", "post").with_id("contact"));
//!     d.insert(form, Element::input().with_name("email").with_value("a@b.c"));
//!     form
//! };
//!
//! let transport = |_req: SubmitRequest| -> TransportFuture {
//!     async { Ok(SubmitResponse::ok().redirect_to("/thanks")) }.boxed_local()
//! };
//! let model = AjaxForm::new(doc.clone(), "contact", FormOptions::new(), transport);
//!
//! let mut sim = ProgramSimulator::new(model, doc.clone());
//! sim.submit(form);
//! sim.run_until_idle();
//!
//! assert_eq!(doc.borrow().location(), Some("/thanks"));
//! ```

pub mod error;
pub mod feedback;
pub mod form;
pub mod form_data;
pub mod options;
pub mod response;
pub mod transport;

pub use error::{FormError, Result, TransportError};
pub use form::{AjaxForm, Outcome, SubmitResultMsg, resolve_redirect};
pub use form_data::FormData;
pub use options::{FormOptions, Loader};
pub use response::SubmitResponse;
pub use transport::{SubmitRequest, Transport, TransportFuture};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{FormError, TransportError};
    pub use crate::form::AjaxForm;
    pub use crate::form_data::FormData;
    pub use crate::options::{FormOptions, Loader};
    pub use crate::response::SubmitResponse;
    pub use crate::transport::{SubmitRequest, Transport, TransportFuture};
}
