//! The form submitter.
//!
//! [`AjaxForm`] intercepts the `submit` event of one form, serializes it and
//! hands the request to a [`Transport`]. The response drives redirects and
//! inline validation feedback.

use std::fmt;
use std::rc::Rc;

use domtea::{Cmd, DocumentHandle, Element, ElementId, ElementKind, Message, Model, SubmitMsg};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{FormError, Result, TransportError};
use crate::feedback::{clear_invalid, show_invalid};
use crate::form_data::FormData;
use crate::options::FormOptions;
use crate::response::{SubmitResponse, message_text};
use crate::transport::{SubmitRequest, Transport};

/// Class of the built-in loading overlay.
pub const OVERLAY_CLASS: &str = "ajaxform-overlay";

/// Method used when a form does not declare one.
pub const DEFAULT_METHOD: &str = "GET";

/// The outcome of one submission, delivered back to the form.
#[derive(Debug)]
pub struct SubmitResultMsg {
    /// The submitted form.
    pub form: ElementId,
    /// What the transport produced.
    pub result: std::result::Result<SubmitResponse, TransportError>,
}

/// What the last completed submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the submission.
    Accepted,
    /// The server rejected the listed fields.
    Rejected(Vec<String>),
    /// No usable response arrived.
    Failed(String),
}

/// Resolves a redirect target against `base`.
///
/// Targets that cannot be resolved are returned unchanged.
///
/// ```rust
/// use ajaxform::resolve_redirect;
///
/// assert_eq!(
///     resolve_redirect(Some("https://shop.test/api/order"), "/thanks"),
///     "https://shop.test/thanks"
/// );
/// assert_eq!(resolve_redirect(None, "/thanks"), "/thanks");
/// ```
pub fn resolve_redirect(base: Option<&str>, target: &str) -> String {
    base.and_then(|base| Url::parse(base).ok())
        .and_then(|base| base.join(target).ok())
        .map_or_else(|| target.to_string(), String::from)
}

/// A form submitted in the background.
///
/// # Example
///
/// ```rust
/// use ajaxform::{AjaxForm, FormOptions, SubmitRequest, SubmitResponse, TransportFuture};
/// use domtea::{Document, Element};
/// use futures::FutureExt;
///
/// let doc = Document::shared();
/// let body = doc.borrow().body();
/// doc.borrow_mut()
///     .insert(body, Element::form("/api/contact", "post").with_id("contact"));
///
/// let transport = |_req: SubmitRequest| -> TransportFuture {
///     async { Ok(SubmitResponse::ok()) }.boxed_local()
/// };
/// let form = AjaxForm::new(doc, "contact", FormOptions::new(), transport);
/// assert!(form.is_bound());
/// ```
pub struct AjaxForm {
    document: DocumentHandle,
    id: String,
    form: Option<ElementId>,
    overlay: Option<ElementId>,
    options: FormOptions,
    transport: Rc<dyn Transport>,
    in_flight: usize,
    outcome: Option<Outcome>,
}

impl fmt::Debug for AjaxForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AjaxForm")
            .field("id", &self.id)
            .field("form", &self.form)
            .field("options", &self.options)
            .field("in_flight", &self.in_flight)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl AjaxForm {
    /// Binds the form with id `form_id`.
    ///
    /// A missing form is logged and yields an inert submitter.
    pub fn new<T>(document: DocumentHandle, form_id: &str, options: FormOptions, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        let transport: Rc<dyn Transport> = Rc::new(transport);
        match Self::bind(document.clone(), form_id, options.clone(), transport.clone()) {
            Ok(form) => form,
            Err(err) => {
                error!(error = %err, "ajaxform: construction failed");
                Self {
                    document,
                    id: form_id.to_string(),
                    form: None,
                    overlay: None,
                    options,
                    transport,
                    in_flight: 0,
                    outcome: None,
                }
            }
        }
    }

    /// Binds the form with id `form_id`, reporting a miss as an error.
    pub fn try_new<T>(
        document: DocumentHandle,
        form_id: &str,
        options: FormOptions,
        transport: T,
    ) -> Result<Self>
    where
        T: Transport + 'static,
    {
        Self::bind(document, form_id, options, Rc::new(transport))
    }

    fn bind(
        document: DocumentHandle,
        form_id: &str,
        options: FormOptions,
        transport: Rc<dyn Transport>,
    ) -> Result<Self> {
        let (form, overlay) = {
            let mut doc = document.borrow_mut();
            let form = doc
                .get_element_by_id(form_id)
                .ok_or_else(|| FormError::FormNotFound {
                    id: form_id.to_string(),
                })?;
            if doc.get(form).kind != ElementKind::Form {
                return Err(FormError::NotAForm {
                    id: form_id.to_string(),
                });
            }
            let overlay = options.loader.is_none().then(|| {
                let overlay = doc.insert(
                    form,
                    Element::new(ElementKind::Div)
                        .with_id(format!("{form_id}-overlay"))
                        .with_class(OVERLAY_CLASS)
                        .hide(),
                );
                let spinner = doc.insert(
                    overlay,
                    Element::new(ElementKind::Div)
                        .with_class("spinner-border")
                        .with_class("text-primary"),
                );
                doc.insert(
                    spinner,
                    Element::new(ElementKind::Span)
                        .with_class("visually-hidden")
                        .with_text("Loading..."),
                );
                overlay
            });
            (form, overlay)
        };

        debug!(form = form_id, overlay = overlay.is_some(), "ajaxform: bound");
        Ok(Self {
            document,
            id: form_id.to_string(),
            form: Some(form),
            overlay,
            options,
            transport,
            in_flight: 0,
            outcome: None,
        })
    }

    /// Returns true if a form was found.
    pub fn is_bound(&self) -> bool {
        self.form.is_some()
    }

    /// The id the form was looked up by.
    pub fn form_id(&self) -> &str {
        &self.id
    }

    /// The bound form element.
    pub fn form(&self) -> Option<ElementId> {
        self.form
    }

    /// The built-in overlay, when no external loader is configured.
    pub fn overlay(&self) -> Option<ElementId> {
        self.overlay
    }

    /// The configured options.
    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Number of submissions awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// What the last completed submission did.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Builds the request the form would submit now.
    pub fn request(&self) -> Option<SubmitRequest> {
        let form = self.form?;
        let doc = self.document.borrow();
        let el = doc.get(form);
        let mut data = FormData::from_form(&doc, form);
        for (name, value) in &self.options.api_params {
            data.append(name.clone(), value.clone());
        }
        let method = if el.method.trim().is_empty() {
            DEFAULT_METHOD.to_string()
        } else {
            el.method.trim().to_uppercase()
        };
        Some(SubmitRequest {
            action: el.action.clone(),
            method,
            data,
        })
    }

    /// Submits the form.
    ///
    /// The returned command resolves to a [`SubmitResultMsg`].
    pub fn submit(&mut self) -> Option<Cmd> {
        let form = self.form?;
        let request = self.request()?;
        debug!(
            form = %self.id,
            action = %request.action,
            method = %request.method,
            fields = request.data.len(),
            "ajaxform: submitting"
        );
        self.in_flight += 1;
        self.set_loading(true);
        let response = self.transport.send(request);
        Some(Cmd::future(async move {
            Message::new(SubmitResultMsg {
                form,
                result: response.await,
            })
        }))
    }

    fn finish(&mut self, result: std::result::Result<SubmitResponse, TransportError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(response) => self.handle_response(&response),
            Err(err) => {
                error!(form = %self.id, error = %err, "ajaxform: request failed");
                self.outcome = Some(Outcome::Failed(err.to_string()));
            }
        }
        self.set_loading(false);
    }

    fn handle_response(&mut self, response: &SubmitResponse) {
        if let Some(msg) = &response.debug_msg {
            warn!(form = %self.id, debug_msg = %msg, "ajaxform: debug message");
            if let Some(on_debug) = &self.options.on_debug {
                on_debug(msg);
            }
        }

        if response.success {
            self.outcome = Some(Outcome::Accepted);
            if let Some(on_success) = &self.options.on_success {
                on_success(response);
            }
            if let Some(target) = &response.redirect {
                let mut doc = self.document.borrow_mut();
                let base = doc
                    .location()
                    .map(str::to_string)
                    .or_else(|| self.form.map(|form| doc.get(form).action.clone()));
                let url = resolve_redirect(base.as_deref(), target);
                info!(form = %self.id, url = %url, "ajaxform: redirecting");
                doc.navigate(url);
            }
            return;
        }

        {
            let mut doc = self.document.borrow_mut();
            for (key, value) in &response.invalid {
                if let Err(err) = show_invalid(&mut doc, key, &message_text(value)) {
                    warn!(form = %self.id, field = %key, error = %err, "ajaxform: cannot mark field");
                }
            }
            for key in response.valid.keys() {
                if let Err(err) = clear_invalid(&mut doc, key) {
                    warn!(form = %self.id, field = %key, error = %err, "ajaxform: cannot clear field");
                }
            }
        }
        debug!(form = %self.id, invalid = response.invalid.len(), "ajaxform: rejected");
        self.outcome = Some(Outcome::Rejected(response.invalid.keys().cloned().collect()));
        if let Some(on_error) = &self.options.on_error {
            on_error(response);
        }
    }

    fn set_loading(&self, loading: bool) {
        if let Some(loader) = &self.options.loader {
            loader.set_loading(loading);
        } else if let Some(overlay) = self.overlay {
            self.document.borrow_mut().get_mut(overlay).hidden = !loading;
        }
    }
}

impl Model for AjaxForm {
    fn update(&mut self, msg: Message) -> Option<Cmd> {
        if let Some(m) = msg.downcast_ref::<SubmitMsg>() {
            if self.form.is_some_and(|form| form == m.form) {
                return self.submit();
            }
            return None;
        }
        if let Some(m) = msg.downcast::<SubmitResultMsg>() {
            if self.form.is_some_and(|form| form == m.form) {
                self.finish(m.result);
            }
        }
        None
    }

    fn view(&self) -> String {
        let Some(form) = self.form else {
            return format!("form #{}: unbound", self.id);
        };
        let doc = self.document.borrow();
        let mut lines = vec![match (&self.outcome, self.in_flight) {
            (_, n) if n > 0 => format!("form #{}: submitting ({n})", self.id),
            (None, _) => format!("form #{}: ready", self.id),
            (Some(Outcome::Accepted), _) => format!("form #{}: accepted", self.id),
            (Some(Outcome::Rejected(_)), _) => format!("form #{}: rejected", self.id),
            (Some(Outcome::Failed(err)), _) => format!("form #{}: failed ({err})", self.id),
        }];
        for id in doc.descendants(form) {
            let el = doc.get(id);
            if el.kind != ElementKind::Input || !el.has_class(crate::feedback::INVALID_CLASS) {
                continue;
            }
            let name = el.name.as_deref().or(el.id.as_deref()).unwrap_or("?");
            let message = crate::feedback::feedback_slot(&doc, id)
                .map(|slot| doc.get(slot).text.clone())
                .unwrap_or_default();
            lines.push(format!("  ! {name}: {message}"));
        }
        lines.join("\n")
    }
}
