//! Form options and hooks.

use std::fmt;
use std::rc::Rc;

use crate::response::SubmitResponse;

/// An external loading indicator.
///
/// When a form has no loader it shows its own overlay instead.
pub trait Loader {
    /// Shows or hides the indicator.
    fn set_loading(&self, loading: bool);
}

/// Called with the server's response.
pub type ResponseFn = Rc<dyn Fn(&SubmitResponse)>;

/// Called with a response's diagnostic text.
pub type DebugFn = Rc<dyn Fn(&str)>;

/// Options of an [`AjaxForm`](crate::AjaxForm).
#[derive(Clone, Default)]
pub struct FormOptions {
    /// Extra pairs appended to every submission.
    pub api_params: Vec<(String, String)>,
    /// External loading indicator.
    pub loader: Option<Rc<dyn Loader>>,
    /// Called when the response reports success, before any redirect.
    pub on_success: Option<ResponseFn>,
    /// Called after validation feedback of a failed submission is applied.
    pub on_error: Option<ResponseFn>,
    /// Called with `debug_msg` whenever a response carries one.
    pub on_debug: Option<DebugFn>,
}

impl fmt::Debug for FormOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormOptions")
            .field("api_params", &self.api_params)
            .field("loader", &self.loader.is_some())
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_debug", &self.on_debug.is_some())
            .finish()
    }
}

impl FormOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair to every submission.
    #[must_use]
    pub fn api_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.api_params.push((name.into(), value.into()));
        self
    }

    /// Uses an external loading indicator instead of the overlay.
    #[must_use]
    pub fn loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Rc::new(loader));
        self
    }

    /// Sets the success hook.
    #[must_use]
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&SubmitResponse) + 'static,
    {
        self.on_success = Some(Rc::new(f));
        self
    }

    /// Sets the failure hook.
    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&SubmitResponse) + 'static,
    {
        self.on_error = Some(Rc::new(f));
        self
    }

    /// Sets the diagnostic hook.
    #[must_use]
    pub fn on_debug<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        self.on_debug = Some(Rc::new(f));
        self
    }
}
