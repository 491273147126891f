//! Widget configuration.
//!
//! [`Config`] is resolved once at construction and shared read-only by every
//! instance the widget binds. Defaults come from [`Config::default`]; caller
//! overrides arrive either through builder methods or as a deserialized
//! [`Options`] overlay (for example from a JSON blob embedded in the page).
//!
//! # Example
//!
//! ```rust
//! use typeahead::{Candidate, Config, Options};
//!
//! let config = Config::default()
//!     .max_selections(3)
//!     .data(vec![Candidate::new("1", "Apple")]);
//! assert!(config.mode().is_multi());
//!
//! let overrides: Options = serde_json::from_str(r#"{"minLength": 2, "tagsPosition": "inline"}"#).unwrap();
//! let config = config.merge(overrides);
//! assert_eq!(config.min_length, 2);
//! ```

use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::FutureExt;
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::error::FetchError;
use crate::selection::{Keys, SelectionValue};
use crate::source::CandidateSource;

/// Where the tags of a multi-select instance are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagsPosition {
    /// A separate tag strip above the input.
    #[default]
    Above,
    /// Inside the input's visual container, before the text field.
    Inline,
}

/// How the clear control is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearStyle {
    /// An affixed button.
    #[default]
    Button,
    /// An icon overlaid on the input.
    Icon,
}

/// Selection mode derived from `max_selections`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// At most one selection; the hidden field holds the raw key.
    Single,
    /// Up to `max` selections; the hidden field holds a JSON key array.
    Multi {
        /// Capacity of the selection store.
        max: usize,
    },
}

impl SelectionMode {
    /// Derives the mode from a `max_selections` setting.
    pub fn from_max(max_selections: usize) -> Self {
        if max_selections > 1 {
            SelectionMode::Multi { max: max_selections }
        } else {
            SelectionMode::Single
        }
    }

    /// Returns true in multi-select mode.
    pub fn is_multi(self) -> bool {
        matches!(self, SelectionMode::Multi { .. })
    }

    /// Capacity of the selection store.
    pub fn capacity(self) -> usize {
        match self {
            SelectionMode::Single => 1,
            SelectionMode::Multi { max } => max,
        }
    }
}

/// User-facing strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Language {
    /// Placeholder shown in an empty input.
    pub placeholder: String,
    /// Text of the dropdown's no-results row.
    pub no_results: String,
    /// Tooltip of the clear control.
    pub clear_title: String,
    /// Tooltip of a tag's remove control.
    pub remove_title: String,
}

impl Default for Language {
    fn default() -> Self {
        Self {
            placeholder: "Search...".to_string(),
            no_results: "No results found".to_string(),
            clear_title: "Clear selection".to_string(),
            remove_title: "Remove".to_string(),
        }
    }
}

/// Called after a selection is committed or removed.
///
/// Receives the selected key(s) and the full selection.
pub type ChangeFn = Rc<dyn Fn(&Keys, &SelectionValue)>;

/// Called after a selection is cleared, and once after construction.
pub type NotifyFn = Rc<dyn Fn()>;

/// Resolved configuration of an autocomplete widget.
#[derive(Clone)]
pub struct Config {
    /// Maximum number of rows rendered in the dropdown.
    pub max_items: usize,
    /// `1` selects single mode, larger values multi mode.
    pub max_selections: usize,
    /// Minimum query length (in characters) before searching.
    pub min_length: usize,
    /// Quiet interval before a search runs.
    pub debounce: Duration,
    /// Whether static filtering compares case-sensitively.
    pub case_sensitive: bool,
    /// Tag placement in multi mode.
    pub tags_position: TagsPosition,
    /// Clear control presentation.
    pub clear_style: ClearStyle,
    /// Start every instance disabled.
    pub disabled: bool,
    /// Single mode: key selected at construction.
    pub default_key: Option<String>,
    /// Single mode: value selected at construction.
    pub default_value: Option<String>,
    /// Multi mode: selections applied at construction.
    pub default_selections: Option<Vec<Candidate>>,
    /// Drop search results that arrive after a newer search has started.
    ///
    /// Off by default: without it an older asynchronous retrieval that
    /// resolves late overwrites the dropdown of a newer one.
    pub discard_stale_results: bool,
    /// Extra classes for the dropdown list, whitespace separated.
    pub class_name: Option<String>,
    /// Candidate retrieval strategy.
    pub source: CandidateSource,
    /// Change notification.
    pub on_change: Option<ChangeFn>,
    /// Clear notification.
    pub on_clear: Option<NotifyFn>,
    /// Construction-complete notification.
    pub on_loaded: Option<NotifyFn>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_items: 5,
            max_selections: 1,
            min_length: 1,
            debounce: Duration::from_millis(300),
            case_sensitive: false,
            tags_position: TagsPosition::Above,
            clear_style: ClearStyle::Button,
            disabled: false,
            default_key: None,
            default_value: None,
            default_selections: None,
            discard_stale_results: false,
            class_name: None,
            source: CandidateSource::Empty,
            on_change: None,
            on_clear: None,
            on_loaded: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("max_items", &self.max_items)
            .field("max_selections", &self.max_selections)
            .field("min_length", &self.min_length)
            .field("debounce", &self.debounce)
            .field("case_sensitive", &self.case_sensitive)
            .field("tags_position", &self.tags_position)
            .field("clear_style", &self.clear_style)
            .field("disabled", &self.disabled)
            .field("default_key", &self.default_key)
            .field("default_value", &self.default_value)
            .field("default_selections", &self.default_selections)
            .field("discard_stale_results", &self.discard_stale_results)
            .field("class_name", &self.class_name)
            .field("source", &self.source)
            .field("on_change", &self.on_change.is_some())
            .field("on_clear", &self.on_clear.is_some())
            .field("on_loaded", &self.on_loaded.is_some())
            .finish()
    }
}

impl Config {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// The selection mode implied by `max_selections`.
    pub fn mode(&self) -> SelectionMode {
        SelectionMode::from_max(self.max_selections)
    }

    /// Overlays caller overrides onto this config.
    pub fn merge(mut self, options: Options) -> Self {
        if let Some(v) = options.max_items {
            self.max_items = v.max(1);
        }
        if let Some(v) = options.max_selections {
            self.max_selections = v.max(1);
        }
        if let Some(v) = options.min_length {
            self.min_length = v;
        }
        if let Some(ms) = options.debounce {
            self.debounce = Duration::from_millis(ms);
        }
        if let Some(v) = options.case_sensitive {
            self.case_sensitive = v;
        }
        if let Some(v) = options.tags_position {
            self.tags_position = v;
        }
        if let Some(v) = options.clear_style {
            self.clear_style = v;
        }
        if let Some(v) = options.disabled {
            self.disabled = v;
        }
        if options.default_key.is_some() {
            self.default_key = options.default_key;
        }
        if options.default_value.is_some() {
            self.default_value = options.default_value;
        }
        if options.default_selections.is_some() {
            self.default_selections = options.default_selections;
        }
        if let Some(v) = options.discard_stale_results {
            self.discard_stale_results = v;
        }
        if options.class_name.is_some() {
            self.class_name = options.class_name;
        }
        if let Some(data) = options.data {
            self.source = CandidateSource::Static(data);
        }
        self
    }

    /// Sets the dropdown row cap.
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    /// Sets the selection capacity (`1` = single mode).
    pub fn max_selections(mut self, max_selections: usize) -> Self {
        self.max_selections = max_selections.max(1);
        self
    }

    /// Sets the minimum query length.
    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Sets the debounce interval.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets case-sensitive static filtering.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Sets tag placement.
    pub fn tags_position(mut self, tags_position: TagsPosition) -> Self {
        self.tags_position = tags_position;
        self
    }

    /// Sets clear control presentation.
    pub fn clear_style(mut self, clear_style: ClearStyle) -> Self {
        self.clear_style = clear_style;
        self
    }

    /// Starts every instance disabled.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Single mode: pre-selects `key`/`value` at construction.
    pub fn default_selection(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_key = Some(key.into());
        self.default_value = Some(value.into());
        self
    }

    /// Multi mode: pre-selects `selections` at construction.
    pub fn default_selections(mut self, selections: Vec<Candidate>) -> Self {
        self.default_selections = Some(selections);
        self
    }

    /// Drops results of superseded searches.
    pub fn discard_stale_results(mut self, discard: bool) -> Self {
        self.discard_stale_results = discard;
        self
    }

    /// Adds classes to every generated dropdown list.
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// The extra dropdown classes, split on whitespace.
    pub fn dropdown_classes(&self) -> impl Iterator<Item = &str> {
        self.class_name.as_deref().unwrap_or_default().split_whitespace()
    }

    /// Uses a static candidate list.
    pub fn data(mut self, data: Vec<Candidate>) -> Self {
        self.source = CandidateSource::Static(data);
        self
    }

    /// Uses an asynchronous retrieval function.
    ///
    /// The function receives the trimmed query. A rejection is logged and
    /// treated as an empty result.
    pub fn fetch_data<F, Fut>(mut self, fetch: F) -> Self
    where
        F: Fn(String) -> Fut + 'static,
        Fut: Future<Output = Result<Vec<Candidate>, FetchError>> + 'static,
    {
        self.source = CandidateSource::Fetch(Rc::new(move |query| fetch(query).boxed_local()));
        self
    }

    /// Uses a synchronous retrieval function.
    pub fn fetch_data_sync<F>(self, fetch: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<Candidate>, FetchError> + 'static,
    {
        self.fetch_data(move |query| futures::future::ready(fetch(&query)))
    }

    /// Sets the change callback.
    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&Keys, &SelectionValue) + 'static,
    {
        self.on_change = Some(Rc::new(f));
        self
    }

    /// Sets the clear callback.
    pub fn on_clear<F>(mut self, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_clear = Some(Rc::new(f));
        self
    }

    /// Sets the loaded callback.
    pub fn on_loaded<F>(mut self, f: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.on_loaded = Some(Rc::new(f));
        self
    }
}

/// Caller overrides, every field optional.
///
/// Field names follow the page-side camelCase convention so an options blob
/// can be deserialized directly. Callbacks and retrieval functions cannot be
/// expressed here; attach them with the [`Config`] builder methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// See [`Config::max_items`].
    pub max_items: Option<usize>,
    /// See [`Config::max_selections`].
    pub max_selections: Option<usize>,
    /// See [`Config::min_length`].
    pub min_length: Option<usize>,
    /// Debounce interval in milliseconds.
    pub debounce: Option<u64>,
    /// See [`Config::case_sensitive`].
    pub case_sensitive: Option<bool>,
    /// See [`Config::tags_position`].
    pub tags_position: Option<TagsPosition>,
    /// See [`Config::clear_style`].
    pub clear_style: Option<ClearStyle>,
    /// See [`Config::disabled`].
    pub disabled: Option<bool>,
    /// See [`Config::default_key`].
    pub default_key: Option<String>,
    /// See [`Config::default_value`].
    pub default_value: Option<String>,
    /// See [`Config::default_selections`].
    pub default_selections: Option<Vec<Candidate>>,
    /// See [`Config::discard_stale_results`].
    pub discard_stale_results: Option<bool>,
    /// See [`Config::class_name`].
    pub class_name: Option<String>,
    /// Static candidate list.
    pub data: Option<Vec<Candidate>>,
}
