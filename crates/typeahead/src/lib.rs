#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Typeahead
//!
//! An autocomplete widget for text inputs: as the user types, candidates are
//! retrieved from a static list or an asynchronous provider and shown in a
//! keyboard-navigable dropdown. Committed selections are mirrored into a
//! hidden field so they travel with the surrounding form.
//!
//! - **config** - options, language strings and callbacks
//! - **source** - static filtering, provider calls and result post-processing
//! - **selection** - the ordered, capacity-bounded selection store
//! - **encoding** - hidden-field encoding of selected keys
//! - **dropdown** - dropdown visibility and the active row
//! - **keymap** - rebindable navigation keys
//! - **debounce** - tag-based input debouncing
//! - **instance** - the generated structure around one input
//! - **widget** - the [`Autocomplete`] model
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use domtea::simulator::ProgramSimulator;
//! use domtea::{Document, Element, KeyType};
//! use typeahead::prelude::*;
//!
//! let doc = Document::shared();
//! let input = {
//!     let mut d = doc.borrow_mut();
//!     let body = d.body();
//!     d.insert(body, Element::input().with_class("fruit").with_name("fruit"))
//! };
//!
//! let config = Config::default().data(candidates([("1", "Apple"), ("2", "Apricot")]));
//! let widget = Autocomplete::new(doc.clone(), "fruit", config);
//!
//! let mut sim = ProgramSimulator::new(widget, doc.clone());
//! sim.focus(input);
//! sim.type_text(input, "ap");
//! sim.advance(Duration::from_millis(300));
//! sim.key(KeyType::Down);
//! sim.key(KeyType::Enter);
//!
//! assert_eq!(sim.model().keys(), vec![Keys::Single("1".into())]);
//! ```

pub mod candidate;
pub mod config;
pub mod debounce;
pub mod dropdown;
pub mod encoding;
pub mod error;
pub mod instance;
pub mod keymap;
pub mod selection;
pub mod source;
pub mod widget;

pub use candidate::{Candidate, candidates};
pub use config::{ClearStyle, Config, Language, Options, SelectionMode, TagsPosition};
pub use error::{AutocompleteError, EncodingError, FetchError, Result};
pub use instance::{Instance, InstanceId};
pub use selection::{Keys, SelectionStore, SelectionValue};
pub use source::CandidateSource;
pub use widget::{Autocomplete, SearchResultsMsg};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::candidate::{Candidate, candidates};
    pub use crate::config::{ClearStyle, Config, Language, Options, TagsPosition};
    pub use crate::error::{AutocompleteError, FetchError};
    pub use crate::selection::{Keys, SelectionValue};
    pub use crate::widget::Autocomplete;
}
