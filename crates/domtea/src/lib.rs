#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Domtea
//!
//! The Elm Architecture for browser-style widgets, running against a
//! headless document.
//!
//! - **dom** - an arena-backed document with selectors, focus and containment
//! - **message** - type-erased messages and the DOM event messages
//! - **command** - immediate, delayed and asynchronous commands
//! - **key** - keyboard events
//! - **simulator** - a deterministic, virtual-time host event loop
//!
//! ## Example
//!
//! ```rust
//! use domtea::{Cmd, Message, Model};
//!
//! struct Clicks(usize);
//!
//! impl Model for Clicks {
//!     fn update(&mut self, msg: Message) -> Option<Cmd> {
//!         if msg.is::<domtea::ClickMsg>() {
//!             self.0 += 1;
//!         }
//!         None
//!     }
//!
//!     fn view(&self) -> String {
//!         format!("{} clicks", self.0)
//!     }
//! }
//! ```

pub mod command;
pub mod dom;
pub mod key;
pub mod message;
pub mod simulator;

pub use command::{Cmd, CmdKind, batch, tick};
pub use dom::{Document, DocumentHandle, DomError, Element, ElementId, ElementKind, InputType};
pub use key::{KeyMsg, KeyType};
pub use message::{ClickMsg, FocusMsg, InputMsg, KeyDownMsg, Message, SubmitMsg};

/// The Model trait for widgets and pages.
///
/// A model owns its state, reacts to messages in `update` and renders a
/// plain-text snapshot in `view`.
pub trait Model: 'static {
    /// Initialize the model and return an optional startup command.
    fn init(&self) -> Option<Cmd> {
        None
    }

    /// Process a message and return a new command.
    ///
    /// Every update runs to completion before the host delivers the next
    /// message.
    fn update(&mut self, msg: Message) -> Option<Cmd>;

    /// Render the model as a string.
    fn view(&self) -> String;
}
