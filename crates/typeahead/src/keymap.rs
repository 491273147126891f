//! Key bindings for dropdown navigation.
//!
//! Keys are matched by their display name (`"up"`, `"enter"`, `"esc"`, or the
//! typed characters for rune keys), so a binding can be rebound to any key
//! the host delivers.
//!
//! # Example
//!
//! ```rust
//! use domtea::{KeyMsg, KeyType};
//! use typeahead::keymap::{Binding, KeyMap, matches};
//!
//! let mut keymap = KeyMap::default();
//! keymap.down = Binding::new().keys(&["down", "ctrl+n"]);
//!
//! assert!(matches(&KeyMsg::from_type(KeyType::Down), &[&keymap.down]));
//! assert!(!matches(&KeyMsg::from_char('j'), &[&keymap.down]));
//! ```

use std::fmt;

/// A key binding with help text.
///
/// A binding matches when it is enabled and one of its keys equals the
/// display name of the pressed key.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<String>,
    help: String,
    disabled: bool,
}

impl Binding {
    /// Creates an empty binding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the keys that trigger this binding.
    #[must_use]
    pub fn keys(mut self, keys: &[&str]) -> Self {
        self.keys = keys.iter().map(|&s| s.to_string()).collect();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Creates a disabled binding.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// The keys of this binding.
    #[must_use]
    pub fn get_keys(&self) -> &[String] {
        &self.keys
    }

    /// The help text of this binding.
    #[must_use]
    pub fn get_help(&self) -> &str {
        &self.help
    }

    /// Returns whether this binding can match.
    #[must_use]
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding.
    pub fn enable(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }
}

/// Checks if `key` matches any of `bindings`.
pub fn matches<K: fmt::Display>(key: K, bindings: &[&Binding]) -> bool {
    let key_str = key.to_string();
    bindings
        .iter()
        .filter(|b| b.enabled())
        .any(|b| b.keys.iter().any(|k| *k == key_str))
}

/// The navigation keys of the widget.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Move the active row up.
    pub up: Binding,
    /// Move the active row down.
    pub down: Binding,
    /// Commit the active row.
    pub select: Binding,
    /// Close the dropdown.
    pub dismiss: Binding,
    /// Remove the last selection (multi mode, inline tags, empty input).
    pub remove_last: Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            up: Binding::new().keys(&["up"]).help("previous suggestion"),
            down: Binding::new().keys(&["down"]).help("next suggestion"),
            select: Binding::new().keys(&["enter"]).help("select suggestion"),
            dismiss: Binding::new().keys(&["esc"]).help("close suggestions"),
            remove_last: Binding::new()
                .keys(&["backspace"])
                .help("remove last selection"),
        }
    }
}

/// What a key press asks the widget to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// Activate the previous row.
    Up,
    /// Activate the next row.
    Down,
    /// Commit the active row.
    Select,
    /// Hide the dropdown.
    Dismiss,
    /// Remove the most recent selection.
    RemoveLast,
}

impl KeyMap {
    /// Resolves a key press to a navigation action.
    pub fn action<K: fmt::Display>(&self, key: K) -> Option<NavAction> {
        let key = key.to_string();
        [
            (&self.up, NavAction::Up),
            (&self.down, NavAction::Down),
            (&self.select, NavAction::Select),
            (&self.dismiss, NavAction::Dismiss),
            (&self.remove_last, NavAction::RemoveLast),
        ]
        .into_iter()
        .find(|(binding, _)| matches(&key, &[*binding]))
        .map(|(_, action)| action)
    }
}
