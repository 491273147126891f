//! Keyboard input handling.
//!
//! This module provides types for representing `keydown` events, covering
//! the navigation keys widgets react to and regular character input.

use std::fmt;

/// Keyboard key event.
///
/// # Example
///
/// ```rust
/// use domtea::{KeyMsg, KeyType};
///
/// fn handle_key(key: KeyMsg) {
///     match key.key_type {
///         KeyType::Enter => println!("Enter pressed"),
///         KeyType::Runes => println!("Typed: {:?}", key.runes),
///         _ => {}
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMsg {
    /// The type of key pressed.
    pub key_type: KeyType,
    /// For `KeyType::Runes`, the characters typed.
    pub runes: Vec<char>,
}

impl KeyMsg {
    /// Create a new key message from a key type.
    pub fn from_type(key_type: KeyType) -> Self {
        Self {
            key_type,
            runes: Vec::new(),
        }
    }

    /// Create a new key message from a character.
    pub fn from_char(c: char) -> Self {
        Self {
            key_type: KeyType::Runes,
            runes: vec![c],
        }
    }
}

impl fmt::Display for KeyMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key_type == KeyType::Runes {
            for c in &self.runes {
                write!(f, "{c}")?;
            }
            Ok(())
        } else {
            write!(f, "{}", self.key_type)
        }
    }
}

/// Key type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Regular character input.
    Runes,
    /// ArrowUp.
    Up,
    /// ArrowDown.
    Down,
    /// ArrowLeft.
    Left,
    /// ArrowRight.
    Right,
    /// Enter.
    Enter,
    /// Escape.
    Esc,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Tab.
    Tab,
    /// Home.
    Home,
    /// End.
    End,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::Runes => "runes",
            KeyType::Up => "up",
            KeyType::Down => "down",
            KeyType::Left => "left",
            KeyType::Right => "right",
            KeyType::Enter => "enter",
            KeyType::Esc => "esc",
            KeyType::Backspace => "backspace",
            KeyType::Delete => "delete",
            KeyType::Tab => "tab",
            KeyType::Home => "home",
            KeyType::End => "end",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(KeyMsg::from_type(KeyType::Down).to_string(), "down");
        assert_eq!(KeyMsg::from_type(KeyType::Esc).to_string(), "esc");
        assert_eq!(KeyMsg::from_char('a').to_string(), "a");
    }

    #[test]
    fn test_from_char_is_runes() {
        let key = KeyMsg::from_char('x');
        assert_eq!(key.key_type, KeyType::Runes);
        assert_eq!(key.runes, vec!['x']);
    }
}
