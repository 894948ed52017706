//! On-screen numeric keypad
//!
//! Each tap rewrites the whole display text. Digit taps go through the
//! display normalizer; backspace edits raw text so a trailing separator can
//! be removed.

use crate::amount::{normalize_display_with, DEFAULT_SEPARATORS};

/// A single keypad key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    DoubleZero,
    Separator(char),
    Backspace,
    Clear,
}

impl Key {
    /// Parse a key label using [`DEFAULT_SEPARATORS`].
    pub fn parse(label: &str) -> Option<Key> {
        Self::parse_with(label, DEFAULT_SEPARATORS)
    }

    /// Parse a key label: `0`-`9`, `00`, `C`, `⌫` (or `back`), or one of
    /// the accepted separator glyphs.
    pub fn parse_with(label: &str, separators: &[char]) -> Option<Key> {
        match label {
            "C" | "c" => return Some(Key::Clear),
            "⌫" | "back" => return Some(Key::Backspace),
            "00" => return Some(Key::DoubleZero),
            _ => {}
        }

        let mut chars = label.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return None;
        };
        if let Some(d) = c.to_digit(10) {
            return Some(Key::Digit(d as u8));
        }
        if separators.contains(&c) {
            return Some(Key::Separator(c));
        }
        None
    }
}

/// Apply one tap using [`DEFAULT_SEPARATORS`].
pub fn apply_key(current: &str, key: Key) -> String {
    apply_key_with(current, key, DEFAULT_SEPARATORS)
}

/// Apply one tap to the display text and return the new display text.
pub fn apply_key_with(current: &str, key: Key, separators: &[char]) -> String {
    match key {
        Key::Clear => String::new(),
        Key::Backspace => {
            let mut text = current.to_string();
            text.pop();
            text
        }
        Key::DoubleZero => normalize_display_with(&format!("{current}00"), separators),
        Key::Separator(glyph) => {
            if current.chars().any(|c| separators.contains(&c)) {
                current.to_string()
            } else if current.is_empty() {
                format!("0{glyph}")
            } else {
                format!("{current}{glyph}")
            }
        }
        Key::Digit(d) if d <= 9 => {
            normalize_display_with(&format!("{current}{d}"), separators)
        }
        Key::Digit(_) => current.to_string(),
    }
}

/// Replay a sequence of taps from an empty display.
pub fn replay<I>(keys: I) -> String
where
    I: IntoIterator<Item = Key>,
{
    keys.into_iter()
        .fold(String::new(), |display, key| apply_key(&display, key))
}
