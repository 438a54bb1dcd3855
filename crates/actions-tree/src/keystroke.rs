//! Keystroke syntax
//!
//! A `KeyStroke` is a single chord: one key plus a set of modifiers. The
//! textual form accepts both `+` and whitespace as separators, so
//! `"ctrl+shift+a"`, `"ctrl shift A"` and `"alt ENTER"` all parse.
//!
//! Supported formats:
//! - Single char: `"q"`, `"1"`, `"G"` (uppercase letters imply shift)
//! - Modifiers: `ctrl`/`control`, `shift`, `alt`, `meta`, `cmd`/`super`
//! - Named keys: `enter`, `escape`, `tab`, `space`, `back_space`, `delete`,
//!   `insert`, `home`, `end`, `page_up`, `page_down`, arrows, `f1`..`f24`
//! - Punctuation names: `back_quote`, `slash`, `comma`, `period`, ...
//! - `pressed` is accepted and ignored; `typed <c>` names a typed character
//!
//! Named keys are case-insensitive and `_` is optional (`PAGE_UP`, `pageup`).

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Modifiers that take part in matching; anything else a terminal reports is dropped
const MODIFIER_MASK: KeyModifiers = KeyModifiers::SHIFT
    .union(KeyModifiers::CONTROL)
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SUPER)
    .union(KeyModifiers::META);

/// A single key chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyStroke {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyStroke {
    /// Create a normalized keystroke
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        normalize(code, modifiers)
    }

    /// A plain character key, e.g. the numbered accelerators `1`..`9`
    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    /// Parse the textual form of a keystroke
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidKeyStroke(text.to_string());

        let tokens = tokenize(text);
        let (key, prefix) = tokens.split_last().ok_or_else(invalid)?;

        let mut modifiers = KeyModifiers::NONE;
        let mut typed = false;
        for token in prefix {
            if typed {
                // `typed` must directly precede the character
                return Err(invalid());
            }
            match token.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" => modifiers |= KeyModifiers::ALT,
                "meta" => modifiers |= KeyModifiers::META,
                "cmd" | "super" => modifiers |= KeyModifiers::SUPER,
                "pressed" => {}
                "typed" => typed = true,
                _ => return Err(invalid()),
            }
        }

        if typed {
            let mut chars = key.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Self {
                    code: KeyCode::Char(c),
                    modifiers: modifiers & !KeyModifiers::SHIFT,
                }),
                _ => Err(invalid()),
            };
        }

        let mut code = parse_key_code(key).ok_or_else(invalid)?;

        // Only letters have a shifted form; `shift 1` would silently become `1`
        if let KeyCode::Char(c) = code {
            if modifiers.contains(KeyModifiers::SHIFT) && !c.is_ascii_alphabetic() {
                return Err(invalid());
            }
        }

        // A bare uppercase letter means the shifted letter, as a terminal reports it.
        // Next to other modifiers the case is only spelling: `ctrl A` is ctrl+a.
        if let KeyCode::Char(c) = code {
            if c.is_ascii_uppercase() {
                if modifiers.is_empty() {
                    modifiers = KeyModifiers::SHIFT;
                } else if !modifiers.contains(KeyModifiers::SHIFT) {
                    code = KeyCode::Char(c.to_ascii_lowercase());
                }
            }
        }

        Ok(normalize(code, modifiers))
    }

    /// Textual form that parses back into the same keystroke
    pub fn pattern(&self) -> String {
        let mut parts: Vec<String> = modifier_names(self.modifiers, false)
            .into_iter()
            .map(str::to_string)
            .collect();
        let key = match self.code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char('+') => "plus".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::F(n) => format!("f{}", n),
            KeyCode::BackTab => "backtab".to_string(),
            code => key_name(code).to_ascii_lowercase(),
        };
        parts.push(key);
        parts.join("+")
    }

    /// Display label, e.g. `Ctrl+Shift+A`, `G`, `PageDown`
    pub fn label(&self) -> String {
        let mut label = String::new();
        let bare_shifted_letter = matches!(self.code, KeyCode::Char(c) if c.is_ascii_uppercase())
            && self.modifiers == KeyModifiers::SHIFT;
        if !bare_shifted_letter {
            for name in modifier_names(self.modifiers, true) {
                label.push_str(name);
                label.push('+');
            }
        }
        match self.code {
            KeyCode::Char(' ') => label.push_str("Space"),
            KeyCode::Char(c) if !self.modifiers.is_empty() => label.push(c.to_ascii_uppercase()),
            KeyCode::Char(c) => label.push(c),
            KeyCode::F(n) => label.push_str(&format!("F{}", n)),
            code => label.push_str(key_name(code)),
        }
        label
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for KeyStroke {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KeyStroke {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<KeyStroke> for String {
    fn from(key: KeyStroke) -> Self {
        key.pattern()
    }
}

impl From<KeyEvent> for KeyStroke {
    fn from(event: KeyEvent) -> Self {
        normalize(event.code, event.modifiers)
    }
}

/// Bring parsed and terminal-reported chords into one canonical shape
///
/// - letters carry their case: shift means uppercase and vice versa
/// - other characters are already shifted, so shift is dropped
/// - back-tab never carries shift, and shift+tab is back-tab
fn normalize(code: KeyCode, modifiers: KeyModifiers) -> KeyStroke {
    let mut modifiers = modifiers & MODIFIER_MASK;
    let code = match code {
        KeyCode::Char(c) if c.is_ascii_alphabetic() => {
            if c.is_ascii_uppercase() {
                modifiers |= KeyModifiers::SHIFT;
            }
            if modifiers.contains(KeyModifiers::SHIFT) {
                KeyCode::Char(c.to_ascii_uppercase())
            } else {
                KeyCode::Char(c)
            }
        }
        KeyCode::Char(c) => {
            modifiers.remove(KeyModifiers::SHIFT);
            KeyCode::Char(c)
        }
        KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => {
            modifiers.remove(KeyModifiers::SHIFT);
            KeyCode::BackTab
        }
        KeyCode::BackTab => {
            modifiers.remove(KeyModifiers::SHIFT);
            KeyCode::BackTab
        }
        code => code,
    };
    KeyStroke { code, modifiers }
}

/// Split on whitespace, then on `+` inside each word; a trailing `++` is the plus key
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        if word.len() > 1 && word.contains('+') {
            let (head, plus_key) = match word.strip_suffix("++") {
                Some(head) => (head, true),
                None => (word, false),
            };
            tokens.extend(head.split('+').filter(|t| !t.is_empty()));
            if plus_key {
                tokens.push("+");
            }
        } else {
            tokens.push(word);
        }
    }
    tokens
}

/// Parse a key name into a KeyCode
fn parse_key_code(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let name: String = s
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    match name.as_str() {
        // Special keys
        "enter" | "return" => Some(KeyCode::Enter),
        "escape" | "esc" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backtab" => Some(KeyCode::BackTab),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" | "bs" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "insert" | "ins" => Some(KeyCode::Insert),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),

        // Punctuation by name
        "backquote" => Some(KeyCode::Char('`')),
        "backslash" => Some(KeyCode::Char('\\')),
        "openbracket" => Some(KeyCode::Char('[')),
        "closebracket" => Some(KeyCode::Char(']')),
        "comma" => Some(KeyCode::Char(',')),
        "equals" => Some(KeyCode::Char('=')),
        "minus" => Some(KeyCode::Char('-')),
        "plus" => Some(KeyCode::Char('+')),
        "period" => Some(KeyCode::Char('.')),
        "quote" => Some(KeyCode::Char('\'')),
        "semicolon" => Some(KeyCode::Char(';')),
        "slash" => Some(KeyCode::Char('/')),

        // Function keys
        s if s.starts_with('f') && s.len() > 1 => {
            let num: u8 = s[1..].parse().ok()?;
            (1..=24).contains(&num).then_some(KeyCode::F(num))
        }

        _ => None,
    }
}

fn modifier_names(modifiers: KeyModifiers, display: bool) -> Vec<&'static str> {
    let table = [
        (KeyModifiers::CONTROL, "ctrl", "Ctrl"),
        (KeyModifiers::ALT, "alt", "Alt"),
        (KeyModifiers::SHIFT, "shift", "Shift"),
        (KeyModifiers::META, "meta", "Meta"),
        (KeyModifiers::SUPER, "super", "Super"),
    ];
    table
        .iter()
        .filter(|(flag, _, _)| modifiers.contains(*flag))
        .map(|(_, pattern, label)| if display { *label } else { *pattern })
        .collect()
}

fn key_name(code: KeyCode) -> &'static str {
    match code {
        KeyCode::Enter => "Enter",
        KeyCode::Esc => "Esc",
        KeyCode::Tab => "Tab",
        KeyCode::BackTab => "Shift+Tab",
        KeyCode::Backspace => "Backspace",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        _ => "?",
    }
}
