//! Widget-scoped shortcut table
//!
//! Bindings are kept in registration order and the first match wins. A popup
//! registers its items' keys before the host's list-navigation defaults, so
//! a node bound to `down` or `enter` beats the default behavior of that key.

use ratatui::crossterm::event::{KeyCode, KeyModifiers};

use crate::keystroke::KeyStroke;

/// Default list behavior of a popup widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    /// Choose the selected item
    Commit,
}

/// What a matched keystroke does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutTarget {
    /// Choose the item at this index
    Item(usize),
    List(ListAction),
    Cancel,
}

/// Host list-navigation defaults
pub fn default_list_shortcuts() -> Vec<(KeyStroke, ListAction)> {
    let key = |code| KeyStroke::new(code, KeyModifiers::NONE);
    vec![
        (key(KeyCode::Up), ListAction::Up),
        (key(KeyCode::Down), ListAction::Down),
        (key(KeyCode::Home), ListAction::Home),
        (key(KeyCode::End), ListAction::End),
        (key(KeyCode::PageUp), ListAction::PageUp),
        (key(KeyCode::PageDown), ListAction::PageDown),
        (key(KeyCode::Enter), ListAction::Commit),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct ShortcutMap {
    bindings: Vec<(KeyStroke, ShortcutTarget)>,
}

impl ShortcutMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: KeyStroke, target: ShortcutTarget) {
        self.bindings.push((key, target));
    }

    pub fn register_all(&mut self, keys: impl IntoIterator<Item = KeyStroke>, target: ShortcutTarget) {
        for key in keys {
            self.register(key, target);
        }
    }

    /// The earliest registered binding for `key`
    pub fn lookup(&self, key: &KeyStroke) -> Option<ShortcutTarget> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == key)
            .map(|(_, target)| *target)
    }

    /// Keys that reach `target`, skipping ones shadowed by an earlier binding
    pub fn keys_for(&self, target: ShortcutTarget) -> Vec<KeyStroke> {
        self.bindings
            .iter()
            .filter(|(key, bound)| *bound == target && self.lookup(key) == Some(target))
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
