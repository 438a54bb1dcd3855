//! Popup controller
//!
//! One `Popup` per open menu level. It is fully built before the host is
//! asked to show it, so a failure while building never leaves a half-made
//! widget on screen.
//!
//! ```text
//! Building ──show──▶ Shown ──choose──▶ Closed (final invocation runs)
//!                      │
//!                      └──escape / dismiss──▶ Cancelled (nothing runs)
//! ```

use ratatui::crossterm::event::KeyModifiers;
use std::sync::Arc;

use crate::host::{ActionRegistry, ComponentId, DataContext, EditorId, Placement, UiHost};
use crate::invocation::Invocation;
use crate::keystroke::KeyStroke;
use crate::model::{Accelerators, ActionNode};
use crate::presentation::ActionPresentation;
use crate::shortcuts::{ListAction, ShortcutMap, ShortcutTarget};

/// Rows skipped by page up/page down
const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Building,
    Shown,
    Cancelled,
    /// Closed with an ok result
    Closed,
}

/// Widget settings handed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupOptions {
    pub title: String,
    /// The popup owns input while it is open
    pub modal_context: bool,
    /// Enter only closes the popup through a commit, never by itself
    pub close_on_enter: bool,
}

/// Result of feeding a keystroke to a popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupInput {
    Chosen {
        index: usize,
        modifiers: KeyModifiers,
    },
    Cancel,
    /// Handled inside the popup (selection moved)
    Consumed,
    /// Not bound; swallowed while the popup is modal
    Ignored,
}

#[derive(Debug)]
pub struct Popup {
    id: PopupId,
    options: PopupOptions,
    items: Vec<ActionPresentation>,
    selected: Option<usize>,
    shortcuts: ShortcutMap,
    state: PopupState,
    source_component: Option<ComponentId>,
    source_editor: Option<EditorId>,
    final_invocation: Option<Invocation>,
}

impl Popup {
    /// Build the popup for `group`'s children
    ///
    /// Shortcut order matters: item keys first, then the host's list
    /// defaults, then escape. The first binding for a key wins.
    pub fn build(
        id: PopupId,
        group: &ActionNode,
        accelerators: Accelerators,
        registry: &dyn ActionRegistry,
        ui: &dyn UiHost,
        context: &DataContext,
        escape_action_id: &str,
    ) -> Self {
        let items: Vec<ActionPresentation> = group
            .prepare(accelerators)
            .into_iter()
            .map(|(keys, node)| ActionPresentation::create(node, registry, context, keys))
            .collect();

        let mut shortcuts = ShortcutMap::new();
        for (index, item) in items.iter().enumerate() {
            item.register_shortcuts(index, &mut shortcuts);
        }
        for (key, action) in ui.list_shortcuts() {
            shortcuts.register(key, ShortcutTarget::List(action));
        }
        register_escape(&mut shortcuts, registry, escape_action_id);

        let selected = items
            .iter()
            .position(ActionPresentation::is_enabled)
            .or(if items.is_empty() { None } else { Some(0) });

        Self {
            id,
            options: PopupOptions {
                title: group.name().to_string(),
                modal_context: true,
                close_on_enter: false,
            },
            items,
            selected,
            shortcuts,
            state: PopupState::Building,
            source_component: context.component,
            source_editor: context.editor,
            final_invocation: None,
        }
    }

    pub fn id(&self) -> PopupId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.options.title
    }

    pub fn options(&self) -> &PopupOptions {
        &self.options
    }

    pub fn items(&self) -> &[ActionPresentation] {
        &self.items
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&ActionPresentation> {
        self.selected.and_then(|index| self.items.get(index))
    }

    pub fn shortcuts(&self) -> &ShortcutMap {
        &self.shortcuts
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn source_component(&self) -> Option<ComponentId> {
        self.source_component
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PopupState::Building | PopupState::Shown)
    }

    /// Best anchor: the invoking editor, else the invoking component
    pub fn placement(&self) -> Placement {
        Placement::best_for(self.source_editor, self.source_component)
    }

    pub(crate) fn show(&mut self, ui: &dyn UiHost) {
        if self.state != PopupState::Building {
            return;
        }
        self.state = PopupState::Shown;
        ui.show_popup(self.id, &self.options, self.placement());
    }

    /// Map a keystroke to what it does in this popup
    pub fn handle_key(&mut self, key: KeyStroke) -> PopupInput {
        if self.state != PopupState::Shown {
            return PopupInput::Ignored;
        }
        match self.shortcuts.lookup(&key) {
            Some(ShortcutTarget::Item(index)) => PopupInput::Chosen {
                index,
                modifiers: key.modifiers(),
            },
            Some(ShortcutTarget::List(ListAction::Commit)) => self.commit(),
            Some(ShortcutTarget::List(action)) => {
                self.navigate(action);
                PopupInput::Consumed
            }
            Some(ShortcutTarget::Cancel) => PopupInput::Cancel,
            None => PopupInput::Ignored,
        }
    }

    /// A list commit chooses the selected item with no modifiers
    pub fn commit(&self) -> PopupInput {
        match self.selected {
            Some(index) if self.state == PopupState::Shown => PopupInput::Chosen {
                index,
                modifiers: KeyModifiers::NONE,
            },
            _ => PopupInput::Ignored,
        }
    }

    /// Move the selection; wraps around at either end for up/down
    pub fn navigate(&mut self, action: ListAction) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let current = self.selected.unwrap_or(0);
        let next = match action {
            ListAction::Up => (current + len - 1) % len,
            ListAction::Down => (current + 1) % len,
            ListAction::Home => 0,
            ListAction::End => len - 1,
            ListAction::PageUp => current.saturating_sub(PAGE_SIZE),
            ListAction::PageDown => (current + PAGE_SIZE).min(len - 1),
            ListAction::Commit => current,
        };
        self.selected = Some(next);
    }

    /// Mark `index` as the selection without scrolling it into view
    pub fn select(&mut self, index: usize) {
        if index < self.items.len() {
            self.selected = Some(index);
        }
    }

    pub(crate) fn set_final_invocation(&mut self, invocation: Invocation) {
        self.final_invocation = Some(invocation);
    }

    /// Close with an ok result; the widget is gone before the invocation is returned
    pub(crate) fn close_ok(&mut self, ui: &dyn UiHost) -> Option<Invocation> {
        if !self.is_open() {
            return None;
        }
        self.state = PopupState::Closed;
        ui.dispose_popup(self.id);
        self.final_invocation.take()
    }

    /// Close without running anything
    pub(crate) fn cancel(&mut self, ui: &dyn UiHost) {
        if !self.is_open() {
            return;
        }
        self.state = PopupState::Cancelled;
        if let Some(discarded) = self.final_invocation.take() {
            log::debug!("Popup {:?} cancelled, dropping {:?}", self.id, discarded);
        }
        ui.dispose_popup(self.id);
    }

    /// Re-query every item against a fresh context
    pub(crate) fn refresh(&mut self, registry: &dyn ActionRegistry, context: &DataContext) {
        for item in &mut self.items {
            item.update(registry, context);
        }
    }

    pub(crate) fn relocate(&self, ui: &dyn UiHost) {
        ui.move_popup(self.id, self.placement());
    }
}

/// Re-use the host escape action's shortcuts for cancelling, if it has any
fn register_escape(shortcuts: &mut ShortcutMap, registry: &dyn ActionRegistry, escape_action_id: &str) {
    let Some(action) = registry.action(escape_action_id) else {
        return;
    };
    let keys = action.shortcuts();
    if keys.is_empty() {
        return;
    }
    shortcuts.register_all(keys, ShortcutTarget::Cancel);
}

/// Group node for a popup listing host actions by id
pub(crate) fn synthetic_group(title: &str, ids: Vec<String>) -> Arc<ActionNode> {
    let items = ids
        .into_iter()
        .map(|id| ActionNode::leaf(id, crate::model::DEFAULT_NAME))
        .collect();
    Arc::new(ActionNode::group(title, title, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ESCAPE_ACTION_ID;
    use crate::test_support::{FakeAction, FakeRegistry, FakeUi};
    use pretty_assertions::assert_eq;

    fn key(text: &str) -> KeyStroke {
        KeyStroke::parse(text).unwrap()
    }

    fn group() -> ActionNode {
        ActionNode::group(
            "menu",
            "Menu",
            vec![
                ActionNode::leaf("A", "A").with_keys(vec![key("a")]),
                ActionNode::leaf("B", "B").with_keys(vec![key("down")]),
                ActionNode::leaf("C", "C"),
            ],
        )
    }

    fn registry() -> FakeRegistry {
        let registry = FakeRegistry::new();
        registry.insert("A", FakeAction::new());
        registry.insert("B", FakeAction::new());
        registry.insert("C", FakeAction::new());
        registry.insert(ESCAPE_ACTION_ID, FakeAction::new().with_shortcuts(vec![key("esc")]));
        registry
    }

    fn build(registry: &FakeRegistry, ui: &FakeUi, accelerators: Accelerators) -> Popup {
        let context = DataContext::new().with_component(ComponentId(7));
        let mut popup = Popup::build(
            PopupId(1),
            &group(),
            accelerators,
            registry,
            ui,
            &context,
            ESCAPE_ACTION_ID,
        );
        popup.show(ui);
        popup
    }

    #[test]
    fn test_build_configures_widget_and_shows_it() {
        let registry = registry();
        let ui = FakeUi::new();
        let popup = build(&registry, &ui, Accelerators::Declared);

        assert_eq!(popup.state(), PopupState::Shown);
        assert!(popup.options().modal_context);
        assert!(!popup.options().close_on_enter);
        assert_eq!(popup.title(), "Menu");
        assert_eq!(popup.items().len(), 3);
        assert_eq!(popup.selected(), Some(0));
        assert_eq!(ui.shown(), vec![(PopupId(1), Placement::Component(ComponentId(7)))]);
    }

    #[test]
    fn test_item_key_beats_host_list_default() {
        let registry = registry();
        let ui = FakeUi::new();
        let mut popup = build(&registry, &ui, Accelerators::Declared);

        assert_eq!(
            popup.handle_key(key("down")),
            PopupInput::Chosen {
                index: 1,
                modifiers: KeyModifiers::NONE
            }
        );
        assert_eq!(popup.selected(), Some(0));
    }

    #[test]
    fn test_item_key_reports_its_modifiers() {
        let registry = FakeRegistry::new();
        registry.insert("A", FakeAction::new());
        let ui = FakeUi::new();
        let node = ActionNode::group(
            "g",
            "G",
            vec![ActionNode::leaf("A", "A").with_keys(vec![key("alt+a")])],
        );
        let mut popup = Popup::build(
            PopupId(3),
            &node,
            Accelerators::Declared,
            &registry,
            &ui,
            &DataContext::new(),
            ESCAPE_ACTION_ID,
        );
        popup.show(&ui);

        assert_eq!(
            popup.handle_key(key("alt+a")),
            PopupInput::Chosen {
                index: 0,
                modifiers: KeyModifiers::ALT
            }
        );
    }

    #[test]
    fn test_numbered_accelerators_replace_declared_keys() {
        let registry = registry();
        let ui = FakeUi::new();
        let mut popup = build(&registry, &ui, Accelerators::Numbered);

        assert!(matches!(popup.handle_key(key("3")), PopupInput::Chosen { index: 2, .. }));
        assert_eq!(popup.handle_key(key("a")), PopupInput::Ignored);
        // down is a list default again once the item no longer claims it
        assert_eq!(popup.handle_key(key("down")), PopupInput::Consumed);
        assert_eq!(popup.selected(), Some(1));
    }

    #[test]
    fn test_navigation_wraps_and_commit_chooses_selection() {
        let registry = registry();
        let ui = FakeUi::new();
        let mut popup = build(&registry, &ui, Accelerators::Numbered);

        assert_eq!(popup.handle_key(key("up")), PopupInput::Consumed);
        assert_eq!(popup.selected(), Some(2));
        assert_eq!(popup.handle_key(key("home")), PopupInput::Consumed);
        assert_eq!(popup.selected(), Some(0));
        assert_eq!(popup.handle_key(key("pagedown")), PopupInput::Consumed);
        assert_eq!(popup.selected(), Some(2));

        assert_eq!(
            popup.handle_key(key("enter")),
            PopupInput::Chosen {
                index: 2,
                modifiers: KeyModifiers::NONE
            }
        );
    }

    #[test]
    fn test_escape_uses_host_escape_shortcuts() {
        let registry = registry();
        let ui = FakeUi::new();
        let mut popup = build(&registry, &ui, Accelerators::Declared);
        assert_eq!(popup.handle_key(key("esc")), PopupInput::Cancel);
    }

    #[test]
    fn test_escape_is_skipped_without_host_shortcuts() {
        let ui = FakeUi::new();

        let registry = FakeRegistry::new();
        let mut popup = build(&registry, &ui, Accelerators::Declared);
        assert_eq!(popup.handle_key(key("esc")), PopupInput::Ignored);

        let registry = FakeRegistry::new();
        registry.insert(ESCAPE_ACTION_ID, FakeAction::new());
        let mut popup = build(&registry, &ui, Accelerators::Declared);
        assert_eq!(popup.handle_key(key("esc")), PopupInput::Ignored);
    }

    #[test]
    fn test_missing_actions_do_not_abort_build() {
        let registry = FakeRegistry::new();
        registry.insert("C", FakeAction::new());
        let ui = FakeUi::new();
        let popup = build(&registry, &ui, Accelerators::Declared);

        let enabled: Vec<_> = popup.items().iter().map(|i| i.is_enabled()).collect();
        assert_eq!(enabled, vec![false, false, true]);
        assert_eq!(popup.selected(), Some(2));
        assert_eq!(popup.state(), PopupState::Shown);
    }

    #[test]
    fn test_cancel_discards_final_invocation() {
        let registry = registry();
        let ui = FakeUi::new();
        let mut popup = build(&registry, &ui, Accelerators::Declared);

        let target = popup.items()[0].target().cloned().unwrap();
        popup.set_final_invocation(Invocation::new("A", target, KeyModifiers::NONE, None, "A"));
        popup.cancel(&ui);

        assert_eq!(popup.state(), PopupState::Cancelled);
        assert!(popup.close_ok(&ui).is_none());
        assert_eq!(ui.disposed(), vec![PopupId(1)]);
        assert_eq!(popup.handle_key(key("a")), PopupInput::Ignored);
    }

    #[test]
    fn test_close_ok_disposes_then_hands_back_invocation() {
        let registry = registry();
        let ui = FakeUi::new();
        let mut popup = build(&registry, &ui, Accelerators::Declared);

        let target = popup.items()[0].target().cloned().unwrap();
        popup.set_final_invocation(Invocation::new("A", target, KeyModifiers::NONE, None, "A"));

        assert!(popup.close_ok(&ui).is_some());
        assert_eq!(popup.state(), PopupState::Closed);
        assert_eq!(ui.disposed(), vec![PopupId(1)]);
        // only once
        assert!(popup.close_ok(&ui).is_none());
    }
}
