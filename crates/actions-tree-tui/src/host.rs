//! The playground's side of the host boundary
//!
//! Deferred tasks wait in queues until the main loop calls `run_pending`
//! between frames, which is what "next UI pass" means here.

use actions_tree::host::{ContextCallback, Task};
use actions_tree::popup::PopupOptions;
use actions_tree::shortcuts::{self, ListAction};
use actions_tree::{
    ActionHandle, ActionRegistry, ComponentId, DataContext, EditorId, HostAction, KeyStroke,
    Placement, PopupId, UiHost,
};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::state::{AppState, EDITOR};

pub type SharedState = Rc<RefCell<AppState>>;

#[derive(Default)]
pub struct DemoRegistry {
    actions: HashMap<String, ActionHandle>,
}

impl DemoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, action: impl HostAction + 'static) {
        if self.actions.insert(id.to_string(), Rc::new(action)).is_some() {
            log::warn!("Action `{}` registered twice, keeping the last one", id);
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

impl ActionRegistry for DemoRegistry {
    fn action(&self, id: &str) -> Option<ActionHandle> {
        self.actions.get(id).cloned()
    }
}

pub struct DemoUi {
    state: SharedState,
    later: RefCell<VecDeque<Task>>,
    focus: RefCell<VecDeque<Task>>,
    popup: RefCell<Option<(PopupId, Placement)>>,
}

impl DemoUi {
    pub fn new(state: SharedState) -> Self {
        Self {
            state,
            later: RefCell::new(VecDeque::new()),
            focus: RefCell::new(VecDeque::new()),
            popup: RefCell::new(None),
        }
    }

    /// Where the open popup widget sits
    pub fn popup_placement(&self) -> Option<(PopupId, Placement)> {
        *self.popup.borrow()
    }

    pub fn has_pending(&self) -> bool {
        !self.later.borrow().is_empty() || !self.focus.borrow().is_empty()
    }

    /// Run the tasks queued so far; returns how many ran
    ///
    /// Tasks queued while these run wait for the next pass. Focus never
    /// leaves the editor here, so focus waiters settle on the same pass.
    pub fn run_pending(&self) -> usize {
        let later: Vec<Task> = self.later.borrow_mut().drain(..).collect();
        let focus: Vec<Task> = self.focus.borrow_mut().drain(..).collect();
        let count = later.len() + focus.len();
        for task in later.into_iter().chain(focus) {
            task();
        }
        count
    }
}

impl UiHost for DemoUi {
    fn data_context(&self, component: ComponentId) -> DataContext {
        let context = DataContext::new().with_component(component);
        if component == EDITOR {
            context.with_editor(EditorId(component.0))
        } else {
            context
        }
    }

    fn data_context_from_focus(&self, callback: ContextCallback) {
        callback(self.data_context(EDITOR));
    }

    fn invoke_later(&self, task: Task) {
        self.later.borrow_mut().push_back(task);
    }

    fn when_focus_settles(&self, task: Task) {
        self.focus.borrow_mut().push_back(task);
    }

    fn is_dumb(&self) -> bool {
        self.state.borrow().indexing
    }

    /// Arrow keys plus vim-style j/k
    fn list_shortcuts(&self) -> Vec<(KeyStroke, ListAction)> {
        let mut list = shortcuts::default_list_shortcuts();
        list.push((KeyStroke::char('k'), ListAction::Up));
        list.push((KeyStroke::char('j'), ListAction::Down));
        list
    }

    fn show_popup(&self, popup: PopupId, options: &PopupOptions, placement: Placement) {
        log::debug!("Showing `{}` at {:?}", options.title, placement);
        *self.popup.borrow_mut() = Some((popup, placement));
    }

    fn move_popup(&self, popup: PopupId, placement: Placement) {
        let mut current = self.popup.borrow_mut();
        match current.as_mut() {
            Some((id, at)) if *id == popup => *at = placement,
            _ => log::debug!("Ignoring move of popup {:?}, not on screen", popup),
        }
    }

    fn dispose_popup(&self, popup: PopupId) {
        let mut current = self.popup.borrow_mut();
        if current.is_some_and(|(id, _)| id == popup) {
            *current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn test_tasks_queued_while_running_wait_for_next_pass() {
        let ui = Rc::new(DemoUi::new(SharedState::default()));
        let ran = Rc::new(Cell::new(0));

        let inner_ui = Rc::clone(&ui);
        let inner_ran = Rc::clone(&ran);
        ui.invoke_later(Box::new(move || {
            inner_ran.set(inner_ran.get() + 1);
            let again = Rc::clone(&inner_ran);
            inner_ui.invoke_later(Box::new(move || again.set(again.get() + 1)));
        }));

        assert_eq!(ui.run_pending(), 1);
        assert_eq!(ran.get(), 1);
        assert!(ui.has_pending());
        assert_eq!(ui.run_pending(), 1);
        assert_eq!(ran.get(), 2);
        assert!(!ui.has_pending());
    }

    #[test]
    fn test_editor_context_carries_editor() {
        let ui = DemoUi::new(SharedState::default());
        let context = ui.data_context(EDITOR);
        assert_eq!(context.editor, Some(EditorId(EDITOR.0)));
        assert_eq!(ui.data_context(ComponentId(42)).editor, None);
    }

    #[test]
    fn test_popup_lifecycle() {
        let ui = DemoUi::new(SharedState::default());
        let options = PopupOptions {
            title: "Actions".to_string(),
            modal_context: true,
            close_on_enter: false,
        };
        ui.show_popup(PopupId(3), &options, Placement::Default);
        ui.move_popup(PopupId(3), Placement::Component(EDITOR));
        assert_eq!(ui.popup_placement(), Some((PopupId(3), Placement::Component(EDITOR))));

        ui.dispose_popup(PopupId(2));
        assert!(ui.popup_placement().is_some());
        ui.dispose_popup(PopupId(3));
        assert_eq!(ui.popup_placement(), None);
    }
}
