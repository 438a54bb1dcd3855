//! In-memory host used by the unit tests
//!
//! `FakeUi` queues deferred tasks instead of running them, so a test can
//! step the invocation pipeline one host continuation at a time.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::engine::PopupEngine;
use crate::host::{
    ActionEvent, ActionHandle, ActionRegistry, ActionState, ComponentId, ContextCallback,
    DataContext, HostAction, HostActionGroup, Placement, Task, UiHost,
};
use crate::keystroke::KeyStroke;
use crate::popup::{PopupId, PopupOptions};

#[derive(Default)]
pub struct FakeRegistry {
    actions: RefCell<HashMap<String, Rc<FakeAction>>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str, action: FakeAction) -> Rc<FakeAction> {
        let action = Rc::new(action);
        self.actions
            .borrow_mut()
            .insert(id.to_string(), Rc::clone(&action));
        action
    }

    pub fn remove(&self, id: &str) {
        self.actions.borrow_mut().remove(id);
    }
}

impl ActionRegistry for FakeRegistry {
    fn action(&self, id: &str) -> Option<ActionHandle> {
        self.actions
            .borrow()
            .get(id)
            .map(|action| Rc::clone(action) as ActionHandle)
    }
}

pub struct FakeGroup {
    can_be_performed: bool,
    children: Vec<String>,
}

impl HostActionGroup for FakeGroup {
    fn can_be_performed(&self, _context: &DataContext) -> bool {
        self.can_be_performed
    }

    fn children(&self, _context: &DataContext) -> Vec<String> {
        self.children.clone()
    }
}

pub struct FakeAction {
    text: Option<String>,
    enabled: Cell<bool>,
    visible: Cell<bool>,
    dumb_aware: bool,
    shortcuts: Vec<KeyStroke>,
    group: Option<FakeGroup>,
    updates: Cell<usize>,
    performed: RefCell<Vec<ActionEvent>>,
}

impl FakeAction {
    pub fn new() -> Self {
        Self {
            text: None,
            enabled: Cell::new(true),
            visible: Cell::new(true),
            dumb_aware: true,
            shortcuts: Vec::new(),
            group: None,
            updates: Cell::new(0),
            performed: RefCell::new(Vec::new()),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_shortcuts(mut self, shortcuts: Vec<KeyStroke>) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    pub fn not_dumb_aware(mut self) -> Self {
        self.dumb_aware = false;
        self
    }

    pub fn with_group(mut self, can_be_performed: bool, children: &[&str]) -> Self {
        self.group = Some(FakeGroup {
            can_be_performed,
            children: children.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    pub fn update_count(&self) -> usize {
        self.updates.get()
    }

    pub fn performed(&self) -> Vec<ActionEvent> {
        self.performed.borrow().clone()
    }
}

impl HostAction for FakeAction {
    fn update(&self, _context: &DataContext) -> ActionState {
        self.updates.set(self.updates.get() + 1);
        ActionState {
            text: self.text.clone(),
            description: None,
            enabled: self.enabled.get(),
            visible: self.visible.get(),
        }
    }

    fn perform(&self, event: &ActionEvent) {
        self.performed.borrow_mut().push(event.clone());
    }

    fn shortcuts(&self) -> Vec<KeyStroke> {
        self.shortcuts.clone()
    }

    fn is_dumb_aware(&self) -> bool {
        self.dumb_aware
    }

    fn as_group(&self) -> Option<&dyn HostActionGroup> {
        self.group.as_ref().map(|group| group as &dyn HostActionGroup)
    }
}

#[derive(Default)]
pub struct FakeUi {
    calls: RefCell<Vec<&'static str>>,
    later: RefCell<VecDeque<Task>>,
    focus: RefCell<VecDeque<Task>>,
    shown: RefCell<Vec<(PopupId, Placement)>>,
    moved: RefCell<Vec<(PopupId, Placement)>>,
    disposed: RefCell<Vec<PopupId>>,
    dumb: Cell<bool>,
    focused: RefCell<DataContext>,
}

impl FakeUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_dumb(&self, dumb: bool) {
        self.dumb.set(dumb);
    }

    pub fn set_focused(&self, context: DataContext) {
        *self.focused.borrow_mut() = context;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn shown(&self) -> Vec<(PopupId, Placement)> {
        self.shown.borrow().clone()
    }

    pub fn moved(&self) -> Vec<(PopupId, Placement)> {
        self.moved.borrow().clone()
    }

    pub fn disposed(&self) -> Vec<PopupId> {
        self.disposed.borrow().clone()
    }

    /// Run one queued task, next-pass tasks first
    pub fn run_pending(&self) -> bool {
        let task = self
            .later
            .borrow_mut()
            .pop_front()
            .or_else(|| self.focus.borrow_mut().pop_front());
        match task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Alternate host tasks and engine pumps until both are idle
    pub fn settle(&self, engine: &mut PopupEngine) {
        loop {
            engine.pump();
            if !self.run_pending() {
                break;
            }
        }
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }
}

impl UiHost for FakeUi {
    fn data_context(&self, component: ComponentId) -> DataContext {
        self.record("data_context");
        DataContext::new().with_component(component)
    }

    fn data_context_from_focus(&self, callback: ContextCallback) {
        self.record("data_context_from_focus");
        let context = self.focused.borrow().clone();
        callback(context);
    }

    fn invoke_later(&self, task: Task) {
        self.record("invoke_later");
        self.later.borrow_mut().push_back(task);
    }

    fn when_focus_settles(&self, task: Task) {
        self.record("when_focus_settles");
        self.focus.borrow_mut().push_back(task);
    }

    fn is_dumb(&self) -> bool {
        self.dumb.get()
    }

    fn show_popup(&self, popup: PopupId, _options: &PopupOptions, placement: Placement) {
        self.record("show_popup");
        self.shown.borrow_mut().push((popup, placement));
    }

    fn move_popup(&self, popup: PopupId, placement: Placement) {
        self.record("move_popup");
        self.moved.borrow_mut().push((popup, placement));
    }

    fn dispose_popup(&self, popup: PopupId) {
        self.record("dispose_popup");
        self.disposed.borrow_mut().push(popup);
    }
}
