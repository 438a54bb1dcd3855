//! Host boundary
//!
//! Everything the engine needs from the application it runs in: looking up
//! and running actions, resolving data contexts, deferring work until focus
//! is back where it was, and putting popup widgets on screen. The engine
//! receives these as injected trait objects; there is no global lookup.
//!
//! All of it lives on the host's UI thread, so handles are `Rc`.

use ratatui::crossterm::event::KeyModifiers;
use std::rc::Rc;

use crate::keystroke::KeyStroke;
use crate::popup::{PopupId, PopupOptions};
use crate::shortcuts::{self, ListAction};

/// Place reported to actions run from a popup
pub const ACTION_PLACE: &str = "ActionsTree";

/// Host action whose shortcuts cancel a popup
pub const ESCAPE_ACTION_ID: &str = "EditorEscape";

/// Opaque id of a host UI component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub u64);

/// Opaque id of a host text-editing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorId(pub u64);

/// What an action sees of the UI when it is updated or performed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataContext {
    pub component: Option<ComponentId>,
    pub editor: Option<EditorId>,
}

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, component: ComponentId) -> Self {
        self.component = Some(component);
        self
    }

    pub fn with_editor(mut self, editor: EditorId) -> Self {
        self.editor = Some(editor);
        self
    }
}

/// Where a popup goes on screen, best candidate first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Next to the caret of a text-editing surface
    Editor(EditorId),
    /// Relative to the component the popup was invoked from
    Component(ComponentId),
    /// Wherever the host puts popups by default
    Default,
}

impl Placement {
    pub fn best_for(editor: Option<EditorId>, component: Option<ComponentId>) -> Self {
        match (editor, component) {
            (Some(editor), _) => Placement::Editor(editor),
            (None, Some(component)) => Placement::Component(component),
            (None, None) => Placement::Default,
        }
    }
}

/// Display state of a host action in some context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionState {
    pub text: Option<String>,
    pub description: Option<String>,
    pub enabled: bool,
    pub visible: bool,
}

impl Default for ActionState {
    fn default() -> Self {
        Self {
            text: None,
            description: None,
            enabled: true,
            visible: true,
        }
    }
}

impl ActionState {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// The event an action is performed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub place: &'static str,
    pub modifiers: KeyModifiers,
    pub context: DataContext,
    pub injected_context: bool,
    /// State from the last update right before performing
    pub presentation: ActionState,
}

/// An action the host knows how to run
pub trait HostAction {
    /// Query the current state for this context
    fn update(&self, context: &DataContext) -> ActionState;

    fn perform(&self, event: &ActionEvent);

    /// Keystrokes the host binds to this action
    fn shortcuts(&self) -> Vec<KeyStroke> {
        Vec::new()
    }

    /// False for actions that must not run while the host is in dumb mode
    fn is_dumb_aware(&self) -> bool {
        true
    }

    fn is_in_injected_context(&self) -> bool {
        false
    }

    /// Group actions expose their children here
    fn as_group(&self) -> Option<&dyn HostActionGroup> {
        None
    }
}

/// A host action that groups other host actions
pub trait HostActionGroup {
    /// Whether choosing the group runs it, rather than listing its children
    fn can_be_performed(&self, context: &DataContext) -> bool;

    /// Ids of the children, resolvable through the registry
    fn children(&self, context: &DataContext) -> Vec<String>;
}

pub type ActionHandle = Rc<dyn HostAction>;

/// Resolves node ids to host actions
pub trait ActionRegistry {
    fn action(&self, id: &str) -> Option<ActionHandle>;
}

/// Deferred work handed to the host
pub type Task = Box<dyn FnOnce()>;

/// Receives a data context once the host has resolved it
pub type ContextCallback = Box<dyn FnOnce(DataContext)>;

/// Focus, scheduling and widget services of the host UI
pub trait UiHost {
    /// Context of a known component, available right away
    fn data_context(&self, component: ComponentId) -> DataContext;

    /// Context of whatever holds focus; may resolve later
    fn data_context_from_focus(&self, callback: ContextCallback);

    /// Run `task` on the next UI pass
    fn invoke_later(&self, task: Task);

    /// Run `task` once focus has settled
    fn when_focus_settles(&self, task: Task);

    /// True while the host is indexing and only dumb-aware actions may run
    fn is_dumb(&self) -> bool {
        false
    }

    /// List navigation keys every popup widget gets from the host
    fn list_shortcuts(&self) -> Vec<(KeyStroke, ListAction)> {
        shortcuts::default_list_shortcuts()
    }

    fn show_popup(&self, popup: PopupId, options: &PopupOptions, placement: Placement);

    fn move_popup(&self, popup: PopupId, placement: Placement);

    /// Destroy the widget; no further input reaches it
    fn dispose_popup(&self, popup: PopupId);
}
