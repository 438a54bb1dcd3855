//! Presentation adapter
//!
//! One `ActionPresentation` per item of an open popup. It pairs the
//! immutable node with whatever the host has to say about it right now and
//! can be refreshed in place without touching the node.

use std::fmt;
use std::sync::Arc;

use crate::host::{ActionHandle, ActionRegistry, ActionState, DataContext};
use crate::keystroke::KeyStroke;
use crate::model::{ActionNode, NodeKind};
use crate::shortcuts::{ShortcutMap, ShortcutTarget};

/// What choosing an item leads to
#[derive(Clone)]
pub enum Target {
    /// A group with no host action of its own: opens its children
    Submenu(Arc<ActionNode>),
    /// A leaf bound to a host action
    Action(ActionHandle),
    /// A group whose id is also a host action
    PerformableGroup {
        node: Arc<ActionNode>,
        action: ActionHandle,
    },
}

impl Target {
    /// Resolve a node against the registry; `None` when a leaf has no host action
    pub fn resolve(node: &Arc<ActionNode>, registry: &dyn ActionRegistry) -> Option<Self> {
        match (node.kind(), registry.action(node.id())) {
            (NodeKind::Group(_), None) => Some(Target::Submenu(Arc::clone(node))),
            (NodeKind::Group(_), Some(action)) => Some(Target::PerformableGroup {
                node: Arc::clone(node),
                action,
            }),
            (NodeKind::Leaf, Some(action)) => Some(Target::Action(action)),
            (NodeKind::Leaf, None) => None,
        }
    }

    pub fn action(&self) -> Option<&ActionHandle> {
        match self {
            Target::Submenu(_) => None,
            Target::Action(action) | Target::PerformableGroup { action, .. } => Some(action),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Submenu(node) => write!(f, "Submenu({})", node.id()),
            Target::Action(_) => write!(f, "Action"),
            Target::PerformableGroup { node, .. } => write!(f, "PerformableGroup({})", node.id()),
        }
    }
}

/// Live view-state of one node inside one popup
#[derive(Debug, Clone)]
pub struct ActionPresentation {
    node: Arc<ActionNode>,
    target: Option<Target>,
    keys: Vec<KeyStroke>,
    state: ActionState,
    label: String,
}

impl ActionPresentation {
    /// Build the presentation for `node` with its effective keys
    ///
    /// A leaf whose id the host does not know is kept, but disabled.
    pub fn create(
        node: Arc<ActionNode>,
        registry: &dyn ActionRegistry,
        context: &DataContext,
        keys: Vec<KeyStroke>,
    ) -> Self {
        let target = Target::resolve(&node, registry);
        match &target {
            None => log::warn!("No action registered for `{}`, showing it disabled", node.id()),
            Some(Target::Submenu(_)) if node.is_sticky() => {
                log::warn!("`{}` only opens a submenu, ignoring sticky", node.id())
            }
            Some(_) => {}
        }

        let mut presentation = Self {
            label: node.name().to_string(),
            node,
            target,
            keys,
            state: ActionState::disabled(),
        };
        presentation.update(registry, context);
        presentation
    }

    /// Re-query the host and refresh the display fields
    pub fn update(&mut self, registry: &dyn ActionRegistry, context: &DataContext) {
        self.state = match &self.target {
            None => ActionState::disabled(),
            Some(Target::Submenu(_)) => ActionState::default(),
            Some(Target::Action(_)) | Some(Target::PerformableGroup { .. }) => {
                match registry.action(self.node.id()) {
                    Some(action) => action.update(context),
                    None => {
                        log::warn!("Action `{}` is gone from the registry", self.node.id());
                        ActionState::disabled()
                    }
                }
            }
        };

        self.label = match &self.state.text {
            Some(text) if self.node.has_default_name() => text.clone(),
            _ => self.node.name().to_string(),
        };
    }

    /// Bind this item's keys to choosing it
    pub fn register_shortcuts(&self, index: usize, shortcuts: &mut ShortcutMap) {
        shortcuts.register_all(self.keys.iter().copied(), ShortcutTarget::Item(index));
    }

    pub fn node(&self) -> &Arc<ActionNode> {
        &self.node
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn keys(&self) -> &[KeyStroke] {
        &self.keys
    }

    pub fn state(&self) -> &ActionState {
        &self.state
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> Option<&str> {
        self.state.description.as_deref()
    }

    pub fn separator_above(&self) -> Option<&str> {
        self.node.separator_above()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled && self.state.visible
    }

    pub fn has_children(&self) -> bool {
        self.node.is_group()
    }

    /// Sticky only counts when choosing the item runs a host action
    pub fn is_sticky(&self) -> bool {
        self.node.is_sticky() && !matches!(self.target, Some(Target::Submenu(_)))
    }
}
