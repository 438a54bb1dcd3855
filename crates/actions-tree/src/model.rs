//! Action-tree model
//!
//! Nodes are built once at parse time and never mutated afterwards. They are
//! shared through `Arc` so that open popups can keep referencing a tree after
//! a reload has swapped in a new one.

use std::sync::Arc;

use crate::keystroke::KeyStroke;

/// Prefix of generated ids, followed by the node's encounter order in its parse
pub const DEFAULT_ID_PREFIX: &str = "ActionsTree";

/// Name shown for nodes that do not declare one
pub const DEFAULT_NAME: &str = "Unnamed";

/// Most numbered accelerators a popup hands out (`1`..`9`)
const MAX_NUMBERED: usize = 9;

/// A command or submenu in the action tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionNode {
    id: String,
    name: String,
    separator_above: Option<String>,
    sticky: bool,
    keys: Vec<KeyStroke>,
    items: Vec<Arc<ActionNode>>,
}

/// Shape of a node: leaf or group with its children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    Leaf,
    Group(&'a [Arc<ActionNode>]),
}

/// Which keys the children of a popup are reachable by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accelerators {
    /// Each child keeps the keys declared in the document
    #[default]
    Declared,
    /// The first nine children answer to `1`..`9` instead
    Numbered,
}

impl ActionNode {
    /// A leaf bound to the host action with the same id
    pub fn leaf(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            separator_above: None,
            sticky: false,
            keys: Vec::new(),
            items: Vec::new(),
        }
    }

    /// A node listing `items` in a submenu
    pub fn group(id: impl Into<String>, name: impl Into<String>, items: Vec<ActionNode>) -> Self {
        Self {
            items: items.into_iter().map(Arc::new).collect(),
            ..Self::leaf(id, name)
        }
    }

    pub fn with_keys(mut self, keys: Vec<KeyStroke>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    pub fn with_separator_above(mut self, separator: Option<String>) -> Self {
        self.separator_above = separator;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the document left the name out
    pub fn has_default_name(&self) -> bool {
        self.name == DEFAULT_NAME
    }

    /// Divider label shown above this node; `Some("")` is an unlabeled divider
    pub fn separator_above(&self) -> Option<&str> {
        self.separator_above.as_deref()
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    pub fn keys(&self) -> &[KeyStroke] {
        &self.keys
    }

    pub fn items(&self) -> &[Arc<ActionNode>] {
        &self.items
    }

    pub fn kind(&self) -> NodeKind<'_> {
        if self.items.is_empty() {
            NodeKind::Leaf
        } else {
            NodeKind::Group(&self.items)
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind(), NodeKind::Group(_))
    }

    /// Children paired with the keys they answer to in a popup
    ///
    /// Overrides never touch the stored nodes.
    pub fn prepare(&self, accelerators: Accelerators) -> Vec<(Vec<KeyStroke>, Arc<ActionNode>)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let keys = match accelerators {
                    Accelerators::Numbered if index < MAX_NUMBERED => {
                        let digit = char::from_digit(index as u32 + 1, 10).unwrap_or('0');
                        vec![KeyStroke::char(digit)]
                    }
                    _ => item.keys.clone(),
                };
                (keys, Arc::clone(item))
            })
            .collect()
    }
}

/// A loaded document: its root nodes in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionsTree {
    roots: Vec<Arc<ActionNode>>,
}

impl ActionsTree {
    pub fn new(roots: Vec<ActionNode>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn roots(&self) -> &[Arc<ActionNode>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// All nodes, depth-first, parents before children
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// First node with the given id, depth-first
    pub fn find(&self, id: &str) -> Option<&Arc<ActionNode>> {
        self.nodes().find(|node| node.id() == id)
    }

    /// A synthetic group holding every root, for "show everything" popups
    pub fn root_group(&self, name: impl Into<String>) -> Arc<ActionNode> {
        Arc::new(ActionNode {
            items: self.roots.clone(),
            ..ActionNode::leaf(DEFAULT_ID_PREFIX, name)
        })
    }
}

/// Depth-first iterator over a tree
pub struct Nodes<'a> {
    stack: Vec<&'a Arc<ActionNode>>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Arc<ActionNode>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.items.iter().rev());
        Some(node)
    }
}
