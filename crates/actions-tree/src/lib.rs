//! Keyboard-driven popup menus over a host's actions
//!
//! A JSON document describes a tree of action nodes. Each group opens as a
//! popup whose items run host actions, open nested groups, or stay open and
//! refresh when marked sticky. The host plugs in through the traits in
//! [`host`]; everything else lives here.

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod host;
pub mod invocation;
pub mod keystroke;
pub mod model;
pub mod parser;
pub mod popup;
pub mod presentation;
pub mod shortcuts;
pub mod store;

#[cfg(test)]
mod test_support;

pub use engine::PopupEngine;
pub use error::{LoadError, ParseError};
pub use host::{
    ActionEvent, ActionHandle, ActionRegistry, ActionState, ComponentId, DataContext, EditorId,
    HostAction, HostActionGroup, Placement, UiHost,
};
pub use keystroke::KeyStroke;
pub use model::{Accelerators, ActionNode, ActionsTree};
pub use popup::{Popup, PopupId, PopupState};
pub use store::{TreeSnapshot, TreeStore};
