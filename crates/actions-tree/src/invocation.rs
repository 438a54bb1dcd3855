//! A pending run of whatever a popup item leads to
//!
//! Invocations never run in the same pass that produced them. They move
//! through the stages below, one host continuation per step, so the popup
//! is gone and focus is back on the invoking component before the host
//! action sees its context.

use ratatui::crossterm::event::KeyModifiers;

use crate::host::{ComponentId, DataContext};
use crate::popup::PopupId;
use crate::presentation::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStage {
    /// Ask the host for the data context of the source component
    ResolveContext,
    /// Give the UI one pass so a just closed popup is really gone
    YieldToUi,
    /// Wait until focus has returned
    AwaitFocusSettled,
    Invoke,
}

impl InvocationStage {
    pub fn next(self) -> Option<Self> {
        match self {
            InvocationStage::ResolveContext => Some(InvocationStage::YieldToUi),
            InvocationStage::YieldToUi => Some(InvocationStage::AwaitFocusSettled),
            InvocationStage::AwaitFocusSettled => Some(InvocationStage::Invoke),
            InvocationStage::Invoke => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Invocation {
    /// Node id, looked up again right before the run
    pub id: String,
    pub target: Target,
    pub modifiers: KeyModifiers,
    /// Component the popup was opened from
    pub source: Option<ComponentId>,
    /// Filled in by `ResolveContext`
    pub context: Option<DataContext>,
    /// Sticky popup to refresh once the invocation is done
    pub refresh: Option<PopupId>,
    /// For logging
    pub label: String,
}

impl Invocation {
    pub fn new(
        id: impl Into<String>,
        target: Target,
        modifiers: KeyModifiers,
        source: Option<ComponentId>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            target,
            modifiers,
            source,
            context: None,
            refresh: None,
            label: label.into(),
        }
    }

    pub fn with_refresh(mut self, popup: PopupId) -> Self {
        self.refresh = Some(popup);
        self
    }
}
