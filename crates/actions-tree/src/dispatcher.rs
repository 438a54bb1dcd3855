//! Dispatcher for engine events
//!
//! Host continuations run outside the engine's borrow. They do not call back
//! into the engine; they send an `EngineEvent` here and the engine picks it up
//! on its next `pump`.

use std::sync::mpsc::Sender;

use crate::host::DataContext;
use crate::invocation::{Invocation, InvocationStage};
use crate::popup::PopupId;

#[derive(Debug)]
pub enum EngineEvent {
    /// Run `stage` of a pending invocation
    Advance {
        invocation: Invocation,
        stage: InvocationStage,
    },
    /// Refresh a sticky popup after one of its actions ran
    Refresh { popup: PopupId, context: DataContext },
}

#[derive(Clone)]
pub struct Dispatcher {
    event_tx: Sender<EngineEvent>,
}

impl Dispatcher {
    pub fn new(event_tx: Sender<EngineEvent>) -> Self {
        Self { event_tx }
    }

    /// Queue an event for the engine's next pump
    pub fn dispatch(&self, event: EngineEvent) {
        if let Err(e) = self.event_tx.send(event) {
            log::error!("Dispatcher: failed to send engine event: {}", e);
        }
    }
}
