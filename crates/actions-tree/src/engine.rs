//! Dispatch engine
//!
//! Owns the open popup (at most one at a time) and drives every invocation
//! through its stages. Host continuations come back as `EngineEvent`s on the
//! dispatcher queue and are drained by `pump`, which the host calls from its
//! UI loop.

use ratatui::crossterm::event::KeyModifiers;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use crate::dispatcher::{Dispatcher, EngineEvent};
use crate::host::{
    ActionEvent, ActionHandle, ActionRegistry, ActionState, ComponentId, ContextCallback,
    DataContext, UiHost, ACTION_PLACE, ESCAPE_ACTION_ID,
};
use crate::invocation::{Invocation, InvocationStage};
use crate::keystroke::KeyStroke;
use crate::model::{Accelerators, ActionNode};
use crate::popup::{self, Popup, PopupId, PopupInput};
use crate::presentation::Target;

pub struct PopupEngine {
    registry: Rc<dyn ActionRegistry>,
    ui: Rc<dyn UiHost>,
    dispatcher: Dispatcher,
    events: Receiver<EngineEvent>,
    popup: Option<Popup>,
    next_popup_id: u64,
    escape_action_id: String,
}

impl PopupEngine {
    pub fn new(registry: Rc<dyn ActionRegistry>, ui: Rc<dyn UiHost>) -> Self {
        let (event_tx, events) = mpsc::channel();
        Self {
            registry,
            ui,
            dispatcher: Dispatcher::new(event_tx),
            events,
            popup: None,
            next_popup_id: 0,
            escape_action_id: ESCAPE_ACTION_ID.to_string(),
        }
    }

    /// Use another host action's shortcuts for cancelling popups
    pub fn with_escape_action(mut self, id: impl Into<String>) -> Self {
        self.escape_action_id = id.into();
        self
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.popup.as_ref().is_some_and(Popup::is_open)
    }

    /// Entry point for a root node: groups open a popup, leaves run directly
    pub fn show(&mut self, node: Arc<ActionNode>, context: DataContext, accelerators: Accelerators) {
        if node.is_group() {
            self.open_popup(&node, accelerators, &context);
        } else {
            match self.registry.action(node.id()) {
                Some(action) => {
                    let invocation = Invocation::new(
                        node.id(),
                        Target::Action(action),
                        KeyModifiers::NONE,
                        context.component,
                        node.name(),
                    );
                    self.start(invocation);
                }
                None => log::warn!("No action registered for `{}`", node.id()),
            }
        }
        self.pump();
    }

    /// Feed a keystroke to the open popup; false when no popup wants it
    pub fn handle_key(&mut self, key: KeyStroke) -> bool {
        let Some(popup) = self.popup.as_mut() else {
            return false;
        };
        match popup.handle_key(key) {
            PopupInput::Chosen { index, modifiers } => self.on_chosen(index, modifiers),
            PopupInput::Cancel => self.cancel(),
            PopupInput::Consumed | PopupInput::Ignored => {}
        }
        self.pump();
        true
    }

    /// Choose the selected item, as a list commit would
    pub fn commit_selection(&mut self) {
        let input = match self.popup.as_ref() {
            Some(popup) => popup.commit(),
            None => return,
        };
        if let PopupInput::Chosen { index, modifiers } = input {
            self.on_chosen(index, modifiers);
            self.pump();
        }
    }

    /// Close the open popup without running anything
    pub fn cancel(&mut self) {
        if let Some(mut popup) = self.popup.take() {
            log::debug!("Cancelling popup {:?}", popup.id());
            popup.cancel(self.ui.as_ref());
        }
    }

    /// The host closed the widget on its own (focus loss, click outside)
    pub fn dismissed(&mut self, id: PopupId) {
        if self.popup.as_ref().is_some_and(|popup| popup.id() == id) {
            self.cancel();
        }
    }

    /// An item was chosen by keystroke or list commit
    pub fn on_chosen(&mut self, index: usize, modifiers: KeyModifiers) {
        let Some(popup) = self.popup.as_mut() else {
            return;
        };
        let Some(item) = popup.items().get(index) else {
            log::warn!("No item {} in popup {:?}", index, popup.id());
            return;
        };
        if !item.is_enabled() {
            log::debug!("`{}` is disabled, ignoring", item.node().id());
            return;
        }
        let Some(target) = item.target().cloned() else {
            return;
        };
        let sticky = item.is_sticky();
        let invocation = Invocation::new(
            item.node().id(),
            target,
            modifiers,
            popup.source_component(),
            item.label(),
        );
        popup.select(index);

        if sticky {
            let id = popup.id();
            log::debug!("Running sticky `{}`, keeping popup {:?} open", invocation.label, id);
            self.start(invocation.with_refresh(id));
        } else {
            popup.set_final_invocation(invocation);
            let invocation = popup.close_ok(self.ui.as_ref());
            self.popup = None;
            if let Some(invocation) = invocation {
                self.start(invocation);
            }
        }
    }

    /// Drain queued engine events; returns how many were handled
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            handled += 1;
            match event {
                EngineEvent::Advance { invocation, stage } => self.advance(invocation, stage),
                EngineEvent::Refresh { popup, context } => self.refresh(popup, &context),
            }
        }
        handled
    }

    fn start(&self, invocation: Invocation) {
        self.dispatcher.dispatch(EngineEvent::Advance {
            invocation,
            stage: InvocationStage::ResolveContext,
        });
    }

    fn advance(&mut self, mut invocation: Invocation, stage: InvocationStage) {
        log::debug!("`{}`: {:?}", invocation.label, stage);
        let dispatcher = self.dispatcher.clone();
        match stage {
            InvocationStage::ResolveContext => {
                let source = invocation.source;
                self.resolve_context(
                    source,
                    Box::new(move |context| {
                        invocation.context = Some(context);
                        dispatcher.dispatch(EngineEvent::Advance {
                            invocation,
                            stage: InvocationStage::YieldToUi,
                        });
                    }),
                );
            }
            InvocationStage::YieldToUi => self.ui.invoke_later(Box::new(move || {
                dispatcher.dispatch(EngineEvent::Advance {
                    invocation,
                    stage: InvocationStage::AwaitFocusSettled,
                })
            })),
            InvocationStage::AwaitFocusSettled => self.ui.when_focus_settles(Box::new(move || {
                dispatcher.dispatch(EngineEvent::Advance {
                    invocation,
                    stage: InvocationStage::Invoke,
                })
            })),
            InvocationStage::Invoke => self.invoke(invocation),
        }
    }

    fn resolve_context(&self, source: Option<ComponentId>, callback: ContextCallback) {
        match source {
            Some(component) => callback(self.ui.data_context(component)),
            None => self.ui.data_context_from_focus(callback),
        }
    }

    fn invoke(&mut self, invocation: Invocation) {
        let context = invocation.context.clone().unwrap_or_default();
        match &invocation.target {
            Target::Submenu(node) => self.open_popup(node, Accelerators::Declared, &context),
            Target::Action(_) => match self.registry.action(&invocation.id) {
                Some(action) => self.invoke_action(&action, &invocation, &context),
                None => log::debug!("`{}` is gone from the registry, skipping", invocation.label),
            },
            Target::PerformableGroup { node, .. } => {
                let Some(action) = self.registry.action(node.id()) else {
                    log::debug!("`{}` is gone from the registry, skipping", invocation.label);
                    return self.finish(invocation.refresh);
                };
                let performable = action
                    .as_group()
                    .is_none_or(|group| group.can_be_performed(&context));
                if performable {
                    let mut event = action_event(&action, invocation.modifiers, &context);
                    if self.last_update_and_check_dumb(&action, &mut event, &invocation.label) {
                        action.perform(&event);
                    }
                } else {
                    log::debug!("`{}` cannot be performed, opening its items", node.id());
                    self.open_popup(node, Accelerators::Declared, &context);
                }
            }
        }

        self.finish(invocation.refresh);
    }

    fn finish(&self, refresh: Option<PopupId>) {
        if let Some(popup) = refresh {
            self.after_sticky(popup);
        }
    }

    fn invoke_action(&mut self, action: &ActionHandle, invocation: &Invocation, context: &DataContext) {
        let mut event = action_event(action, invocation.modifiers, context);
        if self.show_popup_if_group(action, &invocation.label, context) {
            return;
        }
        if !self.last_update_and_check_dumb(action, &mut event, &invocation.label) {
            return;
        }
        log::debug!("Performing `{}` with {:?}", invocation.label, event.modifiers);
        action.perform(&event);
    }

    /// A host group that cannot run itself lists its children instead
    fn show_popup_if_group(&mut self, action: &ActionHandle, title: &str, context: &DataContext) -> bool {
        let Some(group) = action.as_group() else {
            return false;
        };
        if group.can_be_performed(context) {
            return false;
        }
        log::debug!("`{}` is a group that cannot be performed, listing its children", title);
        let node = popup::synthetic_group(title, group.children(context));
        self.open_popup(&node, Accelerators::Numbered, context);
        true
    }

    /// Re-query the action right before performing; false means skip it
    fn last_update_and_check_dumb(&self, action: &ActionHandle, event: &mut ActionEvent, label: &str) -> bool {
        event.presentation = action.update(&event.context);
        if !event.presentation.enabled {
            log::debug!("`{}` got disabled before it ran, skipping", label);
            return false;
        }
        if !event.presentation.visible {
            log::debug!("`{}` got hidden before it ran, skipping", label);
            return false;
        }
        if self.ui.is_dumb() && !action.is_dumb_aware() {
            log::debug!("`{}` is not available while the host is busy, skipping", label);
            return false;
        }
        true
    }

    /// Re-anchor and refresh a sticky popup once its action ran
    fn after_sticky(&self, id: PopupId) {
        let Some(popup) = self.popup.as_ref().filter(|popup| popup.id() == id && popup.is_open())
        else {
            log::debug!("Popup {:?} is gone, nothing to refresh", id);
            return;
        };
        popup.relocate(self.ui.as_ref());
        let dispatcher = self.dispatcher.clone();
        self.resolve_context(
            popup.source_component(),
            Box::new(move |context| dispatcher.dispatch(EngineEvent::Refresh { popup: id, context })),
        );
    }

    fn refresh(&mut self, id: PopupId, context: &DataContext) {
        match self.popup.as_mut() {
            Some(popup) if popup.id() == id && popup.is_open() => {
                popup.refresh(self.registry.as_ref(), context)
            }
            _ => log::debug!("Popup {:?} closed before its refresh", id),
        }
    }

    fn open_popup(&mut self, node: &ActionNode, accelerators: Accelerators, context: &DataContext) {
        self.cancel();
        let id = PopupId(self.next_popup_id);
        self.next_popup_id += 1;
        let mut popup = Popup::build(
            id,
            node,
            accelerators,
            self.registry.as_ref(),
            self.ui.as_ref(),
            context,
            &self.escape_action_id,
        );
        log::debug!("Showing popup {:?} `{}` with {} items", id, popup.title(), popup.items().len());
        popup.show(self.ui.as_ref());
        self.popup = Some(popup);
    }
}

fn action_event(action: &ActionHandle, modifiers: KeyModifiers, context: &DataContext) -> ActionEvent {
    ActionEvent {
        place: ACTION_PLACE,
        modifiers,
        context: context.clone(),
        injected_context: action.is_in_injected_context(),
        presentation: ActionState::default(),
    }
}
