//! Actions the playground registers with its host registry

use actions_tree::{
    ActionEvent, ActionState, DataContext, HostAction, HostActionGroup, KeyStroke,
};
use ratatui::crossterm::event::{KeyCode, KeyModifiers};

use crate::host::{DemoRegistry, SharedState};
use crate::state::AppState;

/// An action over the shared app state
pub struct StateAction {
    state: SharedState,
    text: fn(&AppState) -> String,
    description: Option<&'static str>,
    enabled: fn(&AppState) -> bool,
    run: fn(&mut AppState, &ActionEvent),
    shortcuts: Vec<KeyStroke>,
    dumb_aware: bool,
}

impl StateAction {
    pub fn new(state: &SharedState, text: fn(&AppState) -> String, run: fn(&mut AppState, &ActionEvent)) -> Self {
        Self {
            state: SharedState::clone(state),
            text,
            description: None,
            enabled: |_| true,
            run,
            shortcuts: Vec::new(),
            dumb_aware: true,
        }
    }

    pub fn described(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn enabled_when(mut self, enabled: fn(&AppState) -> bool) -> Self {
        self.enabled = enabled;
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
}

impl HostAction for StateAction {
    fn update(&self, _context: &DataContext) -> ActionState {
        let state = self.state.borrow();
        ActionState {
            text: Some((self.text)(&state)),
            description: self.description.map(str::to_string),
            enabled: (self.enabled)(&state),
            visible: true,
        }
    }

    fn perform(&self, event: &ActionEvent) {
        (self.run)(&mut self.state.borrow_mut(), event);
    }

    fn shortcuts(&self) -> Vec<KeyStroke> {
        self.shortcuts.clone()
    }

    fn is_dumb_aware(&self) -> bool {
        self.dumb_aware
    }
}

/// A host group that only lists other actions
pub struct ListGroup {
    text: &'static str,
    children: &'static [&'static str],
}

impl HostAction for ListGroup {
    fn update(&self, _context: &DataContext) -> ActionState {
        ActionState {
            text: Some(self.text.to_string()),
            ..ActionState::default()
        }
    }

    fn perform(&self, _event: &ActionEvent) {}

    fn as_group(&self) -> Option<&dyn HostActionGroup> {
        Some(self)
    }
}

impl HostActionGroup for ListGroup {
    fn can_be_performed(&self, _context: &DataContext) -> bool {
        false
    }

    fn children(&self, _context: &DataContext) -> Vec<String> {
        self.children.iter().map(|id| id.to_string()).collect()
    }
}

fn insert_date(state: &mut AppState, event: &ActionEvent) {
    let now = chrono::Local::now();
    let stamp = if event.modifiers.contains(KeyModifiers::ALT) {
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        now.format("%Y-%m-%d").to_string()
    };
    let at = (state.cursor + 1).min(state.lines.len());
    state.lines.insert(at, stamp);
    state.cursor = at;
}

fn transform_line(state: &mut AppState, f: fn(&str) -> String) {
    if let Some(line) = state.current_line_mut() {
        *line = f(line);
    }
}

/// Every action the playground knows about
pub fn demo_registry(state: &SharedState) -> DemoRegistry {
    let mut registry = DemoRegistry::new();

    registry.register(
        "EditorEscape",
        StateAction::new(state, |_| "Escape".to_string(), |s, _| s.status = None)
            .with_shortcuts(vec![KeyStroke::new(KeyCode::Esc, KeyModifiers::NONE)]),
    );
    registry.register(
        "Quit",
        StateAction::new(state, |_| "Quit".to_string(), |s, _| s.running = false),
    );
    registry.register(
        "InsertDate",
        StateAction::new(state, |_| "Insert date".to_string(), insert_date)
            .described("Alt adds the time of day"),
    );
    registry.register(
        "Counter.Increment",
        StateAction::new(state, |s| format!("Increment ({})", s.counter), |s, _| {
            s.counter += 1
        }),
    );
    registry.register(
        "Counter.Reset",
        StateAction::new(state, |_| "Reset counter".to_string(), |s, _| s.counter = 0)
            .enabled_when(|s| s.counter != 0),
    );
    registry.register(
        "Line.Duplicate",
        StateAction::new(state, |_| "Duplicate line".to_string(), |s, _| {
            if let Some(line) = s.lines.get(s.cursor).cloned() {
                s.lines.insert(s.cursor + 1, line);
            }
        }),
    );
    registry.register(
        "Line.Delete",
        StateAction::new(state, |_| "Delete line".to_string(), |s, _| {
            s.lines.remove(s.cursor);
            s.move_cursor(0);
        })
        .enabled_when(|s| s.lines.len() > 1),
    );
    registry.register(
        "Line.Upper",
        StateAction::new(state, |_| "Upper case".to_string(), |s, _| {
            transform_line(s, str::to_uppercase)
        }),
    );
    registry.register(
        "Line.Lower",
        StateAction::new(state, |_| "Lower case".to_string(), |s, _| {
            transform_line(s, str::to_lowercase)
        }),
    );
    registry.register(
        "Line.Transform",
        ListGroup {
            text: "Transform line",
            children: &["Line.Upper", "Line.Lower"],
        },
    );
    registry.register(
        "ToggleIndexing",
        StateAction::new(
            state,
            |s| {
                if s.indexing {
                    "Stop indexing".to_string()
                } else {
                    "Start indexing".to_string()
                }
            },
            |s, _| s.indexing = !s.indexing,
        ),
    );
    registry.register(
        "Reindex",
        StateAction::new(state, |_| "Reindex".to_string(), |s, _| s.info("Reindexed"))
            .described("Not available while indexing")
            .not_dumb_aware(),
    );

    log::debug!("Registered {} demo actions", registry.len());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use actions_tree::ActionRegistry;
    use pretty_assertions::assert_eq;

    fn event(modifiers: KeyModifiers) -> ActionEvent {
        ActionEvent {
            place: actions_tree::host::ACTION_PLACE,
            modifiers,
            context: DataContext::new(),
            injected_context: false,
            presentation: ActionState::default(),
        }
    }

    #[test]
    fn test_counter_text_follows_state() {
        let state = SharedState::default();
        let registry = demo_registry(&state);
        let increment = registry.action("Counter.Increment").unwrap();
        let reset = registry.action("Counter.Reset").unwrap();

        assert!(!reset.update(&DataContext::new()).enabled);
        increment.perform(&event(KeyModifiers::NONE));
        increment.perform(&event(KeyModifiers::NONE));

        let update = increment.update(&DataContext::new());
        assert_eq!(update.text.as_deref(), Some("Increment (2)"));
        assert!(reset.update(&DataContext::new()).enabled);
    }

    #[test]
    fn test_insert_date_below_cursor() {
        let state = SharedState::default();
        let registry = demo_registry(&state);
        let lines_before = state.borrow().lines.len();

        registry.action("InsertDate").unwrap().perform(&event(KeyModifiers::ALT));

        let state = state.borrow();
        assert_eq!(state.lines.len(), lines_before + 1);
        assert_eq!(state.cursor, 1);
        // date and time
        assert_eq!(state.lines[1].len(), "2024-01-01 00:00:00".len());
    }

    #[test]
    fn test_transform_is_a_group_that_cannot_run() {
        let state = SharedState::default();
        let registry = demo_registry(&state);
        let transform = registry.action("Line.Transform").unwrap();
        let group = transform.as_group().unwrap();

        assert!(!group.can_be_performed(&DataContext::new()));
        assert_eq!(group.children(&DataContext::new()), vec!["Line.Upper", "Line.Lower"]);
    }

    #[test]
    fn test_reindex_is_not_dumb_aware() {
        let state = SharedState::default();
        let registry = demo_registry(&state);
        assert!(!registry.action("Reindex").unwrap().is_dumb_aware());
        assert!(registry.action("ToggleIndexing").unwrap().is_dumb_aware());
    }
}
