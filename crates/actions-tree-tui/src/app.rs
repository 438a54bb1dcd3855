//! Glue between the terminal, the popup engine and the live tree

use actions_tree::{Accelerators, ActionNode, DataContext, KeyStroke, PopupEngine, TreeStore, UiHost};
use actions_tree_config::AppConfig;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::actions;
use crate::host::{DemoUi, SharedState};
use crate::state::{AppState, EDITOR};

/// Title of the popup listing every root node
const ROOT_TITLE: &str = "Actions";

pub struct App {
    pub state: SharedState,
    pub ui: Rc<DemoUi>,
    pub engine: PopupEngine,
    pub store: TreeStore,
    config: AppConfig,
    reload_key: KeyStroke,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let state: SharedState = Rc::new(RefCell::new(AppState::default()));
        let registry = Rc::new(actions::demo_registry(&state));
        let ui = Rc::new(DemoUi::new(Rc::clone(&state)));
        let engine = PopupEngine::new(registry, ui.clone()).with_escape_action(config.escape_action.clone());
        let store = TreeStore::new(config.actions_file.clone());
        let reload_key = KeyStroke::parse(&config.reload_key).unwrap_or_else(|e| {
            log::warn!("{}, falling back to Ctrl+R for reloading", e);
            KeyStroke::new(KeyCode::Char('r'), KeyModifiers::CONTROL)
        });

        let app = Self {
            state,
            ui,
            engine,
            store,
            config,
            reload_key,
        };
        app.reload();
        app
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    /// Re-read the actions document; a broken one leaves the current tree in place
    pub fn reload(&self) {
        match self.store.reload() {
            Ok(()) => {
                let message = format!(
                    "Loaded {} (v{})",
                    self.store.source().display(),
                    self.store.snapshot().version
                );
                self.state.borrow_mut().info(message);
            }
            Err(e) => {
                log::error!("Reload failed: {}", e);
                self.state.borrow_mut().error(e.to_string());
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let stroke = KeyStroke::from(key);
        if self.engine.handle_key(stroke) {
            return;
        }

        if stroke == self.reload_key {
            self.reload();
        } else if stroke.code() == KeyCode::Char(' ') && stroke.modifiers().is_empty() {
            self.open_root();
        } else if let Some(node) = self.global_node(&stroke) {
            self.engine.show(node, self.editor_context(), Accelerators::Declared);
        } else {
            let mut state = self.state.borrow_mut();
            match (stroke.code(), stroke.modifiers()) {
                (KeyCode::Up, _) => state.move_cursor(-1),
                (KeyCode::Down, _) => state.move_cursor(1),
                (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => state.running = false,
                _ => {}
            }
        }
    }

    /// One host pass: run deferred tasks and let the engine catch up
    pub fn tick(&mut self) {
        self.engine.pump();
        if self.ui.run_pending() > 0 {
            self.engine.pump();
        }
    }

    fn open_root(&mut self) {
        let snapshot = self.store.snapshot();
        if snapshot.tree.is_empty() {
            self.state.borrow_mut().error("No actions loaded");
            return;
        }
        let accelerators = if self.config.numbered_top_level {
            Accelerators::Numbered
        } else {
            Accelerators::Declared
        };
        self.engine
            .show(snapshot.tree.root_group(ROOT_TITLE), self.editor_context(), accelerators);
    }

    /// Root nodes double as global shortcuts
    fn global_node(&self, key: &KeyStroke) -> Option<Arc<ActionNode>> {
        self.store
            .snapshot()
            .tree
            .roots()
            .iter()
            .find(|node| node.keys().contains(key))
            .cloned()
    }

    fn editor_context(&self) -> DataContext {
        self.ui.data_context(EDITOR)
    }
}
