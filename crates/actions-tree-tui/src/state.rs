//! What the playground shows: a small text buffer plus a status line

use actions_tree::ComponentId;

/// The text buffer, the only component that can be focused
pub const EDITOR: ComponentId = ComponentId(1);

#[derive(Debug, Clone)]
pub struct AppState {
    pub running: bool,
    pub lines: Vec<String>,
    pub cursor: usize,
    pub counter: i64,
    /// While true the host is "indexing" and dumb-unaware actions are skipped
    pub indexing: bool,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            running: true,
            lines: vec![
                "Press Space to open the actions menu.".to_string(),
                "Use Up/Down to move the cursor between lines.".to_string(),
                "Ctrl+R reloads the actions document.".to_string(),
            ],
            cursor: 0,
            counter: 0,
            indexing: false,
            status: None,
        }
    }
}

impl AppState {
    pub fn current_line_mut(&mut self) -> Option<&mut String> {
        self.lines.get_mut(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.lines.is_empty() {
            return;
        }
        let last = self.lines.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.status = Some(Status::Info(message.into()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.status = Some(Status::Error(message.into()));
    }
}
