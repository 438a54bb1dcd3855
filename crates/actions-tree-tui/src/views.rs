use actions_tree::shortcuts::ShortcutTarget;
use actions_tree::{Placement, Popup};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::state::{AppState, Status};
use crate::theme::Theme;

const MIN_POPUP_WIDTH: u16 = 24;

/// Render the entire application UI
pub fn render(app: &App, theme: &Theme, area: Rect, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Editor
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    let state = app.state.borrow();
    let editor = render_editor(&state, theme, chunks[0], f);
    render_status_bar(app, &state, theme, chunks[1], f);
    render_hints(theme, chunks[2], f);

    if let (Some(popup), Some((_, placement))) = (app.engine.popup(), app.ui.popup_placement()) {
        let anchor = Anchor {
            placement,
            editor,
            cursor_row: state.cursor as u16,
        };
        render_popup(popup, &anchor, theme, area, f);
    }
}

/// Returns the inner area of the editor block
fn render_editor(state: &AppState, theme: &Theme, area: Rect, f: &mut Frame) -> Rect {
    let block = Block::default()
        .title(" Editor ")
        .borders(Borders::ALL)
        .border_style(theme.panel_border())
        .title_style(theme.panel_title())
        .style(theme.background());
    let inner = block.inner(area);

    let lines: Vec<Line> = state
        .lines
        .iter()
        .enumerate()
        .map(|(row, text)| {
            if row == state.cursor {
                Line::from(vec![
                    Span::styled("> ", theme.success()),
                    Span::styled(text.as_str(), theme.text()),
                ])
            } else {
                Line::from(vec![Span::raw("  "), Span::styled(text.as_str(), theme.muted())])
            }
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
    inner
}

fn render_status_bar(app: &App, state: &AppState, theme: &Theme, area: Rect, f: &mut Frame) {
    let message = match &state.status {
        Some(Status::Info(text)) => Span::styled(text.as_str(), theme.success()),
        Some(Status::Error(text)) => Span::styled(text.as_str(), theme.error()),
        None => Span::raw(""),
    };
    f.render_widget(Paragraph::new(Line::from(message)).style(theme.background()), area);

    let mut right = vec![Span::styled(
        format!("counter {}  tree v{} ", state.counter, app.store.snapshot().version),
        theme.muted(),
    )];
    if state.indexing {
        right.insert(0, Span::styled("indexing  ", theme.warning()));
    }
    f.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        area,
    );
}

fn render_hints(theme: &Theme, area: Rect, f: &mut Frame) {
    let hints = Line::from(vec![
        Span::styled("Space", theme.key_hint()),
        Span::styled(" actions  ", theme.key_description()),
        Span::styled("↑/↓", theme.key_hint()),
        Span::styled(" move  ", theme.key_description()),
        Span::styled("Ctrl+R", theme.key_hint()),
        Span::styled(" reload  ", theme.key_description()),
        Span::styled("Ctrl+C", theme.key_hint()),
        Span::styled(" quit", theme.key_description()),
    ]);
    f.render_widget(
        Paragraph::new(hints)
            .style(theme.background())
            .alignment(Alignment::Center),
        area,
    );
}

/// Where the host was asked to put the popup, plus what that means on screen
struct Anchor {
    placement: Placement,
    editor: Rect,
    cursor_row: u16,
}

fn render_popup(popup: &Popup, anchor: &Anchor, theme: &Theme, area: Rect, f: &mut Frame) {
    let rows = popup_rows(popup);
    let content_width = rows.iter().map(Row::width).max().unwrap_or(0);
    let width = (content_width + 2).max(MIN_POPUP_WIDTH).min(area.width);
    let height = (rows.len() as u16 + 2).min(area.height);
    let popup_area = popup_area(anchor, width, height, area);

    let inner_width = width.saturating_sub(2) as usize;
    let lines: Vec<Line> = rows
        .iter()
        .map(|row| row.to_line(popup.selected(), inner_width, theme))
        .collect();

    let mut block = Block::default()
        .title(format!(" {} ", popup.title()))
        .borders(Borders::ALL)
        .border_style(theme.panel_border())
        .title_style(theme.panel_title())
        .style(theme.panel_background());
    if let Some(description) = popup.selected_item().and_then(|item| item.description()) {
        block = block.title_bottom(Line::styled(format!(" {} ", description), theme.muted()));
    }

    f.render_widget(Clear, popup_area);
    f.render_widget(Paragraph::new(lines).block(block), popup_area);
}

fn popup_area(anchor: &Anchor, width: u16, height: u16, area: Rect) -> Rect {
    let (x, y) = match anchor.placement {
        Placement::Editor(_) => (anchor.editor.x + 2, anchor.editor.y + anchor.cursor_row + 1),
        Placement::Component(_) => (anchor.editor.x + 1, anchor.editor.y),
        Placement::Default => (
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
        ),
    };
    // keep it on screen
    let x = x.min(area.right().saturating_sub(width));
    let y = y.min(area.bottom().saturating_sub(height));
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// One line of a popup: a separator or an item
#[derive(Debug, Clone, PartialEq, Eq)]
enum Row {
    Separator(String),
    Item {
        index: usize,
        label: String,
        hint: String,
        enabled: bool,
        submenu: bool,
    },
}

impl Row {
    fn width(&self) -> u16 {
        let chars = match self {
            Row::Separator(caption) => caption.chars().count() + 6,
            Row::Item { label, hint, .. } => label.chars().count() + hint.chars().count() + 8,
        };
        chars as u16
    }

    fn to_line(&self, selected: Option<usize>, width: usize, theme: &Theme) -> Line<'static> {
        match self {
            Row::Separator(caption) if caption.is_empty() => {
                Line::styled("─".repeat(width), theme.separator())
            }
            Row::Separator(caption) => {
                let rest = width.saturating_sub(caption.chars().count() + 4);
                Line::styled(format!("── {} {}", caption, "─".repeat(rest)), theme.separator())
            }
            Row::Item {
                index,
                label,
                hint,
                enabled,
                submenu,
            } => {
                let is_selected = selected == Some(*index);
                let style = match (is_selected, enabled) {
                    (true, _) => theme.selected(),
                    (false, true) => theme.text(),
                    (false, false) => theme.muted(),
                };
                let marker = if is_selected { "> " } else { "  " };
                let arrow = if *submenu { " ▸" } else { "  " };
                let used = 2 + label.chars().count() + hint.chars().count() + 2;
                let gap = " ".repeat(width.saturating_sub(used).max(1));
                Line::from(vec![
                    Span::styled(format!("{}{}{}", marker, label, gap), style),
                    Span::styled(hint.clone(), if *enabled { theme.key_hint() } else { theme.muted() }),
                    Span::styled(arrow, style),
                ])
            }
        }
    }
}

fn popup_rows(popup: &Popup) -> Vec<Row> {
    let mut rows = Vec::new();
    for (index, item) in popup.items().iter().enumerate() {
        if let Some(caption) = item.separator_above() {
            rows.push(Row::Separator(caption.to_string()));
        }
        let hint = popup
            .shortcuts()
            .keys_for(ShortcutTarget::Item(index))
            .first()
            .map(|key| key.label())
            .unwrap_or_default();
        rows.push(Row::Item {
            index,
            label: item.label().to_string(),
            hint,
            enabled: item.is_enabled(),
            submenu: item.has_children(),
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use actions_tree::{ComponentId, EditorId};
    use pretty_assertions::assert_eq;

    fn anchor(placement: Placement) -> Anchor {
        Anchor {
            placement,
            editor: Rect::new(1, 1, 78, 20),
            cursor_row: 3,
        }
    }

    #[test]
    fn test_popup_area_follows_placement() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(
            popup_area(&anchor(Placement::Editor(EditorId(1))), 30, 6, area),
            Rect::new(3, 5, 30, 6)
        );
        assert_eq!(
            popup_area(&anchor(Placement::Component(ComponentId(1))), 30, 6, area),
            Rect::new(2, 1, 30, 6)
        );
        assert_eq!(
            popup_area(&anchor(Placement::Default), 30, 6, area),
            Rect::new(25, 9, 30, 6)
        );
    }

    #[test]
    fn test_popup_area_stays_on_screen() {
        let area = Rect::new(0, 0, 40, 10);
        let mut low = anchor(Placement::Editor(EditorId(1)));
        low.cursor_row = 8;
        assert_eq!(popup_area(&low, 30, 6, area), Rect::new(3, 4, 30, 6));
    }

    #[test]
    fn test_separator_rows() {
        let theme = Theme::default();
        let line = Row::Separator(String::new()).to_line(None, 5, &theme);
        assert_eq!(line.to_string(), "─────");
        let line = Row::Separator("Edit".to_string()).to_line(None, 12, &theme);
        assert_eq!(line.to_string(), "── Edit ────");
    }
}
