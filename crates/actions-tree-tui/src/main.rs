use anyhow::{Context, Result};
use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    Terminal,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

mod actions;
mod app;
mod host;
mod logger;
mod state;
mod theme;
mod views;

use actions_tree_config::AppConfig;
use app::App;
use theme::Theme;

/// Poll timeout while nothing is waiting on the next UI pass
const IDLE_POLL: Duration = Duration::from_millis(100);
/// Poll timeout while deferred host tasks are queued
const BUSY_POLL: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    let log_file = logger::init()?;
    log::info!("Starting actions-tree, logging to {}", log_file.display());

    let mut config = AppConfig::load();
    // An explicit document path beats the configured one
    if let Some(path) = std::env::args_os().nth(1) {
        config.actions_file = PathBuf::from(path);
    }
    let mut app = App::new(config);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        log::error!("Exiting with error: {:#}", err);
    }
    log::info!("Exiting actions-tree");
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let theme = Theme::default();
    loop {
        app.tick();

        terminal.draw(|frame| {
            let area = frame.area();
            views::render(app, &theme, area, frame);
        })?;

        if !app.is_running() {
            break;
        }

        let timeout = if app.ui.has_pending() { BUSY_POLL } else { IDLE_POLL };
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }

    Ok(())
}
