#![allow(dead_code)]
//! Fleet Console - terminal administration client for the fleet platform.
//!
//! Features:
//! - Login with per-screen read/write permissions
//! - Vehicle management, standard activities, rental assets
//! - Organization permission editing
//! - Configuration-driven search forms and data tables
//! - Idle logout and background token refresh

mod api;
mod app;
mod config;
mod error;
mod fetch;
mod logging;
mod pages;
mod routes;
mod session;
mod ui;

use anyhow::Result;
use app::App;
use config::Config;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use logging::LoggingConfig;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();
    if Config::config_path().is_some_and(|p| !p.exists()) {
        if let Err(error) = config.save() {
            eprintln!("could not write default config: {error}");
        }
    }
    let _log_guard = logging::init(&LoggingConfig::from_config(&config))?;

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref error) = result {
        tracing::error!(%error, "console exited with error");
    }
    tracing::info!("console stopped");
    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    while app.is_running() {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        app.tick();
    }
    Ok(())
}
