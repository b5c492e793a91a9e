//! fsearch - floating search over a directory of markdown notes.
//!
//! Hosts the overlay's in-memory workspace model behind a terminal UI: the
//! modal, its preview pane and the keyboard state machine all run exactly
//! as they do against a real pane-based host.

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use fsearch_core::Overlay;
use fsearch_core::settings::Directories;
use fsearch_host::WorkspaceOps;
use fsearch_types::SearchState;
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod app;
mod cli;
mod render;

use app::{App, load_workspace};
use cli::{Cli, Commands};

/// Log to a file: the terminal itself is the display surface.
fn setup_logging(debug_flag: bool) {
    let level = if debug_flag || cfg!(debug_assertions) {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never("/tmp", "fsearch.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    std::mem::forget(guard);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .init();
}

fn load_overlay(cli: &Cli) -> Result<Overlay> {
    let dirs = match &cli.config {
        Some(base) => Directories::with_base(base.clone()),
        None => Directories::new()?,
    };
    Ok(Overlay::load(&dirs)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.debug);

    match &cli.command {
        Some(Commands::Query { query }) => run_query(&cli, query),
        Some(Commands::Uri { uri }) => run_uri(&cli, uri),
        Some(Commands::Tui) | None => run_tui(&cli).await,
    }
}

/// One-shot search printed to stdout.
fn run_query(cli: &Cli, query: &str) -> Result<()> {
    let mut workspace = load_workspace(&cli.vault)?;
    let state = SearchState {
        query: query.to_string(),
        ..SearchState::default()
    };
    for hit in workspace.vault.search(&state) {
        let name = workspace
            .vault
            .file(hit.file)
            .map_or_else(String::new, |f| f.name.clone());
        println!("{name}: {}", hit.excerpt);
    }
    Ok(())
}

fn run_uri(cli: &Cli, uri: &str) -> Result<()> {
    let workspace = load_workspace(&cli.vault)?;
    let mut app = App::new(load_overlay(cli)?, workspace);
    app.overlay.handle_uri(&mut app.ws, uri, Instant::now())?;
    if let Some(leaf) = app.ws.active_leaf()
        && let Some(parts) = app.ws.search_parts(leaf)
    {
        for item in &parts.view.items {
            println!("{}", item.excerpt);
        }
    }
    Ok(())
}

async fn run_tui(cli: &Cli) -> Result<()> {
    let workspace = load_workspace(&cli.vault)?;
    let mut app = App::new(load_overlay(cli)?, workspace);
    app.open_modal()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal.draw(|frame| render::draw(frame, app))?;

        tokio::select! {
            Some(event_result) = event_stream.next() => {
                let event = match event_result {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::error!("event stream error: {err}");
                        continue;
                    }
                };
                if let Event::Key(key) = event
                    && key.kind == KeyEventKind::Press
                {
                    app.handle_key(key)?;
                }
            }

            _ = ticker.tick() => {
                app.tick(Instant::now())?;
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
