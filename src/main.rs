mod app;
mod auth;
mod clone;
mod command;
mod config;
mod error;
mod event;
mod forge;
mod git;
mod github;
mod log_parse;
mod msg;
mod overlay;
mod pane;
mod session;
#[cfg(test)]
mod testing;
mod tui;
mod types;
mod ui;
mod views;

use std::panic;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::App;
use crate::auth::StoredAuth;
use crate::clone::GitCloner;
use crate::command::Executor;
use crate::config::Config;
use crate::event::Event;
use crate::git::CliRepo;
use crate::github::GitHubConnector;
use crate::msg::Msg;
use crate::session::{Services, Session};
use crate::tui::EventHandler;

/// Terminal dashboard for the git repository in the current directory
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {}

fn log_file() -> Option<std::fs::File> {
    let dir = dirs::cache_dir()?.join("hit");
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("hit.log"))
        .ok()
}

/// The terminal belongs to the UI, so logs go to a file
fn init_logging() {
    let writer = match log_file() {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(std::io::sink),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    Cli::parse();
    init_logging();

    let cwd = std::env::current_dir()?;
    let repo = match CliRepo::open(&cwd) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let config = Config::load();
    let services = Services {
        auth: Arc::new(StoredAuth::new(&config.auth)),
        cloner: Arc::new(GitCloner),
        connector: Arc::new(GitHubConnector),
    };
    let session = Session::new(Arc::new(repo), services);

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(session, config));

    tui::restore()?;

    // Outstanding commands are abandoned, not awaited
    runtime.shutdown_background();

    result
}

async fn run(session: Session, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Msg>();
    let executor = Executor::new(msg_tx);

    let tick_rate = Duration::from_millis(config.general.tick_rate_ms);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut app = App::new(session, config);
    let mut events = EventHandler::new(tick_rate, render_rate);

    let size = terminal.size()?;
    executor.dispatch(app.handle(Msg::Resize {
        width: size.width,
        height: size.height,
    }));
    executor.dispatch(app.init());

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                let msg = match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                        None
                    }
                    Event::Tick => Some(Msg::Tick),
                    Event::Key(key) => Some(Msg::Key(key)),
                    Event::Resize(width, height) => Some(Msg::Resize { width, height }),
                };
                if let Some(msg) = msg {
                    executor.dispatch(app.handle(msg));
                }
            }
            Some(msg) = msg_rx.recv() => {
                executor.dispatch(app.handle(msg));
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
