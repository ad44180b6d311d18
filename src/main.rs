//! Application entry point — Verse Studio interactive session.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create a single-threaded [`tokio`] runtime; actions interleave at
//!    their network calls and never run in parallel.
//! 4. Build the studio service client ([`HttpStudioService`]) from config.
//! 5. Create the session, its [`SessionController`] and the
//!    [`ActionDispatcher`].
//! 6. Kick off the initial corpus library load.
//! 7. Start the line editor thread and handle its lines until `quit` or
//!    Ctrl-D.  Actions are spawned so the user can keep editing parameters
//!    while a request is outstanding.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use verse_studio::{
    api::{HttpStudioService, StudioService},
    app::{execute_local, parse_command, ActionDispatcher, CommandError, SessionCommand, HELP},
    config::{AppConfig, AppPaths},
    controller::{new_shared_session, SessionController},
    repl::{self, ReplEvent},
    session::OperationStatus,
};

/// Print a dispatched action's outcome when it settles, or why it was refused.
fn report(dispatched: Result<JoinHandle<String>, OperationStatus>) {
    match dispatched {
        Ok(task) => {
            tokio::spawn(async move {
                if let Ok(out) = task.await {
                    println!("{out}");
                }
            });
        }
        Err(status) => println!("{status} (wait for it to finish)"),
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let service: Arc<dyn StudioService> = Arc::new(HttpStudioService::from_config(&config.service));
    log::info!("studio service: {}", config.service.base_url);

    let session = new_shared_session(&config);
    let controller = Arc::new(SessionController::new(session, service, config));
    let dispatcher = ActionDispatcher::new(controller);

    report(dispatcher.dispatch(SessionCommand::Refresh).await);
    println!("{HELP}");

    let (line_tx, mut line_rx) = mpsc::channel::<ReplEvent>(32);
    let reader = repl::spawn_reader(Some(AppPaths::new().history_file), line_tx)?;

    while let Some(event) = line_rx.recv().await {
        let line = match event {
            ReplEvent::Line(line) => line,
            ReplEvent::Interrupted => {
                println!("Ctrl-C detected. Type 'quit' to exit.");
                continue;
            }
            ReplEvent::Eof => break,
        };

        match parse_command(&line) {
            Ok(SessionCommand::Quit) => break,
            // Refused while another action is outstanding; edits are
            // always accepted.
            Ok(cmd) if cmd.is_action() => report(dispatcher.dispatch(cmd).await),
            Ok(cmd) => println!("{}", execute_local(dispatcher.controller(), cmd)),
            Err(CommandError::Empty) => {}
            Err(e) => println!("{e}"),
        }
    }

    drop(line_rx);
    match tokio::task::spawn_blocking(move || reader.join()).await {
        Ok(Ok(())) => {}
        _ => log::warn!("line editor thread did not shut down cleanly"),
    }

    log::info!("session ended");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Verse Studio starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e:#}); using defaults");
        AppConfig::default()
    });

    // 3. Runtime
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(run(config))
}
