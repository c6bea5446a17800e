mod cli;
mod config;
mod error;
mod files;
mod ledger;
mod loader;
mod ui;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use std::sync::Arc;
use winit::event_loop::EventLoop;

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::ledger::History;
use crate::loader::{DiskSource, ImageSource};
use crate::ui::state::Player;
use crate::ui::App;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match cli.into_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            let kind = match e {
                ConfigError::ModeNeedsIgnoredLedger { .. } => ErrorKind::ArgumentConflict,
                ConfigError::NotADirectory(_) => ErrorKind::InvalidValue,
            };
            Cli::command().error(kind, e).exit();
        }
    };

    log::info!(
        "Watching {} (mode {}, effect {:?}, every {:.1}s)",
        config.directory.display(),
        config.mode.as_str(),
        config.effect,
        config.poll_interval.as_secs_f64()
    );

    let source = DiskSource::new(&config.directory);
    let catalog = source.scan();
    log::info!("{} images present at startup", catalog.len());
    let history = History::open(
        config.ledger_policy,
        &config.ledger_path,
        config.reset_ledger,
        &catalog,
    );
    let player = Player::new(Arc::clone(&config), source, history);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Could not create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new(player, config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop failed: {}", e);
        return ExitCode::FAILURE;
    }
    match app.fatal {
        Some(msg) => {
            log::error!("Could not open display: {}", msg);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
