mod ai;
mod app;
mod cli;
mod config;
mod constants;
mod dataset;
mod editor;
mod error;
mod input;
mod prompts;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::cli::Cli;
use crate::config::Config;

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    /// `<config_dir>/redraft/redraft.log`, so output doesn't corrupt the TUI
    File,
    Stderr,
}

fn setup_logging(target: LogTarget) {
    use std::fs::OpenOptions;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,redraft=debug"));

    let log_file = match target {
        LogTarget::File => Config::config_dir()
            .ok()
            .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
            .map(|dir| dir.join("redraft.log"))
            .and_then(|path| {
                OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(&path)
                    .ok()
            }),
        LogTarget::Stderr => None,
    };

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Warning: failed to read .env: {}", e);
    }

    match args.command {
        Some(command) => {
            setup_logging(LogTarget::Stderr);
            let config = Config::load()?;
            cli::run(command, config).await
        }
        None => {
            setup_logging(LogTarget::File);

            let config = Config::load()?;

            // Initialize theme from config
            crate::ui::theme::init_theme(config.ui.theme);

            let mut app = App::new(config)?;
            app.run().await
        }
    }
}
