// src/main.rs

use anyhow::Result;
use clap::Parser;
use glone::cli::Cli;
use glone::config::ConfigBuilder;
use glone::constants::GITHUB_TOKEN_ENV;
use glone::errors::Error;
#[cfg(feature = "progress")]
use glone::progress::IndicatifProgress;
use glone::progress::{ConsoleProgress, ProgressReporter};
use glone::report::write_summary;
use glone::run;
use glone::signal::setup_signal_handler;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging. Default to 'info' if RUST_LOG is not set.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                if cfg!(debug_assertions) {
                    "glone=debug".parse()?
                } else {
                    "glone=info".parse()?
                },
            ),
        )
        .init();

    log::debug!("Starting glone v{}...", env!("CARGO_PKG_VERSION"));

    // --- Setup ---
    let cli = Cli::parse();
    let config = match ConfigBuilder::from_cli(cli).build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    log::debug!("Configuration built successfully.");

    let token = setup_signal_handler()?;

    // Spinner on a terminal, plain coloured lines otherwise.
    let progress_reporter: Option<Arc<dyn ProgressReporter>> = if config.quiet {
        None
    } else {
        #[cfg(feature = "progress")]
        {
            if atty::is(atty::Stream::Stderr) {
                Some(Arc::new(IndicatifProgress::new()))
            } else {
                Some(Arc::new(ConsoleProgress))
            }
        }
        #[cfg(not(feature = "progress"))]
        {
            Some(Arc::new(ConsoleProgress))
        }
    };

    // --- Execution & Error Handling ---
    match run(&config, &token, progress_reporter) {
        Ok(report) => {
            if !config.quiet {
                write_summary(&mut std::io::stdout(), &report)?;
            }
            Ok(())
        }
        Err(Error::Interrupted) => {
            eprintln!("\nOperation cancelled.");
            std::process::exit(130);
        }
        Err(Error::Incomplete(report)) => {
            write_summary(&mut std::io::stderr(), &report)?;
            std::process::exit(1);
        }
        Err(Error::HostApi(e)) => {
            eprintln!("Error: {}", e);
            if e.is_rate_limit_plausible() {
                eprintln!(
                    "hint: the host may be rate limiting anonymous requests; set {} to a GitHub token.",
                    GITHUB_TOKEN_ENV
                );
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
