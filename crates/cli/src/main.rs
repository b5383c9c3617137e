//! Bureau access inspector.
//!
//! Loads an access catalog and a session document and prints the decisions
//! the console would make for that session as JSON.

mod commands;
mod config;

use clap::Parser;
use tracing::info;

use crate::commands::Workspace;
use crate::config::CliConfig;

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level`. Logs go to stderr so that
/// stdout carries only the JSON report.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bureau_access={},bureau={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let workspace = Workspace::load(&config)?;
    info!(
        command = ?config.command,
        session_id = %workspace.session().id(),
        "Running command"
    );

    let report = commands::run(&config.command, &workspace)?;
    let output = if config.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);
    Ok(())
}
