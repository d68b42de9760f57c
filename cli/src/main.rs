//! Pledge CLI - binary entry point.
//!
//! ```text
//! main() -> PledgeConfig::load() -> init_tracing() -> commands::run()
//!                                                        |
//!                                                        v
//!                                  load household -> apply -> save -> print
//! ```
//!
//! Household state lives in `<data_dir>/household.json`; logs go to
//! `<data_dir>/logs/pledge.log` so stdout carries only command output.

mod commands;
mod render;

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Mutex,
};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pledge_config::PledgeConfig;

use crate::commands::Cli;

const LOG_FILE_NAME: &str = "pledge.log";

fn init_tracing(data_dir: &Path) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (log_file, init_warnings) = open_pledge_log_file(data_dir);

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::debug!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Without a log file, stay silent rather than mixing logs into command output.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_pledge_log_file(data_dir: &Path) -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in pledge_log_file_candidates(data_dir) {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn pledge_log_file_candidates(data_dir: &Path) -> Vec<PathBuf> {
    // Primary: <data_dir>/logs/pledge.log
    // Fallback: ./.pledge/logs/pledge.log (useful in constrained environments)
    let primary = data_dir.join("logs").join(LOG_FILE_NAME);
    let fallback = PathBuf::from(".pledge").join("logs").join(LOG_FILE_NAME);
    if primary == fallback {
        vec![primary]
    } else {
        vec![primary, fallback]
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let config = PledgeConfig::load()?.unwrap_or_default();

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| config.data_dir())
        .unwrap_or_else(|| PathBuf::from(".pledge"));
    init_tracing(&data_dir);

    commands::run(&cli.command, &config, &data_dir).inspect_err(|err| {
        tracing::error!("{err:#}");
    })
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
