//! Log subscriber setup.
//!
//! The terminal belongs to the game screen, so logs only go to a file, and
//! only when `BLOCKFALL_LOG_PATH` is set.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use crate::config::AppConfig;

/// Install the global subscriber. Returns whether logging is enabled.
pub fn init(config: &AppConfig) -> Result<bool> {
    let Some(path) = &config.log_path else {
        return Ok(false);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(LevelFilter::from_level(config.log_level))
        .try_init()
        .context("failed to install the log subscriber")?;

    Ok(true)
}
