//! Terminal falling-block game (default binary).
//!
//! Takes no arguments; see [`blockfall::config`] for the environment
//! variables it reads. Press Enter to start, Esc to quit.

use anyhow::Result;
use tracing::error;

use blockfall::{app, logging, AppConfig};

fn main() -> Result<()> {
    let config = AppConfig::from_env();
    logging::init(&config)?;

    let result = app::run(&config);
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "exiting with error");
    }
    result
}
