//! Runtime configuration read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BLOCKFALL_SEED` | derived from the clock | Seed for the piece generator |
//! | `BLOCKFALL_TICK_MS` | `TICK_MS` (10) | Period of the update ticker and the frame loop |
//! | `BLOCKFALL_LOG_PATH` | unset | Append logs to this file; no logging when unset |
//! | `BLOCKFALL_LOG_LEVEL` | `info` | `trace`, `debug`, `info`, `warn` or `error` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::Level;

use crate::types::TICK_MS;

pub const ENV_SEED: &str = "BLOCKFALL_SEED";
pub const ENV_TICK_MS: &str = "BLOCKFALL_TICK_MS";
pub const ENV_LOG_PATH: &str = "BLOCKFALL_LOG_PATH";
pub const ENV_LOG_LEVEL: &str = "BLOCKFALL_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub seed: u32,
    pub tick: Duration,
    pub log_path: Option<PathBuf>,
    pub log_level: Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: clock_seed(),
            tick: Duration::from_millis(TICK_MS),
            log_path: None,
            log_level: Level::INFO,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Unparseable values fall back to
    /// their defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            get(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let seed = value(ENV_SEED)
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(clock_seed);

        let tick_ms = value(ENV_TICK_MS)
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(TICK_MS);

        let log_path = value(ENV_LOG_PATH).map(PathBuf::from);

        let log_level = value(ENV_LOG_LEVEL)
            .and_then(|s| Level::from_str(&s).ok())
            .unwrap_or(Level::INFO);

        Self {
            seed,
            tick: Duration::from_millis(tick_ms),
            log_path,
            log_level,
        }
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.as_secs() as u32) ^ d.subsec_nanos())
        .unwrap_or(1)
}
