//! Blockfall (workspace facade crate).
//!
//! The rules engine, input mapping, terminal view and shared types live in
//! dedicated crates under `crates/`; this package re-exports them as
//! `blockfall::{core, input, term, types}` and adds the runner pieces used by
//! the binary.

pub mod app;
pub mod config;
pub mod logging;

pub use blockfall_core as core;
pub use blockfall_input as input;
pub use blockfall_term as term;
pub use blockfall_types as types;

pub use config::AppConfig;
