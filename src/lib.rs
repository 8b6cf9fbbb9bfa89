//! `relation_manager` - relation export/import host
//!
//! This crate provides the `relman` CLI on top of [`relman_lib`], which does
//! the serializing, layer matching and relation reconstruction.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - YAML configuration with environment overrides
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - `tracing` subscriber setup
//! - [`sync`] - Project file backups taken before an import is saved
//!
//! The library modules are re-exported so commands can name them as
//! `crate::model`, `crate::error` and so on.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod format;
pub mod logging;
pub mod sync;

pub use relman_lib::{
    document, error, import, matching, model, project, serialize, validation,
};
pub use relman_lib::{RelationError, Result};

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if argument parsing, configuration or the command fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
