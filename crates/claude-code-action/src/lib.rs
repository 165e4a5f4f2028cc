//! GitHub Actions entry point for Claude Code
//!
//! Reads the action's inputs, runs one Claude Code query and relays every
//! message to the workflow log. Failures become an `::error::` annotation
//! and a nonzero exit status.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod gha;
pub mod run;
pub mod shutdown;

pub use config::{ActionConfig, ConfigError};
pub use gha::{Inputs, Logger, get_input, log_error, log_info, with_stdout};
pub use run::{relay, run};
pub use shutdown::abort_on_shutdown;
