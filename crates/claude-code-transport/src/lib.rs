//! Subprocess transport for the Claude Code CLI
//!
//! Spawns the CLI as a child process and exposes its stdout as a sequence of
//! line-delimited JSON values. Higher layers build the argument vector; this
//! crate only knows how to run a program and read what it prints.
//!
//! # Architecture
//!
//! - **Process handle**: spawn, read, terminate and wait on one child
//! - **Executable lookup**: resolve a configured path before spawning
//! - **Error handling**: one error type for spawn, I/O and decode failures

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod locate;
pub mod subprocess;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use locate::resolve_executable;
pub use subprocess::{ProcessConfig, ProcessHandle, StderrCallback};
