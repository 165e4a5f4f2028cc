//! Subprocess transport for CLI communication
//!
//! Runs the Claude Code CLI with piped stdio and reads its stdout as
//! newline-delimited JSON. Stdin is closed right after spawn; stderr is
//! drained in the background so the child never blocks on a full pipe.

pub mod process;

pub use process::{ProcessConfig, ProcessHandle, StderrCallback};
