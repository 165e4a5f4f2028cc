//! Error types for queries
//!
//! Every failure of a query surfaces as one [`QueryError`]. Cancellation has
//! its own variant so callers can tell a user abort from a crashed CLI.

use claude_code_transport::TransportError;
use std::path::PathBuf;

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors that can occur while running a query
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Prompt was empty or whitespace
    #[error("Prompt is required")]
    InvalidPrompt,

    /// The CLI could not be found before spawning
    #[error(
        "Claude Code executable not found at {}. Is options.path_to_claude_code_executable set?",
        .path.display()
    )]
    ExecutableNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// The operating system failed to start the process
    #[error("Failed to spawn Claude Code process: {0}")]
    Spawn(String),

    /// The process exited with a nonzero status
    #[error("Claude Code process exited with code {}", display_code(.code))]
    ProcessExit {
        /// Exit code, `None` when the process was killed by a signal
        code: Option<i32>,
    },

    /// The query was aborted through its abort controller
    #[error("Claude Code process aborted by user")]
    Aborted,

    /// A line of output was not valid JSON
    #[error("Invalid JSON from Claude Code: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while reading from the process
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Options could not be turned into CLI arguments
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Whether this error was caused by an abort
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Exit code of the process, for [`QueryError::ProcessExit`]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ProcessExit { code } => *code,
            _ => None,
        }
    }
}

impl From<TransportError> for QueryError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Spawn { source, .. } => Self::Spawn(source.to_string()),
            TransportError::Io(e) => Self::Io(e),
            TransportError::Serialization(e) => Self::Json(e),
            TransportError::Process(msg) => Self::Io(std::io::Error::other(msg)),
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "null".to_string(), |c| c.to_string())
}
