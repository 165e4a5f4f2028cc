//! Transport error types

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while running the CLI process
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The operating system refused to start the process
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that was being started
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// I/O error while talking to the process
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of output was not valid JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Process management error (missing pipe, signal delivery)
    #[error("Process error: {0}")]
    Process(String),
}
