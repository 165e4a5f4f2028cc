//! Run Claude Code as a subprocess and stream its messages
//!
//! This crate wraps the Claude Code CLI in non-interactive mode
//! (`--print` with `--output-format stream-json`). A query spawns one CLI
//! process, yields its output as [`Message`] values while it runs, and maps
//! the exit status to success or a typed [`QueryError`].
//!
//! # Architecture
//!
//! 1. **Options** ([`options`]): explicit configuration, no ambient state
//! 2. **Arguments** ([`args`]): options to CLI flags
//! 3. **Transport** (`claude-code-transport`): process spawn and line reading
//! 4. **Query** ([`query`]): the message stream and its lifecycle
//!
//! # Usage Example
//!
//! ```no_run
//! use claude_code_sdk::{AbortController, QueryOptions, query};
//!
//! # async fn example() -> Result<(), claude_code_sdk::QueryError> {
//! let controller = AbortController::new();
//! let options = QueryOptions::new()
//!     .with_max_turns(3)
//!     .with_abort_controller(controller.clone());
//!
//! let messages = query("Write a haiku about foo.py", options)?
//!     .collect_messages()
//!     .await?;
//! println!("{} messages", messages.len());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod abort;
pub mod args;
pub mod error;
pub mod message;
pub mod options;
pub mod query;

// Re-export commonly used types
pub use abort::{AbortController, AbortSignal};
pub use args::build_args;
pub use error::{QueryError, Result};
pub use message::{Message, MessageKind};
pub use options::{McpServerConfig, PermissionMode, QueryOptions};
pub use query::{Query, query};
