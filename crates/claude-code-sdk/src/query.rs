//! Query execution and message streaming
//!
//! [`query`] validates the request, locates the CLI and returns a [`Query`]:
//! a stream that spawns the process on first poll and yields one [`Message`]
//! per non-empty stdout line.
//!
//! # Lifecycle
//!
//! 1. Blank prompt or missing CLI fail immediately, before anything runs
//! 2. First poll spawns the process; a spawn failure is yielded as the first
//!    and only item
//! 3. Lines are decoded as they arrive; invalid JSON ends the stream with an
//!    error
//! 4. At EOF the exit status decides the last item: nothing for zero,
//!    [`QueryError::ProcessExit`] otherwise
//! 5. Aborting at any point terminates the process and yields
//!    [`QueryError::Aborted`]
//!
//! # Example
//!
//! ```no_run
//! # use claude_code_sdk::{query, QueryOptions};
//! # use futures::StreamExt;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut stream = query("Write a haiku about foo.py", QueryOptions::new().with_max_turns(3))?;
//! while let Some(message) = stream.next().await {
//!     println!("{:?}", message?.kind());
//! }
//! # Ok(())
//! # }
//! ```

use crate::abort::{AbortController, AbortSignal};
use crate::args::build_args;
use crate::error::{QueryError, Result};
use crate::message::Message;
use crate::options::QueryOptions;
use claude_code_transport::{ProcessConfig, ProcessHandle, resolve_executable};
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;
use std::process::ExitStatus;
use std::task::{Context, Poll};
use std::time::Duration;

/// Environment variable telling the CLI which client launched it
pub const ENTRYPOINT_ENV: &str = "CLAUDE_CODE_ENTRYPOINT";

/// Value of [`ENTRYPOINT_ENV`] for this SDK
pub const ENTRYPOINT: &str = "sdk-rust";

/// How long an aborted process gets to exit before it is killed
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Run a prompt through the Claude Code CLI
///
/// # Errors
///
/// Returns [`QueryError::InvalidPrompt`] for a blank prompt and
/// [`QueryError::ExecutableNotFound`] when the CLI path does not resolve.
/// Both are checked before any process is started. Failures after that
/// point are yielded by the returned stream.
pub fn query(prompt: impl AsRef<str>, options: QueryOptions) -> Result<Query> {
    let args = build_args(prompt.as_ref(), &options)?;

    let cli_path = options.cli_path();
    let resolved = resolve_executable(&cli_path)
        .ok_or_else(|| QueryError::ExecutableNotFound { path: cli_path })?;

    let config = process_config(&resolved, args, &options);
    tracing::debug!("Spawning Claude Code process: {}", config.command_line());

    Ok(Query::new(config, options.abort_controller))
}

fn process_config(cli_path: &Path, args: Vec<String>, options: &QueryOptions) -> ProcessConfig {
    let mut config = match &options.executable {
        Some(runtime) => ProcessConfig::new(runtime)
            .with_args(options.executable_args.iter().cloned())
            .with_arg(cli_path.display().to_string()),
        None => ProcessConfig::new(cli_path),
    }
    .with_args(args)
    .with_env(ENTRYPOINT_ENV, ENTRYPOINT);

    config
        .env
        .extend(options.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    config.cwd = options.cwd.clone();
    config.stderr = options.stderr.clone();
    config
}

/// Stream of messages from a running query
///
/// Finite and not restartable. Dropping it kills the process if it is still
/// running.
#[must_use = "streams do nothing unless polled"]
pub struct Query {
    inner: Pin<Box<dyn Stream<Item = Result<Message>> + Send>>,
    abort_controller: AbortController,
}

impl Query {
    fn new(config: ProcessConfig, abort_controller: AbortController) -> Self {
        let state = QueryState {
            phase: Phase::Pending(Box::new(config)),
            signal: abort_controller.signal(),
        };

        let inner = futures::stream::unfold(state, |mut state| async move {
            let item = state.next_message().await?;
            Some((item, state))
        });

        Self {
            inner: Box::pin(inner),
            abort_controller,
        }
    }

    /// Controller that cancels this query
    pub fn abort_controller(&self) -> &AbortController {
        &self.abort_controller
    }

    /// Abort the query
    pub fn abort(&self) {
        self.abort_controller.abort();
    }

    /// Drain the stream into a vector
    ///
    /// Messages received before a failure are discarded.
    pub async fn collect_messages(self) -> Result<Vec<Message>> {
        self.try_collect().await
    }
}

impl Stream for Query {
    type Item = Result<Message>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

enum Phase {
    Pending(Box<ProcessConfig>),
    Running(ProcessHandle),
    Done,
}

struct QueryState {
    phase: Phase,
    signal: AbortSignal,
}

enum Step {
    Aborted,
    Read(claude_code_transport::Result<Option<serde_json::Value>>),
    Exited(claude_code_transport::Result<ExitStatus>),
}

impl QueryState {
    async fn next_message(&mut self) -> Option<Result<Message>> {
        if let Err(err) = self.start() {
            return Some(Err(err));
        }

        let Phase::Running(process) = &mut self.phase else {
            return None;
        };

        let step = tokio::select! {
            biased;
            _ = self.signal.aborted() => Step::Aborted,
            read = process.recv_message() => Step::Read(read),
        };

        let step = match step {
            Step::Read(Ok(Some(value))) => return Some(Ok(Message::new(value))),
            Step::Read(Ok(None)) => {
                tokio::select! {
                    biased;
                    _ = self.signal.aborted() => Step::Aborted,
                    status = process.wait() => Step::Exited(status),
                }
            }
            other => other,
        };

        match step {
            Step::Aborted => {
                self.abort_process().await;
                Some(Err(QueryError::Aborted))
            }
            Step::Read(Err(err)) | Step::Exited(Err(err)) => {
                self.finish();
                Some(Err(err.into()))
            }
            Step::Exited(Ok(status)) => {
                self.finish();
                if self.signal.is_aborted() {
                    Some(Err(QueryError::Aborted))
                } else if status.success() {
                    None
                } else {
                    Some(Err(QueryError::ProcessExit {
                        code: status.code(),
                    }))
                }
            }
            Step::Read(Ok(_)) => None,
        }
    }

    /// Spawn the process on first use
    ///
    /// A failed spawn leaves the state `Done`, so the error is the only item
    /// the stream produces.
    fn start(&mut self) -> Result<()> {
        if !matches!(self.phase, Phase::Pending(_)) {
            return Ok(());
        }
        let Phase::Pending(config) = std::mem::replace(&mut self.phase, Phase::Done) else {
            return Ok(());
        };

        if self.signal.is_aborted() {
            return Err(QueryError::Aborted);
        }

        let process = ProcessHandle::spawn(*config)?;
        self.phase = Phase::Running(process);
        Ok(())
    }

    async fn abort_process(&mut self) {
        if let Phase::Running(mut process) = std::mem::replace(&mut self.phase, Phase::Done) {
            tracing::info!(pid = process.id(), "Claude Code process aborted by user");
            if let Err(e) = process.terminate() {
                tracing::debug!(error = %e, "Failed to terminate aborted process");
            }
            if tokio::time::timeout(TERMINATE_GRACE, process.wait())
                .await
                .is_err()
            {
                tracing::debug!("Aborted process did not exit in time, killing");
            }
        }
    }

    fn finish(&mut self) {
        if let Phase::Running(mut process) = std::mem::replace(&mut self.phase, Phase::Done)
            && let Err(e) = process.terminate()
        {
            tracing::debug!(error = %e, "Failed to terminate process during cleanup");
        }
    }
}
