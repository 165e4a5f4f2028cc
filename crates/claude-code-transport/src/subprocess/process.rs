//! Process management for CLI subprocess

use crate::error::{Result, TransportError};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

/// Callback invoked with each line the process writes to stderr
#[derive(Clone)]
pub struct StderrCallback(Arc<dyn Fn(&str) + Send + Sync>);

impl StderrCallback {
    /// Wrap a closure as a stderr callback
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    /// Invoke the callback with one line of output
    pub fn call(&self, line: &str) {
        (self.0)(line)
    }
}

impl fmt::Debug for StderrCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StderrCallback(..)")
    }
}

/// Configuration for spawning a CLI process
#[derive(Clone, Debug)]
pub struct ProcessConfig {
    /// Program to execute
    pub program: PathBuf,

    /// Arguments to pass to the program
    pub args: Vec<String>,

    /// Environment variables set on top of the inherited environment
    pub env: HashMap<String, String>,

    /// Whether the child starts from a copy of the parent environment
    pub inherit_env: bool,

    /// Working directory for the child
    pub cwd: Option<PathBuf>,

    /// Receives stderr output line by line
    pub stderr: Option<StderrCallback>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self::new("claude")
    }
}

impl ProcessConfig {
    /// Create a new process configuration
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            inherit_env: true,
            cwd: None,
            stderr: None,
        }
    }

    /// Add an argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add several arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Control whether the parent environment is passed through
    ///
    /// When disabled, only variables set via [`ProcessConfig::with_env`]
    /// reach the child.
    pub fn with_inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    /// Set the working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the stderr callback
    pub fn with_stderr(mut self, callback: StderrCallback) -> Self {
        self.stderr = Some(callback);
        self
    }

    /// Render the program and arguments as a single line for logging
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if !self.inherit_env {
            cmd.env_clear();
        }
        cmd.envs(&self.env);

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Handle to a running CLI process
///
/// Dropping the handle kills the process if it is still running.
pub struct ProcessHandle {
    child: Child,
    stdout: Lines<BufReader<ChildStdout>>,
    status: Option<ExitStatus>,
    config: ProcessConfig,
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.child.id())
            .field("status", &self.status)
            .field("config", &self.config)
            .finish()
    }
}

impl ProcessHandle {
    /// Spawn a new CLI process
    ///
    /// Must be called from within a Tokio runtime. Stdin is closed
    /// immediately; the CLI receives its whole request through arguments.
    pub fn spawn(config: ProcessConfig) -> Result<Self> {
        let mut child = config
            .to_command()
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: config.program.display().to_string(),
                source,
            })?;

        // No input is ever written
        drop(child.stdin.take());

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Process("Failed to get stdout".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr, config.stderr.clone()));
        }

        tracing::debug!(pid = child.id(), program = %config.program.display(), "Spawned CLI process");

        Ok(Self {
            child,
            stdout: BufReader::new(stdout).lines(),
            status: None,
            config,
        })
    }

    /// Read the next raw line from stdout
    ///
    /// Returns `None` once stdout reaches EOF. Cancel safe.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.stdout.next_line().await?)
    }

    /// Receive the next JSON message from stdout
    ///
    /// Whitespace-only lines are skipped. Returns `None` at EOF.
    pub async fn recv_message(&mut self) -> Result<Option<serde_json::Value>> {
        loop {
            match self.read_line().await? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(serde_json::from_str(&line)?)),
            }
        }
    }

    /// Check if the process is still alive
    pub fn is_alive(&mut self) -> bool {
        self.poll_exit().map(|status| status.is_none()).unwrap_or(false)
    }

    /// Ask the process to exit
    ///
    /// Sends SIGTERM on unix and kills the process elsewhere. Does nothing
    /// if the process has already exited.
    pub fn terminate(&mut self) -> Result<()> {
        if self.poll_exit()?.is_some() {
            return Ok(());
        }

        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        tracing::debug!(pid, "Terminating CLI process");
        send_terminate(&mut self.child, pid)
    }

    /// Wait for the process to exit and return its status
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        if let Some(status) = self.status {
            return Ok(status);
        }
        let status = self.child.wait().await?;
        tracing::debug!(?status, "CLI process exited");
        self.status = Some(status);
        Ok(status)
    }

    /// Process id, if the process has not been reaped yet
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Get the process configuration
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    fn poll_exit(&mut self) -> Result<Option<ExitStatus>> {
        if self.status.is_none() {
            self.status = self.child.try_wait()?;
        }
        Ok(self.status)
    }
}

#[cfg(unix)]
fn send_terminate(_child: &mut Child, pid: u32) -> Result<()> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let pid = i32::try_from(pid)
        .map_err(|_| TransportError::Process(format!("pid {} out of range", pid)))?;
    kill(Pid::from_raw(pid), Signal::SIGTERM)
        .map_err(|e| TransportError::Process(format!("Failed to send SIGTERM: {}", e)))
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child, _pid: u32) -> Result<()> {
    Ok(child.start_kill()?)
}

async fn forward_stderr(stderr: ChildStderr, callback: Option<StderrCallback>) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                tracing::debug!(target: "claude_code_transport::stderr", "{}", line);
                if let Some(callback) = &callback {
                    callback.call(&line);
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Stopped reading CLI stderr");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(script: &str) -> ProcessConfig {
        ProcessConfig::new("/bin/sh").with_arg("-c").with_arg(script)
    }

    #[test]
    fn test_process_config_default() {
        let config = ProcessConfig::default();
        assert_eq!(config.program, PathBuf::from("claude"));
        assert!(config.args.is_empty());
        assert!(config.inherit_env);
    }

    #[test]
    fn test_process_config_builder() {
        let config = ProcessConfig::new("my-claude")
            .with_arg("--verbose")
            .with_args(["--print", "hi"])
            .with_env("ANTHROPIC_API_KEY", "sk-123")
            .with_inherit_env(false)
            .with_cwd("/tmp");

        assert_eq!(config.program, PathBuf::from("my-claude"));
        assert_eq!(config.args, vec!["--verbose", "--print", "hi"]);
        assert_eq!(
            config.env.get("ANTHROPIC_API_KEY"),
            Some(&"sk-123".to_string())
        );
        assert!(!config.inherit_env);
        assert_eq!(config.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(config.command_line(), "my-claude --verbose --print hi");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_recv_message_skips_blank_lines() {
        let mut process =
            ProcessHandle::spawn(shell(r#"printf '{"a":1}\n\n   \n{"b":2}\n'"#)).unwrap();

        let first = process.recv_message().await.unwrap().unwrap();
        let second = process.recv_message().await.unwrap().unwrap();
        assert_eq!(first["a"], 1);
        assert_eq!(second["b"], 2);
        assert!(process.recv_message().await.unwrap().is_none());
        assert!(process.wait().await.unwrap().success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_recv_message_invalid_json() {
        let mut process = ProcessHandle::spawn(shell("echo 'not json'")).unwrap();
        let err = process.recv_message().await.unwrap_err();
        assert!(matches!(err, TransportError::Serialization(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_is_reported() {
        let mut process = ProcessHandle::spawn(shell("exit 3")).unwrap();
        assert!(process.read_line().await.unwrap().is_none());
        let status = process.wait().await.unwrap();
        assert_eq!(status.code(), Some(3));
        assert!(!process.is_alive());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_env_is_passed_to_child() {
        let config = shell(r#"printf '{"value":"%s"}\n' "$CLAUDE_TEST_VALUE""#)
            .with_env("CLAUDE_TEST_VALUE", "hello");
        let mut process = ProcessHandle::spawn(config).unwrap();
        let message = process.recv_message().await.unwrap().unwrap();
        assert_eq!(message["value"], "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_env_clear_hides_parent_environment() {
        let config = shell(r#"printf '{"home":"%s"}\n' "$HOME""#).with_inherit_env(false);
        let mut process = ProcessHandle::spawn(config).unwrap();
        let message = process.recv_message().await.unwrap().unwrap();
        assert_eq!(message["home"], "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_running_process() {
        let mut process = ProcessHandle::spawn(shell("exec sleep 30")).unwrap();
        assert!(process.is_alive());

        process.terminate().unwrap();
        let status = process.wait().await.unwrap();
        assert!(!status.success());
        assert_eq!(status.code(), None);

        // Second terminate after exit is a no-op
        process.terminate().unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_callback_receives_lines() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&seen);
        let config = shell("echo oops >&2; sleep 0.2").with_stderr(StderrCallback::new(
            move |line| sink.lock().unwrap().push(line.to_string()),
        ));

        let mut process = ProcessHandle::spawn(config).unwrap();
        process.wait().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["oops".to_string()]);
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        let err = ProcessHandle::spawn(ProcessConfig::new("/definitely/not/here/claude"))
            .unwrap_err();
        match err {
            TransportError::Spawn { program, .. } => {
                assert_eq!(program, "/definitely/not/here/claude")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
