//! Query options
//!
//! Everything that shapes a query is passed explicitly through
//! [`QueryOptions`]; nothing is read from or written to the process
//! environment here.

use crate::abort::AbortController;
use claude_code_transport::StderrCallback;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default CLI program name, looked up on `PATH`
pub const DEFAULT_CLI_PATH: &str = "claude";

/// Permission mode for tool use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    /// Ask for permission for each tool use
    #[default]
    Default,

    /// Automatically accept edits without asking
    AcceptEdits,

    /// Bypass permission checks entirely
    BypassPermissions,

    /// Plan only, do not execute tools
    Plan,
}

impl PermissionMode {
    /// Value passed to `--permission-mode`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::AcceptEdits => "acceptEdits",
            Self::BypassPermissions => "bypassPermissions",
            Self::Plan => "plan",
        }
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "acceptEdits" => Ok(Self::AcceptEdits),
            "bypassPermissions" => Ok(Self::BypassPermissions),
            "plan" => Ok(Self::Plan),
            other => Err(format!("unknown permission mode: {}", other)),
        }
    }
}

/// MCP server definition passed through `--mcp-config`
///
/// Kept as the raw JSON object so fields the CLI understands but this crate
/// does not model reach it unchanged. A server without a `type` is a stdio
/// server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct McpServerConfig(Map<String, Value>);

impl McpServerConfig {
    /// Stdio server running `command`
    pub fn stdio(command: impl Into<String>) -> Self {
        Self::default().with_field("type", "stdio").with_field("command", command.into())
    }

    /// Server reached over server-sent events at `url`
    pub fn sse(url: impl Into<String>) -> Self {
        Self::default().with_field("type", "sse").with_field("url", url.into())
    }

    /// Server reached over streamable HTTP at `url`
    pub fn http(url: impl Into<String>) -> Self {
        Self::default().with_field("type", "http").with_field("url", url.into())
    }

    /// Command arguments of a stdio server
    pub fn with_args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<Value> = args.into_iter().map(|a| Value::String(a.into())).collect();
        self.with_field("args", args)
    }

    /// Set an arbitrary field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Transport type, `stdio` when the field is absent
    pub fn transport(&self) -> &str {
        self.0
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("stdio")
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for McpServerConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Options for a single query
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Cancels the query when aborted
    pub abort_controller: AbortController,

    /// Tools the model may use without asking
    pub allowed_tools: Vec<String>,

    /// Text appended to the default system prompt
    pub append_system_prompt: Option<String>,

    /// Replaces the default system prompt
    pub custom_system_prompt: Option<String>,

    /// Working directory for the CLI
    pub cwd: Option<PathBuf>,

    /// Tools the model may not use
    pub disallowed_tools: Vec<String>,

    /// Runtime used to launch the CLI (for example `node`); `None` runs the
    /// CLI directly
    pub executable: Option<String>,

    /// Arguments for the runtime, placed before the CLI path
    pub executable_args: Vec<String>,

    /// Maximum number of agent turns
    pub max_turns: Option<u32>,

    /// MCP servers keyed by name
    pub mcp_servers: BTreeMap<String, McpServerConfig>,

    /// Path to the Claude Code CLI; defaults to [`DEFAULT_CLI_PATH`]
    pub path_to_claude_code_executable: Option<PathBuf>,

    /// Permission mode for tool use
    pub permission_mode: PermissionMode,

    /// MCP tool that answers permission prompts
    pub permission_prompt_tool_name: Option<String>,

    /// Continue the most recent conversation
    pub continue_conversation: bool,

    /// Session id to resume
    pub resume: Option<String>,

    /// Model to use
    pub model: Option<String>,

    /// Extra environment variables for the CLI
    pub env: HashMap<String, String>,

    /// Receives the CLI's stderr line by line
    pub stderr: Option<StderrCallback>,
}

impl QueryOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the abort controller
    pub fn with_abort_controller(mut self, controller: AbortController) -> Self {
        self.abort_controller = controller;
        self
    }

    /// Set the allowed tools
    pub fn with_allowed_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Set the disallowed tools
    pub fn with_disallowed_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disallowed_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Append text to the default system prompt
    pub fn with_append_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.append_system_prompt = Some(prompt.into());
        self
    }

    /// Replace the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_system_prompt = Some(prompt.into());
        self
    }

    /// Set the working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Launch the CLI through a runtime such as `node`
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    /// Set runtime arguments
    pub fn with_executable_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.executable_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the maximum number of turns
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = Some(turns);
        self
    }

    /// Add an MCP server
    pub fn add_mcp_server(mut self, name: impl Into<String>, server: McpServerConfig) -> Self {
        self.mcp_servers.insert(name.into(), server);
        self
    }

    /// Set the CLI path
    pub fn with_cli_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path_to_claude_code_executable = Some(path.into());
        self
    }

    /// Set the permission mode
    pub fn with_permission_mode(mut self, mode: PermissionMode) -> Self {
        self.permission_mode = mode;
        self
    }

    /// Set the permission prompt tool
    pub fn with_permission_prompt_tool(mut self, tool: impl Into<String>) -> Self {
        self.permission_prompt_tool_name = Some(tool.into());
        self
    }

    /// Continue the most recent conversation
    pub fn with_continue(mut self, enabled: bool) -> Self {
        self.continue_conversation = enabled;
        self
    }

    /// Resume a session by id
    pub fn with_resume(mut self, session_id: impl Into<String>) -> Self {
        self.resume = Some(session_id.into());
        self
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set an environment variable for the CLI
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Receive CLI stderr lines
    pub fn with_stderr<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.stderr = Some(StderrCallback::new(callback));
        self
    }

    /// The configured CLI path, or the default
    pub fn cli_path(&self) -> PathBuf {
        self.path_to_claude_code_executable
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLI_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_options() {
        let options = QueryOptions::default();
        assert_eq!(options.permission_mode, PermissionMode::Default);
        assert!(options.allowed_tools.is_empty());
        assert!(options.mcp_servers.is_empty());
        assert!(!options.continue_conversation);
        assert!(!options.abort_controller.is_aborted());
        assert_eq!(options.cli_path(), PathBuf::from("claude"));
    }

    #[test]
    fn test_options_builder() {
        let options = QueryOptions::new()
            .with_model("claude-sonnet-4-5")
            .with_max_turns(3)
            .with_allowed_tools(["Read", "Grep"])
            .with_permission_mode(PermissionMode::AcceptEdits)
            .with_cli_path("/usr/local/bin/claude")
            .with_env("ANTHROPIC_API_KEY", "sk-test");

        assert_eq!(options.model.as_deref(), Some("claude-sonnet-4-5"));
        assert_eq!(options.max_turns, Some(3));
        assert_eq!(options.allowed_tools, vec!["Read", "Grep"]);
        assert_eq!(options.permission_mode, PermissionMode::AcceptEdits);
        assert_eq!(options.cli_path(), PathBuf::from("/usr/local/bin/claude"));
        assert_eq!(
            options.env.get("ANTHROPIC_API_KEY").map(String::as_str),
            Some("sk-test")
        );
    }

    #[rstest]
    #[case(PermissionMode::Default, "default")]
    #[case(PermissionMode::AcceptEdits, "acceptEdits")]
    #[case(PermissionMode::BypassPermissions, "bypassPermissions")]
    #[case(PermissionMode::Plan, "plan")]
    fn test_permission_mode_names(#[case] mode: PermissionMode, #[case] name: &str) {
        assert_eq!(mode.as_str(), name);
        assert_eq!(name.parse::<PermissionMode>().unwrap(), mode);
        assert_eq!(serde_json::to_value(mode).unwrap(), name);
    }

    #[test]
    fn test_unknown_permission_mode() {
        assert!("yolo".parse::<PermissionMode>().is_err());
    }

    #[test]
    fn test_mcp_server_serialization() {
        let server = McpServerConfig::stdio("npx").with_args(["-y", "server-fs"]);
        assert_eq!(
            serde_json::to_value(&server).unwrap(),
            serde_json::json!({"type": "stdio", "command": "npx", "args": ["-y", "server-fs"]})
        );

        let http: McpServerConfig =
            serde_json::from_value(serde_json::json!({"type": "http", "url": "https://x"}))
                .unwrap();
        assert_eq!(http, McpServerConfig::http("https://x"));
        assert_eq!(http.transport(), "http");
    }

    #[test]
    fn test_mcp_server_without_type_is_stdio() {
        let raw = serde_json::json!({
            "command": "npx",
            "args": ["-y", "server-fs"],
            "cwd": "/srv",
            "timeout": 30
        });
        let server: McpServerConfig = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(server.transport(), "stdio");
        assert_eq!(server.get("cwd"), Some(&serde_json::json!("/srv")));
        assert_eq!(serde_json::to_value(&server).unwrap(), raw);
    }

    #[test]
    fn test_mcp_server_must_be_object() {
        assert!(serde_json::from_value::<McpServerConfig>(serde_json::json!("npx")).is_err());
    }
}
