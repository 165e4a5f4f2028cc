//! Action configuration
//!
//! Maps action inputs onto [`QueryOptions`]. Every input is optional except
//! `prompt`, which the query itself validates.

use crate::gha::Inputs;
use claude_code_sdk::{AbortController, McpServerConfig, PermissionMode, QueryOptions};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Errors in action inputs
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A numeric input did not parse
    #[error("input '{input}' must be a non-negative integer, got '{value}'")]
    InvalidNumber {
        /// Input name
        input: &'static str,
        /// Raw value
        value: String,
    },

    /// Unknown permission mode
    #[error("input 'permissionMode': {0}")]
    InvalidPermissionMode(String),

    /// `mcpConfig` was not a valid server map
    #[error("input 'mcpConfig' is not a valid MCP server config: {0}")]
    InvalidMcpConfig(#[from] serde_json::Error),
}

/// Everything the action needs to run one query
#[derive(Debug, Clone, Default)]
pub struct ActionConfig {
    /// Prompt sent to Claude Code
    pub prompt: String,

    /// Anthropic API key, passed to the CLI as `ANTHROPIC_API_KEY`
    pub api_key: Option<String>,

    /// Model override
    pub model: Option<String>,

    /// Turn limit
    pub max_turns: Option<u32>,

    /// Tools allowed without prompting
    pub allowed_tools: Vec<String>,

    /// Tools that may not be used
    pub disallowed_tools: Vec<String>,

    /// Replacement system prompt
    pub system_prompt: Option<String>,

    /// Text appended to the system prompt
    pub append_system_prompt: Option<String>,

    /// Permission mode
    pub permission_mode: PermissionMode,

    /// Path to the Claude Code CLI
    pub cli_path: Option<PathBuf>,

    /// Runtime used to launch the CLI, such as `node`
    pub executable: Option<String>,

    /// MCP servers by name
    pub mcp_servers: BTreeMap<String, McpServerConfig>,

    /// Working directory for the CLI
    pub cwd: Option<PathBuf>,
}

impl ActionConfig {
    /// Read the configuration from action inputs
    pub fn from_inputs(inputs: &Inputs) -> Result<Self, ConfigError> {
        let max_turns = match inputs.get_optional("maxTurns") {
            Some(value) => Some(value.parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
                input: "maxTurns",
                value,
            })?),
            None => None,
        };

        let permission_mode = match inputs.get_optional("permissionMode") {
            Some(value) => value
                .parse::<PermissionMode>()
                .map_err(ConfigError::InvalidPermissionMode)?,
            None => PermissionMode::Default,
        };

        let mcp_servers = match inputs.get_optional("mcpConfig") {
            Some(raw) => parse_mcp_servers(&raw)?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            prompt: inputs.get("prompt"),
            api_key: inputs.get_optional("apiKey"),
            model: inputs.get_optional("model"),
            max_turns,
            allowed_tools: split_list(&inputs.get("allowedTools")),
            disallowed_tools: split_list(&inputs.get("disallowedTools")),
            system_prompt: inputs.get_optional("systemPrompt"),
            append_system_prompt: inputs.get_optional("appendSystemPrompt"),
            permission_mode,
            cli_path: inputs.get_optional("claudeCodePath").map(PathBuf::from),
            executable: inputs.get_optional("executable"),
            mcp_servers,
            cwd: inputs.get_optional("cwd").map(PathBuf::from),
        })
    }

    /// Split into the prompt and the query options
    pub fn into_query(self, abort_controller: AbortController) -> (String, QueryOptions) {
        let mut options = QueryOptions::new()
            .with_abort_controller(abort_controller)
            .with_allowed_tools(self.allowed_tools)
            .with_disallowed_tools(self.disallowed_tools)
            .with_permission_mode(self.permission_mode);

        options.model = self.model;
        options.max_turns = self.max_turns;
        options.custom_system_prompt = self.system_prompt;
        options.append_system_prompt = self.append_system_prompt;
        options.path_to_claude_code_executable = self.cli_path;
        options.executable = self.executable;
        options.mcp_servers = self.mcp_servers;
        options.cwd = self.cwd;

        if let Some(key) = self.api_key {
            options = options.with_env("ANTHROPIC_API_KEY", key);
        }

        (self.prompt, options)
    }
}

/// Comma- or newline-separated list, blanks dropped
fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Accepts either `{"mcpServers": {...}}` or the bare server map
fn parse_mcp_servers(raw: &str) -> Result<BTreeMap<String, McpServerConfig>, ConfigError> {
    let mut value: serde_json::Value = serde_json::from_str(raw)?;
    if let Some(servers) = value.get_mut("mcpServers") {
        value = servers.take();
    }
    Ok(serde_json::from_value(value)?)
}
