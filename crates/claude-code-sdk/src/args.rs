//! CLI argument construction
//!
//! Turns a prompt and [`QueryOptions`] into the argument vector for
//! `claude`. Flag order is fixed and always ends with `--print <prompt>`.

use crate::error::{QueryError, Result};
use crate::options::{McpServerConfig, PermissionMode, QueryOptions};
use serde::Serialize;
use std::collections::BTreeMap;

/// Payload of `--mcp-config`
#[derive(Serialize)]
struct McpConfig<'a> {
    #[serde(rename = "mcpServers")]
    mcp_servers: &'a BTreeMap<String, McpServerConfig>,
}

/// Build the CLI arguments for a query
///
/// # Errors
///
/// Returns [`QueryError::InvalidPrompt`] if the prompt is blank, and
/// [`QueryError::Config`] if the MCP server map cannot be serialized.
pub fn build_args(prompt: &str, options: &QueryOptions) -> Result<Vec<String>> {
    let mut args: Vec<String> = vec![
        "--output-format".into(),
        "stream-json".into(),
        "--verbose".into(),
    ];

    if let Some(prompt) = non_empty(&options.custom_system_prompt) {
        args.extend(["--system-prompt".into(), prompt.to_string()]);
    }
    if let Some(prompt) = non_empty(&options.append_system_prompt) {
        args.extend(["--append-system-prompt".into(), prompt.to_string()]);
    }
    if let Some(turns) = options.max_turns.filter(|t| *t > 0) {
        args.extend(["--max-turns".into(), turns.to_string()]);
    }
    if let Some(model) = non_empty(&options.model) {
        args.extend(["--model".into(), model.to_string()]);
    }
    if let Some(tool) = non_empty(&options.permission_prompt_tool_name) {
        args.extend(["--permission-prompt-tool".into(), tool.to_string()]);
    }
    if options.continue_conversation {
        args.push("--continue".into());
    }
    if let Some(session) = non_empty(&options.resume) {
        args.extend(["--resume".into(), session.to_string()]);
    }
    if !options.allowed_tools.is_empty() {
        args.extend(["--allowedTools".into(), options.allowed_tools.join(",")]);
    }
    if !options.disallowed_tools.is_empty() {
        args.extend(["--disallowedTools".into(), options.disallowed_tools.join(",")]);
    }
    if !options.mcp_servers.is_empty() {
        let config = McpConfig {
            mcp_servers: &options.mcp_servers,
        };
        let encoded = serde_json::to_string(&config)
            .map_err(|e| QueryError::Config(format!("invalid MCP server config: {}", e)))?;
        args.extend(["--mcp-config".into(), encoded]);
    }
    if options.permission_mode != PermissionMode::Default {
        args.extend([
            "--permission-mode".into(),
            options.permission_mode.as_str().to_string(),
        ]);
    }

    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(QueryError::InvalidPrompt);
    }
    args.extend(["--print".into(), prompt.to_string()]);

    Ok(args)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
