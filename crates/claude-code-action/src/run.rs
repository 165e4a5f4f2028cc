//! Runs the configured query and relays its messages

use crate::config::ActionConfig;
use crate::gha::Logger;
use claude_code_sdk::{AbortController, Message, query};
use futures::StreamExt;
use std::io::{self, Write};

/// Run the query, handing each message to `on_message` as it arrives
///
/// Returns every message once the CLI exits successfully. On failure the
/// messages already relayed are not returned.
pub async fn run<F>(
    config: ActionConfig,
    abort_controller: AbortController,
    mut on_message: F,
) -> claude_code_sdk::Result<Vec<Message>>
where
    F: FnMut(&Message),
{
    let (prompt, options) = config.into_query(abort_controller);
    let mut stream = query(prompt, options)?;

    let mut messages = Vec::new();
    while let Some(message) = stream.next().await {
        let message = message?;
        tracing::debug!(kind = ?message.kind(), "Received message");
        on_message(&message);
        messages.push(message);
    }

    tracing::debug!(count = messages.len(), "Query finished");
    Ok(messages)
}

/// Write one message to the workflow log
///
/// The raw JSON goes out as an info line. A result the CLI marked as an
/// error also raises a `::warning::` annotation.
pub fn relay<W: Write>(logger: &mut Logger<W>, message: &Message) -> io::Result<()> {
    logger.info(message.as_value())?;
    if message.is_error_result() {
        let detail = message.result_text().unwrap_or("no details");
        logger.warning(format!("Claude Code reported an error result: {}", detail))?;
    }
    Ok(())
}

/// One-line summary of a finished run
pub fn summarize(messages: &[Message]) -> String {
    let result = messages.iter().rev().find(|m| m.is_result());
    match result.and_then(Message::result_text) {
        Some(text) => format!(
            "Claude Code finished with {} messages: {}",
            messages.len(),
            text
        ),
        None => format!("Claude Code finished with {} messages", messages.len()),
    }
}
