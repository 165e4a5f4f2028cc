use anyhow::Context;
use claude_code_action::run::summarize;
use claude_code_action::{
    ActionConfig, Inputs, abort_on_shutdown, log_error, log_info, relay, run, with_stdout,
};
use claude_code_sdk::AbortController;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run_action().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

async fn run_action() -> anyhow::Result<()> {
    let inputs = Inputs::from_env();
    let config = ActionConfig::from_inputs(&inputs).context("invalid action inputs")?;

    let controller = AbortController::new();
    abort_on_shutdown(controller.clone()).context("failed to install signal handlers")?;

    let messages = run(config, controller, |message| {
        with_stdout(|log| relay(log, message))
    })
    .await?;
    log_info(summarize(&messages));
    Ok(())
}

/// Diagnostics go to stderr; stdout carries workflow commands
fn init_tracing() {
    let default_level = if debug_requested() { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn debug_requested() -> bool {
    std::env::var_os("DEBUG").is_some()
        || std::env::var("RUNNER_DEBUG").is_ok_and(|value| value == "1")
}
