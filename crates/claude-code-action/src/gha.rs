//! GitHub Actions inputs and workflow-command logging
//!
//! Inputs arrive as `INPUT_<NAME>` environment variables. Log lines go to
//! stdout, where the runner picks up `::error::`-style workflow commands.

use std::collections::HashMap;
use std::fmt::Display;
use std::io::{self, Write};

/// Prefix of input environment variables
pub const INPUT_PREFIX: &str = "INPUT_";

/// Platform line terminator
pub const LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Read one input straight from the environment
///
/// Reads `INPUT_<NAME>` with the name upper-cased and trims the value.
/// An unset variable yields an empty string.
pub fn get_input(name: &str) -> String {
    std::env::var(input_var(name))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn input_var(name: &str) -> String {
    format!("{}{}", INPUT_PREFIX, name.to_uppercase())
}

/// Snapshot of all action inputs
///
/// [`Inputs::from_env`] is the only place the action reads its inputs from
/// the environment; everything downstream receives values explicitly.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    values: HashMap<String, String>,
}

impl Inputs {
    /// Capture every `INPUT_*` variable
    pub fn from_env() -> Self {
        let values = std::env::vars_os()
            .filter_map(|(key, value)| {
                let key = key.into_string().ok()?;
                let name = key.strip_prefix(INPUT_PREFIX)?.to_string();
                Some((name, value.into_string().ok()?))
            })
            .collect();
        Self { values }
    }

    /// Build a snapshot from input names and values
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(name, value)| (name.as_ref().to_uppercase(), value.into()))
            .collect();
        Self { values }
    }

    /// Trimmed value of an input, or an empty string
    pub fn get(&self, name: &str) -> String {
        self.values
            .get(&name.to_uppercase())
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }

    /// Trimmed value of an input, `None` when unset or blank
    pub fn get_optional(&self, name: &str) -> Option<String> {
        Some(self.get(name)).filter(|value| !value.is_empty())
    }
}

/// Writes log lines and workflow commands
#[derive(Debug)]
pub struct Logger<W: Write> {
    out: W,
}

impl<W: Write> Logger<W> {
    /// Log to the given writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Plain informational line
    pub fn info(&mut self, message: impl Display) -> io::Result<()> {
        write!(self.out, "{}{}", message, LINE_ENDING)
    }

    /// `::error::` annotation
    pub fn error(&mut self, message: impl Display) -> io::Result<()> {
        self.command("error", message)
    }

    /// `::warning::` annotation
    pub fn warning(&mut self, message: impl Display) -> io::Result<()> {
        self.command("warning", message)
    }

    /// `::debug::` line, shown when step debugging is on
    pub fn debug(&mut self, message: impl Display) -> io::Result<()> {
        self.command("debug", message)
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn command(&mut self, name: &str, message: impl Display) -> io::Result<()> {
        let message = escape_data(&message.to_string());
        write!(self.out, "::{}::{}{}", name, message, LINE_ENDING)
    }
}

/// Escape a workflow command payload so multi-line messages stay one command
fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Write to the workflow log on stdout
///
/// A failed write is reported through tracing and otherwise ignored.
pub fn with_stdout<F>(write: F)
where
    F: FnOnce(&mut Logger<io::StdoutLock<'static>>) -> io::Result<()>,
{
    write_or_report(io::stdout().lock(), write);
}

/// Returns whether the write succeeded
fn write_or_report<W, F>(out: W, write: F) -> bool
where
    W: Write,
    F: FnOnce(&mut Logger<W>) -> io::Result<()>,
{
    let mut logger = Logger::new(out);
    match write(&mut logger).and_then(|()| logger.out.flush()) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to write to the workflow log");
            false
        }
    }
}

/// Log an informational line to stdout
pub fn log_info(message: impl Display) {
    with_stdout(|log| log.info(message));
}

/// Log an error annotation to stdout
pub fn log_error(message: impl Display) {
    with_stdout(|log| log.error(message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn captured(write: impl FnOnce(&mut Logger<Vec<u8>>) -> io::Result<()>) -> String {
        let mut logger = Logger::new(Vec::new());
        write(&mut logger).unwrap();
        String::from_utf8(logger.into_inner()).unwrap()
    }

    #[test]
    fn test_info_line() {
        let out = captured(|log| log.info("hello"));
        assert_eq!(out, format!("hello{}", LINE_ENDING));
    }

    #[rstest]
    #[case::error("error")]
    #[case::warning("warning")]
    #[case::debug("debug")]
    fn test_command_prefix(#[case] name: &str) {
        let out = captured(|log| match name {
            "error" => log.error("boom"),
            "warning" => log.warning("boom"),
            _ => log.debug("boom"),
        });
        assert_eq!(out, format!("::{}::boom{}", name, LINE_ENDING));
    }

    #[test]
    fn test_error_with_std_error() {
        let err = io::Error::other("Prompt is required");
        let out = captured(|log| log.error(&err));
        assert_eq!(out, format!("::error::Prompt is required{}", LINE_ENDING));
    }

    #[test]
    fn test_multiline_command_is_escaped() {
        let out = captured(|log| log.error("first\nsecond 100%"));
        assert_eq!(out, format!("::error::first%0Asecond 100%25{}", LINE_ENDING));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_is_reported_not_raised() {
        assert!(!write_or_report(BrokenPipe, |log| log.error("lost")));
        assert!(write_or_report(Vec::new(), |log| log.info("kept")));
    }

    #[test]
    fn test_inputs_from_pairs() {
        let inputs = Inputs::from_pairs([("apiKey", "  sk-123 \n"), ("prompt", "hi")]);
        assert_eq!(inputs.get("apiKey"), "sk-123");
        assert_eq!(inputs.get("APIKEY"), "sk-123");
        assert_eq!(inputs.get("prompt"), "hi");
        assert_eq!(inputs.get("missing"), "");
    }

    #[test]
    fn test_inputs_get_optional() {
        let inputs = Inputs::from_pairs([("model", "   "), ("maxTurns", "3")]);
        assert_eq!(inputs.get_optional("model"), None);
        assert_eq!(inputs.get_optional("maxTurns").as_deref(), Some("3"));
        assert_eq!(inputs.get_optional("unset"), None);
    }
}
