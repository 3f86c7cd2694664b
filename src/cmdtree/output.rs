//! Where text goes.
//!
//! Everything the dispatcher prints goes through an [`OutputSink`], so tests can capture output
//! instead of reading the real stdout. Values produced by commands are formatted by a
//! [`ValueSink`]; failures are reported by an [`ErrorHandler`]. Both are replaceable on the
//! [`crate::app::App`] builder.

use crate::error::{CliError, Result};
use colored::Colorize;
use serde_json::Value;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum Stream {
    Stdout,
    Stderr,
    Memory(Arc<Mutex<Vec<u8>>>),
}

impl Stream {
    fn write_str(&self, text: &str) -> io::Result<()> {
        match self {
            Stream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes())?;
                out.flush()
            }
            Stream::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(text.as_bytes())?;
                err.flush()
            }
            Stream::Memory(buffer) => {
                let mut buffer = buffer.lock().unwrap_or_else(|e| e.into_inner());
                buffer.extend_from_slice(text.as_bytes());
                Ok(())
            }
        }
    }

    fn contents(&self) -> String {
        match self {
            Stream::Memory(buffer) => {
                let buffer = buffer.lock().unwrap_or_else(|e| e.into_inner());
                String::from_utf8_lossy(&buffer).into_owned()
            }
            _ => String::new(),
        }
    }
}

/// A pair of output and error streams.
///
/// Clones share the same streams, so a captured sink can be handed to an app and read back
/// afterwards.
#[derive(Clone)]
pub struct OutputSink {
    out: Stream,
    err: Stream,
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::stdio()
    }
}

/// A one-off message for the user, separate from command results.
#[derive(Debug)]
pub enum Notice<'a> {
    Text(&'a str),
    Error(&'a CliError),
}

impl OutputSink {
    pub fn stdio() -> Self {
        Self {
            out: Stream::Stdout,
            err: Stream::Stderr,
        }
    }

    /// In-memory streams, read back with [`OutputSink::stdout`] and [`OutputSink::stderr`].
    pub fn capture() -> Self {
        Self {
            out: Stream::Memory(Arc::default()),
            err: Stream::Memory(Arc::default()),
        }
    }

    pub fn print(&self, text: &str) -> Result<()> {
        Ok(self.out.write_str(text)?)
    }

    pub fn println(&self, text: &str) -> Result<()> {
        self.print(&format!("{}\n", text))
    }

    pub fn eprintln(&self, text: &str) -> Result<()> {
        Ok(self.err.write_str(&format!("{}\n", text))?)
    }

    /// Writes a warning or an error to the error stream.
    pub fn notice(&self, notice: Notice<'_>) -> Result<()> {
        let line = match notice {
            Notice::Text(text) => format!("{} {}", "Warning:".yellow(), text),
            Notice::Error(error) => format!("{} {}", "Error:".red().bold(), error.to_string().red()),
        };
        self.eprintln(&line)
    }

    /// Captured output; empty for stdio sinks.
    pub fn stdout(&self) -> String {
        self.out.contents()
    }

    /// Captured error output; empty for stdio sinks.
    pub fn stderr(&self) -> String {
        self.err.contents()
    }
}

/// Formats values emitted by scalars and method results.
pub trait ValueSink: Send + Sync {
    fn emit(&self, value: &Value, output: &OutputSink) -> Result<()>;
}

/// Pretty JSON for arrays and objects, plain text for everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct DumpSink;

impl ValueSink for DumpSink {
    fn emit(&self, value: &Value, output: &OutputSink) -> Result<()> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Object(_) => serde_json::to_string_pretty(value)?,
            other => other.to_string(),
        };
        output.println(&text)
    }
}

/// Decides what happens when a run fails. Returns the process exit status.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, error: &CliError, output: &OutputSink, debug: bool) -> i32;
}

/// Prints the error, then terminates the process unless running in debug mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct FatalHandler;

impl ErrorHandler for FatalHandler {
    fn handle(&self, error: &CliError, output: &OutputSink, debug: bool) -> i32 {
        let code = error.exit_code();
        if output.notice(Notice::Error(error)).is_err() {
            eprintln!("Error: {}", error);
        }
        if !debug {
            std::process::exit(code);
        }
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandFailure;
    use serde_json::json;

    #[test]
    fn test_capture_collects_both_streams() {
        let sink = OutputSink::capture();
        let shared = sink.clone();
        sink.println("hello").unwrap();
        sink.eprintln("oops").unwrap();
        assert_eq!(shared.stdout(), "hello\n");
        assert_eq!(shared.stderr(), "oops\n");
    }

    #[test]
    fn test_dump_sink_prints_scalars_plainly() {
        let sink = OutputSink::capture();
        DumpSink.emit(&json!("text"), &sink).unwrap();
        DumpSink.emit(&json!(42), &sink).unwrap();
        DumpSink.emit(&json!(true), &sink).unwrap();
        assert_eq!(sink.stdout(), "text\n42\ntrue\n");
    }

    #[test]
    fn test_dump_sink_pretty_prints_composites() {
        let sink = OutputSink::capture();
        DumpSink.emit(&json!({"a": [1, 2]}), &sink).unwrap();
        let out = sink.stdout();
        assert!(out.contains("\"a\": ["));
        assert!(out.lines().count() > 1);
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_notices_go_to_stderr() {
        colored::control::set_override(false);
        let sink = OutputSink::capture();
        sink.notice(Notice::Text("careful")).unwrap();
        let error = CliError::from(CommandFailure::new("boom"));
        sink.notice(Notice::Error(&error)).unwrap();
        assert_eq!(sink.stdout(), "");
        assert_eq!(sink.stderr(), "Warning: careful\nError: boom\n");
    }

    #[test]
    fn test_fatal_handler_in_debug_returns_exit_code() {
        colored::control::set_override(false);
        let sink = OutputSink::capture();
        let error = CliError::from(CommandFailure::new("bad").with_exit_code(4));
        assert_eq!(FatalHandler.handle(&error, &sink, true), 4);
        assert!(sink.stderr().contains("bad"));
    }
}
