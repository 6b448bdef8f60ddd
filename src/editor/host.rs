//! Interfaces to the outside world that the editing engine calls out to

use std::io;

/// A message from a command — either an error or informational
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// An informational message (e.g. "4 bytes deleted.")
    Info(String),
    /// A real error (parse failure, I/O failure, etc.)
    Error(String),
}

impl Status {
    /// Message text without the severity
    pub fn text(&self) -> &str {
        match self {
            Status::Info(text) | Status::Error(text) => text,
        }
    }

    /// Whether this is an error
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

/// Receives status messages and echoed script lines
pub trait StatusSink {
    /// Show a status message
    fn status(&mut self, status: &Status);

    /// Echo a script line that is about to run (verbose scripting only)
    fn echo(&mut self, line: &str);
}

/// Runs shell commands for `!`
pub trait ProcessRunner {
    /// Run `command`, inheriting the terminal, and return once it exits
    fn run(&mut self, command: &str) -> io::Result<()>;
}
