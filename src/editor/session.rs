//! Editing session: everything one editor instance owns
//!
//! The session is the single aggregate that commands run against. It owns
//! the buffer, marks, yank slot, search state and the script flag stack, and
//! reports through the collaborators it was built with.

use std::io;
use std::path::{Path, PathBuf};

use super::address::AddressEnv;
use super::buffer::ByteBuffer;
use super::command::{self, CommandError, Flow, Response};
use super::host::{ProcessRunner, Status, StatusSink};
use super::literal::strip_comment;
use super::marks::MarkTable;
use super::script::ScriptFlags;
use super::search::SearchEngine;
use crate::settings::EditorSettings;

/// One editing session over one file
pub struct EditorSession {
    pub(super) buffer: ByteBuffer,
    pub(super) marks: MarkTable,
    pub(super) yank: Vec<u8>,
    pub(super) search: SearchEngine,
    /// Current position
    pub(super) cursor: usize,
    /// File being edited
    pub(super) path: PathBuf,

    /// Flags of the script currently running (or of the interactive loop)
    pub(super) flags: ScriptFlags,
    /// Saved caller flags, one entry per nested script
    pub(super) flag_stack: Vec<ScriptFlags>,
    pub(super) max_script_depth: usize,

    pub(super) sink: Box<dyn StatusSink>,
    pub(super) runner: Box<dyn ProcessRunner>,
}

impl EditorSession {
    /// Create a session editing `path`, starting with `bytes`
    pub fn new(
        path: impl Into<PathBuf>,
        bytes: Vec<u8>,
        settings: &EditorSettings,
        sink: Box<dyn StatusSink>,
        runner: Box<dyn ProcessRunner>,
    ) -> Self {
        let mut search = SearchEngine::new();
        search.set_wraparound(settings.wraparound);
        Self {
            buffer: ByteBuffer::new(bytes),
            marks: MarkTable::new(),
            yank: Vec::new(),
            search,
            cursor: 0,
            path: path.into(),
            flags: ScriptFlags::default(),
            flag_stack: Vec::new(),
            max_script_depth: settings.max_script_depth,
            sink,
            runner,
        }
    }

    /// Get the buffer being edited
    pub fn buffer(&self) -> &ByteBuffer {
        &self.buffer
    }

    /// Get the marks
    pub fn marks(&self) -> &MarkTable {
        &self.marks
    }

    /// Get the yank slot
    pub fn yank(&self) -> &[u8] {
        &self.yank
    }

    /// Get the search state
    pub fn search(&self) -> &SearchEngine {
        &self.search
    }

    /// Get the current position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get the file being edited
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the current script flags
    pub fn flags(&self) -> ScriptFlags {
        self.flags
    }

    /// Replace the current script flags (batch mode from the command line)
    pub fn set_flags(&mut self, flags: ScriptFlags) {
        self.flags = flags;
    }

    /// Move the cursor
    pub(super) fn jump(&mut self, addr: usize) {
        self.cursor = addr;
    }

    /// What addresses on a command line resolve against
    pub fn env(&self) -> AddressEnv<'_> {
        AddressEnv {
            len: self.buffer.len(),
            cursor: self.cursor,
            marks: &self.marks,
        }
    }

    /// Parse and run one raw command line
    pub fn execute_line(&mut self, line: &str) -> Result<Response, CommandError> {
        let line = strip_comment(line.trim());
        let command = command::parse(&line, self.env())?;
        log::debug!("Dispatching {:?}", command);
        self.execute(command)
    }

    /// Run one line and report its outcome through the status sink
    pub fn run_line(&mut self, line: &str) -> Flow {
        match self.execute_line(line) {
            Ok(response) => {
                if let Some(status) = &response.status {
                    self.report(status);
                }
                response.flow
            }
            Err(e) => {
                self.report(&Status::Error(e.to_string()));
                Flow::Continue
            }
        }
    }

    /// Show a status message, honoring quiet scripting
    pub fn report(&mut self, status: &Status) {
        if status.is_error() || self.flags.shows_info() {
            self.sink.status(status);
        }
    }

    /// Dump the buffer to `path` after an unrecoverable failure
    pub fn emergency_save(&self, path: &Path) -> io::Result<()> {
        log::warn!("Emergency save of {} bytes to {}", self.buffer.len(), path.display());
        std::fs::write(path, self.buffer.as_slice())
    }
}
