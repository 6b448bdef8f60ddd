//! Batch execution of command files
//!
//! A script is a text file with one command line per line. Nested `t`/`T`
//! commands save the caller's flags on an explicit stack and restore them
//! when the nested script ends.

use std::path::Path;

use super::command::{CommandError, Flow, Response};
use super::session::EditorSession;

/// Mode flags saved and restored around nested scripts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptFlags {
    /// Echo lines and show informational messages while scripting
    pub verbose: bool,
    /// Commands are coming from a script rather than the keyboard
    pub scripting: bool,
}

impl ScriptFlags {
    /// Whether informational messages should reach the user
    pub fn shows_info(&self) -> bool {
        !self.scripting || self.verbose
    }
}

impl EditorSession {
    /// Run every line of the script at `path`
    ///
    /// Stops early and returns the quit signal if a line quits; reaching the
    /// end of the file returns `Flow::Continue`.
    pub fn run_script(&mut self, path: &Path) -> Result<Flow, CommandError> {
        let raw = std::fs::read(path).map_err(CommandError::ScriptOpen)?;
        let text = String::from_utf8_lossy(&raw);
        log::info!("Running script {}", path.display());
        self.flags.scripting = true;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.flags.verbose {
                self.sink.echo(line);
            }
            match self.run_line(line) {
                Flow::Continue => {}
                flow => {
                    log::info!("Script {} quit", path.display());
                    return Ok(flow);
                }
            }
        }

        log::info!("Finished script {}", path.display());
        Ok(Flow::Continue)
    }

    /// Run a script from a `t`/`T` command, restoring the caller's flags after
    ///
    /// A quit inside the nested script only ends that script.
    pub(super) fn run_nested_script(
        &mut self,
        path: &Path,
        verbose: bool,
    ) -> Result<Response, CommandError> {
        if self.flag_stack.len() >= self.max_script_depth {
            return Err(CommandError::ScriptTooDeep);
        }
        self.flag_stack.push(self.flags);
        self.flags = ScriptFlags {
            verbose,
            scripting: true,
        };

        let result = self.run_script(path);

        if let Some(saved) = self.flag_stack.pop() {
            self.flags = saved;
        }
        result.map(|_| Response::none())
    }
}
