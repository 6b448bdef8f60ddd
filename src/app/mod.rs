//! Console front end: drives an `EditorSession` from a terminal or a script

pub mod console;

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::editor::{CommandError, EditorSession, Flow};
use console::{InputSource, Renderer};

/// Prompt shown before each command line
const PROMPT: &str = ":";

/// Failures that end a console session abnormally
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Input error: {0}")]
    Input(#[from] std::io::Error),

    #[error("Input closed.")]
    InputClosed,

    #[error(transparent)]
    Script(#[from] CommandError),

    #[error("Some error occurred.")]
    Panic,
}

/// Console application state
pub struct App {
    /// The editing session being driven
    session: EditorSession,

    input: Box<dyn InputSource>,
    renderer: Box<dyn Renderer>,

    /// Where the buffer goes if the session ends abnormally
    emergency_save_path: PathBuf,
}

impl App {
    pub fn new(
        session: EditorSession,
        input: Box<dyn InputSource>,
        renderer: Box<dyn Renderer>,
        emergency_save_path: PathBuf,
    ) -> Self {
        Self {
            session,
            input,
            renderer,
            emergency_save_path,
        }
    }

    /// Read and run command lines until a quit command
    pub fn run_interactive(&mut self) -> Result<Flow, AppError> {
        self.guarded(|app| loop {
            println!("{}", app.renderer.render(&app.session));
            let Some(line) = app.input.read_line(PROMPT)? else {
                if app.session.buffer().has_last_change() {
                    return Err(AppError::InputClosed);
                }
                return Ok(Flow::Quit);
            };
            match app.session.run_line(&line) {
                Flow::Continue => {}
                flow => return Ok(flow),
            }
        })
    }

    /// Run a script in batch mode, optionally writing the file afterwards
    pub fn run_script(&mut self, script: &Path, write: bool) -> Result<Flow, AppError> {
        self.guarded(|app| {
            let flow = app.session.run_script(script)?;
            if write && app.session.buffer().has_last_change() {
                log::info!("Writing {} after script", app.session.path().display());
                app.session.run_line("w");
            }
            Ok(flow)
        })
    }

    /// Run `f`, saving the buffer to the emergency file if it fails or panics
    fn guarded<F>(&mut self, f: F) -> Result<Flow, AppError>
    where
        F: FnOnce(&mut Self) -> Result<Flow, AppError>,
    {
        let result = match panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(result) => result,
            Err(_) => Err(AppError::Panic),
        };
        if let Err(e) = &result {
            self.rescue(e);
        }
        result
    }

    fn rescue(&self, error: &AppError) {
        log::warn!("Session ended abnormally: {}", error);
        if !self.session.buffer().is_modified() {
            return;
        }
        match self.session.emergency_save(&self.emergency_save_path) {
            Ok(()) => eprintln!(
                "Memory saved to {}.",
                self.emergency_save_path.display()
            ),
            Err(e) => log::error!(
                "Emergency save to {} failed: {}",
                self.emergency_save_path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::host::testing::{Recorded, RecordingRunner, RecordingSink};
    use crate::settings::EditorSettings;
    use std::collections::VecDeque;
    use std::io;

    /// Feeds canned lines, then reports end of input
    struct ScriptedInput(VecDeque<String>);

    impl InputSource for ScriptedInput {
        fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
            Ok(self.0.pop_front())
        }
    }

    /// Renderer that panics once the cursor reaches a trigger address
    struct TripwireRenderer(usize);

    impl Renderer for TripwireRenderer {
        fn render(&self, session: &EditorSession) -> String {
            if session.cursor() == self.0 {
                panic!("tripwire");
            }
            String::new()
        }
    }

    fn app(dir: &Path, bytes: &[u8], lines: &[&str], tripwire: usize) -> (App, Recorded) {
        let recorded = Recorded::default();
        let session = EditorSession::new(
            dir.join("data.bin"),
            bytes.to_vec(),
            &EditorSettings::default(),
            Box::new(RecordingSink(recorded.clone())),
            Box::new(RecordingRunner(recorded.clone())),
        );
        let input = ScriptedInput(lines.iter().map(|l| l.to_string()).collect());
        let app = App::new(
            session,
            Box::new(input),
            Box::new(TripwireRenderer(tripwire)),
            dir.join("file.save"),
        );
        (app, recorded)
    }

    #[test]
    fn test_interactive_loop_until_quit() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app(dir.path(), b"abc", &["1 o 5a", "q", "wq"], usize::MAX);

        assert_eq!(app.run_interactive().unwrap(), Flow::QuitSaved);
        assert_eq!(std::fs::read(dir.path().join("data.bin")).unwrap(), b"aZc");
        assert!(!dir.path().join("file.save").exists());
    }

    #[test]
    fn test_closed_input_with_changes_saves() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app(dir.path(), b"abc", &["0 o 41"], usize::MAX);

        assert!(matches!(app.run_interactive(), Err(AppError::InputClosed)));
        assert_eq!(std::fs::read(dir.path().join("file.save")).unwrap(), b"Abc");
    }

    #[test]
    fn test_closed_input_without_changes_quits() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app(dir.path(), b"abc", &[], usize::MAX);
        assert_eq!(app.run_interactive().unwrap(), Flow::Quit);
    }

    #[test]
    fn test_panic_triggers_emergency_save() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app(dir.path(), b"abc", &["2 o 43", "7"], 7);

        assert!(matches!(app.run_interactive(), Err(AppError::Panic)));
        assert_eq!(std::fs::read(dir.path().join("file.save")).unwrap(), b"abC");
    }

    #[test]
    fn test_batch_script_writes_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fix.bi");
        std::fs::write(&script, "0 O /\\#!\\n/\n").unwrap();
        let (mut app, _) = app(dir.path(), b"x", &[], usize::MAX);

        assert_eq!(app.run_script(&script, true).unwrap(), Flow::Continue);
        assert_eq!(std::fs::read(dir.path().join("data.bin")).unwrap(), b"#!\nx");
    }

    #[test]
    fn test_missing_batch_script_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app(dir.path(), b"x", &[], usize::MAX);
        let result = app.run_script(&dir.path().join("missing.bi"), false);
        assert!(matches!(
            result,
            Err(AppError::Script(CommandError::ScriptOpen(_)))
        ));
        assert!(!dir.path().join("file.save").exists());
    }
}
