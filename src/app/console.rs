//! Terminal collaborators: line input, hex dump, status output, shell

use std::io::{self, BufRead, Write};
use std::process::Command;

use crate::editor::search::SearchPattern;
use crate::editor::{EditorSession, ProcessRunner, Status, StatusSink};

/// Number of bytes displayed per dump row
const BYTES_PER_ROW: usize = 16;

/// Yields completed lines of input
pub trait InputSource {
    /// Show `prompt` and read one line; `None` once input is exhausted
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Produces a screen representation of the session
pub trait Renderer {
    fn render(&self, session: &EditorSession) -> String;
}

/// Reads command lines from standard input
#[derive(Default)]
pub struct StdinInput;

impl InputSource for StdinInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Plain-text hex dump around the cursor
pub struct HexDump {
    rows: usize,
}

impl HexDump {
    pub fn new(rows: usize) -> Self {
        Self { rows: rows.max(1) }
    }

    fn title(session: &EditorSession) -> String {
        let buffer = session.buffer();
        let modified = if buffer.is_modified() { "modified" } else { "not modified" };
        format!(
            "file:[{}] length:{} bytes [{}]",
            session.path().display(),
            buffer.len(),
            modified
        )
    }

    fn row(session: &EditorSession, offset: usize) -> String {
        let buffer = session.buffer();
        let mut hex = String::with_capacity(BYTES_PER_ROW * 3);
        let mut ascii = String::with_capacity(BYTES_PER_ROW);
        for addr in (0..BYTES_PER_ROW).map_while(|i| offset.checked_add(i)) {
            let marker = if addr == session.cursor() { '[' } else { ' ' };
            if addr < buffer.len() {
                let b = buffer.read(addr);
                hex.push_str(&format!("{}{:02X}", marker, b));
                ascii.push(if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                });
            } else {
                hex.push_str(&format!("{}~~", marker));
                ascii.push(' ');
            }
        }
        format!("{:012X}{}  {}", offset, hex, ascii)
    }

    /// Cursor, current search criterion and any set marks
    fn footer(session: &EditorSession) -> String {
        let mut footer = format!("cursor:{:012X}", session.cursor());
        match session.search().pattern() {
            SearchPattern::None => {}
            SearchPattern::Literal(bytes) => {
                let hex: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
                footer.push_str(&format!("  search://{}", hex.join(" ")));
            }
            SearchPattern::Regex { source, .. } => {
                footer.push_str(&format!("  search:/{}", source));
            }
        }
        let marks: Vec<String> = session
            .marks()
            .iter()
            .filter_map(|(name, addr)| addr.map(|a| format!("{}={:012X}", name, a)))
            .collect();
        if !marks.is_empty() {
            footer.push_str(&format!("\nmarks: {}", marks.join(" ")));
        }
        footer
    }
}

impl Renderer for HexDump {
    fn render(&self, session: &EditorSession) -> String {
        let first_row = session.cursor() / BYTES_PER_ROW;
        let mut output = Self::title(session);
        output.push('\n');
        for row in first_row..first_row.saturating_add(self.rows) {
            let Some(offset) = row.checked_mul(BYTES_PER_ROW) else {
                break;
            };
            output.push_str(&Self::row(session, offset));
            output.push('\n');
        }
        output.push_str(&Self::footer(session));
        output
    }
}

/// Prints status messages; errors go to stderr
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn status(&mut self, status: &Status) {
        if status.is_error() {
            eprintln!("{}", status.text());
        } else {
            println!("{}", status.text());
        }
    }

    fn echo(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Runs `!` commands through `sh -c`
pub struct ShellRunner;

impl ProcessRunner for ShellRunner {
    fn run(&mut self, command: &str) -> io::Result<()> {
        let status = Command::new("sh").arg("-c").arg(command).status()?;
        if !status.success() {
            log::warn!("Shell command exited with {}", status);
        }
        Ok(())
    }
}
