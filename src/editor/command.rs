//! Command-line language: parsing a line into a `Command`
//!
//! ```text
//! [address][,address | ,*count] operator [operands]
//! ```
//!
//! plus the line-level commands (`q`, `w`, `r`, `t`, `n`, `/`, `!`, `?`)
//! that are recognised before any address parsing. Parsing only reads the
//! session; nothing is mutated until the whole line has been validated.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::address::{AddressEnv, AddressRange, LineParser};
use super::bitops::{BitOp, Direction, Shift};
use super::buffer::BufferError;
use super::host::Status;

/// Errors that abort a command before or while it runs
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unrecognized command.")]
    Unrecognized,

    #[error("Invalid syntax.")]
    InvalidSyntax,

    #[error("Invalid parameter.")]
    InvalidParameter,

    #[error("File name not specified.")]
    FileNameMissing,

    #[error("Specify script file name.")]
    ScriptNameMissing,

    #[error("Specify search object.")]
    NoSearchObject,

    #[error("No previous data to look for.")]
    NoPreviousSearch,

    #[error("Invalid regular expression: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("No write since last change. To overriding quit, use 'q!'.")]
    UnsavedChanges,

    #[error("Script nesting too deep.")]
    ScriptTooDeep,

    #[error("Cannot write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Script file open error: {0}")]
    ScriptOpen(#[source] io::Error),

    #[error("Shell command failed: {0}")]
    Shell(#[source] io::Error),

    #[error("Memory overflow.")]
    MemoryOverflow,
}

impl From<BufferError> for CommandError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::MemoryOverflow => CommandError::MemoryOverflow,
        }
    }
}

/// Whether the session should keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Quit without writing
    Quit,
    /// Quit after the buffer was written
    QuitSaved,
}

/// Outcome of a command that ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Option<Status>,
    pub flow: Flow,
}

impl Response {
    /// Nothing to report, keep going
    pub fn none() -> Self {
        Self {
            status: None,
            flow: Flow::Continue,
        }
    }

    /// Informational message, keep going
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            status: Some(Status::Info(text.into())),
            flow: Flow::Continue,
        }
    }

    /// Error message for a command that still (partly) ran
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            status: Some(Status::Error(text.into())),
            flow: Flow::Continue,
        }
    }

    /// Stop the session
    pub fn quit(flow: Flow) -> Self {
        Self { status: None, flow }
    }
}

/// Search criterion typed on a command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    Literal(Vec<u8>),
    Regex(String),
}

/// A fully parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty line or a form that deliberately does nothing
    Nop,
    Quit { force: bool },
    WriteQuit,
    /// Write the whole buffer; `None` means the file being edited
    Write(Option<PathBuf>),
    /// Re-read the file being edited from disk
    Reread,
    RunScript { path: PathBuf, verbose: bool },
    SearchNext,
    SearchPrev,
    Search(SearchTarget),
    Shell(String),
    PrintValue(usize),
    Range { range: AddressRange, op: RangeOp },
}

/// Operation applied to an address range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeOp {
    /// Move the cursor to the start address
    Jump,
    /// Copy the range into the yank slot
    Yank,
    /// Store literal data into the yank slot
    YankLiteral(Vec<u8>),
    Paste { insert: bool },
    SetMark(char),
    ReadFile { path: PathBuf, insert: bool },
    /// Write literal data once (`o`/`O`)
    Literal { data: Vec<u8>, insert: bool },
    Delete,
    WriteRange(PathBuf),
    /// `None` reuses the current search pattern
    Substitute { pattern: Option<SearchTarget>, replacement: Vec<u8> },
    Not,
    Fill(Vec<u8>),
    /// Write `data` repeated `count` times (`i`/`I`)
    Repeat { data: Vec<u8>, count: usize, insert: bool },
    Copy { dest: usize, insert: bool },
    Move { dest: usize },
    Bitwise { op: BitOp, operand: u8 },
    Shift(Shift),
}

/// Parse one comment-stripped command line
pub fn parse(line: &str, env: AddressEnv<'_>) -> Result<Command, CommandError> {
    let line = line.trim_start();
    if line.is_empty() {
        return Ok(Command::Nop);
    }
    match line.trim_end() {
        "q" => return Ok(Command::Quit { force: false }),
        "q!" => return Ok(Command::Quit { force: true }),
        "wq" | "wq!" => return Ok(Command::WriteQuit),
        "r" => return Ok(Command::Reread),
        _ => {}
    }

    let mut chars = line.chars();
    let first = chars.next().unwrap_or_default();
    let rest = chars.as_str();
    match first {
        'n' => Ok(Command::SearchNext),
        'N' => Ok(Command::SearchPrev),
        'w' => {
            let name = rest.trim();
            if name.is_empty() || name == "!" {
                Ok(Command::Write(None))
            } else {
                Ok(Command::Write(Some(PathBuf::from(name))))
            }
        }
        't' | 'T' => {
            let name = rest.trim();
            if name.is_empty() {
                return Err(CommandError::ScriptNameMissing);
            }
            Ok(Command::RunScript {
                path: PathBuf::from(name),
                verbose: first == 'T',
            })
        }
        '!' => {
            let command = rest.trim_start();
            if command.is_empty() {
                Ok(Command::Nop)
            } else {
                Ok(Command::Shell(command.to_string()))
            }
        }
        '?' => {
            let mut parser = LineParser::new(rest, env);
            Ok(parser
                .expression()
                .map_or(Command::Nop, Command::PrintValue))
        }
        '/' => {
            let mut parser = LineParser::new(rest, env);
            let target = if parser.eat('/') {
                SearchTarget::Literal(parser.byte_list())
            } else {
                SearchTarget::Regex(parser.pattern_text())
            };
            Ok(Command::Search(target))
        }
        _ => parse_range_command(line, env),
    }
}

fn parse_range_command(line: &str, env: AddressEnv<'_>) -> Result<Command, CommandError> {
    let mut p = LineParser::new(line, env);
    let range = p.range();
    p.skip_spaces();
    let Some(op_char) = p.bump() else {
        return Ok(Command::Range {
            range,
            op: RangeOp::Jump,
        });
    };

    let op = match op_char {
        'y' if !range.is_explicit() => RangeOp::YankLiteral(p.text_or_bytes()),
        'y' => RangeOp::Yank,
        'p' => RangeOp::Paste { insert: false },
        'P' => RangeOp::Paste { insert: true },
        'm' => match p.bump() {
            Some(name) if name.is_ascii_lowercase() => RangeOp::SetMark(name),
            Some(_) => return Ok(Command::Nop),
            None => return Err(CommandError::Unrecognized),
        },
        'r' | 'R' => {
            let name = p.take_rest();
            let name = name.trim();
            if name.is_empty() {
                return Err(CommandError::FileNameMissing);
            }
            RangeOp::ReadFile {
                path: PathBuf::from(name),
                insert: op_char == 'R',
            }
        }
        'o' | 'O' => {
            let data = p.data();
            if data.is_empty() {
                return Err(CommandError::InvalidSyntax);
            }
            match (op_char, range.explicit_end) {
                ('o', true) => RangeOp::Fill(data),
                ('O', true) => return Err(CommandError::InvalidSyntax),
                _ => RangeOp::Literal {
                    data,
                    insert: op_char == 'O',
                },
            }
        }
        'd' => RangeOp::Delete,
        'w' => {
            let name = p.take_rest();
            let name = name.trim();
            if name.is_empty() {
                return Err(CommandError::FileNameMissing);
            }
            RangeOp::WriteRange(PathBuf::from(name))
        }
        's' => parse_substitute(&mut p)?,
        '~' => RangeOp::Not,
        'f' => {
            let data = p.data();
            if data.is_empty() {
                return Err(CommandError::InvalidSyntax);
            }
            RangeOp::Fill(data)
        }
        '<' | '>' => RangeOp::Shift(parse_shift(&mut p, op_char)),
        'i' | 'I' => parse_repeat(&mut p, op_char, range)?,
        'c' | 'C' | 'v' | '&' | '|' | '^' => {
            let x3 = p.expression().ok_or(CommandError::InvalidParameter)?;
            match op_char {
                'c' => RangeOp::Copy {
                    dest: x3,
                    insert: false,
                },
                'C' => RangeOp::Copy {
                    dest: x3,
                    insert: true,
                },
                'v' => RangeOp::Move { dest: x3 },
                '&' => bitwise(BitOp::And, x3),
                '|' => bitwise(BitOp::Or, x3),
                _ => bitwise(BitOp::Xor, x3),
            }
        }
        _ => return Err(CommandError::Unrecognized),
    };
    Ok(Command::Range { range, op })
}

fn bitwise(op: BitOp, operand: usize) -> RangeOp {
    RangeOp::Bitwise {
        op,
        operand: (operand & 0xFF) as u8,
    }
}

fn parse_shift(p: &mut LineParser<'_>, op_char: char) -> Shift {
    let multibyte = p.eat(op_char);
    let count = p.expression().unwrap_or(1);
    let bit = if p.eat(',') { p.expression() } else { None };
    Shift {
        direction: if op_char == '<' {
            Direction::Left
        } else {
            Direction::Right
        },
        count,
        carry_in: match bit {
            Some(0) => Some(0),
            Some(1) => Some(1),
            _ => None,
        },
        multibyte,
    }
}

fn parse_repeat(
    p: &mut LineParser<'_>,
    op_char: char,
    range: AddressRange,
) -> Result<RangeOp, CommandError> {
    p.skip_spaces();
    let data = if p.eat('/') {
        let text = p.text_bytes();
        p.eat('/');
        text
    } else {
        p.byte_list()
    };
    p.skip_spaces();
    let count = if p.eat('*') {
        p.expression().ok_or(CommandError::InvalidParameter)?
    } else {
        1
    };

    if range.explicit_end {
        return match op_char {
            'i' if !data.is_empty() => Ok(RangeOp::Fill(data)),
            _ => Err(CommandError::InvalidSyntax),
        };
    }
    Ok(RangeOp::Repeat {
        data,
        count,
        insert: op_char == 'I',
    })
}

fn parse_substitute(p: &mut LineParser<'_>) -> Result<RangeOp, CommandError> {
    p.skip_spaces();
    let pattern = if p.eat('/') {
        match p.peek() {
            Some('/') => {
                p.bump();
                Some(SearchTarget::Literal(p.byte_list()))
            }
            Some(_) => Some(SearchTarget::Regex(p.pattern_text())),
            None => return Err(CommandError::InvalidSyntax),
        }
    } else {
        None
    };
    let replacement = p.text_or_bytes();
    Ok(RangeOp::Substitute {
        pattern,
        replacement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::marks::MarkTable;

    fn parse_line(line: &str) -> Result<Command, CommandError> {
        let marks = MarkTable::new();
        let env = AddressEnv {
            len: 0x40,
            cursor: 8,
            marks: &marks,
        };
        parse(line, env)
    }

    fn range_op(line: &str) -> (AddressRange, RangeOp) {
        match parse_line(line) {
            Ok(Command::Range { range, op }) => (range, op),
            other => panic!("expected range command for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_line_level_commands() {
        assert_eq!(parse_line("q").unwrap(), Command::Quit { force: false });
        assert_eq!(parse_line("q!").unwrap(), Command::Quit { force: true });
        assert_eq!(parse_line("wq").unwrap(), Command::WriteQuit);
        assert_eq!(parse_line("w").unwrap(), Command::Write(None));
        assert_eq!(
            parse_line("w  out.bin").unwrap(),
            Command::Write(Some(PathBuf::from("out.bin")))
        );
        assert_eq!(parse_line("r").unwrap(), Command::Reread);
        assert_eq!(parse_line("n").unwrap(), Command::SearchNext);
        assert_eq!(parse_line("N").unwrap(), Command::SearchPrev);
        assert_eq!(parse_line("n again").unwrap(), Command::SearchNext);
        assert_eq!(parse_line("q  ").unwrap(), Command::Quit { force: false });
        assert_eq!(parse_line("   ").unwrap(), Command::Nop);
        assert_eq!(parse_line("!ls -l").unwrap(), Command::Shell("ls -l".into()));
        assert_eq!(parse_line("?%255").unwrap(), Command::PrintValue(255));
        assert_eq!(parse_line("?zz").unwrap(), Command::Nop);
    }

    #[test]
    fn test_script_commands() {
        assert_eq!(
            parse_line("T run.bi").unwrap(),
            Command::RunScript {
                path: PathBuf::from("run.bi"),
                verbose: true
            }
        );
        assert!(matches!(
            parse_line("t"),
            Err(CommandError::ScriptNameMissing)
        ));
    }

    #[test]
    fn test_search_commands() {
        assert_eq!(
            parse_line("//41 42").unwrap(),
            Command::Search(SearchTarget::Literal(vec![0x41, 0x42]))
        );
        assert_eq!(
            parse_line("/ab+c/").unwrap(),
            Command::Search(SearchTarget::Regex("ab+c".into()))
        );
    }

    #[test]
    fn test_jump_and_unrecognized() {
        let (range, op) = range_op("1f");
        assert_eq!(range.start, 0x1F);
        assert_eq!(op, RangeOp::Jump);
        assert!(matches!(parse_line("10 z"), Err(CommandError::Unrecognized)));
        assert!(matches!(parse_line("@print(1)"), Err(CommandError::Unrecognized)));
    }

    #[test]
    fn test_yank_forms() {
        let (_, op) = range_op("y /abc/");
        assert_eq!(op, RangeOp::YankLiteral(b"abc".to_vec()));
        let (_, op) = range_op("y //1 2 3/");
        assert_eq!(op, RangeOp::YankLiteral(vec![1, 2, 3]));
        let (range, op) = range_op("10,20 y");
        assert_eq!((range.start, range.end, op), (0x10, 0x20, RangeOp::Yank));
    }

    #[test]
    fn test_marks_and_files() {
        assert_eq!(range_op("20 mk").1, RangeOp::SetMark('k'));
        assert_eq!(parse_line("20 m!").unwrap(), Command::Nop);
        assert!(matches!(parse_line("20 r "), Err(CommandError::FileNameMissing)));
        assert_eq!(
            range_op("0 R data.bin").1,
            RangeOp::ReadFile {
                path: PathBuf::from("data.bin"),
                insert: true
            }
        );
        assert_eq!(
            range_op("0,f w part.bin").1,
            RangeOp::WriteRange(PathBuf::from("part.bin"))
        );
    }

    #[test]
    fn test_hex_letter_operators_need_space() {
        let (range, op) = range_op("10,20 d");
        assert_eq!((range.start, range.end, op), (0x10, 0x20, RangeOp::Delete));
        let (range, op) = range_op("10,20d");
        assert_eq!((range.end, op), (0x20d, RangeOp::Jump));
    }

    #[test]
    fn test_literal_and_fill() {
        assert_eq!(
            range_op("0 o /hi/").1,
            RangeOp::Literal {
                data: b"hi".to_vec(),
                insert: false
            }
        );
        assert_eq!(
            range_op("0 O de ad").1,
            RangeOp::Literal {
                data: vec![0xDE, 0xAD],
                insert: true
            }
        );
        assert_eq!(range_op("0,4 o aa bb").1, RangeOp::Fill(vec![0xAA, 0xBB]));
        assert!(matches!(parse_line("0,4 O aa"), Err(CommandError::InvalidSyntax)));
        assert!(matches!(parse_line("0 o"), Err(CommandError::InvalidSyntax)));
        assert_eq!(range_op("0,4 f aa bb").1, RangeOp::Fill(vec![0xAA, 0xBB]));
    }

    #[test]
    fn test_repeat_forms() {
        assert_eq!(
            range_op("0 i 41 42 *3").1,
            RangeOp::Repeat {
                data: vec![0x41, 0x42],
                count: 3,
                insert: false
            }
        );
        assert_eq!(
            range_op("0 I /ab/*2").1,
            RangeOp::Repeat {
                data: b"ab".to_vec(),
                count: 2,
                insert: true
            }
        );
        assert_eq!(range_op("0,9 i ff").1, RangeOp::Fill(vec![0xFF]));
        assert!(matches!(parse_line("0,9 I ff"), Err(CommandError::InvalidSyntax)));
        assert!(matches!(parse_line("0,9 i"), Err(CommandError::InvalidSyntax)));
        assert!(matches!(parse_line("0 i ff *"), Err(CommandError::InvalidParameter)));
    }

    #[test]
    fn test_third_address_commands() {
        assert_eq!(
            range_op("0,3 C 20").1,
            RangeOp::Copy {
                dest: 0x20,
                insert: true
            }
        );
        assert_eq!(range_op("0,3 v $").1, RangeOp::Move { dest: 0x3F });
        assert_eq!(
            range_op("0,3 & 1f0").1,
            RangeOp::Bitwise {
                op: BitOp::And,
                operand: 0xF0
            }
        );
        assert!(matches!(parse_line("0,3 ^"), Err(CommandError::InvalidParameter)));
    }

    #[test]
    fn test_shift_forms() {
        let (_, op) = range_op("0,3 <");
        assert_eq!(
            op,
            RangeOp::Shift(Shift {
                direction: Direction::Left,
                count: 1,
                carry_in: None,
                multibyte: false
            })
        );
        let (_, op) = range_op("0,3 >>4,1");
        assert_eq!(
            op,
            RangeOp::Shift(Shift {
                direction: Direction::Right,
                count: 4,
                carry_in: Some(1),
                multibyte: true
            })
        );
        let (_, op) = range_op("0,3 <2,5");
        assert!(matches!(op, RangeOp::Shift(s) if s.is_rotate() && s.count == 2));
    }

    #[test]
    fn test_substitute_forms() {
        assert_eq!(
            range_op("s/a+/xy/").1,
            RangeOp::Substitute {
                pattern: Some(SearchTarget::Regex("a+".into())),
                replacement: b"xy".to_vec()
            }
        );
        assert_eq!(
            range_op("0,$ s//41//42 43").1,
            RangeOp::Substitute {
                pattern: Some(SearchTarget::Literal(vec![0x41])),
                replacement: vec![0x42, 0x43]
            }
        );
        assert_eq!(
            range_op("s").1,
            RangeOp::Substitute {
                pattern: None,
                replacement: Vec::new()
            }
        );
        assert_eq!(
            range_op("s /x").1,
            RangeOp::Substitute {
                pattern: Some(SearchTarget::Regex("x".into())),
                replacement: Vec::new()
            }
        );
        assert!(matches!(parse_line("s/"), Err(CommandError::InvalidSyntax)));
    }
}
