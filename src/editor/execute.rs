//! Running parsed commands against the session

use std::path::Path;

use super::address::AddressRange;
use super::bitops::{self, BitOp, Shift};
use super::buffer::MAX_LENGTH;
use super::command::{Command, CommandError, Flow, RangeOp, Response, SearchTarget};
use super::file;
use super::search::SearchHit;
use super::session::EditorSession;

impl EditorSession {
    /// Run a parsed command
    pub(super) fn execute(&mut self, command: Command) -> Result<Response, CommandError> {
        match command {
            Command::Nop => Ok(Response::none()),
            Command::Quit { force } => {
                if !force && self.buffer.has_last_change() {
                    return Err(CommandError::UnsavedChanges);
                }
                Ok(Response::quit(Flow::Quit))
            }
            Command::WriteQuit => {
                self.write_file(None)?;
                Ok(Response::quit(Flow::QuitSaved))
            }
            Command::Write(path) => {
                self.write_file(path.as_deref())?;
                Ok(Response::info("File written."))
            }
            Command::Reread => self.reread(),
            Command::RunScript { path, verbose } => self.run_nested_script(&path, verbose),
            Command::SearchNext => {
                if !self.search.has_criteria() {
                    return Err(CommandError::NoPreviousSearch);
                }
                let from = self.cursor.saturating_add(1);
                let hit = self.search.search_forward(&self.buffer, from);
                Ok(self.finish_search(hit))
            }
            Command::SearchPrev => {
                if !self.search.has_criteria() {
                    return Err(CommandError::NoPreviousSearch);
                }
                // Stepping back from address 0 wraps to the last address.
                let from = self.cursor.checked_sub(1).unwrap_or(usize::MAX);
                let hit = self.search.search_backward(&self.buffer, from);
                Ok(self.finish_search(hit))
            }
            Command::Search(target) => {
                self.set_search(target)?;
                let hit = self.search.search_forward(&self.buffer, self.cursor);
                Ok(self.finish_search(hit))
            }
            Command::Shell(line) => {
                log::info!("Running shell command: {}", line);
                self.runner.run(&line).map_err(CommandError::Shell)?;
                Ok(Response::none())
            }
            Command::PrintValue(value) => Ok(Response::info(describe_value(value))),
            Command::Range { range, op } => self.execute_range(range, op),
        }
    }

    /// Write the whole buffer, to its own file when `path` is `None`
    fn write_file(&mut self, path: Option<&Path>) -> Result<(), CommandError> {
        let own = path.map_or(true, |p| p == self.path);
        let target = path.unwrap_or(&self.path).to_path_buf();
        file::write_all(&target, &self.buffer).map_err(|source| CommandError::FileWrite {
            path: target.clone(),
            source,
        })?;
        if own {
            self.buffer.mark_saved();
        }
        Ok(())
    }

    fn reread(&mut self) -> Result<Response, CommandError> {
        let loaded = file::load(&self.path).map_err(|source| CommandError::FileRead {
            path: self.path.clone(),
            source,
        })?;
        self.buffer.replace(loaded.bytes);
        if loaded.new_file {
            Ok(Response::info("<new file>"))
        } else {
            Ok(Response::info("Original file read."))
        }
    }

    fn set_search(&mut self, target: SearchTarget) -> Result<(), CommandError> {
        match target {
            SearchTarget::Literal(bytes) => {
                if bytes.is_empty() {
                    return Err(CommandError::NoSearchObject);
                }
                self.search.set_literal(bytes);
            }
            SearchTarget::Regex(source) => {
                if source.is_empty() {
                    return Err(CommandError::NoSearchObject);
                }
                self.search.set_regex(&source)?;
            }
        }
        Ok(())
    }

    /// Move to a search hit and describe the outcome
    fn finish_search(&mut self, hit: Option<SearchHit>) -> Response {
        match hit {
            Some(hit) => {
                self.jump(hit.addr);
                if hit.wrapped && self.search.report() {
                    Response::info("Search wrapped.")
                } else {
                    Response::none()
                }
            }
            None if self.search.report() => Response::info("Not found."),
            None => Response::none(),
        }
    }

    // ========== Range Operations ==========

    fn execute_range(&mut self, range: AddressRange, op: RangeOp) -> Result<Response, CommandError> {
        let AddressRange { start, end, .. } = range;
        match op {
            RangeOp::Jump => {
                self.jump(start);
                Ok(Response::none())
            }
            RangeOp::Yank => {
                let count = match self.buffer.yank_range(start, end) {
                    Some(bytes) => {
                        let count = bytes.len();
                        self.yank = bytes;
                        count
                    }
                    None => 0,
                };
                Ok(Response::info(format!("{count} bytes yanked.")))
            }
            RangeOp::YankLiteral(data) => {
                self.yank = data;
                Ok(Response::info(format!("{} bytes yanked.", self.yank.len())))
            }
            RangeOp::Paste { insert } => {
                let data = self.yank.clone();
                self.put(start, &data, insert)?;
                self.jump(start + data.len());
                Ok(Response::info(format!("{} bytes pasted.", data.len())))
            }
            RangeOp::SetMark(name) => {
                if self.marks.set(name, start) {
                    log::debug!("Mark '{}' set to {:#x}", name, start);
                }
                Ok(Response::none())
            }
            RangeOp::ReadFile { path, insert } => {
                let (data, failure) = match file::read_bytes(&path) {
                    Ok(data) => (data, None),
                    Err(e) => (Vec::new(), Some(format!("File read error: {e}"))),
                };
                self.put(start, &data, insert)?;
                self.jump(start + data.len());
                Ok(match failure {
                    Some(message) => Response::error(message),
                    None => Response::info(format!("{} bytes read.", data.len())),
                })
            }
            RangeOp::Literal { data, insert } => {
                self.put(start, &data, insert)?;
                self.jump(start + data.len());
                Ok(Response::info(put_message(data.len(), insert)))
            }
            RangeOp::Delete => match self.buffer.delete(start, end) {
                Some(removed) => {
                    let count = removed.len();
                    self.yank = removed;
                    self.jump(start);
                    Ok(Response::info(format!("{count} bytes deleted.")))
                }
                None => Ok(Response::info("0 bytes deleted.")),
            },
            RangeOp::WriteRange(path) => {
                guard_range(range)?;
                let count = file::write_range(&path, &self.buffer, start, end).map_err(
                    |source| CommandError::FileWrite {
                        path: path.clone(),
                        source,
                    },
                )?;
                Ok(Response::info(format!("{count} bytes written.")))
            }
            RangeOp::Substitute {
                pattern,
                replacement,
            } => self.substitute(range, pattern, &replacement),
            RangeOp::Not => {
                let count = self.transform(range, bitops::not)?;
                self.jump(end + 1);
                Ok(Response::info(format!("{count} bytes noted.")))
            }
            RangeOp::Fill(pattern) => {
                guard_range(range)?;
                let data = bitops::tile(&pattern, range.len());
                self.buffer.overwrite(start, &data)?;
                self.jump(start + data.len());
                Ok(Response::info(format!("{} bytes filled.", data.len())))
            }
            RangeOp::Repeat {
                data,
                count,
                insert,
            } => {
                let total = data
                    .len()
                    .checked_mul(count)
                    .filter(|&n| n <= MAX_LENGTH)
                    .ok_or(CommandError::MemoryOverflow)?;
                let data = data.repeat(count);
                debug_assert_eq!(data.len(), total);
                self.put(start, &data, insert)?;
                self.jump(start + total);
                Ok(Response::info(put_message(total, insert)))
            }
            RangeOp::Copy { dest, insert } => {
                guard_range(range)?;
                let yanked = self.buffer.yank_range(start, end);
                let data = self.buffer.slice(start, end);
                self.put(dest, &data, insert)?;
                if let Some(bytes) = yanked {
                    self.yank = bytes;
                }
                self.jump(dest.saturating_add(data.len()));
                let verb = if insert { "inserted" } else { "copied" };
                Ok(Response::info(format!("{} bytes {verb}.", data.len())))
            }
            RangeOp::Move { dest } => self.move_range(range, dest),
            RangeOp::Bitwise { op, operand } => {
                let count = self.transform(range, |bytes| op.apply(bytes, operand))?;
                self.jump(end + 1);
                Ok(Response::info(format!("{count} bytes {}.", BitOp::verb(op))))
            }
            RangeOp::Shift(shift) => {
                let count = self.transform(range, |bytes| shift.apply(bytes))?;
                Ok(Response::info(shift_message(count, &shift)))
            }
        }
    }

    /// Overwrite or insert `data` at `at`
    fn put(&mut self, at: usize, data: &[u8], insert: bool) -> Result<(), CommandError> {
        if insert {
            self.buffer.insert(at, data)?;
        } else {
            self.buffer.overwrite(at, data)?;
        }
        Ok(())
    }

    /// Read the range with zero fill, rewrite it in place, write it back
    fn transform(
        &mut self,
        range: AddressRange,
        f: impl FnOnce(&mut [u8]),
    ) -> Result<usize, CommandError> {
        guard_range(range)?;
        let mut bytes = self.buffer.slice(range.start, range.end);
        f(&mut bytes);
        self.buffer.overwrite(range.start, &bytes)?;
        Ok(bytes.len())
    }

    fn move_range(&mut self, range: AddressRange, dest: usize) -> Result<Response, CommandError> {
        guard_range(range)?;
        let AddressRange { start, end, .. } = range;
        if (start..=end).contains(&dest) {
            self.jump(end + 1);
            return Ok(Response::none());
        }
        let len = self.buffer.len();
        if start >= len {
            self.jump(dest);
            return Ok(Response::none());
        }

        let block = self.buffer.slice(start, end);
        if dest > len && dest.checked_add(block.len()).map_or(true, |n| n > MAX_LENGTH) {
            return Err(CommandError::MemoryOverflow);
        }
        if let Some(removed) = self.buffer.delete(start, end) {
            self.yank = removed;
        }
        let cursor = if dest > len {
            self.buffer.overwrite(dest, &block)?;
            dest + block.len()
        } else if dest > start {
            self.buffer.insert(dest - block.len(), &block)?;
            dest
        } else {
            self.buffer.insert(dest, &block)?;
            dest + block.len()
        };
        self.jump(cursor);
        Ok(Response::info(format!("{} bytes moved.", block.len())))
    }

    // ========== Substitution ==========

    fn substitute(
        &mut self,
        range: AddressRange,
        pattern: Option<SearchTarget>,
        replacement: &[u8],
    ) -> Result<Response, CommandError> {
        match pattern {
            Some(SearchTarget::Literal(bytes)) => self.search.set_literal(bytes),
            Some(SearchTarget::Regex(source)) => self.search.set_regex(&source)?,
            None => {}
        }
        if !self.search.has_criteria() || self.search.span() == 0 {
            return Err(CommandError::NoSearchObject);
        }

        let (start, end) = if range.is_explicit() {
            (range.start, range.end)
        } else {
            (0, self.buffer.last_address())
        };

        let saved_cursor = self.cursor;
        let saved_report = self.search.report();
        self.search.set_report(false);
        let result = self.replace_all(start, end, replacement);
        self.search.set_report(saved_report);
        self.jump(saved_cursor);

        let count = result?;
        log::debug!("Substitution replaced {} matches", count);
        Ok(Response::info(format!("{count} times replaced.")))
    }

    /// Replace every match starting in `[start, end]`, tracking the range
    /// end as replacements grow or shrink the buffer
    fn replace_all(
        &mut self,
        start: usize,
        mut end: usize,
        replacement: &[u8],
    ) -> Result<usize, CommandError> {
        let mut pos = start;
        let mut count = 0;
        while let Some(hit) = self.search.search_forward_no_wrap(&self.buffer, pos) {
            if hit > end {
                break;
            }
            let span = self.search.span();
            if span == 0 {
                // Zero-width match: nothing to remove, try the next address.
                pos = hit + 1;
                continue;
            }
            if replaced_len(self.buffer.len(), span, replacement.len()).is_none() {
                return Err(CommandError::MemoryOverflow);
            }
            self.buffer.delete(hit, hit + span - 1);
            self.buffer.insert(hit, replacement)?;
            count += 1;
            pos = hit + replacement.len();
            match end
                .checked_add(replacement.len())
                .and_then(|e| e.checked_sub(span))
            {
                Some(adjusted) => end = adjusted,
                None => break,
            }
        }
        Ok(count)
    }
}

/// Fail before touching anything when the range cannot fit in a buffer
fn guard_range(range: AddressRange) -> Result<(), CommandError> {
    if range.end >= MAX_LENGTH {
        return Err(CommandError::MemoryOverflow);
    }
    Ok(())
}

fn put_message(count: usize, insert: bool) -> String {
    if insert {
        format!("{count} bytes inserted.")
    } else {
        format!("{count} bytes overwritten.")
    }
}

fn shift_message(count: usize, shift: &Shift) -> String {
    if shift.is_rotate() {
        format!("{count} bytes rotated.")
    } else {
        format!("{count} bytes shifted.")
    }
}

/// Split a digit string into groups of four separated by spaces
fn grouped(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    chars
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Buffer length after swapping `span` bytes for `replacement` bytes
fn replaced_len(len: usize, span: usize, replacement: usize) -> Option<usize> {
    len.checked_sub(span)?
        .checked_add(replacement)
        .filter(|&n| n <= MAX_LENGTH)
}

/// Render a value in decimal, hex, octal, binary and as a character
pub fn describe_value(value: usize) -> String {
    let v = value as u64;
    let ch = match u8::try_from(v) {
        Ok(b) if b < 0x20 => format!("^{} ", char::from(b + b'@')),
        Ok(b) if b < 0x7E => format!("'{}'", char::from(b)),
        _ => " . ".to_string(),
    };
    format!(
        "d{:>10}  x{}  o{} {}\nb{}",
        v,
        grouped(&format!("{v:016X}")),
        grouped(&format!("{v:024o}")),
        ch,
        grouped(&format!("{v:064b}")),
    )
}
