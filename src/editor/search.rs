//! Literal and regex search over the byte buffer
//!
//! A search pattern is either a literal byte sequence or a regular
//! expression. Regex matching decodes a bounded window of bytes starting at
//! the candidate address as (lossy) UTF-8 and anchors the pattern at the
//! start of that text. The match length in *bytes* is kept in `span` since
//! the editing commands work on byte addresses.

use regex::Regex;

use super::buffer::ByteBuffer;

/// Maximum number of bytes decoded for one regex match attempt
pub const REGEX_WINDOW: usize = 128;

/// Current search pattern
#[derive(Debug, Clone, Default)]
pub enum SearchPattern {
    /// No search has been set up yet
    #[default]
    None,
    /// Exact byte sequence
    Literal(Vec<u8>),
    /// Regular expression, anchored at the candidate address
    Regex {
        /// Pattern as typed by the user
        source: String,
        /// Compiled `^(?:source)`
        compiled: Regex,
    },
}

/// Where a successful search landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    /// Address of the match
    pub addr: usize,
    /// The scan passed the end (or start) of the buffer before matching
    pub wrapped: bool,
}

/// Search state that persists between commands
#[derive(Debug, Clone)]
pub struct SearchEngine {
    pattern: SearchPattern,
    /// Byte length of the most recent successful match
    span: usize,
    /// Whether forward/backward scans continue from the other end
    wraparound: bool,
    /// Whether "wrapped"/"not found" notices should be shown
    report: bool,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self {
            pattern: SearchPattern::None,
            span: 0,
            wraparound: true,
            report: true,
        }
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl SearchEngine {
    /// Create an engine with no pattern and wraparound enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pattern
    pub fn pattern(&self) -> &SearchPattern {
        &self.pattern
    }

    /// Byte length of the most recent successful match
    pub fn span(&self) -> usize {
        self.span
    }

    /// Whether a usable search criterion is set
    pub fn has_criteria(&self) -> bool {
        match &self.pattern {
            SearchPattern::None => false,
            SearchPattern::Literal(bytes) => !bytes.is_empty(),
            SearchPattern::Regex { .. } => true,
        }
    }

    /// Enable or disable wrapping for `search_forward`/`search_backward`
    pub fn set_wraparound(&mut self, enabled: bool) {
        self.wraparound = enabled;
    }

    /// Enable or disable wrap/not-found notices
    pub fn set_report(&mut self, enabled: bool) {
        self.report = enabled;
    }

    /// Whether wrap/not-found notices should be shown
    pub fn report(&self) -> bool {
        self.report
    }

    /// Switch to literal mode; the span becomes the pattern length
    pub fn set_literal(&mut self, bytes: Vec<u8>) {
        self.span = bytes.len();
        self.pattern = SearchPattern::Literal(bytes);
    }

    /// Switch to regex mode
    ///
    /// The span is seeded with the pattern's length so a caller can tell an
    /// empty pattern apart before any match has been made.
    pub fn set_regex(&mut self, source: &str) -> Result<(), regex::Error> {
        let compiled = Regex::new(&format!("^(?:{source})"))?;
        self.span = source.len();
        self.pattern = SearchPattern::Regex {
            source: source.to_string(),
            compiled,
        };
        Ok(())
    }

    /// Test whether the pattern matches at `addr`, updating `span` on success
    pub fn matches_at(&mut self, buffer: &ByteBuffer, addr: usize) -> bool {
        let data = buffer.as_slice();
        match &self.pattern {
            SearchPattern::None => false,
            SearchPattern::Literal(bytes) => {
                if bytes.is_empty() {
                    return false;
                }
                let hit = bytes
                    .iter()
                    .enumerate()
                    .all(|(i, b)| addr.checked_add(i).and_then(|a| data.get(a)) == Some(b));
                if hit {
                    self.span = bytes.len();
                }
                hit
            }
            SearchPattern::Regex { compiled, .. } => {
                let start = addr.min(data.len());
                let end = start.saturating_add(REGEX_WINDOW).min(data.len());
                let text = decode_lossy(&data[start..end]);
                match compiled.find(&text) {
                    Some(m) => {
                        self.span = m.as_str().len();
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Scan forward from `from`, wrapping to 0 at the end if enabled
    ///
    /// Gives up once every address has been tried once.
    pub fn search_forward(&mut self, buffer: &ByteBuffer, from: usize) -> Option<SearchHit> {
        let len = buffer.len();
        if !self.has_criteria() || len == 0 {
            return None;
        }
        let start = if from >= len {
            if !self.wraparound {
                return None;
            }
            0
        } else {
            from
        };
        let mut wrapped = from >= len;
        let mut addr = start;
        loop {
            if self.matches_at(buffer, addr) {
                if wrapped {
                    log::debug!("Forward search wrapped to {:#x}", addr);
                }
                return Some(SearchHit { addr, wrapped });
            }
            addr += 1;
            if addr >= len {
                if !self.wraparound {
                    return None;
                }
                addr = 0;
                wrapped = true;
            }
            if addr == start {
                return None;
            }
        }
    }

    /// Scan backward from `from`, wrapping to the last address if enabled
    pub fn search_backward(&mut self, buffer: &ByteBuffer, from: usize) -> Option<SearchHit> {
        let len = buffer.len();
        if !self.has_criteria() || len == 0 {
            return None;
        }
        let start = if from >= len {
            if !self.wraparound {
                return None;
            }
            len - 1
        } else {
            from
        };
        let mut wrapped = from >= len;
        let mut addr = start;
        loop {
            if self.matches_at(buffer, addr) {
                if wrapped {
                    log::debug!("Backward search wrapped to {:#x}", addr);
                }
                return Some(SearchHit { addr, wrapped });
            }
            if addr == 0 {
                if !self.wraparound {
                    return None;
                }
                addr = len - 1;
                wrapped = true;
            } else {
                addr -= 1;
            }
            if addr == start {
                return None;
            }
        }
    }

    /// Scan forward from `from` up to the end of the buffer, never wrapping
    pub fn search_forward_no_wrap(&mut self, buffer: &ByteBuffer, from: usize) -> Option<usize> {
        if !self.has_criteria() {
            return None;
        }
        (from..buffer.len()).find(|&addr| self.matches_at(buffer, addr))
    }
}
