//! Address expressions and ranges on a command line
//!
//! ```text
//! value      := '$' | '.' | "'" mark | hexdigits | '%' decdigits | '{' arith '}'
//! expression := value [ ('+' | '-') value ]
//! range      := expression [ ',' ( '*' expression | expression ) ]
//! ```
//!
//! Hex is the default radix. Every parse function returns `None` for an
//! absent or malformed address and never a placeholder number.

use super::expr;
use super::marks::MarkTable;

/// What an address can refer to besides literal numbers
#[derive(Clone, Copy)]
pub struct AddressEnv<'a> {
    /// Current buffer length (for `$`)
    pub len: usize,
    /// Current position (for `.`)
    pub cursor: usize,
    /// Marks (for `'x`)
    pub marks: &'a MarkTable,
}

impl AddressEnv<'_> {
    /// Value of `$`: last address, or 0 for an empty buffer
    pub fn last_address(&self) -> usize {
        self.len.saturating_sub(1)
    }
}

/// Inclusive address range plus whether each end was written out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    pub start: usize,
    pub end: usize,
    /// The start address was given (not defaulted to the cursor)
    pub explicit_start: bool,
    /// The end address was given as an absolute address
    pub explicit_end: bool,
}

impl AddressRange {
    /// Number of addresses covered
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Whether any address was written on the line
    pub fn is_explicit(&self) -> bool {
        self.explicit_start || self.explicit_end
    }
}

/// Character cursor over one command line
pub struct LineParser<'a> {
    chars: Vec<char>,
    pos: usize,
    env: AddressEnv<'a>,
}

impl<'a> LineParser<'a> {
    /// Start parsing `line` at its first character
    pub fn new(line: &str, env: AddressEnv<'a>) -> Self {
        Self {
            chars: line.chars().collect(),
            pos: 0,
            env,
        }
    }

    /// Whether the whole line has been consumed
    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Character at the cursor
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Character one past the cursor
    pub fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    /// Consume one character
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Consume `c` if it is next
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip blanks
    pub fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }

    /// Everything from the cursor to the end of the line, consumed
    pub fn take_rest(&mut self) -> String {
        let rest: String = self.chars[self.pos.min(self.chars.len())..].iter().collect();
        self.pos = self.chars.len();
        rest
    }

    /// Parse a single address token
    pub fn value(&mut self) -> Option<usize> {
        self.skip_spaces();
        let c = self.peek()?;
        match c {
            '$' => {
                self.pos += 1;
                Some(self.env.last_address())
            }
            '.' => {
                self.pos += 1;
                Some(self.env.cursor)
            }
            '{' => self.braced(),
            '\'' if self.peek_second().is_some_and(|m| m.is_ascii_lowercase()) => {
                let name = self.peek_second()?;
                let addr = self.env.marks.get(name)?;
                self.pos += 2;
                Some(addr)
            }
            '%' => {
                self.pos += 1;
                Some(self.digits(10))
            }
            c if c.is_ascii_hexdigit() => Some(self.digits(16)),
            _ => None,
        }
    }

    /// Greedy run of digits in `radix`; saturates instead of overflowing
    fn digits(&mut self, radix: u32) -> usize {
        let mut value: usize = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(radix)) {
            value = value
                .saturating_mul(radix as usize)
                .saturating_add(d as usize);
            self.pos += 1;
        }
        value
    }

    fn braced(&mut self) -> Option<usize> {
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('}') => break,
                Some(c) => text.push(c),
                None => return None,
            }
        }
        expr::evaluate(&text, self.env)
    }

    /// Parse `value [(+|-) value]`
    ///
    /// The operator is only looked at when the first value parsed. A missing
    /// right operand makes the whole expression absent.
    pub fn expression(&mut self) -> Option<usize> {
        let x = self.value()?;
        if self.eat('+') {
            let y = self.value()?;
            Some(x.saturating_add(y))
        } else if self.eat('-') {
            let y = self.value()?;
            Some(x.saturating_sub(y))
        } else {
            Some(x)
        }
    }

    /// Parse an address range, defaulting the start to the cursor
    pub fn range(&mut self) -> AddressRange {
        self.skip_spaces();
        let (start, explicit_start) = match self.expression() {
            Some(x) => (x, true),
            None => (self.env.cursor, false),
        };
        let mut end = start;
        let mut explicit_end = false;

        self.skip_spaces();
        if self.eat(',') {
            self.skip_spaces();
            if self.eat('*') {
                self.skip_spaces();
                let count = self.expression().unwrap_or(1);
                end = start.saturating_add(count).saturating_sub(1);
            } else if let Some(t) = self.expression() {
                end = t;
                explicit_end = true;
            }
        }

        AddressRange {
            start,
            end: end.max(start),
            explicit_start,
            explicit_end,
        }
    }
}
