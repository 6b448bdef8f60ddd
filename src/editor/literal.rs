//! Literal data on a command line: pattern strings, byte lists, comments

use super::address::LineParser;

/// Comment marker; everything from an unescaped marker on is dropped
pub const COMMENT_MARKER: char = '#';

/// Strip a trailing comment from a command line
///
/// `\#` becomes a literal `#` and `\n` becomes a line break.
pub fn strip_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == COMMENT_MARKER {
            break;
        }
        if c == '\\' {
            match chars.peek() {
                Some(&COMMENT_MARKER) => {
                    chars.next();
                    out.push(COMMENT_MARKER);
                    continue;
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

impl LineParser<'_> {
    /// Read a `/`-delimited pattern body, stopping before the closing `/`
    ///
    /// `\/` yields a literal slash, `\\` is kept as an escaped backslash for
    /// the regex engine, and a lone trailing backslash is dropped.
    pub fn pattern_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '/' {
                break;
            }
            if c == '\\' {
                match self.peek_second() {
                    Some('\\') => {
                        text.push_str("\\\\");
                        self.bump();
                        self.bump();
                        continue;
                    }
                    Some('/') => {
                        text.push('/');
                        self.bump();
                        self.bump();
                        continue;
                    }
                    None => {
                        self.bump();
                        break;
                    }
                    Some(_) => {}
                }
            }
            text.push(c);
            self.bump();
        }
        text
    }

    /// Pattern text encoded as UTF-8 bytes
    pub fn text_bytes(&mut self) -> Vec<u8> {
        self.pattern_text().into_bytes()
    }

    /// A run of address expressions, each masked to one byte
    ///
    /// Stops at the first token that does not parse.
    pub fn byte_list(&mut self) -> Vec<u8> {
        let mut bytes = Vec::new();
        while !self.at_end() {
            match self.expression() {
                Some(v) => bytes.push((v & 0xFF) as u8),
                None => break,
            }
        }
        bytes
    }

    /// `/text` as UTF-8, `//b1 b2 ...` as bytes, anything else as no data
    pub fn text_or_bytes(&mut self) -> Vec<u8> {
        self.skip_spaces();
        if !self.eat('/') {
            return Vec::new();
        }
        if self.eat('/') {
            self.byte_list()
        } else {
            self.text_bytes()
        }
    }

    /// Like `text_or_bytes`, but a bare byte list is accepted too
    pub fn data(&mut self) -> Vec<u8> {
        self.skip_spaces();
        if self.peek() == Some('/') {
            self.text_or_bytes()
        } else {
            self.byte_list()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::address::AddressEnv;
    use crate::editor::marks::MarkTable;

    fn with_parser<T>(line: &str, f: impl FnOnce(&mut LineParser<'_>) -> T) -> T {
        let marks = MarkTable::new();
        let env = AddressEnv {
            len: 0x10,
            cursor: 3,
            marks: &marks,
        };
        let mut parser = LineParser::new(line, env);
        f(&mut parser)
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("10 y # yank it"), "10 y ");
        assert_eq!(strip_comment("/\\#tag/"), "/#tag/");
        assert_eq!(strip_comment("o /a\\nb/"), "o /a\nb/");
        assert_eq!(strip_comment("# whole line"), "");
        assert_eq!(strip_comment("plain"), "plain");
    }

    #[test]
    fn test_pattern_text_stops_at_slash() {
        with_parser("ab+c/rest", |p| {
            assert_eq!(p.pattern_text(), "ab+c");
            assert_eq!(p.peek(), Some('/'));
        });
    }

    #[test]
    fn test_pattern_text_escapes() {
        with_parser(r"a\/b\\c/", |p| assert_eq!(p.pattern_text(), r"a/b\\c"));
        with_parser(r"\d+", |p| assert_eq!(p.pattern_text(), r"\d+"));
        with_parser("abc\\", |p| {
            assert_eq!(p.pattern_text(), "abc");
            assert!(p.at_end());
        });
    }

    #[test]
    fn test_byte_list() {
        with_parser("41 42 1ff .+1/", |p| {
            assert_eq!(p.byte_list(), vec![0x41, 0x42, 0xFF, 0x04]);
            assert_eq!(p.peek(), Some('/'));
        });
    }

    #[test]
    fn test_text_or_bytes() {
        with_parser(" /héllo/", |p| {
            assert_eq!(p.text_or_bytes(), "héllo".as_bytes().to_vec());
        });
        with_parser("//de ad/", |p| assert_eq!(p.text_or_bytes(), vec![0xDE, 0xAD]));
        with_parser("de ad", |p| assert!(p.text_or_bytes().is_empty()));
    }

    #[test]
    fn test_data_accepts_bare_bytes() {
        with_parser(" de ad", |p| assert_eq!(p.data(), vec![0xDE, 0xAD]));
        with_parser("/hi/", |p| assert_eq!(p.data(), b"hi".to_vec()));
    }
}
