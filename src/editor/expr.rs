//! Integer arithmetic inside `{...}` addresses
//!
//! Only a closed grammar is accepted, with C precedence from loosest to
//! tightest: `|`, `^`, `&`, `<< >>`, `+ -`, `* / %`, unary `- + ~`.
//! Literals are decimal unless prefixed with `0x`, `0o` or `0b`; `$`, `.` and
//! `'x` resolve like they do outside braces. Any error makes the result
//! absent. Negative results clamp to 0.

use super::address::AddressEnv;

/// Evaluate `text`, returning `None` on any syntax or arithmetic error
pub fn evaluate(text: &str, env: AddressEnv<'_>) -> Option<usize> {
    let mut eval = Evaluator {
        chars: text.chars().collect(),
        pos: 0,
        env,
    };
    let value = eval.or()?;
    eval.skip_ws();
    if eval.pos != eval.chars.len() {
        return None;
    }
    if value < 0 {
        Some(0)
    } else {
        Some(usize::try_from(value).unwrap_or(usize::MAX))
    }
}

struct Evaluator<'a> {
    chars: Vec<char>,
    pos: usize,
    env: AddressEnv<'a>,
}

impl Evaluator<'_> {
    fn skip_ws(&mut self) {
        while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).copied()
    }

    /// Consume `op` if it is next and not the start of a longer operator
    fn eat_op(&mut self, op: &str) -> bool {
        self.skip_ws();
        let len = op.chars().count();
        let matches = op
            .chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c));
        if matches {
            self.pos += len;
        }
        matches
    }

    fn or(&mut self) -> Option<i128> {
        let mut v = self.xor()?;
        while self.eat_op("|") {
            v |= self.xor()?;
        }
        Some(v)
    }

    fn xor(&mut self) -> Option<i128> {
        let mut v = self.and()?;
        while self.eat_op("^") {
            v ^= self.and()?;
        }
        Some(v)
    }

    fn and(&mut self) -> Option<i128> {
        let mut v = self.shift()?;
        while self.eat_op("&") {
            v &= self.shift()?;
        }
        Some(v)
    }

    fn shift(&mut self) -> Option<i128> {
        let mut v = self.sum()?;
        loop {
            if self.eat_op("<<") {
                let n = u32::try_from(self.sum()?).ok().filter(|&n| n < 127)?;
                v = v.checked_mul(1i128 << n)?;
            } else if self.eat_op(">>") {
                let n = u32::try_from(self.sum()?).ok()?;
                v = v.checked_shr(n).unwrap_or(if v < 0 { -1 } else { 0 });
            } else {
                return Some(v);
            }
        }
    }

    fn sum(&mut self) -> Option<i128> {
        let mut v = self.product()?;
        loop {
            if self.eat_op("+") {
                v = v.checked_add(self.product()?)?;
            } else if self.eat_op("-") {
                v = v.checked_sub(self.product()?)?;
            } else {
                return Some(v);
            }
        }
    }

    fn product(&mut self) -> Option<i128> {
        let mut v = self.unary()?;
        loop {
            if self.eat_op("*") {
                v = v.checked_mul(self.unary()?)?;
            } else if self.eat_op("/") {
                v = v.checked_div_euclid(self.unary()?)?;
            } else if self.eat_op("%") {
                v = v.checked_rem_euclid(self.unary()?)?;
            } else {
                return Some(v);
            }
        }
    }

    fn unary(&mut self) -> Option<i128> {
        if self.eat_op("-") {
            self.unary()?.checked_neg()
        } else if self.eat_op("+") {
            self.unary()
        } else if self.eat_op("~") {
            Some(!self.unary()?)
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Option<i128> {
        match self.peek()? {
            '(' => {
                self.pos += 1;
                let v = self.or()?;
                self.eat_op(")").then_some(v)
            }
            '$' => {
                self.pos += 1;
                Some(self.env.last_address() as i128)
            }
            '.' => {
                self.pos += 1;
                Some(self.env.cursor as i128)
            }
            '\'' => {
                let name = *self.chars.get(self.pos + 1)?;
                self.pos += 2;
                self.env.marks.get(name).map(|a| a as i128)
            }
            c if c.is_ascii_digit() => self.number(),
            _ => None,
        }
    }

    fn number(&mut self) -> Option<i128> {
        let radix = match (self.chars.get(self.pos), self.chars.get(self.pos + 1)) {
            (Some('0'), Some('x' | 'X')) => 16,
            (Some('0'), Some('o' | 'O')) => 8,
            (Some('0'), Some('b' | 'B')) => 2,
            _ => 10,
        };
        if radix != 10 {
            self.pos += 2;
        }
        let start = self.pos;
        let mut v: i128 = 0;
        while let Some(d) = self.chars.get(self.pos).and_then(|c| c.to_digit(radix)) {
            v = v.checked_mul(radix as i128)?.checked_add(d as i128)?;
            self.pos += 1;
        }
        (self.pos > start).then_some(v)
    }
}
