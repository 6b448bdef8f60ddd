//! Byte-range transforms: fill, bitwise combine, shift and rotate
//!
//! These work on a copy of the affected range. The interpreter reads the
//! range with zero fill, transforms it here, and overwrites it back, which
//! extends the buffer exactly like byte-by-byte writes would.

/// Bitwise operator combined with an 8-bit operand
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitOp {
    And,
    Or,
    Xor,
}

impl BitOp {
    /// Apply the operator to every byte
    pub fn apply(self, bytes: &mut [u8], operand: u8) {
        for b in bytes.iter_mut() {
            *b = match self {
                BitOp::And => *b & operand,
                BitOp::Or => *b | operand,
                BitOp::Xor => *b ^ operand,
            };
        }
    }

    /// Past-tense verb used in status messages
    pub fn verb(self) -> &'static str {
        match self {
            BitOp::And => "anded",
            BitOp::Or => "ored",
            BitOp::Xor => "xored",
        }
    }
}

/// Complement every byte
pub fn not(bytes: &mut [u8]) {
    for b in bytes.iter_mut() {
        *b = !*b;
    }
}

/// Repeat `pattern` and cut it to exactly `len` bytes
pub fn tile(pattern: &[u8], len: usize) -> Vec<u8> {
    if pattern.is_empty() {
        return Vec::new();
    }
    pattern.iter().copied().cycle().take(len).collect()
}

/// Shift direction; `Left` moves bits toward the most significant end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// One shift/rotate command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shift {
    pub direction: Direction,
    /// Number of single-bit steps
    pub count: usize,
    /// Incoming bit for a shift; `None` rotates instead
    pub carry_in: Option<u8>,
    /// Treat the range as one big-endian integer instead of separate bytes
    pub multibyte: bool,
}

impl Shift {
    /// Whether this rotates rather than shifts
    pub fn is_rotate(&self) -> bool {
        self.carry_in.is_none()
    }

    /// Apply the whole command to `bytes`
    pub fn apply(&self, bytes: &mut [u8]) {
        if bytes.is_empty() {
            return;
        }
        let width = if self.multibyte { bytes.len() * 8 } else { 8 };
        // Rotation is periodic and a shift saturates after `width` steps.
        let steps = if self.is_rotate() {
            self.count % width
        } else {
            self.count.min(width)
        };
        for _ in 0..steps {
            if self.multibyte {
                self.step_multibyte(bytes);
            } else {
                for b in bytes.iter_mut() {
                    *b = self.step_byte(*b);
                }
            }
        }
    }

    fn step_byte(&self, b: u8) -> u8 {
        match self.direction {
            Direction::Left => {
                let carry = self.carry_in.unwrap_or(b >> 7);
                (b << 1) | (carry & 1)
            }
            Direction::Right => {
                let carry = self.carry_in.unwrap_or(b & 1);
                (b >> 1) | ((carry & 1) << 7)
            }
        }
    }

    /// Lowest address holds the most significant byte
    fn step_multibyte(&self, bytes: &mut [u8]) {
        let last = bytes.len() - 1;
        match self.direction {
            Direction::Left => {
                let carry = self.carry_in.unwrap_or(bytes[0] >> 7) & 1;
                for i in 0..last {
                    bytes[i] = (bytes[i] << 1) | (bytes[i + 1] >> 7);
                }
                bytes[last] = (bytes[last] << 1) | carry;
            }
            Direction::Right => {
                let carry = self.carry_in.unwrap_or(bytes[last] & 1) & 1;
                for i in (1..=last).rev() {
                    bytes[i] = (bytes[i] >> 1) | (bytes[i - 1] << 7);
                }
                bytes[0] = (bytes[0] >> 1) | (carry << 7);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate(direction: Direction, count: usize, multibyte: bool) -> Shift {
        Shift {
            direction,
            count,
            carry_in: None,
            multibyte,
        }
    }

    fn shift(direction: Direction, count: usize, bit: u8, multibyte: bool) -> Shift {
        Shift {
            direction,
            count,
            carry_in: Some(bit),
            multibyte,
        }
    }

    #[test]
    fn test_tile() {
        assert_eq!(tile(&[0xAA, 0xBB], 5), vec![0xAA, 0xBB, 0xAA, 0xBB, 0xAA]);
        assert_eq!(tile(&[1, 2, 3], 2), vec![1, 2]);
        assert!(tile(&[], 4).is_empty());
    }

    #[test]
    fn test_bitops_with_ff() {
        let data = vec![0x00, 0x5A, 0xFF, 0x81];

        let mut and = data.clone();
        BitOp::And.apply(&mut and, 0xFF);
        assert_eq!(and, data);

        let mut or = data.clone();
        BitOp::Or.apply(&mut or, 0xFF);
        assert_eq!(or, vec![0xFF; 4]);

        let mut xor = data.clone();
        BitOp::Xor.apply(&mut xor, 0xFF);
        let mut complemented = data.clone();
        not(&mut complemented);
        assert_eq!(xor, complemented);
        assert_eq!(complemented, vec![0xFF, 0xA5, 0x00, 0x7E]);
    }

    #[test]
    fn test_byte_rotate() {
        let mut bytes = [0x81, 0x01];
        rotate(Direction::Left, 1, false).apply(&mut bytes);
        assert_eq!(bytes, [0x03, 0x02]);
        rotate(Direction::Right, 1, false).apply(&mut bytes);
        assert_eq!(bytes, [0x81, 0x01]);
    }

    #[test]
    fn test_byte_rotate_eight_times_is_identity() {
        for value in [0x00u8, 0x01, 0x80, 0xA5, 0xFF, 0x3C] {
            let mut bytes = [value];
            for _ in 0..8 {
                rotate(Direction::Left, 1, false).apply(&mut bytes);
            }
            assert_eq!(bytes, [value]);
        }
    }

    #[test]
    fn test_byte_shift_with_carry() {
        let mut bytes = [0x80, 0x01];
        shift(Direction::Left, 1, 1, false).apply(&mut bytes);
        assert_eq!(bytes, [0x01, 0x03]);

        let mut bytes = [0x80, 0x01];
        shift(Direction::Right, 1, 0, false).apply(&mut bytes);
        assert_eq!(bytes, [0x40, 0x00]);

        let mut bytes = [0x12];
        shift(Direction::Left, 100, 1, false).apply(&mut bytes);
        assert_eq!(bytes, [0xFF]);
    }

    #[test]
    fn test_multibyte_shift_is_big_endian() {
        let mut bytes = [0x00, 0x80];
        shift(Direction::Left, 1, 0, true).apply(&mut bytes);
        assert_eq!(bytes, [0x01, 0x00]);

        let mut bytes = [0x01, 0x00];
        shift(Direction::Right, 1, 1, true).apply(&mut bytes);
        assert_eq!(bytes, [0x80, 0x80]);
    }

    #[test]
    fn test_multibyte_rotate_carries_across_ends() {
        let mut bytes = [0x80, 0x00, 0x01];
        rotate(Direction::Left, 1, true).apply(&mut bytes);
        assert_eq!(bytes, [0x00, 0x00, 0x03]);
        rotate(Direction::Right, 1, true).apply(&mut bytes);
        assert_eq!(bytes, [0x80, 0x00, 0x01]);
    }

    #[test]
    fn test_multibyte_full_rotation_is_identity() {
        let original = [0xDE, 0xAD, 0xBE, 0xEF];
        let mut bytes = original;
        for _ in 0..original.len() * 8 {
            rotate(Direction::Left, 1, true).apply(&mut bytes);
        }
        assert_eq!(bytes, original);

        rotate(Direction::Right, 5, true).apply(&mut bytes);
        assert_ne!(bytes, original);
        rotate(Direction::Left, 5 + 64, true).apply(&mut bytes);
        assert_eq!(bytes, original);
    }
}
