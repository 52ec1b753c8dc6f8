use std::fmt;

use crate::opcode::AluOp;
use crate::registers::Register;
use crate::vm::Error;

/// The flags register, laid out as `00000LGE`.
///
/// Only `CMP` writes it, and it always leaves exactly one bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u8);

impl Flags {
  pub const EQUAL: Flags = Flags(0b001);
  pub const GREATER: Flags = Flags(0b010);
  pub const LESS: Flags = Flags(0b100);

  pub const fn empty() -> Self {
    Flags(0)
  }

  pub fn compare(a: Register, b: Register) -> Self {
    use std::cmp::Ordering;
    match a.cmp(&b) {
      Ordering::Equal => Self::EQUAL,
      Ordering::Greater => Self::GREATER,
      Ordering::Less => Self::LESS,
    }
  }

  pub const fn bits(self) -> u8 {
    self.0
  }

  pub const fn contains(self, other: Flags) -> bool {
    self.0 & other.0 == other.0
  }

  pub const fn equal(self) -> bool {
    self.contains(Self::EQUAL)
  }
}

impl fmt::Display for Flags {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let bit = |flag: Flags, c: char| if self.contains(flag) { c } else { '-' };
    write!(
      f,
      "{}{}{}",
      bit(Self::LESS, 'L'),
      bit(Self::GREATER, 'G'),
      bit(Self::EQUAL, 'E')
    )
  }
}

/// What an ALU operation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Store the value into the first operand's register.
  Write(Register),
  /// Replace the flags register; no register changes.
  Flags(Flags),
}

/// Computes `op` over the values of two registers.
///
/// Results are always truncated to the width of a register. `Not` ignores `b`.
pub fn execute(op: AluOp, a: Register, b: Register) -> Result<Outcome, Error> {
  let value = match op {
    AluOp::Add => a.wrapping_add(b),
    AluOp::Multiply => a.wrapping_mul(b),
    AluOp::Compare => return Ok(Outcome::Flags(Flags::compare(a, b))),
    AluOp::And => a & b,
    AluOp::Or => a | b,
    AluOp::Xor => a ^ b,
    AluOp::Not => !a,
    // anything shifted by the full width or more is gone
    AluOp::ShiftLeft => a.checked_shl(b.into()).unwrap_or(0),
    AluOp::ShiftRight => a.checked_shr(b.into()).unwrap_or(0),
    AluOp::Modulo => a.checked_rem(b).ok_or(Error::DivideByZero)?,
  };
  Ok(Outcome::Write(value))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write(op: AluOp, a: Register, b: Register) -> Register {
    match execute(op, a, b).unwrap() {
      Outcome::Write(value) => value,
      Outcome::Flags(flags) => panic!("{op:?} set flags {flags}"),
    }
  }

  #[test]
  fn arithmetic_wraps_to_eight_bits() {
    assert_eq!(write(AluOp::Add, 8, 9), 17);
    assert_eq!(write(AluOp::Add, 0xFF, 2), 1);
    assert_eq!(write(AluOp::Multiply, 8, 9), 72);
    assert_eq!(write(AluOp::Multiply, 16, 16), 0);
    assert_eq!(write(AluOp::Multiply, 0x81, 3), 0x83);
  }

  #[test]
  fn bitwise() {
    assert_eq!(write(AluOp::And, 0b1100, 0b1010), 0b1000);
    assert_eq!(write(AluOp::Or, 0b1100, 0b1010), 0b1110);
    assert_eq!(write(AluOp::Xor, 0b1100, 0b1010), 0b0110);
    assert_eq!(write(AluOp::Not, 0b0000_1111, 0xAA), 0b1111_0000);
  }

  #[test]
  fn shifts() {
    assert_eq!(write(AluOp::ShiftLeft, 0b0000_0001, 3), 0b0000_1000);
    assert_eq!(write(AluOp::ShiftLeft, 0b1100_0000, 1), 0b1000_0000);
    assert_eq!(write(AluOp::ShiftLeft, 1, 8), 0);
    assert_eq!(write(AluOp::ShiftRight, 0b1000_0000, 7), 1);
    assert_eq!(write(AluOp::ShiftRight, 0xFF, 200), 0);
  }

  #[test]
  fn modulo() {
    assert_eq!(write(AluOp::Modulo, 17, 5), 2);
    assert_eq!(write(AluOp::Modulo, 15, 5), 0);
    assert!(matches!(
      execute(AluOp::Modulo, 17, 0),
      Err(Error::DivideByZero)
    ));
  }

  #[test]
  fn compare_sets_one_flag() {
    let cases = [
      (5, 5, Flags::EQUAL),
      (6, 5, Flags::GREATER),
      (4, 5, Flags::LESS),
      (0xFF, 0, Flags::GREATER),
    ];
    for (a, b, expected) in cases {
      let outcome = execute(AluOp::Compare, a, b).unwrap();
      assert_eq!(outcome, Outcome::Flags(expected));
      assert_eq!(expected.bits().count_ones(), 1);
    }
  }

  #[test]
  fn flags_display() {
    assert_eq!(Flags::empty().to_string(), "---");
    assert_eq!(Flags::EQUAL.to_string(), "--E");
    assert_eq!(Flags::LESS.to_string(), "L--");
    assert!(Flags::EQUAL.equal());
    assert!(!Flags::GREATER.equal());
  }
}
