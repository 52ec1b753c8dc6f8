use crate::vm::Error;

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// The register reserved for the stack pointer.
pub const SP: usize = 7;

/// Where the stack pointer starts; the stack grows down from here.
pub const SP_INIT: u8 = 0xF4;

/// A single 8-bit register.
pub type Register = u8;

/// The register file. `R7` doubles as the stack pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers([Register; REGISTER_COUNT]);

impl Registers {
  pub fn new() -> Self {
    let mut registers = [0; REGISTER_COUNT];
    registers[SP] = SP_INIT;
    Self(registers)
  }

  pub fn get(&self, index: usize) -> Result<Register, Error> {
    self
      .0
      .get(index)
      .copied()
      .ok_or(Error::RegisterOutOfBounds { index })
  }

  pub fn set(&mut self, index: usize, value: Register) -> Result<(), Error> {
    let register = self
      .0
      .get_mut(index)
      .ok_or(Error::RegisterOutOfBounds { index })?;
    *register = value;
    Ok(())
  }

  pub fn sp(&self) -> Register {
    self.0[SP]
  }

  pub fn set_sp(&mut self, value: Register) {
    self.0[SP] = value;
  }

  pub fn as_array(&self) -> &[Register; REGISTER_COUNT] {
    &self.0
  }
}

impl Default for Registers {
  fn default() -> Self {
    Self::new()
  }
}
