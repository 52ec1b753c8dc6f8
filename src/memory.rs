use crate::vm::Error;

/// Number of addressable cells.
pub const MEMORY_SIZE: usize = 0xFF;

/// Main memory of the machine.
///
/// Every access goes through the memory address register (`mar`) and memory
/// data register (`mdr`), which hold the last address touched and the value
/// read or written there.
#[derive(Debug, Clone)]
pub struct Memory {
  cells: Vec<u8>,
  mar: usize,
  mdr: u8,
}

impl Memory {
  pub fn new() -> Self {
    Self {
      cells: vec![0; MEMORY_SIZE],
      mar: 0,
      mdr: 0,
    }
  }

  pub fn read(&mut self, address: usize) -> Result<u8, Error> {
    let value = *self
      .cells
      .get(address)
      .ok_or(Error::MemoryOutOfBounds { address })?;
    self.mar = address;
    self.mdr = value;
    Ok(value)
  }

  pub fn write(&mut self, address: usize, value: u8) -> Result<(), Error> {
    let cell = self
      .cells
      .get_mut(address)
      .ok_or(Error::MemoryOutOfBounds { address })?;
    *cell = value;
    self.mar = address;
    self.mdr = value;
    Ok(())
  }

  /// Reads a cell without going through `mar`/`mdr`.
  pub fn peek(&self, address: usize) -> Option<u8> {
    self.cells.get(address).copied()
  }

  pub fn mar(&self) -> usize {
    self.mar
  }

  pub fn mdr(&self) -> u8 {
    self.mdr
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn as_slice(&self) -> &[u8] {
    &self.cells
  }
}

impl Default for Memory {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_is_zeroed() {
    let memory = Memory::new();
    assert_eq!(memory.len(), MEMORY_SIZE);
    assert!(memory.as_slice().iter().all(|&cell| cell == 0));
  }

  #[test]
  fn write_then_read() {
    let mut memory = Memory::new();
    memory.write(0x10, 42).unwrap();
    assert_eq!((memory.mar(), memory.mdr()), (0x10, 42));
    memory.write(0x11, 7).unwrap();
    assert_eq!(memory.read(0x10).unwrap(), 42);
    assert_eq!((memory.mar(), memory.mdr()), (0x10, 42));
  }

  #[test]
  fn last_cell_is_addressable() {
    let mut memory = Memory::new();
    memory.write(MEMORY_SIZE - 1, 0xAB).unwrap();
    assert_eq!(memory.read(MEMORY_SIZE - 1).unwrap(), 0xAB);
  }

  #[test]
  fn out_of_bounds_is_an_error() {
    let mut memory = Memory::new();
    assert!(matches!(
      memory.read(MEMORY_SIZE),
      Err(Error::MemoryOutOfBounds { address: MEMORY_SIZE })
    ));
    assert!(matches!(
      memory.write(0x100, 1),
      Err(Error::MemoryOutOfBounds { address: 0x100 })
    ));
    // failed accesses leave the shadow registers alone
    assert_eq!((memory.mar(), memory.mdr()), (0, 0));
    assert_eq!(memory.peek(MEMORY_SIZE), None);
  }
}
