use std::io::Write;

use crate::alu::{self, Flags, Outcome};
use crate::memory::Memory;
use crate::opcode::{self, AluOp, Flow, Operation};
use crate::region::Region;
use crate::registers::{Register, Registers, REGISTER_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  Running,
  Halted,
  Faulted,
}

/// A virtual machine for the LS-8.
///
/// All state lives here: memory, the register file (with `R7` as the stack
/// pointer), the program counter and the flags set by `CMP`. Every instruction
/// either advances `pc` past itself and its operands, or (for `CALL`, `RET`,
/// `JMP`, `JEQ` and `JNE`) sets `pc` itself.
#[derive(Debug)]
pub struct Vm {
  pc: usize,
  memory: Memory,
  registers: Registers,
  flags: Flags,
  state: State,
}

impl Vm {
  /// Create a new virtual machine with empty memory
  pub fn new() -> Self {
    Self {
      pc: 0,
      memory: Memory::new(),
      registers: Registers::new(),
      flags: Flags::empty(),
      state: State::Running,
    }
  }

  /// Copy a region into memory starting at address zero, returning the first
  /// address after it
  pub fn load<R>(&mut self, region: &R) -> Result<usize, Error>
  where
    R: Region + ?Sized,
  {
    let bytes = region.bytes();
    for (address, &byte) in bytes.iter().enumerate() {
      self.memory.write(address, byte)?;
    }
    Ok(bytes.len())
  }

  /// Execute a single instruction, writing anything it prints to `out`.
  ///
  /// Any error faults the machine, after which it refuses to step again.
  pub fn step<W>(&mut self, out: &mut W) -> Result<(), Error>
  where
    W: Write,
  {
    match self.state {
      State::Running => {}
      State::Halted => return Err(Error::MachineHalted),
      State::Faulted => return Err(Error::MachineFaulted),
    }
    log::trace!("{}", self.trace());
    let result = Task::new(self, out).run();
    if let Err(err) = &result {
      log::debug!("faulted at {:#04x}: {err}", self.pc);
      self.state = State::Faulted;
    }
    result
  }

  /// Step until the machine halts or faults
  pub fn run<W>(&mut self, out: &mut W) -> Result<(), Error>
  where
    W: Write,
  {
    while self.state == State::Running {
      self.step(out)?;
    }
    match self.state {
      State::Faulted => Err(Error::MachineFaulted),
      _ => Ok(()),
    }
  }

  /// A one line dump of the machine: `pc`, the three bytes from `pc` on and
  /// every register in hex, then the `LGE` flags.
  pub fn trace(&self) -> String {
    let byte = |address: usize| match self.memory.peek(address) {
      Some(byte) => format!("{byte:02X}"),
      None => "--".to_string(),
    };
    let mut line = format!(
      "TRACE: {:02X} | {} {} {} |",
      self.pc,
      byte(self.pc),
      byte(self.pc + 1),
      byte(self.pc + 2)
    );
    for register in self.registers.as_array() {
      line.push_str(&format!(" {register:02X}"));
    }
    line.push_str(&format!(" | {}", self.flags));
    line
  }

  pub fn pc(&self) -> usize {
    self.pc
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn flags(&self) -> Flags {
    self.flags
  }

  pub fn registers(&self) -> &[Register; REGISTER_COUNT] {
    self.registers.as_array()
  }

  fn push(&mut self, value: Register) -> Result<(), Error> {
    let sp = self.registers.sp().wrapping_sub(1);
    self.registers.set_sp(sp);
    self.memory.write(sp.into(), value)
  }

  fn pop(&mut self) -> Result<Register, Error> {
    let sp = self.registers.sp();
    let value = self.memory.read(sp.into())?;
    self.registers.set_sp(sp.wrapping_add(1));
    Ok(value)
  }
}

impl Default for Vm {
  fn default() -> Self {
    Self::new()
  }
}

/// An error that occurred during execution of instructions
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("memory address {address:#04x} is out of bounds")]
  MemoryOutOfBounds { address: usize },

  #[error("register R{index} does not exist")]
  RegisterOutOfBounds { index: usize },

  #[error("modulo by zero")]
  DivideByZero,

  #[error("machine is halted")]
  MachineHalted,

  #[error("machine has faulted")]
  MachineFaulted,

  #[error("could not write output")]
  Output(#[from] std::io::Error),
}

struct Task<'vm, 'out, W> {
  vm: &'vm mut Vm,
  out: &'out mut W,
  // address of the next byte to fetch for the current instruction
  cursor: usize,
}

impl<'vm, 'out, W> Task<'vm, 'out, W>
where
  W: Write,
{
  fn new(vm: &'vm mut Vm, out: &'out mut W) -> Self {
    let cursor = vm.pc;
    Self { vm, out, cursor }
  }

  #[inline]
  fn eat(&mut self) -> Result<u8, Error> {
    let byte = self.vm.memory.read(self.cursor)?;
    self.cursor += 1;
    Ok(byte)
  }

  fn register(&self, index: u8) -> Result<Register, Error> {
    self.vm.registers.get(index.into())
  }

  fn run(&mut self) -> Result<(), Error> {
    let pc = self.vm.pc;
    let ir = self.eat()?;
    let Some(instruction) = opcode::decode(ir) else {
      log::warn!("unknown instruction {ir:#010b} at {pc:#04x}, skipping");
      self.vm.pc = pc + 1;
      return Ok(());
    };
    log::trace!("{pc:#04x}: {}", instruction.opcode.mnemonic());
    match instruction.operation {
      Operation::Halt => halt(self),
      Operation::LoadImmediate => load_immediate(self)?,
      Operation::Print => print(self)?,
      Operation::Push => push(self)?,
      Operation::Pop => pop(self)?,
      Operation::Flow(flow) => control_flow(self, flow, pc)?,
      Operation::Alu(op) => alu(self, op, instruction.operand_count())?,
    }
    if instruction.operation.advances_pc() {
      self.vm.pc = pc + 1 + instruction.operand_count();
    }
    Ok(())
  }
}

// (stop execution)
fn halt<W>(task: &mut Task<'_, '_, W>)
where
  W: Write,
{
  log::debug!("halted at {:#04x}", task.vm.pc);
  task.vm.state = State::Halted;
}

// r[a] ← vv
fn load_immediate<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat()?;
  let vv = task.eat()?;
  task.vm.registers.set(a.into(), vv)
}

// stdout ← r[a]
fn print<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat()?;
  let value = task.register(a)?;
  writeln!(task.out, "{value}")?;
  Ok(())
}

// r[7] ← r[7] − 1; m[r[7]] ← r[a]
fn push<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat()?;
  let value = task.register(a)?;
  task.vm.push(value)
}

// r[a] ← m[r[7]]; r[7] ← r[7] + 1
fn pop<W>(task: &mut Task<'_, '_, W>) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat()?;
  // validate the destination before touching the stack
  task.register(a)?;
  let value = task.vm.pop()?;
  task.vm.registers.set(a.into(), value)
}

fn control_flow<W>(task: &mut Task<'_, '_, W>, flow: Flow, pc: usize) -> Result<(), Error>
where
  W: Write,
{
  match flow {
    Flow::Call => {
      // r[7] ← r[7] − 1; m[r[7]] ← pc + 2; pc ← r[a]
      let a = task.eat()?;
      let target = task.register(a)?;
      let ret = pc + 2;
      let ret = Register::try_from(ret).map_err(|_| Error::MemoryOutOfBounds { address: ret })?;
      task.vm.push(ret)?;
      task.vm.pc = target.into();
    }
    Flow::Return => {
      // pc ← m[r[7]]; r[7] ← r[7] + 1
      task.vm.pc = task.vm.pop()?.into();
    }
    Flow::Jump => {
      // pc ← r[a]
      let a = task.eat()?;
      task.vm.pc = task.register(a)?.into();
    }
    Flow::JumpIfEqual | Flow::JumpIfNotEqual => {
      // if E (or !E) : pc ← r[a] else pc ← pc + 2
      let a = task.eat()?;
      let target = task.register(a)?;
      let wanted = flow == Flow::JumpIfEqual;
      if task.vm.flags.equal() == wanted {
        task.vm.pc = target.into();
      } else {
        task.vm.pc = pc + 2;
      }
    }
  }
  Ok(())
}

// r[a] ← r[a] op r[b], or fl ← cmp(r[a], r[b])
fn alu<W>(task: &mut Task<'_, '_, W>, op: AluOp, operands: usize) -> Result<(), Error>
where
  W: Write,
{
  let a = task.eat()?;
  let lhs = task.register(a)?;
  let rhs = if operands > 1 {
    let b = task.eat()?;
    task.register(b)?
  } else {
    0
  };
  match alu::execute(op, lhs, rhs)? {
    Outcome::Write(value) => task.vm.registers.set(a.into(), value)?,
    Outcome::Flags(flags) => task.vm.flags = flags,
  }
  Ok(())
}
