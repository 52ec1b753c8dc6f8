/// Every instruction the LS-8 understands.
///
/// The top two bits of an opcode hold the number of operand bytes that follow
/// it, so `LDI` (`0b10...`) always carries two and `HLT` (`0b00...`) none.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
  /// Stops the machine.
  ///
  /// | Operation | Semantics/RTL      | Assembly |
  /// |-----------|--------------------|----------|
  /// | Halt      | `(stop execution)` | `HLT`    |
  Hlt = 0b0000_0001,

  /// Returns from a subroutine.
  ///
  /// | Operation | Semantics/RTL                  | Assembly |
  /// |-----------|--------------------------------|----------|
  /// | Return    | `pc ← m[r[7]]; r[7] ← r[7] + 1` | `RET`    |
  Ret = 0b0001_0001,

  /// Pushes a register onto the stack.
  ///
  /// | Operation | Semantics/RTL                   | Assembly  |
  /// |-----------|---------------------------------|-----------|
  /// | Push      | `r[7] ← r[7] − 1; m[r[7]] ← r[a]` | `PUSH ra` |
  Push = 0b0100_0101,

  /// Pops the top of the stack into a register.
  ///
  /// | Operation | Semantics/RTL                   | Assembly |
  /// |-----------|---------------------------------|----------|
  /// | Pop       | `r[a] ← m[r[7]]; r[7] ← r[7] + 1` | `POP ra` |
  Pop = 0b0100_0110,

  /// Prints a register in decimal, followed by a newline.
  ///
  /// | Operation | Semantics/RTL   | Assembly |
  /// |-----------|-----------------|----------|
  /// | Print     | `stdout ← r[a]` | `PRN ra` |
  Prn = 0b0100_0111,

  /// Calls a subroutine at the address held in a register.
  ///
  /// | Operation | Semantics/RTL                                    | Assembly  |
  /// |-----------|--------------------------------------------------|-----------|
  /// | Call      | `r[7] ← r[7] − 1; m[r[7]] ← pc + 2; pc ← r[a]`    | `CALL ra` |
  Call = 0b0101_0000,

  /// | Operation | Semantics/RTL | Assembly |
  /// |-----------|---------------|----------|
  /// | Jump      | `pc ← r[a]`   | `JMP ra` |
  Jmp = 0b0101_0100,

  /// | Operation     | Semantics/RTL                       | Assembly |
  /// |---------------|-------------------------------------|----------|
  /// | Jump if equal | `if E : pc ← r[a] else pc ← pc + 2` | `JEQ ra` |
  Jeq = 0b0101_0101,

  /// | Operation         | Semantics/RTL                        | Assembly |
  /// |-------------------|--------------------------------------|----------|
  /// | Jump if not equal | `if !E : pc ← r[a] else pc ← pc + 2` | `JNE ra` |
  Jne = 0b0101_0110,

  /// | Operation   | Semantics/RTL | Assembly |
  /// |-------------|---------------|----------|
  /// | Bitwise not | `r[a] ← ~r[a]` | `NOT ra` |
  Not = 0b0110_1001,

  /// Loads an immediate value into a register.
  ///
  /// | Operation      | Semantics/RTL | Assembly     |
  /// |----------------|---------------|--------------|
  /// | Load Immediate | `r[a] ← vv`   | `LDI ra, vv` |
  Ldi = 0b1000_0010,

  /// | Operation | Semantics/RTL         | Assembly     |
  /// |-----------|-----------------------|--------------|
  /// | Add       | `r[a] ← r[a] + r[b]`  | `ADD ra, rb` |
  Add = 0b1010_0000,

  /// | Operation | Semantics/RTL         | Assembly     |
  /// |-----------|-----------------------|--------------|
  /// | Multiply  | `r[a] ← r[a] × r[b]`  | `MUL ra, rb` |
  Mul = 0b1010_0010,

  /// Faults the machine when `r[b]` is zero.
  ///
  /// | Operation | Semantics/RTL           | Assembly     |
  /// |-----------|-------------------------|--------------|
  /// | Modulo    | `r[a] ← r[a] mod r[b]`  | `MOD ra, rb` |
  Mod = 0b1010_0100,

  /// Sets exactly one of the `L`, `G`, `E` flags.
  ///
  /// | Operation | Semantics/RTL          | Assembly     |
  /// |-----------|------------------------|--------------|
  /// | Compare   | `fl ← cmp(r[a], r[b])` | `CMP ra, rb` |
  Cmp = 0b1010_0111,

  /// | Operation   | Semantics/RTL        | Assembly     |
  /// |-------------|----------------------|--------------|
  /// | Bitwise and | `r[a] ← r[a] & r[b]` | `AND ra, rb` |
  And = 0b1010_1000,

  /// | Operation  | Semantics/RTL         | Assembly    |
  /// |------------|-----------------------|-------------|
  /// | Bitwise or | `r[a] ← r[a] \| r[b]` | `OR ra, rb` |
  Or = 0b1010_1010,

  /// | Operation   | Semantics/RTL        | Assembly     |
  /// |-------------|----------------------|--------------|
  /// | Bitwise xor | `r[a] ← r[a] ^ r[b]` | `XOR ra, rb` |
  Xor = 0b1010_1011,

  /// | Operation  | Semantics/RTL         | Assembly     |
  /// |------------|-----------------------|--------------|
  /// | Shift left | `r[a] ← r[a] << r[b]` | `SHL ra, rb` |
  Shl = 0b1010_1100,

  /// | Operation   | Semantics/RTL         | Assembly     |
  /// |-------------|-----------------------|--------------|
  /// | Shift right | `r[a] ← r[a] >> r[b]` | `SHR ra, rb` |
  Shr = 0b1010_1101,
}

/// Operations that own the program counter themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Call,
  Return,
  Jump,
  JumpIfEqual,
  JumpIfNotEqual,
}

/// Operations carried out by the ALU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
  Add,
  Multiply,
  Compare,
  And,
  Or,
  Xor,
  Not,
  ShiftLeft,
  ShiftRight,
  Modulo,
}

/// What the machine does with an opcode once it has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Halt,
  LoadImmediate,
  Print,
  Push,
  Pop,
  Flow(Flow),
  Alu(AluOp),
}

impl Operation {
  /// Whether the run loop moves `pc` past the instruction afterwards.
  pub const fn advances_pc(self) -> bool {
    !matches!(self, Self::Halt | Self::Flow(_))
  }
}

impl Opcode {
  pub const ALL: [Opcode; 20] = [
    Self::Hlt,
    Self::Ret,
    Self::Push,
    Self::Pop,
    Self::Prn,
    Self::Call,
    Self::Jmp,
    Self::Jeq,
    Self::Jne,
    Self::Not,
    Self::Ldi,
    Self::Add,
    Self::Mul,
    Self::Mod,
    Self::Cmp,
    Self::And,
    Self::Or,
    Self::Xor,
    Self::Shl,
    Self::Shr,
  ];

  pub const fn operation(self) -> Operation {
    match self {
      Self::Hlt => Operation::Halt,
      Self::Ldi => Operation::LoadImmediate,
      Self::Prn => Operation::Print,
      Self::Push => Operation::Push,
      Self::Pop => Operation::Pop,
      Self::Call => Operation::Flow(Flow::Call),
      Self::Ret => Operation::Flow(Flow::Return),
      Self::Jmp => Operation::Flow(Flow::Jump),
      Self::Jeq => Operation::Flow(Flow::JumpIfEqual),
      Self::Jne => Operation::Flow(Flow::JumpIfNotEqual),
      Self::Add => Operation::Alu(AluOp::Add),
      Self::Mul => Operation::Alu(AluOp::Multiply),
      Self::Cmp => Operation::Alu(AluOp::Compare),
      Self::And => Operation::Alu(AluOp::And),
      Self::Or => Operation::Alu(AluOp::Or),
      Self::Xor => Operation::Alu(AluOp::Xor),
      Self::Not => Operation::Alu(AluOp::Not),
      Self::Shl => Operation::Alu(AluOp::ShiftLeft),
      Self::Shr => Operation::Alu(AluOp::ShiftRight),
      Self::Mod => Operation::Alu(AluOp::Modulo),
    }
  }

  /// Number of operand bytes following this opcode.
  pub const fn operand_count(self) -> usize {
    operand_count(self as u8)
  }

  pub const fn mnemonic(self) -> &'static str {
    match self {
      Self::Hlt => "HLT",
      Self::Ret => "RET",
      Self::Push => "PUSH",
      Self::Pop => "POP",
      Self::Prn => "PRN",
      Self::Call => "CALL",
      Self::Jmp => "JMP",
      Self::Jeq => "JEQ",
      Self::Jne => "JNE",
      Self::Not => "NOT",
      Self::Ldi => "LDI",
      Self::Add => "ADD",
      Self::Mul => "MUL",
      Self::Mod => "MOD",
      Self::Cmp => "CMP",
      Self::And => "AND",
      Self::Or => "OR",
      Self::Xor => "XOR",
      Self::Shl => "SHL",
      Self::Shr => "SHR",
    }
  }
}

/// Operand count encoded in bits 6-7 of any instruction byte.
pub const fn operand_count(byte: u8) -> usize {
  (byte >> 6) as usize
}

/// A fetched opcode resolved against the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
  pub opcode: Opcode,
  pub operation: Operation,
}

impl Instruction {
  pub const fn operand_count(&self) -> usize {
    self.opcode.operand_count()
  }
}

static DISPATCH: [Option<Instruction>; 256] = dispatch_table();

const fn dispatch_table() -> [Option<Instruction>; 256] {
  let mut table = [None; 256];
  let mut i = 0;
  while i < Opcode::ALL.len() {
    let opcode = Opcode::ALL[i];
    table[opcode as usize] = Some(Instruction {
      opcode,
      operation: opcode.operation(),
    });
    i += 1;
  }
  table
}

/// Looks an instruction byte up in the dispatch table, `None` when the byte is
/// not a known opcode.
pub fn decode(byte: u8) -> Option<Instruction> {
  DISPATCH[byte as usize]
}

impl TryFrom<u8> for Opcode {
  type Error = u8;

  fn try_from(byte: u8) -> Result<Self, Self::Error> {
    decode(byte).map(|instruction| instruction.opcode).ok_or(byte)
  }
}
