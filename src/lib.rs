//! Bare-bones implementation of the LS-8, a tiny 8-bit teaching computer
//!
//! Programs are plain text files of binary bytes, one per line. They are loaded
//! at address zero and run until a `HLT`.

pub mod alu;
pub mod memory;
pub mod opcode;
pub mod region;
pub mod registers;
pub mod vm;
