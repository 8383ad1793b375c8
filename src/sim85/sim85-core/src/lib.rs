#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod assembler;
pub mod constants;
pub mod control;
pub mod cpu;
pub mod decoder;
pub mod error;
pub mod instructions;
pub mod memory;
pub mod utils;

pub use assembler::{assemble, encode, load_program, Encoded};
pub use control::RunControl;
pub use cpu::{run, run_with, Cpu, RunOptions};
pub use decoder::disassemble;
pub use error::{AsmError, ExecError, LoadError};
pub use memory::{Flags, Memory, Ports, Registers};
