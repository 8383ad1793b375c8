pub mod io;
mod memory;
mod registers;

pub use io::Ports;
pub use memory::Memory;
pub use registers::{Flags, Registers};
