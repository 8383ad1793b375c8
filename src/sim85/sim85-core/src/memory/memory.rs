use core::fmt;

use crate::constants::MEMORY_SIZE;

/// Flat 64K byte-addressable store
/// Addresses are u16, so every access is in range and arithmetic wraps
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Self {
            cells: [0; MEMORY_SIZE],
        }
    }

    pub fn reset(&mut self) {
        self.cells = [0; MEMORY_SIZE];
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.cells[addr as usize]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Little-endian 16-bit read: low byte at `addr`, high byte at `addr + 1`
    pub fn read_word(&self, addr: u16) -> u16 {
        let low = self.read(addr);
        let high = self.read(addr.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write(addr, low);
        self.write(addr.wrapping_add(1), high);
    }

    /// Copy bytes in starting at `addr`, wrapping past FFFF
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let mut cursor = addr;
        for byte in bytes {
            self.write(cursor, *byte);
            cursor = cursor.wrapping_add(1);
        }
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

// A full dump is 64K entries; summarise instead
impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.cells.iter().filter(|cell| **cell != 0).count();
        f.debug_struct("Memory")
            .field("size", &MEMORY_SIZE)
            .field("non_zero_cells", &used)
            .finish()
    }
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[test]
    fn test_word_is_little_endian() {
        let mut mem = Memory::new();
        mem.write(0xC050, 0x96);
        mem.write(0xC051, 0x75);
        assert_eq!(mem.read_word(0xC050), 0x7596);

        mem.write_word(0xC052, 0xEB2C);
        assert_eq!(mem.read(0xC052), 0x2C);
        assert_eq!(mem.read(0xC053), 0xEB);
    }

    #[test]
    fn test_word_access_wraps() {
        let mut mem = Memory::new();
        mem.write_word(0xFFFF, 0x1234);
        assert_eq!(mem.read(0xFFFF), 0x34);
        assert_eq!(mem.read(0x0000), 0x12);
        assert_eq!(mem.read_word(0xFFFF), 0x1234);
    }

    #[test]
    fn test_load_wraps() {
        let mut mem = Memory::new();
        mem.load(0xFFFE, &[1, 2, 3]);
        assert_eq!(mem.read(0xFFFE), 1);
        assert_eq!(mem.read(0xFFFF), 2);
        assert_eq!(mem.read(0x0000), 3);
    }

    #[test]
    fn test_reset() {
        let mut mem = Memory::new();
        mem.write(0x1234, 0xAA);
        mem.reset();
        assert_eq!(mem, Memory::new());
    }
}
