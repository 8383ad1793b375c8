use core::fmt;

use crate::constants::flags::*;
use crate::instructions::Pair;
use crate::utils::{even_parity, word};

/// The five 8085 condition flags
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Flags {
    pub z: bool,  // Zero
    pub s: bool,  // Sign (bit 7 of result)
    pub p: bool,  // Even parity
    pub cy: bool, // Carry / borrow
    pub ac: bool, // Auxiliary carry out of bit 3
}

impl Flags {
    /// Update Z, S and P from a result byte
    pub fn set_zsp(&mut self, value: u8) {
        self.z = value == 0;
        self.s = value & 0x80 != 0;
        self.p = even_parity(value);
    }

    /// Packs the flags as PUSH PSW stores them: S Z 0 AC 0 P 1 CY
    pub fn to_byte(self) -> u8 {
        let mut byte = FLAG_ALWAYS_ONE;
        if self.s {
            byte |= FLAG_SIGN;
        }
        if self.z {
            byte |= FLAG_ZERO;
        }
        if self.ac {
            byte |= FLAG_AUX_CARRY;
        }
        if self.p {
            byte |= FLAG_PARITY;
        }
        if self.cy {
            byte |= FLAG_CARRY;
        }
        byte
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            z: byte & FLAG_ZERO != 0,
            s: byte & FLAG_SIGN != 0,
            p: byte & FLAG_PARITY != 0,
            cy: byte & FLAG_CARRY != 0,
            ac: byte & FLAG_AUX_CARRY != 0,
        }
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S={} Z={} AC={} P={} CY={}",
            self.s as u8, self.z as u8, self.ac as u8, self.p as u8, self.cy as u8
        )
    }
}

/// 8085 register file
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub pc: u16, // Address of the next opcode to fetch
    pub sp: u16,
    pub flags: Flags,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bc(&self) -> u16 {
        word(self.b, self.c)
    }

    pub fn de(&self) -> u16 {
        word(self.d, self.e)
    }

    pub fn hl(&self) -> u16 {
        word(self.h, self.l)
    }

    /// Read a register pair; PSW is A followed by the packed flags
    pub fn pair(&self, pair: Pair) -> u16 {
        match pair {
            Pair::B => self.bc(),
            Pair::D => self.de(),
            Pair::H => self.hl(),
            Pair::SP => self.sp,
            Pair::PSW => word(self.a, self.flags.to_byte()),
        }
    }

    pub fn set_pair(&mut self, pair: Pair, value: u16) {
        let [high, low] = value.to_be_bytes();
        match pair {
            Pair::B => {
                self.b = high;
                self.c = low;
            }
            Pair::D => {
                self.d = high;
                self.e = low;
            }
            Pair::H => {
                self.h = high;
                self.l = low;
            }
            Pair::SP => self.sp = value,
            Pair::PSW => {
                self.a = high;
                self.flags = Flags::from_byte(low);
            }
        }
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A={:02X} B={:02X} C={:02X} D={:02X} E={:02X} H={:02X} L={:02X} PC={:04X} SP={:04X} {}",
            self.a, self.b, self.c, self.d, self.e, self.h, self.l, self.pc, self.sp, self.flags
        )
    }
}
