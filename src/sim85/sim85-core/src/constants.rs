// Flat address space: 64K byte cells
pub const MEMORY_SIZE: usize = 0x10000;

// I/O port latch: one cell per 8-bit port number
pub const PORT_COUNT: usize = 0x100;

// Number of recently executed program counters kept for diagnostics
pub const TRAIL_LENGTH: usize = 16;

// Longest encoding: opcode + 16-bit operand
pub const MAX_INSTRUCTION_LENGTH: usize = 3;

pub mod flags {
    // Bit positions of the packed flag byte (low half of PSW)
    pub const FLAG_CARRY: u8 = 1 << 0;
    pub const FLAG_ALWAYS_ONE: u8 = 1 << 1;
    pub const FLAG_PARITY: u8 = 1 << 2;
    pub const FLAG_AUX_CARRY: u8 = 1 << 4;
    pub const FLAG_ZERO: u8 = 1 << 6;
    pub const FLAG_SIGN: u8 = 1 << 7;
}

pub mod opcodes {
    // Bases of the register-indexed opcode groups
    pub const OPCODE_MOV: u8 = 0x40;
    pub const OPCODE_ALU_REG: u8 = 0x80;
    pub const OPCODE_HLT: u8 = 0x76;

    // Register field positions inside an opcode byte
    pub const DEST_SHIFT: u8 = 3;
    pub const PAIR_SHIFT: u8 = 4;

    // Opcodes without a documented instruction
    pub const UNDOCUMENTED: [u8; 10] = [0x08, 0x10, 0x18, 0x28, 0x38, 0xCB, 0xD9, 0xDD, 0xED, 0xFD];
}

pub mod interrupts {
    // SIM: bit 3 enables loading the mask from bits 0-2
    pub const SIM_MASK_SET_ENABLE: u8 = 0x08;
    pub const INTERRUPT_MASK: u8 = 0x07;

    // RIM: bit 3 reports the interrupt enable latch
    pub const RIM_INTERRUPT_ENABLE: u8 = 0x08;

    // RST n jumps to n * 8
    pub const RESTART_SPACING: u16 = 8;
}
