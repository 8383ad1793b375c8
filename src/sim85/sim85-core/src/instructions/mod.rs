pub mod instructions;
pub mod table;

use core::fmt;

// Import trait implementations for CPU instruction categories
pub use instructions::Arithmetic;
pub use instructions::Branch;
pub use instructions::DataTransfer;
pub use instructions::Logical;
pub use instructions::Machine;

pub use table::Entry;

/// Enum representing 8085 instruction mnemonics
/// Conditional branches carry their condition so `JNZ` and `JZ` share one handler
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mnemonic {
    MOV,  // Move register/memory to register/memory
    MVI,  // Move immediate
    LXI,  // Load register pair immediate
    LDA,  // Load accumulator direct
    STA,  // Store accumulator direct
    LHLD, // Load HL direct
    SHLD, // Store HL direct
    LDAX, // Load accumulator indirect
    STAX, // Store accumulator indirect
    XCHG, // Exchange HL with DE
    ADD,  // Add register/memory
    ADC,  // Add with carry
    ADI,  // Add immediate
    ACI,  // Add immediate with carry
    SUB,  // Subtract register/memory
    SBB,  // Subtract with borrow
    SUI,  // Subtract immediate
    SBI,  // Subtract immediate with borrow
    INR,  // Increment register/memory
    DCR,  // Decrement register/memory
    INX,  // Increment register pair
    DCX,  // Decrement register pair
    DAD,  // Add register pair to HL
    DAA,  // Decimal adjust accumulator
    ANA,  // AND register/memory
    ANI,  // AND immediate
    XRA,  // XOR register/memory
    XRI,  // XOR immediate
    ORA,  // OR register/memory
    ORI,  // OR immediate
    CMP,  // Compare register/memory
    CPI,  // Compare immediate
    RLC,  // Rotate left
    RRC,  // Rotate right
    RAL,  // Rotate left through carry
    RAR,  // Rotate right through carry
    CMA,  // Complement accumulator
    CMC,  // Complement carry
    STC,  // Set carry
    JMP,  // Jump
    J(Condition), // Conditional jump
    CALL, // Call subroutine
    C(Condition), // Conditional call
    RET,  // Return
    R(Condition), // Conditional return
    RST,  // Restart
    PCHL, // Jump to HL
    PUSH, // Push register pair
    POP,  // Pop register pair
    XTHL, // Exchange top of stack with HL
    SPHL, // Load SP from HL
    IN,   // Input from port
    OUT,  // Output to port
    EI,   // Enable interrupts
    DI,   // Disable interrupts
    RIM,  // Read interrupt mask
    SIM,  // Set interrupt mask
    NOP,  // No operation
    HLT,  // Halt
}

impl Mnemonic {
    pub const fn name(self) -> &'static str {
        use Condition::*;
        match self {
            Mnemonic::MOV => "MOV",
            Mnemonic::MVI => "MVI",
            Mnemonic::LXI => "LXI",
            Mnemonic::LDA => "LDA",
            Mnemonic::STA => "STA",
            Mnemonic::LHLD => "LHLD",
            Mnemonic::SHLD => "SHLD",
            Mnemonic::LDAX => "LDAX",
            Mnemonic::STAX => "STAX",
            Mnemonic::XCHG => "XCHG",
            Mnemonic::ADD => "ADD",
            Mnemonic::ADC => "ADC",
            Mnemonic::ADI => "ADI",
            Mnemonic::ACI => "ACI",
            Mnemonic::SUB => "SUB",
            Mnemonic::SBB => "SBB",
            Mnemonic::SUI => "SUI",
            Mnemonic::SBI => "SBI",
            Mnemonic::INR => "INR",
            Mnemonic::DCR => "DCR",
            Mnemonic::INX => "INX",
            Mnemonic::DCX => "DCX",
            Mnemonic::DAD => "DAD",
            Mnemonic::DAA => "DAA",
            Mnemonic::ANA => "ANA",
            Mnemonic::ANI => "ANI",
            Mnemonic::XRA => "XRA",
            Mnemonic::XRI => "XRI",
            Mnemonic::ORA => "ORA",
            Mnemonic::ORI => "ORI",
            Mnemonic::CMP => "CMP",
            Mnemonic::CPI => "CPI",
            Mnemonic::RLC => "RLC",
            Mnemonic::RRC => "RRC",
            Mnemonic::RAL => "RAL",
            Mnemonic::RAR => "RAR",
            Mnemonic::CMA => "CMA",
            Mnemonic::CMC => "CMC",
            Mnemonic::STC => "STC",
            Mnemonic::JMP => "JMP",
            Mnemonic::J(cc) => match cc {
                NZ => "JNZ",
                Z => "JZ",
                NC => "JNC",
                C => "JC",
                PO => "JPO",
                PE => "JPE",
                P => "JP",
                M => "JM",
            },
            Mnemonic::CALL => "CALL",
            Mnemonic::C(cc) => match cc {
                NZ => "CNZ",
                Z => "CZ",
                NC => "CNC",
                C => "CC",
                PO => "CPO",
                PE => "CPE",
                P => "CP",
                M => "CM",
            },
            Mnemonic::RET => "RET",
            Mnemonic::R(cc) => match cc {
                NZ => "RNZ",
                Z => "RZ",
                NC => "RNC",
                C => "RC",
                PO => "RPO",
                PE => "RPE",
                P => "RP",
                M => "RM",
            },
            Mnemonic::RST => "RST",
            Mnemonic::PCHL => "PCHL",
            Mnemonic::PUSH => "PUSH",
            Mnemonic::POP => "POP",
            Mnemonic::XTHL => "XTHL",
            Mnemonic::SPHL => "SPHL",
            Mnemonic::IN => "IN",
            Mnemonic::OUT => "OUT",
            Mnemonic::EI => "EI",
            Mnemonic::DI => "DI",
            Mnemonic::RIM => "RIM",
            Mnemonic::SIM => "SIM",
            Mnemonic::NOP => "NOP",
            Mnemonic::HLT => "HLT",
        }
    }
}

/// 8-bit operands in opcode field order; M is memory at HL
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reg {
    B = 0,
    C,
    D,
    E,
    H,
    L,
    M,
    A,
}

impl Reg {
    pub const ALL: [Reg; 8] = [Reg::B, Reg::C, Reg::D, Reg::E, Reg::H, Reg::L, Reg::M, Reg::A];

    pub const fn name(self) -> &'static str {
        match self {
            Reg::B => "B",
            Reg::C => "C",
            Reg::D => "D",
            Reg::E => "E",
            Reg::H => "H",
            Reg::L => "L",
            Reg::M => "M",
            Reg::A => "A",
        }
    }
}

/// Register pairs as named in operands; SP and PSW share field value 3
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pair {
    B,
    D,
    H,
    SP,
    PSW,
}

impl Pair {
    pub const fn name(self) -> &'static str {
        match self {
            Pair::B => "B",
            Pair::D => "D",
            Pair::H => "H",
            Pair::SP => "SP",
            Pair::PSW => "PSW",
        }
    }
}

/// Branch conditions in opcode field order
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Condition {
    NZ = 0, // Not zero
    Z,      // Zero
    NC,     // No carry
    C,      // Carry
    PO,     // Parity odd
    PE,     // Parity even
    P,      // Plus
    M,      // Minus
}

impl Condition {
    pub const ALL: [Condition; 8] = [
        Condition::NZ,
        Condition::Z,
        Condition::NC,
        Condition::C,
        Condition::PO,
        Condition::PE,
        Condition::P,
        Condition::M,
    ];
}

/// One operand slot of a table entry
/// Register slots are fixed per entry; literal slots are filled from the source text
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operand {
    Reg(Reg),
    Pair(Pair),
    Data8,      // 8-bit immediate
    Data16,     // 16-bit immediate
    Addr,       // 16-bit direct address
    Vector(u8), // RST number, folded into the opcode
}

impl Operand {
    /// Slots that take a hexadecimal literal rather than a fixed name
    pub const fn is_literal(self) -> bool {
        matches!(self, Operand::Data8 | Operand::Data16 | Operand::Addr)
    }

    /// Bytes the slot adds after the opcode
    pub const fn width(self) -> u8 {
        match self {
            Operand::Data8 => 1,
            Operand::Data16 | Operand::Addr => 2,
            _ => 0,
        }
    }
}

/// Operand encoding shape of an entry, ordered so that the dominant slot wins
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Shape {
    None = 0,
    Restart,
    RegisterPair,
    Register,
    Memory, // implicit memory via HL
    Immediate8,
    Immediate16,
    Direct,
}

/// Structure representing a decoded instruction
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub pc: u16,               // Address the opcode was fetched from
    pub entry: &'static Entry, // Table entry for the opcode byte
    pub data: u16,             // Operand bytes (0 when the entry has none)
}

impl Instruction {
    pub fn mnemonic(&self) -> Mnemonic {
        self.entry.mnem
    }

    /// 8-bit immediate operand
    pub fn imm8(&self) -> u8 {
        (self.data & 0xFF) as u8
    }

    /// 16-bit immediate or direct address operand
    pub fn imm16(&self) -> u16 {
        self.data
    }

    /// Address of the instruction that follows this one
    pub fn next_pc(&self) -> u16 {
        self.pc.wrapping_add(self.entry.length as u16)
    }
}

/// Canonical assembly text, e.g. `MVI A,99` or `LXI H,C051`
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entry.mnem.name())?;
        let mut separator = " ";
        for slot in self.entry.operands.iter().flatten() {
            f.write_str(separator)?;
            match slot {
                Operand::Reg(r) => f.write_str(r.name())?,
                Operand::Pair(p) => f.write_str(p.name())?,
                Operand::Data8 => write!(f, "{:02X}", self.imm8())?,
                Operand::Data16 | Operand::Addr => write!(f, "{:04X}", self.imm16())?,
                Operand::Vector(n) => write!(f, "{}", n)?,
            }
            separator = ",";
        }
        Ok(())
    }
}
