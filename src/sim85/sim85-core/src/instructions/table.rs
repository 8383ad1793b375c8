use super::{Condition, Mnemonic, Operand, Pair, Reg, Shape};
use crate::constants::opcodes::*;
use crate::error::AsmError;

/// Static description of one concrete instruction variant
/// `MOV A,M` and `MOV A,B` are separate entries; only literal slots vary per use
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Entry {
    pub mnem: Mnemonic,                // Mnemonic representation
    pub operands: [Option<Operand>; 2], // Operand slots in source order
    pub shape: Shape,                  // Dominant operand shape
    pub length: u8,                    // Encoded length in bytes (1-3)
    pub opcode: u8,                    // Byte written to memory
}

impl Entry {
    const fn new(
        mnem: Mnemonic,
        first: Option<Operand>,
        second: Option<Operand>,
        opcode: u8,
    ) -> Entry {
        let operands = [first, second];
        let mut shape = Shape::None;
        let mut length = 1;
        let mut i = 0;
        while i < 2 {
            if let Some(slot) = operands[i] {
                let candidate = slot_shape(slot);
                if candidate as u8 > shape as u8 {
                    shape = candidate;
                }
                length += slot.width();
            }
            i += 1;
        }
        Entry {
            mnem,
            operands,
            shape,
            length,
            opcode,
        }
    }
}

const fn slot_shape(slot: Operand) -> Shape {
    match slot {
        Operand::Reg(Reg::M) => Shape::Memory,
        Operand::Reg(_) => Shape::Register,
        Operand::Pair(_) => Shape::RegisterPair,
        Operand::Data8 => Shape::Immediate8,
        Operand::Data16 => Shape::Immediate16,
        Operand::Addr => Shape::Direct,
        Operand::Vector(_) => Shape::Restart,
    }
}

// Accumulator group, indexed by bits 3-5 of the opcode
const ALU_REGISTER: [Mnemonic; 8] = [
    Mnemonic::ADD,
    Mnemonic::ADC,
    Mnemonic::SUB,
    Mnemonic::SBB,
    Mnemonic::ANA,
    Mnemonic::XRA,
    Mnemonic::ORA,
    Mnemonic::CMP,
];
const ALU_IMMEDIATE: [Mnemonic; 8] = [
    Mnemonic::ADI,
    Mnemonic::ACI,
    Mnemonic::SUI,
    Mnemonic::SBI,
    Mnemonic::ANI,
    Mnemonic::XRI,
    Mnemonic::ORI,
    Mnemonic::CPI,
];

// Pair field values 0-3; field 3 is SP for data ops and PSW for the stack
const DATA_PAIRS: [Pair; 4] = [Pair::B, Pair::D, Pair::H, Pair::SP];
const STACK_PAIRS: [Pair; 4] = [Pair::B, Pair::D, Pair::H, Pair::PSW];

macro_rules! put {
    ($t:ident, $opcode:expr, $mnem:expr) => {
        $t[($opcode) as usize] = Some(Entry::new($mnem, None, None, $opcode));
    };
    ($t:ident, $opcode:expr, $mnem:expr, $a:expr) => {
        $t[($opcode) as usize] = Some(Entry::new($mnem, Some($a), None, $opcode));
    };
    ($t:ident, $opcode:expr, $mnem:expr, $a:expr, $b:expr) => {
        $t[($opcode) as usize] = Some(Entry::new($mnem, Some($a), Some($b), $opcode));
    };
}

const fn build_table() -> [Option<Entry>; 256] {
    let mut t: [Option<Entry>; 256] = [None; 256];

    // Register-indexed groups: the register sits in bits 3-5 (destination) or 0-2 (source)
    let mut r = 0;
    while r < 8 {
        let reg = Operand::Reg(Reg::ALL[r]);
        let field = (r as u8) << DEST_SHIFT;

        put!(t, 0x04 | field, Mnemonic::INR, reg);
        put!(t, 0x05 | field, Mnemonic::DCR, reg);
        put!(t, 0x06 | field, Mnemonic::MVI, reg, Operand::Data8);

        let mut s = 0;
        while s < 8 {
            let opcode = OPCODE_MOV | field | s as u8;
            // MOV M,M is the HLT slot
            if opcode != OPCODE_HLT {
                put!(t, opcode, Mnemonic::MOV, reg, Operand::Reg(Reg::ALL[s]));
            }
            // Accumulator ops reuse the same loop with r as the operation index
            put!(t, OPCODE_ALU_REG | field | s as u8, ALU_REGISTER[r], Operand::Reg(Reg::ALL[s]));
            s += 1;
        }
        put!(t, 0xC6 | field, ALU_IMMEDIATE[r], Operand::Data8);

        // Conditions and restart vectors share the same field
        let cc = Condition::ALL[r];
        put!(t, 0xC0 | field, Mnemonic::R(cc));
        put!(t, 0xC2 | field, Mnemonic::J(cc), Operand::Addr);
        put!(t, 0xC4 | field, Mnemonic::C(cc), Operand::Addr);
        put!(t, 0xC7 | field, Mnemonic::RST, Operand::Vector(r as u8));
        r += 1;
    }

    // Register-pair groups: the pair sits in bits 4-5
    let mut p = 0;
    while p < 4 {
        let field = (p as u8) << PAIR_SHIFT;
        let rp = Operand::Pair(DATA_PAIRS[p]);
        let sp = Operand::Pair(STACK_PAIRS[p]);

        put!(t, 0x01 | field, Mnemonic::LXI, rp, Operand::Data16);
        put!(t, 0x03 | field, Mnemonic::INX, rp);
        put!(t, 0x09 | field, Mnemonic::DAD, rp);
        put!(t, 0x0B | field, Mnemonic::DCX, rp);
        put!(t, 0xC1 | field, Mnemonic::POP, sp);
        put!(t, 0xC5 | field, Mnemonic::PUSH, sp);
        p += 1;
    }

    put!(t, 0x02, Mnemonic::STAX, Operand::Pair(Pair::B));
    put!(t, 0x12, Mnemonic::STAX, Operand::Pair(Pair::D));
    put!(t, 0x0A, Mnemonic::LDAX, Operand::Pair(Pair::B));
    put!(t, 0x1A, Mnemonic::LDAX, Operand::Pair(Pair::D));

    put!(t, 0x00, Mnemonic::NOP);
    put!(t, 0x07, Mnemonic::RLC);
    put!(t, 0x0F, Mnemonic::RRC);
    put!(t, 0x17, Mnemonic::RAL);
    put!(t, 0x1F, Mnemonic::RAR);
    put!(t, 0x20, Mnemonic::RIM);
    put!(t, 0x22, Mnemonic::SHLD, Operand::Addr);
    put!(t, 0x27, Mnemonic::DAA);
    put!(t, 0x2A, Mnemonic::LHLD, Operand::Addr);
    put!(t, 0x2F, Mnemonic::CMA);
    put!(t, 0x30, Mnemonic::SIM);
    put!(t, 0x32, Mnemonic::STA, Operand::Addr);
    put!(t, 0x37, Mnemonic::STC);
    put!(t, 0x3A, Mnemonic::LDA, Operand::Addr);
    put!(t, 0x3F, Mnemonic::CMC);
    put!(t, OPCODE_HLT, Mnemonic::HLT);
    put!(t, 0xC3, Mnemonic::JMP, Operand::Addr);
    put!(t, 0xC9, Mnemonic::RET);
    put!(t, 0xCD, Mnemonic::CALL, Operand::Addr);
    put!(t, 0xD3, Mnemonic::OUT, Operand::Data8);
    put!(t, 0xDB, Mnemonic::IN, Operand::Data8);
    put!(t, 0xE3, Mnemonic::XTHL);
    put!(t, 0xE9, Mnemonic::PCHL);
    put!(t, 0xEB, Mnemonic::XCHG);
    put!(t, 0xF3, Mnemonic::DI);
    put!(t, 0xF9, Mnemonic::SPHL);
    put!(t, 0xFB, Mnemonic::EI);

    t
}

/// Opcode byte -> entry, built at compile time
/// The undocumented opcodes have no entry
pub static OPCODES: [Option<Entry>; 256] = build_table();

/// Reverse lookup used by the decoder
pub fn by_opcode(opcode: u8) -> Option<&'static Entry> {
    OPCODES[opcode as usize].as_ref()
}

/// Every defined entry in opcode order
pub fn entries() -> impl Iterator<Item = &'static Entry> {
    OPCODES.iter().flatten()
}

/// Names that can never be read as a hexadecimal literal
pub fn is_reserved(token: &str) -> bool {
    Reg::ALL.iter().any(|r| r.name() == token)
        || token == Pair::SP.name()
        || token == Pair::PSW.name()
}

/// Split raw operand text on the comma into at most two trimmed tokens
pub fn split_operands(text: &str) -> Result<[Option<&str>; 2], AsmError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok([None, None]);
    }

    let mut parts = text.split(',').map(str::trim);
    let first = parts.next();
    let second = parts.next();
    if parts.next().is_some() || first == Some("") || second == Some("") {
        return Err(AsmError::InvalidOperand);
    }
    Ok([first, second])
}

/// Find the entry matching a mnemonic and its raw operand text
pub fn lookup(mnemonic: &str, operand_text: &str) -> Result<&'static Entry, AsmError> {
    let tokens = split_operands(operand_text)?;
    resolve(mnemonic, &tokens)
}

pub(crate) fn resolve(mnemonic: &str, tokens: &[Option<&str>; 2]) -> Result<&'static Entry, AsmError> {
    let mut known = false;
    for entry in entries().filter(|entry| entry.mnem.name() == mnemonic) {
        known = true;
        let fits = entry
            .operands
            .iter()
            .zip(tokens.iter())
            .all(|(slot, token)| accepts(*slot, *token));
        if fits {
            return Ok(entry);
        }
    }

    if known {
        Err(AsmError::InvalidOperand)
    } else {
        Err(AsmError::UnknownMnemonic)
    }
}

// Literal slots accept any token that is not a register name; the digits are checked on encode
fn accepts(slot: Option<Operand>, token: Option<&str>) -> bool {
    match (slot, token) {
        (None, None) => true,
        (Some(Operand::Reg(r)), Some(t)) => t == r.name(),
        (Some(Operand::Pair(p)), Some(t)) => t == p.name(),
        (Some(Operand::Vector(n)), Some(t)) => t.as_bytes() == [b'0' + n],
        (Some(slot), Some(t)) if slot.is_literal() => !is_reserved(t),
        _ => false,
    }
}
