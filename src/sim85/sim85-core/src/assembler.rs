use crate::constants::MAX_INSTRUCTION_LENGTH;
use crate::error::{AsmError, LoadError};
use crate::instructions::{table, Entry, Operand};
use crate::memory::Memory;
use crate::utils;
use log::debug;

/// Byte encoding of one assembly line
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Encoded {
    entry: &'static Entry,
    bytes: [u8; MAX_INSTRUCTION_LENGTH],
}

impl Encoded {
    /// Table entry the line resolved to
    pub fn entry(&self) -> &'static Entry {
        self.entry
    }

    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Operand bytes following the opcode, little-endian for 16-bit values
    pub fn operands(&self) -> &[u8] {
        &self.bytes[1..self.length()]
    }

    /// Opcode followed by its operand bytes, as written to memory
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.length()]
    }

    pub fn length(&self) -> usize {
        self.entry.length as usize
    }
}

fn parse_literal(token: &str, digits: u8) -> Result<u16, AsmError> {
    utils::parse_hex(token, digits as usize).ok_or(AsmError::MalformedImmediate { digits })
}

/// Encode a single line: `MNEMONIC`, `MNEMONIC OPERAND` or `MNEMONIC OPERAND,OPERAND`
pub fn encode(line: &str) -> Result<Encoded, AsmError> {
    let line = line.trim();
    let (mnemonic, operand_text) = match line.find(char::is_whitespace) {
        Some(idx) => line.split_at(idx),
        None => (line, ""),
    };

    let tokens = table::split_operands(operand_text)?;
    let entry = table::resolve(mnemonic, &tokens)?;

    let mut bytes = [entry.opcode, 0, 0];
    for (slot, token) in entry.operands.iter().zip(tokens.iter()) {
        let token = match (slot, token) {
            (Some(slot), Some(token)) if slot.is_literal() => token,
            _ => continue,
        };
        match slot {
            Some(Operand::Data8) => bytes[1] = parse_literal(token, 2)? as u8,
            _ => {
                let [low, high] = parse_literal(token, 4)?.to_le_bytes();
                bytes[1] = low;
                bytes[2] = high;
            }
        }
    }

    Ok(Encoded { entry, bytes })
}

/// Encode every line without touching memory
pub fn assemble<I>(lines: I) -> impl Iterator<Item = Result<Encoded, AsmError>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    lines.into_iter().map(|line| encode(line.as_ref()))
}

/// Encode `lines` in order and write them contiguously from `load_address`
/// Returns the address one past the last byte written. The first failing line
/// aborts the load; bytes from earlier lines stay in memory
pub fn load_program<I>(lines: I, load_address: u16, memory: &mut Memory) -> Result<u16, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut cursor = load_address;
    for (line, text) in lines.into_iter().enumerate() {
        let text = text.as_ref();
        let encoded = encode(text).map_err(|error| LoadError {
            line,
            address: cursor,
            error,
        })?;

        debug!("{:04X}: {:<14} {:02X?}", cursor, text.trim(), encoded.as_bytes());
        memory.load(cursor, encoded.as_bytes());
        cursor = cursor.wrapping_add(encoded.length() as u16);
    }

    debug!(
        "Loaded {} bytes at {:04X}",
        cursor.wrapping_sub(load_address),
        load_address
    );
    Ok(cursor)
}

#[cfg(test)]
mod assembler_tests {
    use super::*;
    use crate::decoder::decoder;
    use crate::instructions::Instruction;
    use std::string::ToString;
    use std::vec::Vec;

    fn bytes(line: &str) -> Vec<u8> {
        encode(line).unwrap().as_bytes().to_vec()
    }

    #[test]
    fn test_encodings() {
        assert_eq!(bytes("LXI H,C051"), [0x21, 0x51, 0xC0]);
        assert_eq!(bytes("LDA C050"), [0x3A, 0x50, 0xC0]);
        assert_eq!(bytes("SHLD C052"), [0x22, 0x52, 0xC0]);
        assert_eq!(bytes("MVI A,99"), [0x3E, 0x99]);
        assert_eq!(bytes("MVI M,ff"), [0x36, 0xFF]);
        assert_eq!(bytes("MOV A,M"), [0x7E]);
        assert_eq!(bytes("SUB M"), [0x96]);
        assert_eq!(bytes("DCX H"), [0x2B]);
        assert_eq!(bytes("RST 5"), [0xEF]);
        assert_eq!(bytes("JNZ 0009"), [0xC2, 0x09, 0x00]);
        assert_eq!(bytes("HLT"), [0x76]);
    }

    #[test]
    fn test_whitespace_is_tolerated() {
        assert_eq!(bytes("  MOV A , B  "), [0x78]);
        assert_eq!(bytes("LDA\tC050"), [0x3A, 0x50, 0xC0]);
        assert_eq!(bytes("CMA "), [0x2F]);
    }

    #[test]
    fn test_encoded_parts() {
        let encoded = encode("LXI SP,D000").unwrap();
        assert_eq!(encoded.opcode(), 0x31);
        assert_eq!(encoded.operands(), &[0x00, 0xD0]);
        assert_eq!(encoded.length(), 3);
        assert_eq!(encoded.entry().mnem.name(), "LXI");
    }

    #[test]
    fn test_malformed_immediates() {
        let narrow = Err(AsmError::MalformedImmediate { digits: 2 });
        let wide = Err(AsmError::MalformedImmediate { digits: 4 });
        assert_eq!(encode("MVI A,9"), narrow);
        assert_eq!(encode("MVI A,099"), narrow);
        assert_eq!(encode("ADI G1"), narrow);
        assert_eq!(encode("ADI -1"), narrow);
        assert_eq!(encode("LDA C05"), wide);
        assert_eq!(encode("LDA 0xC0"), wide);
        assert_eq!(encode("LXI H,+123"), wide);
        assert_eq!(encode("JMP C0500"), wide);
    }

    #[test]
    fn test_encode_failures() {
        assert_eq!(encode("FOO A"), Err(AsmError::UnknownMnemonic));
        assert_eq!(encode("lda C050"), Err(AsmError::UnknownMnemonic));
        assert_eq!(encode(""), Err(AsmError::UnknownMnemonic));
        assert_eq!(encode("ADI B"), Err(AsmError::InvalidOperand));
        assert_eq!(encode("MOV A"), Err(AsmError::InvalidOperand));
        assert_eq!(encode("LDA"), Err(AsmError::InvalidOperand));
        assert_eq!(encode("STAX H"), Err(AsmError::InvalidOperand));
    }

    #[test]
    fn test_every_entry_survives_format_encode_decode() {
        let mut mem = Memory::new();
        for entry in table::entries() {
            let data = match entry.length {
                2 => 0x00A5,
                3 => 0xC051,
                _ => 0,
            };
            let text = Instruction { pc: 0, entry, data }.to_string();
            let encoded = encode(&text).unwrap();
            assert_eq!(encoded.opcode(), entry.opcode, "{}", text);

            mem.load(0x0000, encoded.as_bytes());
            let decoded = decoder(&mem, 0x0000).unwrap();
            assert_eq!(decoded.mnemonic(), entry.mnem, "{}", text);
            assert_eq!(decoded.entry.shape, entry.shape, "{}", text);
            assert_eq!(decoded.data, data, "{}", text);
            assert_eq!(decoded.to_string(), text);
        }
    }

    #[test]
    fn test_assemble_leaves_memory_alone() {
        let lines = ["LDA C050", "CMA", "BAD"];
        let out: Vec<_> = assemble(lines.iter()).collect();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].unwrap().as_bytes(), &[0x3A, 0x50, 0xC0]);
        assert_eq!(out[1].unwrap().opcode(), 0x2F);
        assert_eq!(out[2], Err(AsmError::UnknownMnemonic));
    }

    #[test]
    fn test_load_program_writes_contiguously() {
        let mut mem = Memory::new();
        let end = load_program(
            ["LDA C050", "CMA", "STA C051", "HLT"].iter(),
            0x0100,
            &mut mem,
        )
        .unwrap();
        assert_eq!(end, 0x0108);
        assert_eq!(
            &mem.as_slice()[0x0100..0x0108],
            &[0x3A, 0x50, 0xC0, 0x2F, 0x32, 0x51, 0xC0, 0x76]
        );
    }

    #[test]
    fn test_load_program_stops_at_first_failure() {
        let mut mem = Memory::new();
        let result = load_program(["MVI A,99", "FOO", "HLT"].iter(), 0x0000, &mut mem);
        assert_eq!(
            result,
            Err(LoadError {
                line: 1,
                address: 0x0002,
                error: AsmError::UnknownMnemonic
            })
        );
        assert_eq!(mem.read(0x0000), 0x3E);
        assert_eq!(mem.read(0x0001), 0x99);
        assert_eq!(mem.read(0x0002), 0x00);
    }
}
