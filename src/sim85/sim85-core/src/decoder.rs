use crate::error::ExecError;
use crate::instructions::{table, Instruction};
use crate::memory::Memory;
use log::error;

/// Decode the instruction at `pc` without touching any state
/// Operand bytes follow the opcode, 16-bit values low byte first
pub fn decoder(mem: &Memory, pc: u16) -> Result<Instruction, ExecError> {
    let opcode = mem.read(pc);
    let entry = match table::by_opcode(opcode) {
        Some(entry) => entry,
        None => {
            error!("Illegal opcode {:02X} at {:04X}", opcode, pc);
            return Err(ExecError::IllegalOpcode { opcode, pc });
        }
    };

    let data = match entry.length {
        2 => mem.read(pc.wrapping_add(1)) as u16,
        3 => mem.read_word(pc.wrapping_add(1)),
        _ => 0,
    };

    Ok(Instruction { pc, entry, data })
}

/// Decode for display; identical to `decoder`, named for callers that never execute
pub fn disassemble(mem: &Memory, address: u16) -> Result<Instruction, ExecError> {
    decoder(mem, address)
}

#[cfg(test)]
mod decoder_tests {
    use super::*;
    use crate::constants::opcodes::UNDOCUMENTED;
    use crate::instructions::Mnemonic;
    use std::string::ToString;

    #[test]
    fn test_decode_operands() {
        let mut mem = Memory::new();
        mem.load(0x0000, &[0x21, 0x51, 0xC0, 0x3E, 0x99, 0x7E, 0xFF]);

        let lxi = decoder(&mem, 0x0000).unwrap();
        assert_eq!(lxi.mnemonic(), Mnemonic::LXI);
        assert_eq!(lxi.imm16(), 0xC051);
        assert_eq!(lxi.next_pc(), 0x0003);
        assert_eq!(lxi.to_string(), "LXI H,C051");

        let mvi = decoder(&mem, 0x0003).unwrap();
        assert_eq!(mvi.imm8(), 0x99);
        assert_eq!(mvi.to_string(), "MVI A,99");

        assert_eq!(decoder(&mem, 0x0005).unwrap().to_string(), "MOV A,M");
        assert_eq!(decoder(&mem, 0x0006).unwrap().to_string(), "RST 7");
    }

    #[test]
    fn test_operands_wrap_past_top_of_memory() {
        let mut mem = Memory::new();
        mem.write(0xFFFF, 0xC3); // JMP
        mem.write(0x0000, 0x34);
        mem.write(0x0001, 0x12);
        let jmp = decoder(&mem, 0xFFFF).unwrap();
        assert_eq!(jmp.imm16(), 0x1234);
        assert_eq!(jmp.next_pc(), 0x0002);
    }

    #[test]
    fn test_undocumented_opcodes_are_illegal() {
        let mut mem = Memory::new();
        for opcode in UNDOCUMENTED.iter() {
            mem.write(0x4000, *opcode);
            assert_eq!(
                disassemble(&mem, 0x4000),
                Err(ExecError::IllegalOpcode {
                    opcode: *opcode,
                    pc: 0x4000
                })
            );
        }
    }
}
