#![no_std]

/// Load and start address shared by every bundled program
pub const ORIGIN: u16 = 0x0000;

/// A classic 8085 lab exercise: seed bytes, source lines and the bytes it must leave behind
#[derive(Clone, Copy, Debug)]
pub struct Program {
    pub name: &'static str,                // Short identifier used on the command line
    pub title: &'static str,               // One-line description
    pub inputs: &'static [(u16, u8)],      // Memory seeded before the run
    pub source: &'static [&'static str],   // One instruction per line
    pub expected: &'static [(u16, u8)],    // Memory checked after the run
}

// Squares of 0-9 at C060, the lookup table read by `square`
const SQUARES: [(u16, u8); 11] = [
    (0xC060, 0),
    (0xC061, 1),
    (0xC062, 4),
    (0xC063, 9),
    (0xC064, 16),
    (0xC065, 25),
    (0xC066, 36),
    (0xC067, 49),
    (0xC068, 64),
    (0xC069, 81),
    (0xC050, 9),
];

/// Bundled programs in listing order
pub static PROGRAMS: [Program; 14] = [
    Program {
        name: "ones-complement",
        title: "1's complement of an 8-bit number",
        inputs: &[(0xC050, 0x96)],
        source: &["LDA C050", "CMA", "STA C051", "HLT"],
        expected: &[(0xC051, 0x69)],
    },
    Program {
        name: "twos-complement",
        title: "2's complement of an 8-bit number",
        inputs: &[(0xC050, 0x96)],
        source: &["LDA C050", "CMA", "INR A", "STA C051", "HLT"],
        expected: &[(0xC051, 0x6A)],
    },
    Program {
        name: "add",
        title: "Addition of two 8-bit numbers",
        inputs: &[(0xC050, 0x55), (0xC051, 0x66)],
        source: &["LXI H,C050", "MOV A,M", "INX H", "ADD M", "STA C052", "HLT"],
        expected: &[(0xC052, 0xBB)],
    },
    Program {
        name: "subtract",
        title: "Subtraction of two 8-bit numbers",
        inputs: &[(0xC050, 0x95), (0xC051, 0x65)],
        source: &[
            "LXI H,C050",
            "MOV A,M",
            "INX H",
            "SUB M",
            "INX H",
            "MOV M,A",
            "HLT",
        ],
        expected: &[(0xC052, 0x30)],
    },
    Program {
        name: "shift-left",
        title: "Shift an 8-bit number left by 1 bit",
        inputs: &[(0xC050, 0x65)],
        source: &["LDA C050", "ADD A", "STA C051", "HLT"],
        expected: &[(0xC051, 0xCA)],
    },
    Program {
        name: "square",
        title: "Find a square from a lookup table",
        inputs: &SQUARES,
        source: &[
            "LDA C050",
            "ADI 60",
            "MOV L,A",
            "MVI H,C0",
            "MOV A,M",
            "STA C051",
            "HLT",
        ],
        expected: &[(0xC051, 0x51)],
    },
    Program {
        name: "bcd-subtract",
        title: "8-bit decimal subtraction (10's complement when negative)",
        inputs: &[(0xC050, 0x99), (0xC051, 0x48)],
        source: &[
            "LXI H,C051",
            "MVI A,99",
            "SUB M",
            "INR A",
            "DCX H",
            "ADD M",
            "DAA",
            "STA C052",
            "HLT",
        ],
        expected: &[(0xC052, 0x51)],
    },
    Program {
        name: "mask-low",
        title: "Mask off the least significant 4 bits",
        inputs: &[(0xC050, 0x96)],
        source: &["LDA C050", "ANI F0", "STA C051", "HLT"],
        expected: &[(0xC051, 0x90)],
    },
    Program {
        name: "mask-high",
        title: "Mask off the most significant 4 bits",
        inputs: &[(0xC050, 0x96)],
        source: &["LDA C050", "ANI 0F", "STA C051", "HLT"],
        expected: &[(0xC051, 0x06)],
    },
    Program {
        name: "shift16",
        title: "Shift a 16-bit number left by 1 bit",
        inputs: &[(0xC050, 0x96), (0xC051, 0x75)],
        source: &["LHLD C050", "DAD H", "SHLD C052", "HLT"],
        expected: &[(0xC052, 0x2C), (0xC053, 0xEB)],
    },
    Program {
        name: "shift16-by-2",
        title: "Shift a 16-bit number left by 2 bits",
        inputs: &[(0xC050, 0x96), (0xC051, 0x15)],
        source: &["LHLD C050", "DAD H", "DAD H", "SHLD C052", "HLT"],
        expected: &[(0xC052, 0x58), (0xC053, 0x56)],
    },
    Program {
        name: "ones-complement16",
        title: "1's complement of a 16-bit number",
        inputs: &[(0xC050, 0x85), (0xC051, 0x54)],
        source: &[
            "LXI H,C050",
            "MOV A,M",
            "CMA",
            "STA C052",
            "INX H",
            "MOV A,M",
            "CMA",
            "STA C053",
            "HLT",
        ],
        expected: &[(0xC052, 0x7A), (0xC053, 0xAB)],
    },
    Program {
        name: "multiply",
        title: "Multiply two 8-bit numbers by repeated addition",
        inputs: &[(0xC050, 0x12), (0xC051, 0x0A)],
        source: &[
            "LDA C050",   // 0000
            "MOV E,A",    // 0003
            "MVI D,00",   // 0004
            "LDA C051",   // 0006
            "MOV C,A",    // 0009
            "LXI H,0000", // 000A
            "DAD D",      // 000D
            "DCR C",      // 000E
            "JNZ 000D",   // 000F
            "SHLD C052",  // 0012
            "HLT",        // 0015
        ],
        expected: &[(0xC052, 0xB4), (0xC053, 0x00)],
    },
    Program {
        name: "sum",
        title: "Sum four bytes through a subroutine",
        inputs: &[(0xC050, 0x11), (0xC051, 0x22), (0xC052, 0x33), (0xC053, 0x44)],
        source: &[
            "LXI SP,D000", // 0000
            "LXI H,C050",  // 0003
            "MVI C,04",    // 0006
            "XRA A",       // 0008
            "CALL 0015",   // 0009
            "INX H",       // 000C
            "DCR C",       // 000D
            "JNZ 0009",    // 000E
            "STA C054",    // 0011
            "HLT",         // 0014
            "PUSH B",      // 0015
            "MVI C,00",    // 0016
            "ADD M",       // 0018
            "POP B",       // 0019
            "RET",         // 001A
        ],
        expected: &[(0xC054, 0xAA)],
    },
];

/// Look a bundled program up by name
pub fn find(name: &str) -> Option<&'static Program> {
    PROGRAMS.iter().find(|program| program.name == name)
}
