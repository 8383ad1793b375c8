use core::fmt;

/// Failures while turning one line of assembly text into bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AsmError {
    /// No table entry carries this mnemonic
    UnknownMnemonic,
    /// Operands do not fit any entry for the mnemonic
    InvalidOperand,
    /// Literal is not exactly `digits` hexadecimal characters
    MalformedImmediate { digits: u8 },
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmError::UnknownMnemonic => write!(f, "unknown mnemonic"),
            AsmError::InvalidOperand => write!(f, "invalid operand"),
            AsmError::MalformedImmediate { digits } => {
                write!(f, "malformed immediate, expected {} hex digits", digits)
            }
        }
    }
}

/// Encoding failure while writing a program into memory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadError {
    pub line: usize,   // index of the offending line
    pub address: u16,  // write cursor when the line was reached
    pub error: AsmError,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} (address {:04X}): {}",
            self.line + 1,
            self.address,
            self.error
        )
    }
}

/// Fatal conditions of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecError {
    IllegalOpcode { opcode: u8, pc: u16 },
    StepLimitExceeded { limit: u64 },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::IllegalOpcode { opcode, pc } => {
                write!(f, "illegal opcode {:02X} at {:04X}", opcode, pc)
            }
            ExecError::StepLimitExceeded { limit } => {
                write!(f, "program did not halt within {} steps", limit)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AsmError {}

#[cfg(feature = "std")]
impl std::error::Error for LoadError {}

#[cfg(feature = "std")]
impl std::error::Error for ExecError {}
