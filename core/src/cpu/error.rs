use std::fmt;

use crate::cpu::lr35902::opcodes;

/// An opcode together with the table it was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// First byte of an instruction (primary table).
    Primary(u8),
    /// Byte following the 0xCB prefix (secondary table).
    Prefixed(u8),
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Primary(op) => write!(f, "0x{op:02X} ({})", opcodes::mnemonic(op)),
            Self::Prefixed(op) => write!(f, "0xCB 0x{op:02X} ({})", opcodes::cb_mnemonic(op)),
        }
    }
}

/// Faults raised while executing an instruction.
///
/// Every variant is a coverage error rather than a recoverable condition:
/// re-running a deterministic interpreter from the same state reproduces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuError {
    /// A dispatch slot with no handler behind it.
    Unimplemented { opcode: Opcode, pc: u16 },

    /// One of the opcodes the hardware leaves undefined (the real chip locks up).
    Illegal { opcode: u8, pc: u16 },
}

impl CpuError {
    /// Address of the first byte of the faulting instruction.
    pub fn pc(&self) -> u16 {
        match *self {
            Self::Unimplemented { pc, .. } | Self::Illegal { pc, .. } => pc,
        }
    }
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unimplemented { opcode, pc } => {
                write!(f, "unimplemented opcode {opcode} at 0x{pc:04X}")
            }
            Self::Illegal { opcode, pc } => {
                write!(f, "illegal opcode 0x{opcode:02X} at 0x{pc:04X}")
            }
        }
    }
}

impl std::error::Error for CpuError {}
