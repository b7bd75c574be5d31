//! CPU state snapshot types and traits

/// Trait for CPU types that can provide state snapshots
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
}

/// LR35902 CPU state snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lr35902State {
    pub a: u8,       // Accumulator
    pub f: u8,       // Flags (low nibble always zero)
    pub b: u8,       // Register B
    pub c: u8,       // Register C
    pub d: u8,       // Register D
    pub e: u8,       // Register E
    pub h: u8,       // Register H
    pub l: u8,       // Register L
    pub sp: u16,     // Stack pointer
    pub pc: u16,     // Program counter
    pub ime: bool,   // Interrupt master enable
    pub halted: bool, // Parked by HALT/STOP
}
