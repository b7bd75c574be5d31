/// Generic CPU interface
pub trait Cpu: CpuStateTrait {
    /// Power-on reset
    fn reset(&mut self);

    /// Interrupt master enable as last written by EI/DI/RETI
    fn interrupts_enabled(&self) -> bool;

    /// Query if CPU is parked internally (HALT, STOP instruction)
    fn is_sleeping(&self) -> bool;

    /// Clear the sleeping state; called by an external interrupt controller
    fn wake(&mut self);
}

pub mod error;
pub use error::{CpuError, Opcode};

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, Lr35902State};

// Sharp LR35902 (Game Boy CPU)
pub mod lr35902;
pub use lr35902::Lr35902;
