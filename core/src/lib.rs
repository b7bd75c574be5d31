pub mod core;
pub mod cpu;

pub mod prelude {
    pub use crate::core::{Bus, bus::InterruptState};
    pub use crate::cpu::{Cpu, CpuError, CpuStateTrait, Lr35902, Opcode};
}
