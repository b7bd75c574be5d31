use log::debug;
use lr35902_core::core::Bus;
use lr35902_core::cpu::{CpuError, CpuStateTrait, Lr35902, state::Lr35902State};

use crate::io::SystemBus;

/// Why [`SimpleLr35902System::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStop {
    /// The caller's condition became true.
    Condition,
    /// The cycle budget ran out first.
    Budget,
}

/// LR35902 wired to a flat 64 KiB bus with timer, serial and interrupt
/// latches. Enough to run CPU conformance programs headless.
pub struct SimpleLr35902System {
    pub cpu: Lr35902,
    pub bus: SystemBus,
    clock: u64,
}

impl Default for SimpleLr35902System {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleLr35902System {
    pub fn new() -> Self {
        Self {
            cpu: Lr35902::new(),
            bus: SystemBus::new(),
            clock: 0,
        }
    }

    pub fn load_program(&mut self, offset: u16, data: &[u8]) {
        self.bus.load(offset, data);
    }

    /// Clocks elapsed, including time spent halted.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn get_cpu_state(&self) -> Lr35902State {
        self.cpu.snapshot()
    }

    /// Dispatch a pending interrupt or execute one instruction, then run
    /// the peripherals for the time that took.
    ///
    /// A halted CPU with nothing to wake it still lets 4 clocks pass so the
    /// timer can eventually raise the interrupt it is waiting for.
    pub fn step(&mut self) -> Result<u32, CpuError> {
        let pending = self.bus.check_interrupts();
        let cycles = match pending.highest() {
            Some(line) if self.cpu.accepts_interrupts() => {
                self.bus.acknowledge(line);
                self.cpu.service_interrupt(&mut self.bus, 0x0040 + 8 * line as u16)
            }
            _ => self.cpu.step(&mut self.bus)?,
        };

        let elapsed = if cycles == 0 { 4 } else { cycles };
        self.bus.tick(elapsed);
        self.clock += elapsed as u64;
        Ok(elapsed)
    }

    /// Step until `done` returns true or `max_cycles` clocks have passed.
    pub fn run(
        &mut self,
        max_cycles: u64,
        mut done: impl FnMut(&Self) -> bool,
    ) -> Result<RunStop, CpuError> {
        let deadline = self.clock.saturating_add(max_cycles);
        while self.clock < deadline {
            self.step()?;
            if done(self) {
                return Ok(RunStop::Condition);
            }
        }
        debug!("cycle budget of {max_cycles} exhausted at PC 0x{:04X}", self.cpu.regs.pc);
        Ok(RunStop::Budget)
    }

    /// Serial output decoded as text, lossy for non-UTF-8 bytes.
    pub fn serial_text(&self) -> String {
        String::from_utf8_lossy(self.bus.serial_output()).into_owned()
    }
}
