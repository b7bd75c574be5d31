mod alu;
mod bit;
mod branch;
mod load_store;
pub mod opcodes;
mod registers;
mod stack;
mod table;

pub use alu::{AluOp, ShiftOp, ZeroFlag};
pub use registers::{Flags, Reg8, Reg16, Registers};
pub use table::ILLEGAL_OPCODES;

use log::{debug, trace, warn};

use crate::core::Bus;
use crate::cpu::{
    Cpu, CpuError, Opcode,
    state::{CpuStateTrait, Lr35902State},
};

/// Outcome of a single instruction handler.
pub(crate) type OpResult = Result<(), CpuError>;

/// Sharp LR35902 (Game Boy CPU) interpreter.
///
/// Executes one whole instruction per [`step`](Lr35902::step) and counts
/// cycles at 4 per bus access or internal step. The bus is lent in on every
/// call; the CPU never holds on to it.
pub struct Lr35902 {
    pub regs: Registers,

    // Internal state
    pub halted: bool,
    pub ime: bool,
    pub(crate) ei_delay: bool, // Instruction after EI runs before any interrupt
    pub(crate) halt_bug: bool, // Next opcode fetch leaves PC in place

    cycles: u32,
    total_cycles: u64,
    fault: Option<CpuError>,
    instr_pc: u16, // Address of the opcode being executed
}

impl Default for Lr35902 {
    fn default() -> Self {
        Self::new()
    }
}

impl Lr35902 {
    /// Power-on state: all registers zero, PC at the boot ROM entry.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            halted: false,
            ime: false,
            ei_delay: false,
            halt_bug: false,
            cycles: 0,
            total_cycles: 0,
            fault: None,
            instr_pc: 0,
        }
    }

    /// Load the register values the DMG boot ROM leaves behind and start at
    /// the cartridge entry point (0x0100).
    pub fn skip_boot_rom(&mut self) {
        self.reset();
        self.regs = Registers::post_boot();
    }

    /// Cycles charged by the most recent step (or interrupt dispatch).
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Cycles charged since construction or the last reset.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// The latched fault, if a previous step failed.
    pub fn fault(&self) -> Option<&CpuError> {
        self.fault.as_ref()
    }

    /// True when an interrupt controller may dispatch now: IME is set and
    /// the instruction following EI has already run.
    pub fn accepts_interrupts(&self) -> bool {
        self.ime && !self.ei_delay
    }

    /// Execute exactly one instruction and return the cycles it took.
    ///
    /// A halted CPU with nothing pending does no work and returns `Ok(0)`.
    /// Once a handler fails the error is latched; every later call returns it
    /// again without touching the bus.
    pub fn step(&mut self, bus: &mut dyn Bus) -> Result<u32, CpuError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        self.cycles = 0;
        self.ei_delay = false;

        if self.halted {
            if !bus.check_interrupts().any() {
                return Ok(0);
            }
            debug!("wake from HALT at 0x{:04X}", self.regs.pc);
            self.halted = false;
            self.internal();
        }

        self.instr_pc = self.regs.pc;
        let opcode = self.fetch_opcode(bus);
        trace!(
            "{:04X}: {:02X} {:<14} {:?}",
            self.instr_pc,
            opcode,
            opcodes::mnemonic(opcode),
            self.regs
        );

        match table::PRIMARY[opcode as usize](self, bus, opcode) {
            Ok(()) => Ok(self.cycles),
            Err(err) => {
                warn!("CPU fault: {err}");
                self.fault = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Dispatch an interrupt through `vector` (0x40, 0x48, 0x50, 0x58, 0x60).
    ///
    /// Called by the interrupt controller once it has picked a line and
    /// acknowledged it in IF. Clears IME and halted, spends two internal
    /// cycles, pushes PC, spends one more, then jumps: 20 cycles in total.
    pub fn service_interrupt(&mut self, bus: &mut dyn Bus, vector: u16) -> u32 {
        debug!(
            "interrupt 0x{vector:04X} from 0x{:04X}{}",
            self.regs.pc,
            if self.halted { " (halted)" } else { "" }
        );
        self.cycles = 0;
        self.ime = false;
        self.ei_delay = false;
        self.halted = false;
        self.internal();
        self.internal();
        self.push_word(bus, self.regs.pc);
        self.internal();
        self.regs.pc = vector;
        self.cycles
    }

    // --- Bus access (each charges 4 cycles) ---

    /// Opcode fetch. Reproduces the HALT bug by not advancing PC once.
    fn fetch_opcode(&mut self, bus: &mut dyn Bus) -> u8 {
        let opcode = self.read8(bus, self.regs.pc);
        if self.halt_bug {
            self.halt_bug = false;
        } else {
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
        opcode
    }

    pub(crate) fn fetch8(&mut self, bus: &mut dyn Bus) -> u8 {
        let val = self.read8(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        val
    }

    /// Little-endian immediate word.
    pub(crate) fn fetch16(&mut self, bus: &mut dyn Bus) -> u16 {
        let lo = self.fetch8(bus);
        let hi = self.fetch8(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn read8(&mut self, bus: &mut dyn Bus, addr: u16) -> u8 {
        self.charge();
        bus.read(addr)
    }

    pub(crate) fn write8(&mut self, bus: &mut dyn Bus, addr: u16, data: u8) {
        self.charge();
        bus.write(addr, data);
    }

    /// Register-only machine cycle with no bus access.
    pub(crate) fn internal(&mut self) {
        self.charge();
    }

    fn charge(&mut self) {
        self.cycles += 4;
        self.total_cycles += 4;
    }

    /// Read an 8-bit operand by register field. Index 6 is (HL) and costs a
    /// memory read.
    pub(crate) fn read_r(&mut self, bus: &mut dyn Bus, index: u8) -> u8 {
        match Reg8::from_index(index) {
            Some(reg) => self.regs.get8(reg),
            None => self.read8(bus, self.regs.hl()),
        }
    }

    /// Write an 8-bit operand by register field. Index 6 is (HL).
    pub(crate) fn write_r(&mut self, bus: &mut dyn Bus, index: u8, val: u8) {
        match Reg8::from_index(index) {
            Some(reg) => self.regs.set8(reg, val),
            None => self.write8(bus, self.regs.hl(), val),
        }
    }

    // --- Control instructions ---

    /// NOP — 4 cycles
    pub(crate) fn op_nop(&mut self, _bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        Ok(())
    }

    /// HALT — 4 cycles
    pub(crate) fn op_halt(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        if !self.ime && bus.check_interrupts().any() {
            debug!("HALT bug at 0x{:04X}", self.instr_pc);
            self.halt_bug = true;
        } else {
            debug!("HALT at 0x{:04X}", self.instr_pc);
            self.halted = true;
        }
        Ok(())
    }

    /// STOP — 8 cycles. The byte after the opcode is skipped.
    pub(crate) fn op_stop(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.fetch8(bus);
        debug!("STOP at 0x{:04X}", self.instr_pc);
        self.halted = true;
        Ok(())
    }

    /// DI — 4 cycles
    pub(crate) fn op_di(&mut self, _bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.ime = false;
        self.ei_delay = false;
        Ok(())
    }

    /// EI — 4 cycles. IME is set now; dispatch waits one instruction.
    pub(crate) fn op_ei(&mut self, _bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        if !self.ime {
            self.ei_delay = true;
        }
        self.ime = true;
        Ok(())
    }

    /// 0xCB prefix: fetch the second byte and run it from the secondary table.
    pub(crate) fn op_prefix_cb(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let opcode = self.fetch8(bus);
        trace!("{:04X}: CB {:02X} {}", self.instr_pc, opcode, opcodes::cb_mnemonic(opcode));
        table::SECONDARY[opcode as usize](self, bus, opcode)
    }

    pub(crate) fn op_illegal(&mut self, _bus: &mut dyn Bus, opcode: u8) -> OpResult {
        Err(CpuError::Illegal {
            opcode,
            pc: self.instr_pc,
        })
    }

    /// Fallback for a primary-table slot with no handler.
    pub(crate) fn op_unimplemented(&mut self, _bus: &mut dyn Bus, opcode: u8) -> OpResult {
        Err(CpuError::Unimplemented {
            opcode: Opcode::Primary(opcode),
            pc: self.instr_pc,
        })
    }

    /// Fallback for a secondary-table slot with no handler.
    pub(crate) fn op_cb_unimplemented(&mut self, _bus: &mut dyn Bus, opcode: u8) -> OpResult {
        Err(CpuError::Unimplemented {
            opcode: Opcode::Prefixed(opcode),
            pc: self.instr_pc,
        })
    }
}

impl Cpu for Lr35902 {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn interrupts_enabled(&self) -> bool {
        self.ime
    }

    fn is_sleeping(&self) -> bool {
        self.halted
    }

    fn wake(&mut self) {
        self.halted = false;
    }
}

impl CpuStateTrait for Lr35902 {
    type Snapshot = Lr35902State;

    fn snapshot(&self) -> Lr35902State {
        Lr35902State {
            a: self.regs.a,
            f: self.regs.f(),
            b: self.regs.b,
            c: self.regs.c,
            d: self.regs.d,
            e: self.regs.e,
            h: self.regs.h,
            l: self.regs.l,
            sp: self.regs.sp,
            pc: self.regs.pc,
            ime: self.ime,
            halted: self.halted,
        }
    }
}
