use crate::core::Bus;
use crate::cpu::lr35902::{Lr35902, OpResult, Reg16};

impl Lr35902 {
    /// Push a word: high byte to SP-1, low byte to SP-2. 8 cycles.
    pub(crate) fn push_word(&mut self, bus: &mut dyn Bus, val: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(bus, self.regs.sp, (val >> 8) as u8);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write8(bus, self.regs.sp, val as u8);
    }

    /// Pop a word: low byte from SP, high byte from SP+1. 8 cycles.
    pub(crate) fn pop_word(&mut self, bus: &mut dyn Bus) -> u16 {
        let lo = self.read8(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.read8(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// PUSH rr — 16 cycles: fetch + internal + write high + write low
    /// Opcode mask: 11 rr0 101 (rr: 0=BC, 1=DE, 2=HL, 3=AF)
    pub(crate) fn op_push(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let val = self.regs.get16(Reg16::from_rp_af(opcode >> 4));
        self.internal();
        self.push_word(bus, val);
        Ok(())
    }

    /// POP rr — 12 cycles: fetch + read low + read high
    /// Opcode mask: 11 rr0 001. POP AF drops the low nibble of F.
    pub(crate) fn op_pop(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let val = self.pop_word(bus);
        self.regs.set16(Reg16::from_rp_af(opcode >> 4), val);
        Ok(())
    }
}
