use crate::core::Bus;
use crate::cpu::lr35902::{Lr35902, OpResult, ShiftOp, ZeroFlag};

// CB-prefixed instructions. Cycle counts include the prefix fetch.

impl Lr35902 {
    /// RLC/RRC/RL/RR/SLA/SRA/SWAP/SRL r — 8 cycles, (HL) 16
    /// CB opcode mask: 00 ooo rrr
    pub(crate) fn op_cb_shift(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let r = opcode & 0x07;
        let val = self.read_r(bus, r);
        let result = self
            .regs
            .shift(ShiftOp::from_index(opcode >> 3), val, ZeroFlag::FromResult);
        self.write_r(bus, r, result);
        Ok(())
    }

    /// BIT b,r — 8 cycles, (HL) 12 (read only, no write back)
    /// CB opcode mask: 01 bbb rrr
    pub(crate) fn op_cb_bit(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let val = self.read_r(bus, opcode & 0x07);
        self.regs.bit_test((opcode >> 3) & 0x07, val);
        Ok(())
    }

    /// RES b,r — 8 cycles, (HL) 16. Flags untouched.
    /// CB opcode mask: 10 bbb rrr
    pub(crate) fn op_cb_res(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let r = opcode & 0x07;
        let val = self.read_r(bus, r);
        self.write_r(bus, r, val & !(1 << ((opcode >> 3) & 0x07)));
        Ok(())
    }

    /// SET b,r — 8 cycles, (HL) 16. Flags untouched.
    /// CB opcode mask: 11 bbb rrr
    pub(crate) fn op_cb_set(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let r = opcode & 0x07;
        let val = self.read_r(bus, r);
        self.write_r(bus, r, val | (1 << ((opcode >> 3) & 0x07)));
        Ok(())
    }
}
