use crate::core::Bus;
use crate::cpu::lr35902::{Flags, Lr35902, OpResult};

impl Lr35902 {
    /// Evaluate a 2-bit condition field: 0=NZ, 1=Z, 2=NC, 3=C.
    pub(crate) fn condition(&self, cc: u8) -> bool {
        match cc & 0x03 {
            0 => !self.regs.flag(Flags::Z),
            1 => self.regs.flag(Flags::Z),
            2 => !self.regs.flag(Flags::C),
            _ => self.regs.flag(Flags::C),
        }
    }

    /// JP nn — 16 cycles: fetch + 2 operand + internal
    pub(crate) fn op_jp(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let addr = self.fetch16(bus);
        self.internal();
        self.regs.pc = addr;
        Ok(())
    }

    /// JP cc,nn — 16 cycles taken, 12 not taken
    /// Opcode mask: 110 cc 010
    pub(crate) fn op_jp_cc(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let addr = self.fetch16(bus);
        if self.condition(opcode >> 3) {
            self.internal();
            self.regs.pc = addr;
        }
        Ok(())
    }

    /// JP HL — 4 cycles
    pub(crate) fn op_jp_hl(&mut self, _bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.regs.pc = self.regs.hl();
        Ok(())
    }

    /// JR e8 — 12 cycles. Offset is relative to the following instruction.
    pub(crate) fn op_jr(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let offset = self.fetch8(bus) as i8;
        self.internal();
        self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
        Ok(())
    }

    /// JR cc,e8 — 12 cycles taken, 8 not taken
    /// Opcode mask: 001 cc 000
    pub(crate) fn op_jr_cc(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let offset = self.fetch8(bus) as i8;
        if self.condition(opcode >> 3) {
            self.internal();
            self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
        }
        Ok(())
    }

    /// CALL nn — 24 cycles: fetch + 2 operand + internal + 2 writes
    pub(crate) fn op_call(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let addr = self.fetch16(bus);
        self.call(bus, addr);
        Ok(())
    }

    /// CALL cc,nn — 24 cycles taken, 12 not taken
    /// Opcode mask: 110 cc 100
    pub(crate) fn op_call_cc(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let addr = self.fetch16(bus);
        if self.condition(opcode >> 3) {
            self.call(bus, addr);
        }
        Ok(())
    }

    fn call(&mut self, bus: &mut dyn Bus, addr: u16) {
        self.internal();
        self.push_word(bus, self.regs.pc);
        self.regs.pc = addr;
    }

    /// RET — 16 cycles: fetch + 2 reads + internal
    pub(crate) fn op_ret(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.ret(bus);
        Ok(())
    }

    /// RET cc — 20 cycles taken, 8 not taken (condition check is internal)
    /// Opcode mask: 110 cc 000
    pub(crate) fn op_ret_cc(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        self.internal();
        if self.condition(opcode >> 3) {
            self.ret(bus);
        }
        Ok(())
    }

    /// RETI — 16 cycles. Sets IME with no EI-style delay.
    pub(crate) fn op_reti(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.ret(bus);
        self.ime = true;
        Ok(())
    }

    fn ret(&mut self, bus: &mut dyn Bus) {
        let addr = self.pop_word(bus);
        self.internal();
        self.regs.pc = addr;
    }

    /// RST n — 16 cycles. Target is bits 5-3 times 8 (0x00..0x38).
    /// Opcode mask: 11 ttt 111
    pub(crate) fn op_rst(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        self.call(bus, (opcode & 0x38) as u16);
        Ok(())
    }
}
