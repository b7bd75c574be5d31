use crate::core::Bus;
use crate::cpu::lr35902::{Lr35902, OpResult, Reg16};

impl Lr35902 {
    /// LD r,r' — 4 cycles (reg to reg) or 8 (either side (HL))
    /// Opcode mask: 01 ddd sss (01 110 110 is HALT)
    pub(crate) fn op_ld_r_r(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let val = self.read_r(bus, opcode & 0x07);
        self.write_r(bus, (opcode >> 3) & 0x07, val);
        Ok(())
    }

    /// LD r,n — 8 cycles, LD (HL),n — 12 cycles
    /// Opcode mask: 00 rrr 110
    pub(crate) fn op_ld_r_n(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let val = self.fetch8(bus);
        self.write_r(bus, (opcode >> 3) & 0x07, val);
        Ok(())
    }

    /// LD rr,nn — 12 cycles
    /// Opcode mask: 00 rr0 001 (rr: 0=BC, 1=DE, 2=HL, 3=SP)
    pub(crate) fn op_ld_rr_nn(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let val = self.fetch16(bus);
        self.regs.set16(Reg16::from_rp(opcode >> 4), val);
        Ok(())
    }

    /// Address for the `00 rr0 010` / `00 rr1 010` indirect forms:
    /// (BC), (DE), (HL+), (HL-). HL is post-adjusted.
    fn indirect_addr(&mut self, opcode: u8) -> u16 {
        match (opcode >> 4) & 0x03 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            _ => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    /// LD (BC),A / LD (DE),A / LD (HL+),A / LD (HL-),A — 8 cycles
    pub(crate) fn op_ld_ind_a(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let addr = self.indirect_addr(opcode);
        self.write8(bus, addr, self.regs.a);
        Ok(())
    }

    /// LD A,(BC) / LD A,(DE) / LD A,(HL+) / LD A,(HL-) — 8 cycles
    pub(crate) fn op_ld_a_ind(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let addr = self.indirect_addr(opcode);
        self.regs.a = self.read8(bus, addr);
        Ok(())
    }

    /// LD (nn),SP — 20 cycles. Low byte first.
    pub(crate) fn op_ld_nn_sp(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let addr = self.fetch16(bus);
        let sp = self.regs.sp;
        self.write8(bus, addr, sp as u8);
        self.write8(bus, addr.wrapping_add(1), (sp >> 8) as u8);
        Ok(())
    }

    /// LDH (n),A — 12 cycles. Writes to 0xFF00 + n.
    pub(crate) fn op_ldh_n_a(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let offset = self.fetch8(bus);
        self.write8(bus, 0xFF00 | offset as u16, self.regs.a);
        Ok(())
    }

    /// LDH A,(n) — 12 cycles
    pub(crate) fn op_ldh_a_n(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let offset = self.fetch8(bus);
        self.regs.a = self.read8(bus, 0xFF00 | offset as u16);
        Ok(())
    }

    /// LD (C),A — 8 cycles. Writes to 0xFF00 + C.
    pub(crate) fn op_ld_c_a(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.write8(bus, 0xFF00 | self.regs.c as u16, self.regs.a);
        Ok(())
    }

    /// LD A,(C) — 8 cycles
    pub(crate) fn op_ld_a_c(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.regs.a = self.read8(bus, 0xFF00 | self.regs.c as u16);
        Ok(())
    }

    /// LD (nn),A — 16 cycles
    pub(crate) fn op_ld_nn_a(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let addr = self.fetch16(bus);
        self.write8(bus, addr, self.regs.a);
        Ok(())
    }

    /// LD A,(nn) — 16 cycles
    pub(crate) fn op_ld_a_nn(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let addr = self.fetch16(bus);
        self.regs.a = self.read8(bus, addr);
        Ok(())
    }

    /// LD HL,SP+e8 — 12 cycles: fetch + operand + internal.
    /// Flags as ADD SP,e8 (H/C from the low byte, Z = N = 0).
    pub(crate) fn op_ld_hl_sp_e(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let offset = self.fetch8(bus);
        self.internal();
        let val = self.regs.add_sp_signed(offset);
        self.regs.set_hl(val);
        Ok(())
    }

    /// LD SP,HL — 8 cycles: fetch + internal
    pub(crate) fn op_ld_sp_hl(&mut self, _bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.internal();
        self.regs.sp = self.regs.hl();
        Ok(())
    }
}
