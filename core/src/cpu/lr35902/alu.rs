use crate::core::Bus;
use crate::cpu::lr35902::{Flags, Lr35902, OpResult, Reg16, Registers};

/// Accumulator operation selected by bits 5-3 of `10 xxx zzz` / `11 xxx 110`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    pub const fn from_index(index: u8) -> AluOp {
        match index & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbc,
            4 => AluOp::And,
            5 => AluOp::Xor,
            6 => AluOp::Or,
            _ => AluOp::Cp,
        }
    }
}

/// Rotate/shift/swap selected by bits 5-3 of a CB-prefixed `00 xxx zzz` opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

impl ShiftOp {
    pub const fn from_index(index: u8) -> ShiftOp {
        match index & 0x07 {
            0 => ShiftOp::Rlc,
            1 => ShiftOp::Rrc,
            2 => ShiftOp::Rl,
            3 => ShiftOp::Rr,
            4 => ShiftOp::Sla,
            5 => ShiftOp::Sra,
            6 => ShiftOp::Swap,
            _ => ShiftOp::Srl,
        }
    }
}

/// How a rotate writes Z. RLCA/RRCA/RLA/RRA always clear it; the CB forms
/// set it from the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZeroFlag {
    AlwaysClear,
    FromResult,
}

// --- Flag primitives ---

impl Registers {
    /// 8-bit increment. C is not affected.
    pub fn inc8(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.assign_flag(Flags::Z, result == 0);
        self.clear_flag(Flags::N);
        self.assign_flag(Flags::H, (val & 0x0F) == 0x0F);
        result
    }

    /// 8-bit decrement. C is not affected.
    pub fn dec8(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.assign_flag(Flags::Z, result == 0);
        self.set_flag(Flags::N);
        self.assign_flag(Flags::H, (val & 0x0F) == 0x00); // Borrow from bit 4
        result
    }

    /// ADD/ADC. `with_carry` lets the current C flag participate as carry-in.
    pub fn add8(&mut self, lhs: u8, rhs: u8, with_carry: bool) -> u8 {
        let c = (with_carry && self.flag(Flags::C)) as u8;
        let sum = lhs as u16 + rhs as u16 + c as u16;
        let result = sum as u8;

        let mut f = Flags::NONE;
        f.set(Flags::Z, result == 0);
        f.set(Flags::H, (lhs & 0x0F) + (rhs & 0x0F) + c > 0x0F);
        f.set(Flags::C, sum > 0xFF);
        self.set_flags(f);
        result
    }

    /// SUB/SBC. `with_carry` lets the current C flag participate as borrow-in.
    pub fn sub8(&mut self, lhs: u8, rhs: u8, with_carry: bool) -> u8 {
        let c = (with_carry && self.flag(Flags::C)) as u8;
        let result = lhs.wrapping_sub(rhs).wrapping_sub(c);

        let mut f = Flags::N;
        f.set(Flags::Z, result == 0);
        f.set(Flags::H, (lhs & 0x0F) < (rhs & 0x0F) + c);
        f.set(Flags::C, (lhs as u16) < rhs as u16 + c as u16);
        self.set_flags(f);
        result
    }

    pub fn and8(&mut self, lhs: u8, rhs: u8) -> u8 {
        let result = lhs & rhs;
        self.set_flags(Self::zero(result) | Flags::H);
        result
    }

    pub fn or8(&mut self, lhs: u8, rhs: u8) -> u8 {
        let result = lhs | rhs;
        self.set_flags(Self::zero(result));
        result
    }

    pub fn xor8(&mut self, lhs: u8, rhs: u8) -> u8 {
        let result = lhs ^ rhs;
        self.set_flags(Self::zero(result));
        result
    }

    /// Apply an accumulator operation to A. CP only writes flags.
    pub fn alu(&mut self, op: AluOp, val: u8) {
        let a = self.a;
        match op {
            AluOp::Add => self.a = self.add8(a, val, false),
            AluOp::Adc => self.a = self.add8(a, val, true),
            AluOp::Sub => self.a = self.sub8(a, val, false),
            AluOp::Sbc => self.a = self.sub8(a, val, true),
            AluOp::And => self.a = self.and8(a, val),
            AluOp::Xor => self.a = self.xor8(a, val),
            AluOp::Or => self.a = self.or8(a, val),
            AluOp::Cp => {
                self.sub8(a, val, false);
            }
        }
    }

    /// ADD HL,rr. H from bit 11, C from bit 15, N cleared, Z untouched.
    pub fn add16_hl(&mut self, val: u16) {
        let hl = self.hl();
        let sum = hl as u32 + val as u32;
        self.clear_flag(Flags::N);
        self.assign_flag(Flags::H, (hl & 0x0FFF) + (val & 0x0FFF) > 0x0FFF);
        self.assign_flag(Flags::C, sum > 0xFFFF);
        self.set_hl(sum as u16);
    }

    /// SP plus a sign-extended immediate (ADD SP,e8 and LD HL,SP+e8).
    ///
    /// H and C come from the unsigned addition of SP's low byte and the raw
    /// immediate byte (carry out of bits 3 and 7), regardless of the sign.
    /// Z and N are always cleared.
    pub fn add_sp_signed(&mut self, offset: u8) -> u16 {
        let sp = self.sp;
        let mut f = Flags::NONE;
        f.set(Flags::H, (sp & 0x000F) + (offset as u16 & 0x000F) > 0x000F);
        f.set(Flags::C, (sp & 0x00FF) + offset as u16 > 0x00FF);
        self.set_flags(f);
        sp.wrapping_add(offset as i8 as i16 as u16)
    }

    /// DAA: BCD-correct A after an add (N clear) or subtract (N set).
    pub fn daa(&mut self) {
        let mut a = self.a;
        let mut carry = self.flag(Flags::C);
        let half = self.flag(Flags::H);

        if !self.flag(Flags::N) {
            if carry || a > 0x99 {
                a = a.wrapping_add(0x60);
                carry = true;
            }
            if half || (a & 0x0F) > 0x09 {
                a = a.wrapping_add(0x06);
            }
        } else {
            if carry {
                a = a.wrapping_sub(0x60);
            }
            if half {
                a = a.wrapping_sub(0x06);
            }
        }

        self.a = a;
        self.assign_flag(Flags::Z, a == 0);
        self.clear_flag(Flags::H);
        self.assign_flag(Flags::C, carry);
    }

    /// Rotate/shift/swap a value. N and H cleared, C receives the bit shifted
    /// out (cleared for SWAP), Z written according to `zero`.
    pub fn shift(&mut self, op: ShiftOp, val: u8, zero: ZeroFlag) -> u8 {
        let old_carry = self.flag(Flags::C) as u8;
        let (result, carry) = match op {
            ShiftOp::Rlc => (val.rotate_left(1), val & 0x80 != 0),
            ShiftOp::Rrc => (val.rotate_right(1), val & 0x01 != 0),
            ShiftOp::Rl => ((val << 1) | old_carry, val & 0x80 != 0),
            ShiftOp::Rr => ((val >> 1) | (old_carry << 7), val & 0x01 != 0),
            ShiftOp::Sla => (val << 1, val & 0x80 != 0),
            ShiftOp::Sra => ((val >> 1) | (val & 0x80), val & 0x01 != 0), // keeps bit 7
            ShiftOp::Swap => (val.rotate_left(4), false),
            ShiftOp::Srl => (val >> 1, val & 0x01 != 0),
        };

        let mut f = Flags::NONE;
        f.set(Flags::Z, zero == ZeroFlag::FromResult && result == 0);
        f.set(Flags::C, carry);
        self.set_flags(f);
        result
    }

    /// BIT b: Z = !bit, N = 0, H = 1, C untouched.
    pub fn bit_test(&mut self, bit: u8, val: u8) {
        self.assign_flag(Flags::Z, val & (1 << (bit & 0x07)) == 0);
        self.clear_flag(Flags::N);
        self.set_flag(Flags::H);
    }

    fn zero(result: u8) -> Flags {
        if result == 0 { Flags::Z } else { Flags::NONE }
    }
}

// --- Instructions ---

impl Lr35902 {
    /// ALU A, r — 4 cycles (reg) or 8 ((HL))
    /// ADD, ADC, SUB, SBC, AND, XOR, OR, CP
    /// Opcode mask: 10 xxx zzz
    pub(crate) fn op_alu_r(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let val = self.read_r(bus, opcode & 0x07);
        self.regs.alu(AluOp::from_index(opcode >> 3), val);
        Ok(())
    }

    /// ALU A, n — 8 cycles
    /// Opcode mask: 11 xxx 110
    pub(crate) fn op_alu_n(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let val = self.fetch8(bus);
        self.regs.alu(AluOp::from_index(opcode >> 3), val);
        Ok(())
    }

    /// INC/DEC r — 4 cycles (reg) or 12 ((HL): read + write)
    /// Opcode mask: 00 rrr 10x
    pub(crate) fn op_inc_dec_r(&mut self, bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let r = (opcode >> 3) & 0x07;
        let val = self.read_r(bus, r);
        let result = if opcode & 0x01 != 0 {
            self.regs.dec8(val)
        } else {
            self.regs.inc8(val)
        };
        self.write_r(bus, r, result);
        Ok(())
    }

    /// INC rr / DEC rr — 8 cycles: fetch + internal. No flags affected.
    /// INC: 00 rr0 011, DEC: 00 rr1 011.
    pub(crate) fn op_inc_dec_rr(&mut self, _bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let rp = Reg16::from_rp(opcode >> 4);
        let val = self.regs.get16(rp);
        let result = if opcode & 0x08 != 0 {
            val.wrapping_sub(1)
        } else {
            val.wrapping_add(1)
        };
        self.internal();
        self.regs.set16(rp, result);
        Ok(())
    }

    /// ADD HL,rr — 8 cycles: fetch + internal
    /// Opcode mask: 00 rr1 001 (rr: 0=BC, 1=DE, 2=HL, 3=SP)
    pub(crate) fn op_add_hl_rr(&mut self, _bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let val = self.regs.get16(Reg16::from_rp(opcode >> 4));
        self.internal();
        self.regs.add16_hl(val);
        Ok(())
    }

    /// ADD SP,e8 — 16 cycles: fetch + operand + 2 internal
    pub(crate) fn op_add_sp_e(&mut self, bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let offset = self.fetch8(bus);
        self.internal();
        self.internal();
        self.regs.sp = self.regs.add_sp_signed(offset);
        Ok(())
    }

    /// RLCA / RRCA / RLA / RRA — 4 cycles. Z is always cleared.
    /// Opcode mask: 000 xx 111
    pub(crate) fn op_rotate_a(&mut self, _bus: &mut dyn Bus, opcode: u8) -> OpResult {
        let op = ShiftOp::from_index(opcode >> 3);
        let a = self.regs.a;
        self.regs.a = self.regs.shift(op, a, ZeroFlag::AlwaysClear);
        Ok(())
    }

    /// DAA — 4 cycles
    pub(crate) fn op_daa(&mut self, _bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.regs.daa();
        Ok(())
    }

    /// CPL — 4 cycles. Complement A, set N and H.
    pub(crate) fn op_cpl(&mut self, _bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.regs.a = !self.regs.a;
        self.regs.set_flag(Flags::N | Flags::H);
        Ok(())
    }

    /// SCF — 4 cycles. C = 1, N = H = 0, Z untouched.
    pub(crate) fn op_scf(&mut self, _bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        self.regs.clear_flag(Flags::N | Flags::H);
        self.regs.set_flag(Flags::C);
        Ok(())
    }

    /// CCF — 4 cycles. C = !C, N = H = 0, Z untouched.
    pub(crate) fn op_ccf(&mut self, _bus: &mut dyn Bus, _opcode: u8) -> OpResult {
        let carry = self.regs.flag(Flags::C);
        self.regs.clear_flag(Flags::N | Flags::H);
        self.regs.assign_flag(Flags::C, !carry);
        Ok(())
    }
}
