use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Condition flags held in the high nibble of F.
///
/// A small bitmask: flags combine with `|` and every constructor masks the
/// unused low nibble, so F can never hold anything in bits 0-3.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0x00);
    pub const C: Flags = Flags(0x10); // Carry
    pub const H: Flags = Flags(0x20); // Half Carry
    pub const N: Flags = Flags(0x40); // Subtract
    pub const Z: Flags = Flags(0x80); // Zero
    pub const ALL: Flags = Flags(0xF0);

    pub const fn from_bits(bits: u8) -> Self {
        Flags(bits & 0xF0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set.
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Flags) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: Flags, value: bool) {
        if value {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bit = |flag: Flags, ch: char| if self.contains(flag) { ch } else { '-' };
        write!(
            f,
            "{}{}{}{}",
            bit(Flags::Z, 'Z'),
            bit(Flags::N, 'N'),
            bit(Flags::H, 'H'),
            bit(Flags::C, 'C')
        )
    }
}

/// 8-bit registers. Opcode register fields use the order B, C, D, E, H, L, (HL), A.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Reg8 {
    /// Decode a 3-bit register field. Index 6 is the (HL) memory operand and
    /// has no register, so it decodes to `None`.
    pub const fn from_index(index: u8) -> Option<Reg8> {
        match index & 0x07 {
            0 => Some(Reg8::B),
            1 => Some(Reg8::C),
            2 => Some(Reg8::D),
            3 => Some(Reg8::E),
            4 => Some(Reg8::H),
            5 => Some(Reg8::L),
            7 => Some(Reg8::A),
            _ => None,
        }
    }
}

/// 16-bit registers and register-pair views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
}

impl Reg16 {
    /// 2-bit pair field used by loads and 16-bit arithmetic (0=BC, 1=DE, 2=HL, 3=SP).
    pub const fn from_rp(index: u8) -> Reg16 {
        match index & 0x03 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::SP,
        }
    }

    /// 2-bit pair field used by PUSH/POP (0=BC, 1=DE, 2=HL, 3=AF).
    pub const fn from_rp_af(index: u8) -> Reg16 {
        match index & 0x03 {
            0 => Reg16::BC,
            1 => Reg16::DE,
            2 => Reg16::HL,
            _ => Reg16::AF,
        }
    }
}

/// Register file: eight 8-bit registers plus SP and PC.
///
/// AF, BC, DE and HL are projections over the 8-bit registers (first-named
/// register is the high byte); they have no storage of their own.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// DMG register contents left behind by the boot ROM.
    pub fn post_boot() -> Self {
        let mut regs = Self::new();
        regs.set_af(0x01B0);
        regs.set_bc(0x0013);
        regs.set_de(0x00D8);
        regs.set_hl(0x014D);
        regs.sp = 0xFFFE;
        regs.pc = 0x0100;
        regs
    }

    pub fn get8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::F => self.f.bits(),
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
        }
    }

    pub fn set8(&mut self, reg: Reg8, val: u8) {
        match reg {
            Reg8::A => self.a = val,
            Reg8::F => self.f = Flags::from_bits(val),
            Reg8::B => self.b = val,
            Reg8::C => self.c = val,
            Reg8::D => self.d = val,
            Reg8::E => self.e = val,
            Reg8::H => self.h = val,
            Reg8::L => self.l = val,
        }
    }

    pub fn get16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::AF => self.af(),
            Reg16::BC => self.bc(),
            Reg16::DE => self.de(),
            Reg16::HL => self.hl(),
            Reg16::SP => self.sp,
            Reg16::PC => self.pc,
        }
    }

    pub fn set16(&mut self, reg: Reg16, val: u16) {
        match reg {
            Reg16::AF => self.set_af(val),
            Reg16::BC => self.set_bc(val),
            Reg16::DE => self.set_de(val),
            Reg16::HL => self.set_hl(val),
            Reg16::SP => self.sp = val,
            Reg16::PC => self.pc = val,
        }
    }

    // Helpers for 16-bit register access
    pub fn af(&self) -> u16 { ((self.a as u16) << 8) | self.f.bits() as u16 }
    pub fn set_af(&mut self, val: u16) { self.a = (val >> 8) as u8; self.f = Flags::from_bits(val as u8); }

    pub fn bc(&self) -> u16 { ((self.b as u16) << 8) | self.c as u16 }
    pub fn set_bc(&mut self, val: u16) { self.b = (val >> 8) as u8; self.c = val as u8; }

    pub fn de(&self) -> u16 { ((self.d as u16) << 8) | self.e as u16 }
    pub fn set_de(&mut self, val: u16) { self.d = (val >> 8) as u8; self.e = val as u8; }

    pub fn hl(&self) -> u16 { ((self.h as u16) << 8) | self.l as u16 }
    pub fn set_hl(&mut self, val: u16) { self.h = (val >> 8) as u8; self.l = val as u8; }

    // --- Flag view ---

    /// Raw F register value. Bits 0-3 always read as zero.
    pub fn f(&self) -> u8 {
        self.f.bits()
    }

    pub fn flags(&self) -> Flags {
        self.f
    }

    /// Replace all four flags at once.
    pub fn set_flags(&mut self, flags: Flags) {
        self.f = flags;
    }

    /// True if every flag in `mask` is set.
    pub fn flag(&self, mask: Flags) -> bool {
        self.f.contains(mask)
    }

    pub fn set_flag(&mut self, mask: Flags) {
        self.f.insert(mask);
    }

    pub fn clear_flag(&mut self, mask: Flags) {
        self.f.remove(mask);
    }

    pub fn assign_flag(&mut self, mask: Flags, value: bool) {
        self.f.set(mask, value);
    }
}

impl fmt::Debug for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X} [{:?}]",
            self.af(),
            self.bc(),
            self.de(),
            self.hl(),
            self.sp,
            self.pc,
            self.f
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_round_trip_through_8bit_registers() {
        let mut regs = Registers::new();
        for (pair, hi, lo) in [
            (Reg16::BC, Reg8::B, Reg8::C),
            (Reg16::DE, Reg8::D, Reg8::E),
            (Reg16::HL, Reg8::H, Reg8::L),
        ] {
            for x in [0x0000u16, 0x1234, 0x80FF, 0xFFFF, 0xBEEF] {
                regs.set16(pair, x);
                assert_eq!(regs.get16(pair), x);
                assert_eq!(regs.get8(hi), (x >> 8) as u8);
                assert_eq!(regs.get8(lo), x as u8);
            }
        }
    }

    #[test]
    fn writing_8bit_half_updates_pair_view() {
        let mut regs = Registers::new();
        regs.set_hl(0x1234);
        regs.l = 0xCD;
        assert_eq!(regs.hl(), 0x12CD);
        regs.set8(Reg8::H, 0xAB);
        assert_eq!(regs.hl(), 0xABCD);
    }

    #[test]
    fn af_masks_low_nibble_of_f() {
        let mut regs = Registers::new();
        for x in [0x12FFu16, 0x000F, 0xABCD, 0xFFF0] {
            regs.set_af(x);
            assert_eq!(regs.a, (x >> 8) as u8);
            assert_eq!(regs.f() & 0x0F, 0);
            assert_eq!(regs.f(), (x as u8) & 0xF0);
            assert_eq!(regs.af(), x & 0xFFF0);
        }
        regs.set8(Reg8::F, 0xFF);
        assert_eq!(regs.f(), 0xF0);
    }

    #[test]
    fn flags_combine_as_bitmask() {
        let mut regs = Registers::new();
        regs.set_flag(Flags::Z | Flags::C);
        assert!(regs.flag(Flags::Z));
        assert!(regs.flag(Flags::Z | Flags::C));
        assert!(!regs.flag(Flags::Z | Flags::N));
        regs.clear_flag(Flags::Z);
        assert_eq!(regs.f(), 0x10);
        regs.assign_flag(Flags::H | Flags::N, true);
        assert_eq!(regs.f(), 0x70);
        assert_eq!(format!("{:?}", regs.flags()), "-NHC");
    }

    #[test]
    fn post_boot_values() {
        let regs = Registers::post_boot();
        assert_eq!(regs.af(), 0x01B0);
        assert_eq!(regs.bc(), 0x0013);
        assert_eq!(regs.de(), 0x00D8);
        assert_eq!(regs.hl(), 0x014D);
        assert_eq!(regs.sp, 0xFFFE);
        assert_eq!(regs.pc, 0x0100);
    }

    #[test]
    fn register_field_decoding() {
        assert_eq!(Reg8::from_index(0), Some(Reg8::B));
        assert_eq!(Reg8::from_index(6), None);
        assert_eq!(Reg8::from_index(7), Some(Reg8::A));
        assert_eq!(Reg16::from_rp(3), Reg16::SP);
        assert_eq!(Reg16::from_rp_af(3), Reg16::AF);
    }
}
