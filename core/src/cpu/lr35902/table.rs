//! Opcode dispatch tables.
//!
//! Both tables are built at compile time from the opcode bit fields
//! (`xx yyy zzz`), one handler per byte. Slots nothing claims fall back to
//! the unimplemented handler so a gap shows up as an error, never as a NOP.

use crate::core::Bus;
use crate::cpu::lr35902::{Lr35902, OpResult};

pub(crate) type Handler = fn(&mut Lr35902, &mut dyn Bus, u8) -> OpResult;

pub(crate) static PRIMARY: [Handler; 256] = build_primary();
pub(crate) static SECONDARY: [Handler; 256] = build_secondary();

/// Opcodes the hardware leaves undefined.
pub const ILLEGAL_OPCODES: [u8; 11] = [
    0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD,
];

const fn is_illegal(op: u8) -> bool {
    let mut i = 0;
    while i < ILLEGAL_OPCODES.len() {
        if ILLEGAL_OPCODES[i] == op {
            return true;
        }
        i += 1;
    }
    false
}

const fn primary(op: u8) -> Handler {
    match op {
        _ if is_illegal(op) => Lr35902::op_illegal,

        // x = 0
        0x00 => Lr35902::op_nop,
        0x08 => Lr35902::op_ld_nn_sp,
        0x10 => Lr35902::op_stop,
        0x18 => Lr35902::op_jr,
        0x20 | 0x28 | 0x30 | 0x38 => Lr35902::op_jr_cc,
        _ if op & 0xCF == 0x01 => Lr35902::op_ld_rr_nn,
        _ if op & 0xCF == 0x09 => Lr35902::op_add_hl_rr,
        _ if op & 0xCF == 0x02 => Lr35902::op_ld_ind_a,
        _ if op & 0xCF == 0x0A => Lr35902::op_ld_a_ind,
        _ if op & 0xC7 == 0x03 => Lr35902::op_inc_dec_rr,
        _ if op & 0xC6 == 0x04 => Lr35902::op_inc_dec_r,
        _ if op & 0xC7 == 0x06 => Lr35902::op_ld_r_n,
        0x07 | 0x0F | 0x17 | 0x1F => Lr35902::op_rotate_a,
        0x27 => Lr35902::op_daa,
        0x2F => Lr35902::op_cpl,
        0x37 => Lr35902::op_scf,
        0x3F => Lr35902::op_ccf,

        // x = 1
        0x76 => Lr35902::op_halt,
        0x40..=0x7F => Lr35902::op_ld_r_r,

        // x = 2
        0x80..=0xBF => Lr35902::op_alu_r,

        // x = 3
        0xC0 | 0xC8 | 0xD0 | 0xD8 => Lr35902::op_ret_cc,
        0xE0 => Lr35902::op_ldh_n_a,
        0xE8 => Lr35902::op_add_sp_e,
        0xF0 => Lr35902::op_ldh_a_n,
        0xF8 => Lr35902::op_ld_hl_sp_e,
        _ if op & 0xCF == 0xC1 => Lr35902::op_pop,
        0xC9 => Lr35902::op_ret,
        0xD9 => Lr35902::op_reti,
        0xE9 => Lr35902::op_jp_hl,
        0xF9 => Lr35902::op_ld_sp_hl,
        0xC2 | 0xCA | 0xD2 | 0xDA => Lr35902::op_jp_cc,
        0xE2 => Lr35902::op_ld_c_a,
        0xEA => Lr35902::op_ld_nn_a,
        0xF2 => Lr35902::op_ld_a_c,
        0xFA => Lr35902::op_ld_a_nn,
        0xC3 => Lr35902::op_jp,
        0xCB => Lr35902::op_prefix_cb,
        0xF3 => Lr35902::op_di,
        0xFB => Lr35902::op_ei,
        0xC4 | 0xCC | 0xD4 | 0xDC => Lr35902::op_call_cc,
        _ if op & 0xCF == 0xC5 => Lr35902::op_push,
        0xCD => Lr35902::op_call,
        _ if op & 0xC7 == 0xC6 => Lr35902::op_alu_n,
        _ if op & 0xC7 == 0xC7 => Lr35902::op_rst,

        _ => Lr35902::op_unimplemented,
    }
}

const fn secondary(op: u8) -> Handler {
    match op >> 6 {
        0 => Lr35902::op_cb_shift,
        1 => Lr35902::op_cb_bit,
        2 => Lr35902::op_cb_res,
        3 => Lr35902::op_cb_set,
        _ => Lr35902::op_cb_unimplemented,
    }
}

const fn build_primary() -> [Handler; 256] {
    let mut table: [Handler; 256] = [Lr35902::op_unimplemented as Handler; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = primary(i as u8);
        i += 1;
    }
    table
}

const fn build_secondary() -> [Handler; 256] {
    let mut table: [Handler; 256] = [Lr35902::op_cb_unimplemented as Handler; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = secondary(i as u8);
        i += 1;
    }
    table
}
