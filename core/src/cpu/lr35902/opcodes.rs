//! Opcode metadata: mnemonics and encoded lengths for both tables.

#[rustfmt::skip]
static MNEMONICS: [&str; 256] = [
    // 0x00
    "NOP", "LD BC,nn", "LD (BC),A", "INC BC", "INC B", "DEC B", "LD B,n", "RLCA",
    "LD (nn),SP", "ADD HL,BC", "LD A,(BC)", "DEC BC", "INC C", "DEC C", "LD C,n", "RRCA",
    // 0x10
    "STOP", "LD DE,nn", "LD (DE),A", "INC DE", "INC D", "DEC D", "LD D,n", "RLA",
    "JR e", "ADD HL,DE", "LD A,(DE)", "DEC DE", "INC E", "DEC E", "LD E,n", "RRA",
    // 0x20
    "JR NZ,e", "LD HL,nn", "LD (HL+),A", "INC HL", "INC H", "DEC H", "LD H,n", "DAA",
    "JR Z,e", "ADD HL,HL", "LD A,(HL+)", "DEC HL", "INC L", "DEC L", "LD L,n", "CPL",
    // 0x30
    "JR NC,e", "LD SP,nn", "LD (HL-),A", "INC SP", "INC (HL)", "DEC (HL)", "LD (HL),n", "SCF",
    "JR C,e", "ADD HL,SP", "LD A,(HL-)", "DEC SP", "INC A", "DEC A", "LD A,n", "CCF",
    // 0x40
    "LD B,B", "LD B,C", "LD B,D", "LD B,E", "LD B,H", "LD B,L", "LD B,(HL)", "LD B,A",
    "LD C,B", "LD C,C", "LD C,D", "LD C,E", "LD C,H", "LD C,L", "LD C,(HL)", "LD C,A",
    // 0x50
    "LD D,B", "LD D,C", "LD D,D", "LD D,E", "LD D,H", "LD D,L", "LD D,(HL)", "LD D,A",
    "LD E,B", "LD E,C", "LD E,D", "LD E,E", "LD E,H", "LD E,L", "LD E,(HL)", "LD E,A",
    // 0x60
    "LD H,B", "LD H,C", "LD H,D", "LD H,E", "LD H,H", "LD H,L", "LD H,(HL)", "LD H,A",
    "LD L,B", "LD L,C", "LD L,D", "LD L,E", "LD L,H", "LD L,L", "LD L,(HL)", "LD L,A",
    // 0x70
    "LD (HL),B", "LD (HL),C", "LD (HL),D", "LD (HL),E", "LD (HL),H", "LD (HL),L", "HALT", "LD (HL),A",
    "LD A,B", "LD A,C", "LD A,D", "LD A,E", "LD A,H", "LD A,L", "LD A,(HL)", "LD A,A",
    // 0x80
    "ADD A,B", "ADD A,C", "ADD A,D", "ADD A,E", "ADD A,H", "ADD A,L", "ADD A,(HL)", "ADD A,A",
    "ADC A,B", "ADC A,C", "ADC A,D", "ADC A,E", "ADC A,H", "ADC A,L", "ADC A,(HL)", "ADC A,A",
    // 0x90
    "SUB B", "SUB C", "SUB D", "SUB E", "SUB H", "SUB L", "SUB (HL)", "SUB A",
    "SBC A,B", "SBC A,C", "SBC A,D", "SBC A,E", "SBC A,H", "SBC A,L", "SBC A,(HL)", "SBC A,A",
    // 0xA0
    "AND B", "AND C", "AND D", "AND E", "AND H", "AND L", "AND (HL)", "AND A",
    "XOR B", "XOR C", "XOR D", "XOR E", "XOR H", "XOR L", "XOR (HL)", "XOR A",
    // 0xB0
    "OR B", "OR C", "OR D", "OR E", "OR H", "OR L", "OR (HL)", "OR A",
    "CP B", "CP C", "CP D", "CP E", "CP H", "CP L", "CP (HL)", "CP A",
    // 0xC0
    "RET NZ", "POP BC", "JP NZ,nn", "JP nn", "CALL NZ,nn", "PUSH BC", "ADD A,n", "RST 00H",
    "RET Z", "RET", "JP Z,nn", "PREFIX CB", "CALL Z,nn", "CALL nn", "ADC A,n", "RST 08H",
    // 0xD0
    "RET NC", "POP DE", "JP NC,nn", "ILLEGAL", "CALL NC,nn", "PUSH DE", "SUB n", "RST 10H",
    "RET C", "RETI", "JP C,nn", "ILLEGAL", "CALL C,nn", "ILLEGAL", "SBC A,n", "RST 18H",
    // 0xE0
    "LDH (n),A", "POP HL", "LD (C),A", "ILLEGAL", "ILLEGAL", "PUSH HL", "AND n", "RST 20H",
    "ADD SP,e", "JP HL", "LD (nn),A", "ILLEGAL", "ILLEGAL", "ILLEGAL", "XOR n", "RST 28H",
    // 0xF0
    "LDH A,(n)", "POP AF", "LD A,(C)", "DI", "ILLEGAL", "PUSH AF", "OR n", "RST 30H",
    "LD HL,SP+e", "LD SP,HL", "LD A,(nn)", "EI", "ILLEGAL", "ILLEGAL", "CP n", "RST 38H",
];

const CB_OPS: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];
const CB_REGS: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];

/// Mnemonic of a primary-table opcode, with operand placeholders
/// (`n` = byte, `nn` = word, `e` = signed byte).
pub fn mnemonic(opcode: u8) -> &'static str {
    MNEMONICS[opcode as usize]
}

/// Mnemonic of the instruction following a 0xCB prefix.
pub fn cb_mnemonic(opcode: u8) -> String {
    let reg = CB_REGS[(opcode & 0x07) as usize];
    let bit = (opcode >> 3) & 0x07;
    match opcode >> 6 {
        0 => format!("{} {reg}", CB_OPS[bit as usize]),
        1 => format!("BIT {bit},{reg}"),
        2 => format!("RES {bit},{reg}"),
        _ => format!("SET {bit},{reg}"),
    }
}

/// Encoded length in bytes of the instruction starting with `opcode`,
/// counting the prefix for 0xCB. Illegal opcodes report 1.
pub const fn instruction_len(opcode: u8) -> u8 {
    match opcode {
        0xCB => 2,
        // Immediate byte
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => 2,
        0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => 2,
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => 2,
        0xE0 | 0xE8 | 0xF0 | 0xF8 => 2,
        // Immediate word
        0x01 | 0x11 | 0x21 | 0x31 | 0x08 => 3,
        0xC2 | 0xC3 | 0xCA | 0xD2 | 0xDA => 3,
        0xC4 | 0xCC | 0xCD | 0xD4 | 0xDC => 3,
        0xEA | 0xFA => 3,
        _ => 1,
    }
}
