use lr35902_core::cpu::lr35902::ILLEGAL_OPCODES;
use lr35902_core::cpu::{Cpu, CpuError, CpuStateTrait, Lr35902, Opcode};
mod common;
use common::TestBus;

fn run_instruction(cpu: &mut Lr35902, bus: &mut TestBus) -> u32 {
    cpu.step(bus).expect("instruction should execute")
}

// --- NOP / cycle counters ---

#[test]
fn test_nop() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x00, 0x00]);

    assert_eq!(run_instruction(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.pc, 1);
    assert_eq!(cpu.cycles(), 4);
    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.total_cycles(), 8);
}

#[test]
fn test_pc_wraps_at_top_of_memory() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    cpu.regs.pc = 0xFFFF;
    bus.memory[0xFFFF] = 0x00;

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0000);
}

// --- HALT / STOP ---

#[test]
fn test_halt_then_steps_are_noops() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x76, 0x3C]); // HALT; INC A

    assert_eq!(run_instruction(&mut cpu, &mut bus), 4);
    assert!(cpu.halted);
    assert!(cpu.is_sleeping());
    assert_eq!(cpu.regs.pc, 1);

    let before = cpu.total_cycles();
    for _ in 0..10 {
        assert_eq!(run_instruction(&mut cpu, &mut bus), 0);
    }
    assert_eq!(cpu.regs.pc, 1);
    assert_eq!(cpu.regs.a, 0);
    assert_eq!(cpu.total_cycles(), before);
}

#[test]
fn test_external_wake_resumes_execution() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x76, 0x3C]); // HALT; INC A

    run_instruction(&mut cpu, &mut bus);
    cpu.wake();
    assert_eq!(run_instruction(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.a, 1);
}

#[test]
fn test_pending_interrupt_wakes_halt_without_ime() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x76, 0x3C]); // HALT; INC A

    run_instruction(&mut cpu, &mut bus);
    assert!(cpu.halted);
    assert_eq!(run_instruction(&mut cpu, &mut bus), 0);

    bus.pending = 0x04; // Timer
    // Wake step plus INC A
    assert_eq!(run_instruction(&mut cpu, &mut bus), 8);
    assert!(!cpu.halted);
    assert_eq!(cpu.regs.a, 1);
    assert_eq!(cpu.regs.pc, 2);
}

#[test]
fn test_halt_bug_reads_next_byte_twice() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.pending = 0x01;
    bus.load(0, &[0x76, 0x3C, 0x00]); // HALT; INC A; NOP

    run_instruction(&mut cpu, &mut bus);
    assert!(!cpu.halted, "IME clear with a pending interrupt does not halt");
    assert_eq!(cpu.regs.pc, 1);

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 1);
    assert_eq!(cpu.regs.pc, 1, "PC not advanced by the first fetch");

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 2);
    assert_eq!(cpu.regs.pc, 2);
}

#[test]
fn test_halt_with_ime_set_halts() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    cpu.ime = true;
    bus.pending = 0x01;
    bus.load(0, &[0x76]); // HALT

    run_instruction(&mut cpu, &mut bus);
    assert!(cpu.halted);
}

#[test]
fn test_stop_skips_padding_and_halts() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x10, 0x00, 0x3C]); // STOP 0; INC A

    let cycles = run_instruction(&mut cpu, &mut bus);
    assert_eq!(cycles, 8);
    assert!(cpu.halted);
    assert_eq!(cpu.regs.pc, 2);
    assert_eq!(run_instruction(&mut cpu, &mut bus), 0);
}

// --- EI / DI ---

#[test]
fn test_ei_sets_ime_with_one_instruction_delay() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xFB, 0x00, 0x00]); // EI; NOP; NOP

    run_instruction(&mut cpu, &mut bus);
    assert!(cpu.ime);
    assert!(cpu.interrupts_enabled());
    assert!(!cpu.accepts_interrupts(), "not before the next instruction");

    run_instruction(&mut cpu, &mut bus);
    assert!(cpu.accepts_interrupts());
}

#[test]
fn test_di_clears_ime() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xFB, 0xF3]); // EI; DI

    run_instruction(&mut cpu, &mut bus);
    assert_eq!(run_instruction(&mut cpu, &mut bus), 4);
    assert!(!cpu.ime);
    assert!(!cpu.accepts_interrupts());
}

// --- Interrupt dispatch ---

#[test]
fn test_service_interrupt() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    cpu.regs.pc = 0x1234;
    cpu.regs.sp = 0xFFFE;
    cpu.ime = true;
    cpu.halted = true;

    let cycles = cpu.service_interrupt(&mut bus, 0x0050);
    assert_eq!(cycles, 20);
    assert_eq!(cpu.cycles(), 20);
    assert_eq!(cpu.regs.pc, 0x0050);
    assert_eq!(cpu.regs.sp, 0xFFFC);
    assert_eq!(bus.memory[0xFFFD], 0x12);
    assert_eq!(bus.memory[0xFFFC], 0x34);
    assert!(!cpu.ime);
    assert!(!cpu.halted);
}

// --- Illegal opcodes and fault latching ---

#[test]
fn test_illegal_opcodes_fail() {
    for op in ILLEGAL_OPCODES {
        let mut cpu = Lr35902::new();
        let mut bus = TestBus::new();
        cpu.regs.pc = 0x0200;
        bus.load(0x0200, &[op]);

        let err = cpu.step(&mut bus).unwrap_err();
        assert_eq!(err, CpuError::Illegal { opcode: op, pc: 0x0200 });
        assert_eq!(err.pc(), 0x0200);
    }
}

#[test]
fn test_fault_is_latched_until_reset() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0xDD, 0x3C]); // illegal; INC A

    let first = cpu.step(&mut bus).unwrap_err();
    let pc = cpu.regs.pc;
    let second = cpu.step(&mut bus).unwrap_err();
    assert_eq!(first, second);
    assert_eq!(cpu.regs.pc, pc);
    assert_eq!(cpu.regs.a, 0);
    assert_eq!(cpu.fault(), Some(&first));

    cpu.reset();
    assert!(cpu.fault().is_none());
    bus.memory[0] = 0x3C;
    assert_eq!(run_instruction(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.a, 1);
}

#[test]
fn test_every_legal_opcode_executes() {
    for op in 0..=255u8 {
        if ILLEGAL_OPCODES.contains(&op) {
            continue;
        }
        let mut cpu = Lr35902::new();
        let mut bus = TestBus::new();
        cpu.regs.sp = 0xFFFE;
        cpu.regs.pc = 0x0100;
        bus.load(0x0100, &[op, 0x00, 0x00]);

        let cycles = cpu
            .step(&mut bus)
            .unwrap_or_else(|e| panic!("opcode {op:02X}: {e}"));
        assert!(cycles >= 4 && cycles % 4 == 0, "opcode {op:02X}: {cycles}");
    }
}

#[test]
fn test_error_display_names_opcode() {
    let err = CpuError::Illegal { opcode: 0xE3, pc: 0x0150 };
    assert_eq!(err.to_string(), "illegal opcode 0xE3 at 0x0150");

    let err = CpuError::Unimplemented {
        opcode: Opcode::Prefixed(0x7C),
        pc: 0x0200,
    };
    assert_eq!(err.to_string(), "unimplemented opcode 0xCB 0x7C (BIT 7,H) at 0x0200");
}

// --- Reset / post-boot state / snapshot ---

#[test]
fn test_reset_and_skip_boot_rom() {
    let mut cpu = Lr35902::new();
    cpu.regs.a = 0x55;
    cpu.ime = true;
    cpu.reset();
    assert_eq!(cpu.regs.pc, 0x0000);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(!cpu.ime);

    cpu.skip_boot_rom();
    let s = cpu.snapshot();
    assert_eq!((s.a, s.f), (0x01, 0xB0));
    assert_eq!((s.b, s.c), (0x00, 0x13));
    assert_eq!((s.d, s.e), (0x00, 0xD8));
    assert_eq!((s.h, s.l), (0x01, 0x4D));
    assert_eq!(s.sp, 0xFFFE);
    assert_eq!(s.pc, 0x0100);
    assert!(!s.ime);
    assert!(!s.halted);
}

#[test]
fn test_snapshot_tracks_halt() {
    let mut cpu = Lr35902::new();
    let mut bus = TestBus::new();
    bus.load(0, &[0x76]);

    run_instruction(&mut cpu, &mut bus);
    assert!(cpu.snapshot().halted);
}
