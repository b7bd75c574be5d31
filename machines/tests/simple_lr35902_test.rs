use lr35902_core::core::Bus;
use lr35902_core::cpu::CpuError;
use lr35902_machines::{RunStop, SerialSink, SimpleLr35902System};

use std::cell::RefCell;
use std::rc::Rc;

const BUDGET: u64 = 100_000;

// Prints the NUL-terminated string at HL over serial, then returns.
const PRINT: [u8; 12] = [
    0x2A, // 0300: LD A,(HL+)
    0xB7, // 0301: OR A
    0xC8, // 0302: RET Z
    0xE0, 0x01, // 0303: LDH (SB),A
    0x3E, 0x81, // 0305: LD A,0x81
    0xE0, 0x02, // 0307: LDH (SC),A
    0xC3, 0x00, 0x03, // 0309: JP 0x0300
];

fn system_with(main: &[u8]) -> SimpleLr35902System {
    let mut sys = SimpleLr35902System::new();
    sys.cpu.skip_boot_rom();
    sys.load_program(0x0100, main);
    sys.load_program(0x0300, &PRINT);
    sys.load_program(0x0400, b"Passed\0");
    sys.load_program(0x0410, b"Failed\0");
    sys
}

fn run_to_verdict(sys: &mut SimpleLr35902System) -> RunStop {
    sys.run(BUDGET, |s| {
        let out = s.serial_text();
        out.contains("Passed") || out.contains("Failed")
    })
    .expect("program should not fault")
}

// Self-checking program: DAA and a PUSH/POP round trip.
fn self_check_program() -> Vec<u8> {
    vec![
        0x31, 0xFE, 0xFF, // 0100: LD SP,0xFFFE
        0x3E, 0x45, // 0103: LD A,0x45
        0xC6, 0x38, // 0105: ADD A,0x38
        0x27, // 0107: DAA
        0xFE, 0x83, // 0108: CP 0x83
        0xC2, 0x20, 0x01, // 010A: JP NZ,fail
        0x01, 0xEF, 0xBE, // 010D: LD BC,0xBEEF
        0xC5, // 0110: PUSH BC
        0xD1, // 0111: POP DE
        0x7B, // 0112: LD A,E
        0xFE, 0xEF, // 0113: CP 0xEF
        0xC2, 0x20, 0x01, // 0115: JP NZ,fail
        0x21, 0x00, 0x04, // 0118: LD HL,"Passed"
        0xCD, 0x00, 0x03, // 011B: CALL print
        0x18, 0xFE, // 011E: JR 011E
        0x21, 0x10, 0x04, // 0120: fail: LD HL,"Failed"
        0xCD, 0x00, 0x03, // 0123: CALL print
        0x18, 0xFE, // 0126: JR 0126
    ]
}

#[test]
fn test_self_check_prints_passed() {
    let mut sys = system_with(&self_check_program());

    assert_eq!(run_to_verdict(&mut sys), RunStop::Condition);
    assert_eq!(sys.serial_text(), "Passed");
}

#[test]
fn test_failing_check_prints_failed() {
    let mut program = self_check_program();
    program[0x09] = 0x84; // CP 0x84 no longer matches the DAA result
    let mut sys = system_with(&program);

    assert_eq!(run_to_verdict(&mut sys), RunStop::Condition);
    assert_eq!(sys.serial_text(), "Failed");
}

#[test]
fn test_timer_interrupt_wakes_halt() {
    let main = [
        0x31, 0xFE, 0xFF, // 0100: LD SP,0xFFFE
        0x3E, 0x04, // 0103: LD A,0x04
        0xE0, 0xFF, // 0105: LDH (IE),A
        0x3E, 0xF0, // 0107: LD A,0xF0
        0xE0, 0x05, // 0109: LDH (TIMA),A
        0x3E, 0x05, // 010B: LD A,0x05
        0xE0, 0x07, // 010D: LDH (TAC),A
        0xAF, // 010F: XOR A
        0xE0, 0x0F, // 0110: LDH (IF),A
        0xFB, // 0112: EI
        0x76, // 0113: HALT
        0x00, // 0114: NOP
        0x21, 0x00, 0x04, // 0115: LD HL,"Passed"
        0xCD, 0x00, 0x03, // 0118: CALL print
        0x18, 0xFE, // 011B: JR 011B
    ];
    let isr = [
        0x3E, 0x01, // LD A,1
        0xEA, 0x00, 0xC0, // LD (0xC000),A
        0xD9, // RETI
    ];
    let mut sys = system_with(&main);
    sys.load_program(0x0050, &isr);

    assert_eq!(run_to_verdict(&mut sys), RunStop::Condition);
    assert_eq!(sys.serial_text(), "Passed");
    assert_eq!(sys.bus.read(0xC000), 0x01, "timer handler ran");
    assert!(sys.get_cpu_state().ime, "RETI re-enables interrupts");
    assert!(sys.clock() > 256, "HALT waited for the timer");
}

#[test]
fn test_halt_without_interrupts_runs_out_budget() {
    let mut sys = system_with(&[0x76]); // HALT

    let stop = sys.run(1_000, |_| false).expect("no fault");
    assert_eq!(stop, RunStop::Budget);
    assert!(sys.cpu.halted);
    assert_eq!(sys.cpu.regs.pc, 0x0101);
    assert!(sys.clock() >= 1_000);
}

#[test]
fn test_disabled_interrupt_is_not_dispatched() {
    let main = [
        0x3E, 0x08, // 0100: LD A,0x08
        0xE0, 0xFF, // 0102: LDH (IE),A
        0x3E, 0x41, // 0104: LD A,'A'
        0xE0, 0x01, // 0106: LDH (SB),A
        0x3E, 0x81, // 0108: LD A,0x81
        0xE0, 0x02, // 010A: LDH (SC),A
        0x18, 0xFE, // 010C: JR 010C
    ];
    let mut sys = system_with(&main);

    sys.run(1_000, |_| false).expect("no fault");
    assert_eq!(sys.serial_text(), "A");
    assert_eq!(sys.cpu.regs.pc, 0x010C, "IME clear: serial interrupt stays pending");
    assert!(sys.bus.check_interrupts().any());
}

#[test]
fn test_illegal_opcode_stops_run() {
    let mut sys = system_with(&[0x00, 0xFD]); // NOP; illegal

    let err = sys.run(BUDGET, |_| false).unwrap_err();
    assert_eq!(err, CpuError::Illegal { opcode: 0xFD, pc: 0x0101 });
    assert_eq!(sys.step().unwrap_err(), err, "fault stays latched");
}

struct SharedSink(Rc<RefCell<Vec<u8>>>);

impl SerialSink for SharedSink {
    fn transfer(&mut self, byte: u8) {
        self.0.borrow_mut().push(byte);
    }
}

#[test]
fn test_serial_sink_receives_bytes_as_sent() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut sys = system_with(&self_check_program());
    sys.bus.set_serial_sink(Box::new(SharedSink(Rc::clone(&seen))));

    run_to_verdict(&mut sys);
    assert_eq!(seen.borrow().as_slice(), b"Passed");
}
