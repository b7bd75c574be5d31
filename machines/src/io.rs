//! Memory-mapped I/O for the flat test system: interrupt latches, the
//! DIV/TIMA timer and the serial port that conformance programs print to.

use log::{debug, trace};
use lr35902_core::core::{Bus, bus::InterruptState};

pub const SB_ADDR: u16 = 0xFF01;
pub const SC_ADDR: u16 = 0xFF02;
pub const DIV_ADDR: u16 = 0xFF04;
pub const TIMA_ADDR: u16 = 0xFF05;
pub const TMA_ADDR: u16 = 0xFF06;
pub const TAC_ADDR: u16 = 0xFF07;
pub const IF_ADDR: u16 = 0xFF0F;
pub const LY_ADDR: u16 = 0xFF44;
pub const IE_ADDR: u16 = 0xFFFF;

pub const INTERRUPT_VBLANK: u8 = 0x01;
pub const INTERRUPT_LCD: u8 = 0x02;
pub const INTERRUPT_TIMER: u8 = 0x04;
pub const INTERRUPT_SERIAL: u8 = 0x08;
pub const INTERRUPT_JOYPAD: u8 = 0x10;

/// LY reads as the first V-Blank line so programs that wait for V-Blank
/// before touching VRAM do not spin forever without a PPU.
const LY_VBLANK: u8 = 0x90;

/// Receiver for bytes shifted out of the serial port.
pub trait SerialSink {
    fn transfer(&mut self, byte: u8);
}

impl SerialSink for Vec<u8> {
    fn transfer(&mut self, byte: u8) {
        self.push(byte);
    }
}

/// DIV/TIMA timer. TIMA counts falling edges of the DIV bit selected by TAC
/// and reloads from TMA one M-cycle after it overflows.
#[derive(Debug, Clone, Default)]
pub struct Timer {
    divider: u16,
    tima: u8,
    tma: u8,
    tac: u8,
    reload_delay: Option<u8>,
}

impl Timer {
    pub fn div(&self) -> u8 {
        (self.divider >> 8) as u8
    }

    fn tac_read(&self) -> u8 {
        0xF8 | (self.tac & 0x07)
    }

    fn write_div(&mut self) {
        let before = self.input();
        self.divider = 0;
        if before && !self.input() {
            self.increment_tima();
        }
    }

    fn write_tima(&mut self, value: u8) {
        self.tima = value;
        self.reload_delay = None;
    }

    fn write_tac(&mut self, value: u8) {
        let before = self.input();
        self.tac = value & 0x07;
        if before && !self.input() {
            self.increment_tima();
        }
    }

    /// Advance by `cycles` clocks. Returns true if TIMA reloaded, which
    /// requests the timer interrupt.
    pub fn tick(&mut self, cycles: u32) -> bool {
        let mut fired = false;
        for _ in 0..cycles {
            let before = self.input();
            self.divider = self.divider.wrapping_add(1);
            if before && !self.input() {
                self.increment_tima();
            }
            fired |= self.reload();
        }
        fired
    }

    fn reload(&mut self) -> bool {
        match self.reload_delay {
            Some(0) => {
                self.reload_delay = None;
                if self.tima == 0 {
                    self.tima = self.tma;
                    return true;
                }
                false
            }
            Some(n) => {
                self.reload_delay = Some(n - 1);
                false
            }
            None => false,
        }
    }

    fn increment_tima(&mut self) {
        if self.tima == 0xFF {
            self.tima = 0;
            self.reload_delay = Some(3);
        } else {
            self.tima += 1;
        }
    }

    fn input(&self) -> bool {
        let bit = match self.tac & 0x03 {
            0 => 9,
            1 => 3,
            2 => 5,
            _ => 7,
        };
        self.tac & 0x04 != 0 && self.divider & (1 << bit) != 0
    }
}

/// Flat 64 KiB address space with the handful of I/O registers the CPU's
/// conformance programs touch. Everything else is plain RAM.
pub struct SystemBus {
    memory: Box<[u8; 0x10000]>,
    timer: Timer,
    interrupt_enable: u8,
    interrupt_flags: u8,
    serial: Vec<u8>,
    sink: Option<Box<dyn SerialSink>>,
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemBus {
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            timer: Timer::default(),
            interrupt_enable: 0,
            interrupt_flags: 0,
            serial: Vec::new(),
            sink: None,
        }
    }

    /// Copy `data` into memory at `addr`. Bytes past 0xFFFF are dropped.
    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        let len = data.len().min(self.memory.len() - start);
        self.memory[start..start + len].copy_from_slice(&data[..len]);
    }

    /// Forward every serial byte to `sink` as it is sent, in addition to
    /// the internal capture.
    pub fn set_serial_sink(&mut self, sink: Box<dyn SerialSink>) {
        self.sink = Some(sink);
    }

    /// Everything sent over serial so far.
    pub fn serial_output(&self) -> &[u8] {
        &self.serial
    }

    pub fn request_interrupt(&mut self, mask: u8) {
        self.interrupt_flags |= mask & 0x1F;
    }

    /// Clear the IF bit of `line` (0 = V-Blank .. 4 = Joypad) as the CPU
    /// enters its handler.
    pub fn acknowledge(&mut self, line: u8) {
        self.interrupt_flags &= !(1 << line);
    }

    /// Run the peripherals for `cycles` clocks.
    pub fn tick(&mut self, cycles: u32) {
        if self.timer.tick(cycles) {
            debug!("timer overflow, TIMA reloaded with 0x{:02X}", self.timer.tma);
            self.request_interrupt(INTERRUPT_TIMER);
        }
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    fn serial_control(&mut self, value: u8) {
        self.memory[SC_ADDR as usize] = value;
        // Transfer start with internal clock completes at once.
        if value & 0x81 == 0x81 {
            let byte = self.memory[SB_ADDR as usize];
            trace!("serial out 0x{byte:02X}");
            self.serial.push(byte);
            if let Some(sink) = self.sink.as_mut() {
                sink.transfer(byte);
            }
            self.memory[SC_ADDR as usize] = value & !0x80;
            self.request_interrupt(INTERRUPT_SERIAL);
        }
    }
}

impl Bus for SystemBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            DIV_ADDR => self.timer.div(),
            TIMA_ADDR => self.timer.tima,
            TMA_ADDR => self.timer.tma,
            TAC_ADDR => self.timer.tac_read(),
            IF_ADDR => 0xE0 | self.interrupt_flags,
            LY_ADDR => LY_VBLANK,
            IE_ADDR => self.interrupt_enable,
            _ => self.memory[addr as usize],
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            SC_ADDR => self.serial_control(data),
            DIV_ADDR => self.timer.write_div(),
            TIMA_ADDR => self.timer.write_tima(data),
            TMA_ADDR => self.timer.tma = data,
            TAC_ADDR => self.timer.write_tac(data),
            IF_ADDR => self.interrupt_flags = data & 0x1F,
            IE_ADDR => self.interrupt_enable = data,
            _ => self.memory[addr as usize] = data,
        }
    }

    fn check_interrupts(&self) -> InterruptState {
        InterruptState::new(self.interrupt_enable & self.interrupt_flags)
    }
}
