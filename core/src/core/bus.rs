/// Byte-addressable 16-bit memory interface driven by the CPU.
///
/// The CPU issues only `read` and `write` and charges 4 cycles per call. It
/// has no knowledge of what backs a given address (ROM, RAM, I/O registers or
/// open bus), so every address in 0x0000..=0xFFFF must be accepted.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Interrupts that are both requested and enabled, as seen by whatever
    /// interrupt controller backs this bus. Buses without a controller keep
    /// the default, which reports nothing pending.
    ///
    /// Consulted by HALT and by a halted step deciding whether to wake; the
    /// CPU never acknowledges interrupts itself.
    fn check_interrupts(&self) -> InterruptState {
        InterruptState::default()
    }
}

/// Snapshot of the interrupt lines an external controller reports to the CPU.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptState {
    /// IE & IF, bit 0 = V-Blank .. bit 4 = Joypad.
    pub pending: u8,
}

impl InterruptState {
    pub fn new(pending: u8) -> Self {
        Self {
            pending: pending & 0x1F,
        }
    }

    pub fn any(&self) -> bool {
        self.pending & 0x1F != 0
    }

    /// Highest-priority pending line (lowest bit number), if any.
    pub fn highest(&self) -> Option<u8> {
        if self.any() {
            Some((self.pending & 0x1F).trailing_zeros() as u8)
        } else {
            None
        }
    }
}
