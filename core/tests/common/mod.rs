use lr35902_core::core::{Bus, bus::InterruptState};

/// Minimal bus for testing: flat 64KB read/write memory, no peripherals.
/// `pending` stands in for an interrupt controller's IE & IF.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    pub pending: u8,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            pending: 0,
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn check_interrupts(&self) -> InterruptState {
        InterruptState::new(self.pending)
    }
}
