pub mod bus;

pub use bus::{Bus, InterruptState};
