pub mod io;
pub mod simple_lr35902;

pub use io::{SerialSink, SystemBus, Timer};
pub use simple_lr35902::{RunStop, SimpleLr35902System};
