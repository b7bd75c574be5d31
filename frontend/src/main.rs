use clap::Parser;
use log::{info, warn};
use lr35902_machines::{RunStop, SerialSink, SimpleLr35902System};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod config;

use config::{Config, RunnerError};

#[derive(Parser, Debug)]
#[command(
    name = "lr35902",
    about = "Run an LR35902 test program headless and report its serial verdict."
)]
struct Args {
    /// Program image to load (raw bytes, e.g. a test ROM).
    #[arg(value_name = "PROGRAM")]
    program: PathBuf,

    /// Config file (defaults to <config dir>/lr35902/runner.toml).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Give up after this many clock cycles.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Address the image is loaded at (hex with 0x or $, or decimal).
    #[arg(long, value_parser = config::parse_address)]
    load_address: Option<u16>,

    /// Start at 0x0100 with post-boot registers instead of at 0x0000.
    #[arg(long)]
    skip_boot_rom: Option<bool>,

    /// Serial text that means the program passed.
    #[arg(long)]
    pass_marker: Option<String>,

    /// Serial text that means the program failed.
    #[arg(long)]
    fail_marker: Option<String>,

    /// Log filter, same syntax as RUST_LOG (e.g. "debug" or "lr35902_core=trace").
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(self, mut config: Config) -> (PathBuf, Config) {
        if let Some(v) = self.max_cycles {
            config.max_cycles = v;
        }
        if let Some(v) = self.load_address {
            config.load_address = v;
        }
        if let Some(v) = self.skip_boot_rom {
            config.skip_boot_rom = v;
        }
        if let Some(v) = self.pass_marker {
            config.pass_marker = v;
        }
        if let Some(v) = self.fail_marker {
            config.fail_marker = v;
        }
        if self.log_level.is_some() {
            config.log_level = self.log_level;
        }
        (self.program, config)
    }
}

/// How a run ended, and the process status it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Passed,
    Failed,
    TimedOut,
    Faulted,
}

impl Verdict {
    fn exit_code(self) -> u8 {
        match self {
            Verdict::Passed => 0,
            Verdict::Failed => 1,
            Verdict::TimedOut | Verdict::Faulted => 2,
        }
    }
}

/// Echo serial bytes to stdout as the program sends them.
struct StdoutSink;

impl SerialSink for StdoutSink {
    fn transfer(&mut self, byte: u8) {
        let mut out = std::io::stdout().lock();
        // A closed stdout must not stop the run; the verdict still comes
        // from the captured copy.
        let _ = out.write_all(&[byte]).and_then(|()| out.flush());
    }
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    let needle = needle.as_bytes();
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

fn load_image(path: &Path, config: &Config) -> Result<Vec<u8>, RunnerError> {
    let image = std::fs::read(path).map_err(|source| RunnerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let room = 0x10000 - config.load_address as usize;
    if image.is_empty() {
        return Err(RunnerError::BadImage(format!("{} is empty", path.display())));
    }
    if image.len() > room {
        return Err(RunnerError::BadImage(format!(
            "{} bytes do not fit at 0x{:04X}",
            image.len(),
            config.load_address
        )));
    }
    Ok(image)
}

fn run(program: &Path, config: &Config) -> Result<Verdict, RunnerError> {
    let image = load_image(program, config)?;

    let mut sys = SimpleLr35902System::new();
    if config.skip_boot_rom {
        sys.cpu.skip_boot_rom();
    }
    sys.load_program(config.load_address, &image);
    sys.bus.set_serial_sink(Box::new(StdoutSink));
    info!(
        "loaded {} bytes at 0x{:04X}, starting at PC 0x{:04X}",
        image.len(),
        config.load_address,
        sys.cpu.regs.pc
    );

    let mut seen = 0;
    let result = sys.run(config.max_cycles, |s| {
        let out = s.bus.serial_output();
        if out.len() == seen {
            return false;
        }
        seen = out.len();
        contains(out, &config.pass_marker) || contains(out, &config.fail_marker)
    });
    println!();

    let verdict = match result {
        Ok(RunStop::Condition) if contains(sys.bus.serial_output(), &config.fail_marker) => {
            Verdict::Failed
        }
        Ok(RunStop::Condition) => Verdict::Passed,
        Ok(RunStop::Budget) => {
            warn!("no verdict after {} cycles", config.max_cycles);
            Verdict::TimedOut
        }
        Err(e) => {
            eprintln!("CPU fault: {e}");
            Verdict::Faulted
        }
    };
    info!(
        "{verdict:?} after {} clocks, {} spent executing",
        sys.clock(),
        sys.cpu.total_cycles()
    );
    Ok(verdict)
}

fn init_logging(filter: Option<&str>) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(3);
        }
    };
    let (program, config) = args.apply(config);
    init_logging(config.log_level.as_deref());

    match run(&program, &config) {
        Ok(verdict) => ExitCode::from(verdict.exit_code()),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(3)
        }
    }
}
