use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use lr35902_core::core::Bus;
use serde::{Deserialize, Serialize};

// --- TracingBus: flat 64KB memory with access-by-access recording ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusOp {
    Read,
    Write,
}

#[derive(Clone, Debug)]
pub struct BusCycle {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct TracingBus {
    pub memory: [u8; 0x10000],
    pub cycles: Vec<BusCycle>,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            cycles: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_cycles(&mut self) {
        self.cycles.clear();
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    fn read(&mut self, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.cycles.push(BusCycle {
            addr,
            data,
            op: BusOp::Write,
        });
    }
}

// --- SM83 JSON test vector types (SingleStepTests/sm83 format) ---

/// One M-cycle: `[addr, data, "r-m"/"-wm"]`, or `null` for an internal cycle.
pub type Sm83Cycle = Option<(u16, u8, String)>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sm83TestCase {
    pub name: String,
    pub initial: Sm83CpuState,
    #[serde(rename = "final")]
    pub final_state: Sm83CpuState,
    pub cycles: Vec<Sm83Cycle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sm83CpuState {
    pub pc: u16,
    pub sp: u16,
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub f: u8,
    pub h: u8,
    pub l: u8,
    #[serde(default)]
    pub ime: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ie: Option<u8>,
    pub ram: Vec<(u16, u8)>,
}

impl BusOp {
    /// Pin-state label used in the `cycles` array.
    pub fn label(self) -> &'static str {
        match self {
            BusOp::Read => "r-m",
            BusOp::Write => "-wm",
        }
    }
}

// --- Loading ---

#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {}", e),
            LoadError::Json(e) => write!(f, "malformed test vectors: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Json(e)
    }
}

/// True for files [`load_test_file`] understands: `.json` and `.json.gz`.
pub fn is_test_file(path: &Path) -> bool {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    name.ends_with(".json") || name.ends_with(".json.gz")
}

/// Read a vector file, decompressing it first when the name ends in `.gz`.
pub fn load_test_file(path: &Path) -> Result<Vec<Sm83TestCase>, LoadError> {
    let file = BufReader::new(File::open(path)?);
    let mut json = String::new();
    if path.extension().is_some_and(|ext| ext == "gz") {
        GzDecoder::new(file).read_to_string(&mut json)?;
    } else {
        let mut file = file;
        file.read_to_string(&mut json)?;
    }
    Ok(serde_json::from_str(&json)?)
}
