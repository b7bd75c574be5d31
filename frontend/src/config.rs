//! Runner settings: an optional TOML file under the user's config directory,
//! overridden field by field from the command line.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors raised before the CPU gets to run.
#[derive(Debug)]
pub enum RunnerError {
    /// Program image or config file could not be read.
    Io { path: PathBuf, source: std::io::Error },

    /// Config file is not valid TOML for [`Config`].
    Toml(toml::de::Error),

    /// Program image is empty or does not fit above the load address.
    BadImage(String),
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Toml(e) => write!(f, "invalid config: {e}"),
            Self::BadImage(msg) => write!(f, "bad program image: {msg}"),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Toml(e) => Some(e),
            Self::BadImage(_) => None,
        }
    }
}

impl From<toml::de::Error> for RunnerError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

/// Runner settings after file and command line are merged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub max_cycles: u64,
    pub load_address: u16,
    pub skip_boot_rom: bool,
    pub pass_marker: String,
    pub fail_marker: String,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // About a minute of emulated time at 4.19 MHz.
            max_cycles: 250_000_000,
            load_address: 0x0000,
            skip_boot_rom: true,
            pass_marker: "Passed".to_string(),
            fail_marker: "Failed".to_string(),
            log_level: None,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, RunnerError> {
        Ok(toml::from_str(text)?)
    }

    /// Read `explicit` if given (it must exist), otherwise the default
    /// location. A missing default file yields [`Config::default`].
    pub fn load(explicit: Option<&Path>) -> Result<Self, RunnerError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };
        let text = std::fs::read_to_string(&path).map_err(|source| RunnerError::Io {
            path: path.clone(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml(&text)
    }
}

/// `<config dir>/lr35902/runner.toml`, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lr35902").join("runner.toml"))
}

/// Accepts `0x0150`, `$0150` or plain decimal.
pub fn parse_address(arg: &str) -> Result<u16, String> {
    let arg = arg.trim();
    let parsed = match arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .or_else(|| arg.strip_prefix('$'))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => arg.parse(),
    };
    parsed.map_err(|e| format!("invalid address {arg:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            max_cycles = 1000
            load_address = 0x100
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_cycles, 1000);
        assert_eq!(config.load_address, 0x0100);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.skip_boot_rom);
        assert_eq!(config.pass_marker, "Passed");
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = Config::from_toml("max_cycle = 5").unwrap_err();
        assert!(matches!(err, RunnerError::Toml(_)));
        assert!(err.to_string().starts_with("invalid config"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/runner.toml"))).unwrap_err();
        assert!(matches!(err, RunnerError::Io { .. }));
        assert!(err.to_string().starts_with("/nonexistent/runner.toml"));
    }

    #[test]
    fn addresses_parse_in_hex_and_decimal() {
        assert_eq!(parse_address("0x0150"), Ok(0x0150));
        assert_eq!(parse_address("$C000"), Ok(0xC000));
        assert_eq!(parse_address("256"), Ok(256));
        assert!(parse_address("0x10000").is_err());
        assert!(parse_address("zz").is_err());
    }
}
