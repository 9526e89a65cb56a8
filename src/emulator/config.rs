// Configuration management
//
// User-facing knobs for the core, persisted as TOML next to the host
// binary. Everything has a sensible default; hosts that never touch the
// file run with NTSC-ish timing and hardware-faithful quirks.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;

/// Default configuration file path
const CONFIG_FILE: &str = "famicore.toml";

/// Emulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Presentation hints for the host
    pub video: VideoConfig,

    /// CPU/PPU interleaving
    pub timing: TimingConfig,

    /// Hardware quirk switches
    pub quirks: QuirksConfig,
}

/// Presentation hints (the core renders 256x240 regardless)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Integer window scale suggested to the host
    pub scale: u32,

    /// Target frames per second (60 for NTSC)
    pub fps: u32,

    /// Ask the host for vsync
    pub vsync: bool,
}

/// CPU/PPU timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// CPU cycles granted per scanline (NTSC: ~113.7, rounded to 114)
    pub cpu_cycles_per_scanline: u64,
}

/// Hardware quirk switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuirksConfig {
    /// Replicate the NMOS JMP (indirect) page-wrap bug
    pub jmp_indirect_page_bug: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            video: VideoConfig {
                scale: 3,
                fps: 60,
                vsync: true,
            },
            timing: TimingConfig {
                cpu_cycles_per_scanline: 114,
            },
            quirks: QuirksConfig {
                jmp_indirect_page_bug: true,
            },
        }
    }
}

/// Errors from loading or saving the configuration file
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read or written
    Io(io::Error),
    /// File contents are not valid configuration TOML
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
        }
    }
}

impl Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl EmulatorConfig {
    /// Load the configuration file, falling back to defaults
    ///
    /// A missing or malformed file is not fatal; the failure is logged and
    /// defaults are used.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Load configuration from `famicore.toml`
    pub fn load() -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(CONFIG_FILE)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to `famicore.toml`
    pub fn save(&self) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(CONFIG_FILE, contents)?;
        Ok(())
    }
}
