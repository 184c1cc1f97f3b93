//! Configuration loading for the RTTTL player.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins, key by key):
//! 1. `/etc/rtttl/config.toml` (system)
//! 2. `~/.config/rtttl/config.toml` (user)
//! 3. `./rtttl.toml` (local override, replaced by an explicit path if given)
//! 4. Environment variables (`RTTTL_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [playback]
//! volume = 7
//! gap_ms = 10
//! tick_ms = 2
//! min_audible_pitch = 100
//!
//! [telemetry]
//! log_level = "info,rtttl=debug"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{PlaybackConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete player configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RtttlConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl RtttlConfig {
    /// Load configuration from all standard sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load with an explicit file taking the place of `./rtttl.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report which files and variables contributed.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = RtttlConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::load_file_into(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# RTTTL player configuration\n\n");

        output.push_str("[playback]\n");
        output.push_str(&format!("volume = {}\n", self.playback.volume));
        output.push_str(&format!("gap_ms = {}\n", self.playback.gap_ms));
        output.push_str(&format!("tick_ms = {}\n", self.playback.tick_ms));
        output.push_str(&format!(
            "min_audible_pitch = {}\n",
            self.playback.min_audible_pitch
        ));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "log_level = \"{}\"\n",
            self.telemetry.log_level
        ));

        output
    }
}
