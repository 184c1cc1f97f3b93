//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, RtttlConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Existing config files in load order (system, user, local).
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Existing config files in load order; `cli_path` takes the place of `./rtttl.toml`.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let user = directories::BaseDirs::new().map(|d| d.config_dir().join("rtttl/config.toml"));
    let local = match cli_path {
        Some(path) if path.exists() => path.to_path_buf(),
        _ => PathBuf::from("rtttl.toml"),
    };

    [Some(PathBuf::from("/etc/rtttl/config.toml")), user, Some(local)]
        .into_iter()
        .flatten()
        .filter(|path| path.exists())
        .collect()
}

/// Load a single file on top of the compiled defaults.
pub fn load_from_file(path: &Path) -> Result<RtttlConfig, ConfigError> {
    let mut config = RtttlConfig::default();
    load_file_into(&mut config, path)?;
    Ok(config)
}

/// Overlay the keys present in `path` onto `config`.
///
/// Keys the file does not mention keep whatever an earlier layer set.
pub fn load_file_into(config: &mut RtttlConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    overlay_toml(config, &contents, path)
}

fn overlay_toml(config: &mut RtttlConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let invalid = |key: &str, want: &str| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("{} must be {}", key, want),
    };

    if let Some(playback) = table.get("playback").and_then(|v| v.as_table()) {
        if let Some(v) = playback.get("volume") {
            let v = v.as_integer().ok_or_else(|| invalid("playback.volume", "an integer"))?;
            config.playback.volume = v.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        }
        if let Some(v) = playback.get("gap_ms") {
            config.playback.gap_ms = v
                .as_integer()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| invalid("playback.gap_ms", "a non-negative integer"))?;
        }
        if let Some(v) = playback.get("tick_ms") {
            config.playback.tick_ms = v
                .as_integer()
                .and_then(|v| u64::try_from(v).ok())
                .ok_or_else(|| invalid("playback.tick_ms", "a non-negative integer"))?;
        }
        if let Some(v) = playback.get("min_audible_pitch") {
            config.playback.min_audible_pitch = v
                .as_integer()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| invalid("playback.min_audible_pitch", "a non-negative integer"))?;
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level") {
            config.telemetry.log_level = v
                .as_str()
                .ok_or_else(|| invalid("telemetry.log_level", "a string"))?
                .to_string();
        }
    }

    Ok(())
}

/// Apply `RTTTL_*` and `RUST_LOG` from the process environment.
pub fn apply_env_overrides(config: &mut RtttlConfig, sources: &mut ConfigSources) {
    apply_overrides_with(config, sources, |name| env::var(name).ok());
}

/// Apply environment-style overrides from an arbitrary lookup.
///
/// Values that fail to parse are ignored. `RUST_LOG` beats `RTTTL_LOG_LEVEL`.
pub fn apply_overrides_with<F>(config: &mut RtttlConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("RTTTL_VOLUME").and_then(|v| v.trim().parse().ok()) {
        config.playback.volume = v;
        sources.env_overrides.push("RTTTL_VOLUME".to_string());
    }

    if let Some(v) = lookup("RTTTL_GAP_MS").and_then(|v| v.trim().parse().ok()) {
        config.playback.gap_ms = v;
        sources.env_overrides.push("RTTTL_GAP_MS".to_string());
    }

    if let Some(v) = lookup("RTTTL_TICK_MS").and_then(|v| v.trim().parse().ok()) {
        config.playback.tick_ms = v;
        sources.env_overrides.push("RTTTL_TICK_MS".to_string());
    }

    if let Some(v) = lookup("RTTTL_MIN_AUDIBLE").and_then(|v| v.trim().parse().ok()) {
        config.playback.min_audible_pitch = v;
        sources.env_overrides.push("RTTTL_MIN_AUDIBLE".to_string());
    }

    if let Some(v) = lookup("RTTTL_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RTTTL_LOG_LEVEL".to_string());
    }

    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}
