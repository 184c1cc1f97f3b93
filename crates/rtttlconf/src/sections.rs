//! Configuration sections.

use serde::{Deserialize, Serialize};

/// Playback tuning for the polled player loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume step (clamped to 0..=11 by the player).
    /// Default: 5
    #[serde(default = "PlaybackConfig::default_volume")]
    pub volume: i32,

    /// Silence between notes in milliseconds.
    /// Default: 10
    #[serde(default = "PlaybackConfig::default_gap_ms")]
    pub gap_ms: u32,

    /// How often the driver loop calls tick, in milliseconds.
    /// Default: 2
    #[serde(default = "PlaybackConfig::default_tick_ms")]
    pub tick_ms: u64,

    /// Pitches below this are played as silence.
    /// Default: 100
    #[serde(default = "PlaybackConfig::default_min_audible_pitch")]
    pub min_audible_pitch: u32,
}

impl PlaybackConfig {
    fn default_volume() -> i32 {
        5
    }

    fn default_gap_ms() -> u32 {
        10
    }

    fn default_tick_ms() -> u64 {
        2
    }

    fn default_min_audible_pitch() -> u32 {
        100
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: Self::default_volume(),
            gap_ms: Self::default_gap_ms(),
            tick_ms: Self::default_tick_ms(),
            min_audible_pitch: Self::default_min_audible_pitch(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log filter (trace, debug, info, warn, error, or an EnvFilter directive).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
