//! A pin driver with no hardware behind it: every request becomes a log line.

use rtttl::PinDriver;
use tracing::info;

/// Logs tone, intensity, and silence requests and remembers the last state.
#[derive(Debug, Default)]
pub struct LogPin {
    frequency: Option<u32>,
    intensity: u16,
    range: u16,
    tones: usize,
}

impl LogPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no tone is sounding and the duty is zero.
    pub fn is_quiet(&self) -> bool {
        self.frequency.is_none() && self.intensity == 0
    }

    /// Number of tones emitted since construction.
    pub fn tones(&self) -> usize {
        self.tones
    }
}

impl PinDriver for LogPin {
    fn emit_tone(&mut self, frequency: u32) {
        info!(frequency, "tone");
        self.frequency = Some(frequency);
        self.tones += 1;
    }

    fn set_intensity(&mut self, level: u16) {
        info!(level, range = self.range, "intensity");
        self.intensity = level;
    }

    fn silence(&mut self) {
        if self.frequency.take().is_some() {
            info!("silence");
        }
        self.intensity = 0;
    }

    fn set_range(&mut self, range: u16) {
        self.range = range;
    }
}
