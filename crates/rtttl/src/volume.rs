//! Output volume steps.

use serde::{Deserialize, Serialize};

pub const MAX_VOLUME: u8 = 11;

/// PWM range the intensity table assumes.
pub const PWM_RANGE: u16 = 1023;

// Duty cycle also shifts timbre on a piezo, so only the bottom of the range
// is usable; found by ear rather than computed.
const INTENSITY: [u16; MAX_VOLUME as usize + 1] = [0, 4, 8, 13, 18, 24, 30, 37, 44, 52, 61, 70];

/// A volume step in `0..=11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Volume(u8);

impl Volume {
    /// Clamp any requested level into range.
    pub fn new(level: i32) -> Self {
        Volume(level.clamp(0, MAX_VOLUME as i32) as u8)
    }

    pub fn level(&self) -> u8 {
        self.0
    }

    /// Duty value to request from the pin driver.
    pub fn intensity(&self) -> u16 {
        INTENSITY[self.0 as usize]
    }
}

impl Default for Volume {
    fn default() -> Self {
        Volume(MAX_VOLUME / 2)
    }
}
