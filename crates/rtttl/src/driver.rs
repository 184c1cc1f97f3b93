//! Capabilities the player drives: a tone output pin and a millisecond clock.

use std::time::Instant;

/// Square-wave output on a single pin.
pub trait PinDriver {
    /// Set the output frequency.
    fn emit_tone(&mut self, frequency: u32);

    /// Set the duty value (0 is silent).
    fn set_intensity(&mut self, level: u16);

    /// Stop any output.
    fn silence(&mut self);

    /// Configure the duty range `set_intensity` values are relative to.
    fn set_range(&mut self, _range: u16) {}
}

/// Monotonic millisecond counter. Only differences are used, so wrapping is fine.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

impl<P: PinDriver + ?Sized> PinDriver for &mut P {
    fn emit_tone(&mut self, frequency: u32) {
        (**self).emit_tone(frequency)
    }

    fn set_intensity(&mut self, level: u16) {
        (**self).set_intensity(level)
    }

    fn silence(&mut self) {
        (**self).silence()
    }

    fn set_range(&mut self, range: u16) {
        (**self).set_range(range)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Clock backed by `std::time::Instant`, counting from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        // truncation wraps like a hardware millis() counter
        self.origin.elapsed().as_millis() as u32
    }
}
