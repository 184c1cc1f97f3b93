//! RTTTL ring-tone decoding and playback.
//!
//! A tune looks like `name:d=4,o=5,b=120:8c6,8e6,4p,2g.` and is decoded one
//! note at a time straight out of the caller's buffer, without allocating.
//! Decoding never fails: malformed fields fall back to defaults.
//!
//! # Example
//!
//! ```
//! use rtttl::Tune;
//!
//! let tune = Tune::parse("x:d=4,o=5,b=120:c,8g,,2p");
//! let durations: Vec<u32> = tune.notes().map(|n| n.duration_ms).collect();
//! assert_eq!(durations, vec![500, 250, 500, 1000]);
//! ```
//!
//! Real-time playback goes through [`Player`], which is polled from the
//! caller's loop and drives a [`PinDriver`] against a [`Clock`].

pub mod driver;
pub mod note;
pub mod pitch;
pub mod player;
pub mod scan;
pub mod tune;
pub mod volume;

pub use driver::{Clock, PinDriver, SystemClock};
pub use note::{Note, Notes};
pub use pitch::NoteName;
pub use player::{PlaybackState, Player, PlayerConfig, TickOutcome};
pub use tune::{Settings, Tune};
pub use volume::Volume;

/// Decode every note of a tune.
pub fn decode(text: &str) -> Notes<'_> {
    Tune::parse(text).notes()
}
