//! Pitch table and octave arithmetic.

use serde::{Deserialize, Serialize};

pub const MIN_OCTAVE: u32 = 3;
pub const MAX_OCTAVE: u32 = 8;

/// Below this, a decoded pitch is treated as silence.
pub const MIN_AUDIBLE_PITCH: u32 = 100;

/// Octave 8 frequencies, indexed by semitones above A.
///
/// The C..G# entries are the octave-8 values too, so they sit below A8 in the
/// table; lower octaves are derived by halving.
//                            A     A#     B     C    C#     D    D#     E     F    F#     G    G#
const OCTAVE_8: [u32; 12] = [7040, 7459, 7902, 4186, 4435, 4699, 4978, 5274, 5588, 5920, 6272, 6645];

/// A note letter. `H` is accepted on input as an alias for `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteName {
    /// Case-insensitive letter lookup. Anything outside `a`-`h` is `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'a' => Some(NoteName::A),
            'b' | 'h' => Some(NoteName::B),
            'c' => Some(NoteName::C),
            'd' => Some(NoteName::D),
            'e' => Some(NoteName::E),
            'f' => Some(NoteName::F),
            'g' => Some(NoteName::G),
            _ => None,
        }
    }

    /// Semitone offset above A within the octave-8 table.
    pub fn semitone(&self) -> usize {
        match self {
            NoteName::A => 0,
            NoteName::B => 2,
            NoteName::C => 3,
            NoteName::D => 5,
            NoteName::E => 7,
            NoteName::F => 8,
            NoteName::G => 10,
        }
    }
}

/// Clamp an octave number into the playable range.
pub fn clamp_octave(octave: u32) -> u32 {
    octave.clamp(MIN_OCTAVE, MAX_OCTAVE)
}

/// Frequency at octave 8 for a semitone index (wraps past G#).
pub fn top_octave_pitch(semitone: usize) -> u32 {
    OCTAVE_8[semitone % OCTAVE_8.len()]
}

/// Frequency of `semitone` at `octave`, halving (truncating) once per octave below 8.
pub fn pitch_at(semitone: usize, octave: u32) -> u32 {
    top_octave_pitch(semitone) >> (MAX_OCTAVE - clamp_octave(octave))
}
