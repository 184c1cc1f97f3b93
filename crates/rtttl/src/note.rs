//! Note token decoding.
//!
//! A token is `[fraction] letter [#] [.*] [octave] [.*]`, terminated by a
//! comma or end of input. Every field has a fallback, so decoding a
//! non-empty cursor always yields a note and always makes progress.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pitch::{self, NoteName, MIN_AUDIBLE_PITCH};
use crate::scan;
use crate::tune::Settings;

/// One decoded note: what to play and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    /// Frequency to emit; `0` for a pause.
    pub pitch: u32,
    /// Duration in milliseconds, always at least 1.
    pub duration_ms: u32,
}

impl Note {
    pub fn is_pause(&self) -> bool {
        self.pitch == 0
    }

    /// Whether the pitch is high enough to drive the output.
    pub fn is_audible(&self) -> bool {
        self.pitch >= MIN_AUDIBLE_PITCH
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symbol {
    Pitch(NoteName),
    Pause,
}

/// Decode the note under the cursor and advance past its separator.
///
/// Returns `None` only when the cursor is already at end of input.
pub fn decode_next(input: &mut &str, settings: Settings, whole_note_ms: u32) -> Option<Note> {
    if input.is_empty() {
        return None;
    }

    let fraction = match scan::read_uint(input) {
        Some(f) if f > 0 => f,
        _ => settings.fraction.max(1),
    };
    let base_ms = (whole_note_ms / fraction).max(1);

    let symbol = read_symbol(input);

    let mut semitone = match symbol {
        Symbol::Pitch(name) => name.semitone(),
        Symbol::Pause => 0,
    };
    if scan::peek(input) == Some('#') {
        scan::bump(input);
        semitone += 1;
    }

    let mut dots = scan::count_run(input, '.');
    let octave = scan::read_uint(input);
    dots += scan::count_run(input, '.');

    scan::skip_past(input, ',');

    let pitch = match symbol {
        Symbol::Pause => 0,
        Symbol::Pitch(_) => pitch::pitch_at(semitone, octave.unwrap_or(settings.octave)),
    };
    let duration_ms = dotted(base_ms, dots);

    debug!(?symbol, fraction, ?octave, dots, pitch, duration_ms, "decoded note");
    Some(Note { pitch, duration_ms })
}

/// Read the note letter. An empty token (`,` or end of input) is not consumed.
fn read_symbol(input: &mut &str) -> Symbol {
    let Some(c) = scan::peek(input).filter(|c| *c != ',') else {
        debug!("empty note token, reading as c");
        return Symbol::Pitch(NoteName::C);
    };
    scan::bump(input);

    if c.eq_ignore_ascii_case(&'p') {
        return Symbol::Pause;
    }
    NoteName::from_char(c).map(Symbol::Pitch).unwrap_or_else(|| {
        debug!(letter = %c, "unknown note letter, reading as c");
        Symbol::Pitch(NoteName::C)
    })
}

/// Extend `base_ms` by half the previous increment for each dot (truncating).
pub fn dotted(base_ms: u32, dots: u32) -> u32 {
    let mut duration = base_ms;
    let mut extra = base_ms;
    for _ in 0..dots {
        extra /= 2;
        if extra == 0 {
            break;
        }
        duration = duration.saturating_add(extra);
    }
    duration
}

/// Iterator that decodes a note section to the end.
#[derive(Debug, Clone)]
pub struct Notes<'a> {
    rest: &'a str,
    settings: Settings,
    whole_note_ms: u32,
}

impl<'a> Notes<'a> {
    pub fn new(notes: &'a str, settings: Settings, whole_note_ms: u32) -> Self {
        Notes {
            rest: notes,
            settings,
            whole_note_ms,
        }
    }

    /// Text not yet decoded.
    pub fn remaining(&self) -> &'a str {
        self.rest
    }
}

impl Iterator for Notes<'_> {
    type Item = Note;

    fn next(&mut self) -> Option<Note> {
        decode_next(&mut self.rest, self.settings, self.whole_note_ms)
    }
}
