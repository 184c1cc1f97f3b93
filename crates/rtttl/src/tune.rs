//! Tune loading: the `<name>:<settings>:<notes>` prefix.
//!
//! Like the rest of the crate this never rejects input. Unknown settings are
//! skipped and missing or zero values fall back to the standard defaults.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::note::Notes;
use crate::scan;

/// Standard default note fraction (quarter note).
pub const STD_FRACTION: u32 = 4;
/// Standard default octave.
pub const STD_OCTAVE: u32 = 5;
/// Standard default tempo in beats per minute.
pub const STD_TEMPO: u32 = 60;

/// Tune-wide defaults from the settings section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// `d`: default note length as a fraction of a whole note.
    pub fraction: u32,
    /// `o`: default octave, clamped when applied to a note.
    pub octave: u32,
    /// `b`: beats per minute, one beat per default fraction.
    pub tempo: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            fraction: STD_FRACTION,
            octave: STD_OCTAVE,
            tempo: STD_TEMPO,
        }
    }
}

impl Settings {
    /// Length of a whole note in milliseconds (truncating).
    pub fn whole_note_ms(&self) -> u32 {
        self.fraction.saturating_mul(60_000) / self.tempo.max(1)
    }
}

/// A loaded tune: a borrowed view of the caller's text plus its defaults.
///
/// The text is never copied; it must outlive every cursor handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tune<'a> {
    text: &'a str,
    name: &'a str,
    settings: Settings,
    whole_note_ms: u32,
    notes: &'a str,
}

impl<'a> Tune<'a> {
    /// Parse the name and settings, leaving the note section untouched.
    pub fn parse(text: &'a str) -> Self {
        let name = text.split(':').next().unwrap_or_default().trim();

        let mut input = text;
        scan::skip_past(&mut input, ':');
        let settings = parse_settings(&mut input);
        scan::skip_past(&mut input, ':');

        let whole_note_ms = settings.whole_note_ms();
        debug!(
            name,
            d = settings.fraction,
            o = settings.octave,
            b = settings.tempo,
            whole_note_ms,
            "tune loaded"
        );

        Tune {
            text,
            name,
            settings,
            whole_note_ms,
            notes: input,
        }
    }

    /// The full notation text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Tune title (before the first colon), trimmed.
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn whole_note_ms(&self) -> u32 {
        self.whole_note_ms
    }

    /// The note section, starting at the first note token.
    pub fn notes_text(&self) -> &'a str {
        self.notes
    }

    /// Decode every note without playing it.
    pub fn notes(&self) -> Notes<'a> {
        Notes::new(self.notes, self.settings, self.whole_note_ms)
    }
}

/// Scan settings up to (not past) the second colon.
fn parse_settings(input: &mut &str) -> Settings {
    let mut settings = Settings::default();

    while let Some(c) = scan::peek(input) {
        if c == ':' {
            break;
        }
        match c.to_ascii_lowercase() {
            'd' => settings.fraction = setting_value(input, 'd', STD_FRACTION),
            'o' => settings.octave = setting_value(input, 'o', STD_OCTAVE),
            'b' => settings.tempo = setting_value(input, 'b', STD_TEMPO),
            other => trace!(key = %other, "ignoring unknown setting"),
        }
        scan::skip_past_until(input, ',', &[':']);
    }

    settings
}

/// Value after `=` for the setting under the cursor; `default` if absent or zero.
fn setting_value(input: &mut &str, key: char, default: u32) -> u32 {
    let value = if scan::skip_past_until(input, '=', &[',', ':']) {
        scan::read_uint(input)
    } else {
        None
    };

    match value {
        Some(v) if v > 0 => v,
        _ => {
            debug!(key = %key, default, "setting missing or zero, using default");
            default
        }
    }
}
