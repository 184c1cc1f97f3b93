//! Polled playback state machine.
//!
//! Nothing here runs on its own: the caller invokes [`Player::tick`] from its
//! main loop every few milliseconds, and all timing is computed from the
//! [`Clock`] at that moment. The short silence between notes is a scheduling
//! phase rather than a sleep, so a tick never blocks.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::driver::{Clock, PinDriver};
use crate::note::{self, Note};
use crate::pitch::MIN_AUDIBLE_PITCH;
use crate::tune::Tune;
use crate::volume::{Volume, PWM_RANGE};

/// Silence inserted between consecutive notes.
pub const DEFAULT_GAP_MS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No tune loaded yet.
    Unready,
    /// Tune loaded, cursor at the first note.
    Ready,
    Playing,
    /// Output silenced, cursor kept.
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Silence between notes in milliseconds; 0 starts the next note in the same tick.
    pub gap_ms: u32,
    /// Pitches below this start a silent note.
    pub min_audible_pitch: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            gap_ms: DEFAULT_GAP_MS,
            min_audible_pitch: MIN_AUDIBLE_PITCH,
        }
    }
}

/// What a call to [`Player::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing.
    Idle,
    /// Current note still sounding.
    Waiting,
    /// In the gap before the next note.
    Gap,
    /// A new note started and the pin is emitting it.
    NoteStarted(Note),
    /// A new note started silently (pause or inaudible pitch).
    RestStarted(Note),
    /// The last note ended; back to `Ready`.
    Finished,
}

/// Where the scheduler is within `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Next tick decodes and starts a note immediately.
    Due,
    Sounding { since: u32 },
    Gap { since: u32 },
}

/// One playback session over a caller-owned tune text.
pub struct Player<'a, P, C> {
    pin: P,
    clock: C,
    config: PlayerConfig,
    tune: Option<Tune<'a>>,
    cursor: &'a str,
    state: PlaybackState,
    phase: Phase,
    current: Option<Note>,
    volume: Volume,
}

impl<'a, P: PinDriver, C: Clock> Player<'a, P, C> {
    pub fn new(pin: P, clock: C) -> Self {
        Self::with_config(pin, clock, PlayerConfig::default())
    }

    pub fn with_config(pin: P, clock: C, config: PlayerConfig) -> Self {
        Player {
            pin,
            clock,
            config,
            tune: None,
            cursor: "",
            state: PlaybackState::Unready,
            phase: Phase::Due,
            current: None,
            volume: Volume::default(),
        }
    }

    /// Silence the pin, parse `text`, and position at the first note.
    pub fn load(&mut self, text: &'a str, volume: i32) {
        self.pin.silence();
        self.pin.set_range(PWM_RANGE);
        self.set_volume(volume);

        let tune = Tune::parse(text);
        self.cursor = tune.notes_text();
        self.tune = Some(tune);
        self.phase = Phase::Due;
        self.current = None;
        self.state = PlaybackState::Ready;
        info!(name = tune.name(), "tune ready");
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn tune(&self) -> Option<&Tune<'a>> {
        self.tune.as_ref()
    }

    /// The note most recently decoded.
    pub fn current_note(&self) -> Option<Note> {
        self.current
    }

    pub fn has_more_notes(&self) -> bool {
        !self.cursor.is_empty()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    /// Clamp and store the volume; returns the level actually used.
    ///
    /// Applies from the next note onwards.
    pub fn set_volume(&mut self, volume: i32) -> u8 {
        self.volume = Volume::new(volume);
        debug!(requested = volume, level = self.volume.level(), "volume set");
        self.volume.level()
    }

    /// Decode the next note and make it current.
    ///
    /// No-op unless `Ready` or `Playing` with notes remaining.
    pub fn decode_next(&mut self) -> Option<Note> {
        if !matches!(self.state, PlaybackState::Ready | PlaybackState::Playing) {
            return None;
        }
        let tune = self.tune?;
        let note = note::decode_next(&mut self.cursor, tune.settings(), tune.whole_note_ms())?;
        self.current = Some(note);
        Some(note)
    }

    /// Rewind and play from the first note; the next tick starts it.
    pub fn start(&mut self) {
        let Some(tune) = self.tune else {
            debug!("start ignored, no tune loaded");
            return;
        };
        if self.state == PlaybackState::Playing {
            self.pin.silence();
        }
        self.cursor = tune.notes_text();
        self.phase = Phase::Due;
        self.state = PlaybackState::Playing;
        info!(name = tune.name(), "playback started");
    }

    /// Silence output and suspend timing, keeping the cursor.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.pin.silence();
        self.state = PlaybackState::Paused;
        info!("playback paused");
    }

    /// Continue from the cursor without rewinding.
    ///
    /// The interrupted note gets a fresh full-length window and is not
    /// re-emitted, so its remainder plays as silence.
    pub fn resume(&mut self) {
        if !matches!(self.state, PlaybackState::Ready | PlaybackState::Paused) {
            return;
        }
        let now = self.clock.now_ms();
        self.phase = match self.phase {
            Phase::Due => Phase::Due,
            Phase::Sounding { .. } => Phase::Sounding { since: now },
            Phase::Gap { .. } => Phase::Gap { since: now },
        };
        self.state = PlaybackState::Playing;
        info!("playback resumed");
    }

    /// Silence output and rewind.
    pub fn stop(&mut self) {
        self.pin.silence();
        self.reset();
    }

    /// Rewind to the first note without touching the output.
    pub fn reset(&mut self) {
        let Some(tune) = self.tune else {
            return;
        };
        self.cursor = tune.notes_text();
        self.phase = Phase::Due;
        self.state = PlaybackState::Ready;
    }

    /// Advance playback if the current note or gap has run out.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != PlaybackState::Playing {
            return TickOutcome::Idle;
        }
        let now = self.clock.now_ms();

        match self.phase {
            Phase::Due => self.begin_next(now),
            Phase::Sounding { since } => {
                let duration = self.current.map_or(0, |n| n.duration_ms);
                if now.wrapping_sub(since) <= duration {
                    return TickOutcome::Waiting;
                }
                trace!(elapsed = now.wrapping_sub(since), duration, "note ended");
                self.pin.silence();

                if !self.has_more_notes() {
                    return self.finish();
                }
                self.phase = Phase::Gap { since: now };
                if self.config.gap_ms == 0 {
                    self.begin_next(now)
                } else {
                    TickOutcome::Gap
                }
            }
            Phase::Gap { since } => {
                if now.wrapping_sub(since) < self.config.gap_ms {
                    TickOutcome::Gap
                } else {
                    self.begin_next(now)
                }
            }
        }
    }

    fn begin_next(&mut self, now: u32) -> TickOutcome {
        let Some(note) = self.decode_next() else {
            return self.finish();
        };
        self.phase = Phase::Sounding { since: now };

        if note.pitch < self.config.min_audible_pitch {
            return TickOutcome::RestStarted(note);
        }
        self.pin.emit_tone(note.pitch);
        self.pin.set_intensity(self.volume.intensity());
        TickOutcome::NoteStarted(note)
    }

    fn finish(&mut self) -> TickOutcome {
        self.pin.silence();
        self.reset();
        info!("end of tune");
        TickOutcome::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Default)]
    struct CountingPin {
        tones: Vec<u32>,
        silences: usize,
    }

    impl PinDriver for CountingPin {
        fn emit_tone(&mut self, frequency: u32) {
            self.tones.push(frequency);
        }

        fn set_intensity(&mut self, _level: u16) {}

        fn silence(&mut self) {
            self.silences += 1;
        }
    }

    #[derive(Debug, Default)]
    struct ManualClock(Cell<u32>);

    impl ManualClock {
        fn set(&self, ms: u32) {
            self.0.set(ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    #[test]
    fn test_unready_controls_are_noops() {
        let clock = ManualClock::default();
        let mut player = Player::new(CountingPin::default(), &clock);

        player.start();
        assert_eq!(player.state(), PlaybackState::Unready);
        player.resume();
        player.pause();
        player.reset();
        assert_eq!(player.state(), PlaybackState::Unready);
        assert_eq!(player.tick(), TickOutcome::Idle);
        assert_eq!(player.decode_next(), None);
    }

    #[test]
    fn test_load_goes_ready() {
        let clock = ManualClock::default();
        let mut player = Player::new(CountingPin::default(), &clock);
        player.load("t:b=120:c", 3);

        assert_eq!(player.state(), PlaybackState::Ready);
        assert_eq!(player.volume(), 3);
        assert!(player.has_more_notes());
        assert_eq!(player.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_first_tick_after_start_sounds_first_note() {
        let clock = ManualClock::default();
        let mut player = Player::new(CountingPin::default(), &clock);
        player.load("t:b=120:c", 5);
        player.start();

        match player.tick() {
            TickOutcome::NoteStarted(note) => assert_eq!(note.duration_ms, 500),
            other => panic!("expected a note, got {:?}", other),
        }
        assert_eq!(player.pin().tones.len(), 1);
    }

    #[test]
    fn test_expiry_is_strictly_after_duration() {
        let clock = ManualClock::default();
        let mut player = Player::new(CountingPin::default(), &clock);
        player.load("t:b=120:c,d", 5);
        player.start();
        player.tick();

        clock.set(500);
        assert_eq!(player.tick(), TickOutcome::Waiting);
        clock.set(501);
        assert_eq!(player.tick(), TickOutcome::Gap);
        clock.set(510);
        assert_eq!(player.tick(), TickOutcome::Gap);
        clock.set(511);
        assert!(matches!(player.tick(), TickOutcome::NoteStarted(_)));
    }

    #[test]
    fn test_zero_gap_advances_in_one_tick() {
        let clock = ManualClock::default();
        let config = PlayerConfig {
            gap_ms: 0,
            ..PlayerConfig::default()
        };
        let mut player = Player::with_config(CountingPin::default(), &clock, config);
        player.load("t:b=120:c,d", 5);
        player.start();
        player.tick();

        clock.set(501);
        assert!(matches!(player.tick(), TickOutcome::NoteStarted(_)));
    }

    #[test]
    fn test_clock_wraparound() {
        let clock = ManualClock::default();
        clock.set(u32::MAX - 100);
        let mut player = Player::new(CountingPin::default(), &clock);
        player.load("t:b=120:c", 5);
        player.start();
        player.tick();

        clock.set(300);
        assert_eq!(player.tick(), TickOutcome::Waiting);
        clock.set(400);
        assert_eq!(player.tick(), TickOutcome::Finished);
        assert_eq!(player.state(), PlaybackState::Ready);
    }

    #[test]
    fn test_stop_silences_but_reset_does_not() {
        let clock = ManualClock::default();
        let mut player = Player::new(CountingPin::default(), &clock);
        player.load("t::c,d", 5);
        let after_load = player.pin().silences;

        player.start();
        player.tick();
        player.reset();
        assert_eq!(player.state(), PlaybackState::Ready);
        assert_eq!(player.pin().silences, after_load);

        player.start();
        player.tick();
        player.stop();
        assert_eq!(player.state(), PlaybackState::Ready);
        assert_eq!(player.pin().silences, after_load + 1);
    }

    #[test]
    fn test_set_volume_returns_clamped() {
        let clock = ManualClock::default();
        let mut player = Player::new(CountingPin::default(), &clock);
        assert_eq!(player.set_volume(-5), 0);
        assert_eq!(player.set_volume(99), 11);
        assert_eq!(player.set_volume(7), 7);
        assert_eq!(player.volume(), 7);
    }
}
