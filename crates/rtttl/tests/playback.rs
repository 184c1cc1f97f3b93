//! Scheduler tests against a recording pin and a hand-driven clock.

use pretty_assertions::assert_eq;
use rtttl::{Clock, Note, PinDriver, PlaybackState, Player, PlayerConfig, TickOutcome};
use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PinEvent {
    Range(u16),
    Tone(u32),
    Intensity(u16),
    Silence,
}

#[derive(Debug, Default)]
struct RecordingPin {
    events: Vec<PinEvent>,
}

impl RecordingPin {
    fn tones(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PinEvent::Tone(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    fn last(&self) -> Option<PinEvent> {
        self.events.last().copied()
    }
}

impl PinDriver for RecordingPin {
    fn emit_tone(&mut self, frequency: u32) {
        self.events.push(PinEvent::Tone(frequency));
    }

    fn set_intensity(&mut self, level: u16) {
        self.events.push(PinEvent::Intensity(level));
    }

    fn silence(&mut self) {
        self.events.push(PinEvent::Silence);
    }

    fn set_range(&mut self, range: u16) {
        self.events.push(PinEvent::Range(range));
    }
}

#[derive(Debug, Default)]
struct TestClock(Cell<u32>);

impl TestClock {
    fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

const SCENARIO: &str = "x:d=4,o=5,b=120:c,8g,,2p";

fn no_gap() -> PlayerConfig {
    PlayerConfig {
        gap_ms: 0,
        ..PlayerConfig::default()
    }
}

#[test]
fn test_state_machine_walkthrough() {
    let clock = TestClock::default();
    let mut player = Player::with_config(RecordingPin::default(), &clock, no_gap());
    assert_eq!(player.state(), PlaybackState::Unready);

    player.load(SCENARIO, 5);
    assert_eq!(player.state(), PlaybackState::Ready);
    assert_eq!(
        player.pin().events,
        vec![PinEvent::Silence, PinEvent::Range(1023)]
    );

    player.start();
    assert_eq!(player.state(), PlaybackState::Playing);

    let c5 = Note { pitch: 4186 >> 3, duration_ms: 500 };
    assert_eq!(player.tick(), TickOutcome::NoteStarted(c5));

    clock.advance(200);
    assert_eq!(player.tick(), TickOutcome::Waiting);
    assert_eq!(player.state(), PlaybackState::Playing);

    clock.advance(301);
    let g5 = Note { pitch: 6272 >> 3, duration_ms: 250 };
    assert_eq!(player.tick(), TickOutcome::NoteStarted(g5));
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.current_note(), Some(g5));

    clock.advance(251);
    assert_eq!(player.tick(), TickOutcome::NoteStarted(c5));

    clock.advance(501);
    let rest = Note { pitch: 0, duration_ms: 1000 };
    assert_eq!(player.tick(), TickOutcome::RestStarted(rest));
    assert_eq!(player.pin().last(), Some(PinEvent::Silence));

    clock.advance(1001);
    assert_eq!(player.tick(), TickOutcome::Finished);
    assert_eq!(player.state(), PlaybackState::Ready);
    assert_eq!(player.pin().last(), Some(PinEvent::Silence));
    assert_eq!(player.pin().tones(), vec![c5.pitch, g5.pitch, c5.pitch]);

    clock.advance(5000);
    assert_eq!(player.tick(), TickOutcome::Idle);
}

#[test]
fn test_gap_defers_next_note() {
    let clock = TestClock::default();
    let mut player = Player::new(RecordingPin::default(), &clock);
    player.load(SCENARIO, 5);
    player.start();
    player.tick();

    clock.advance(501);
    assert_eq!(player.tick(), TickOutcome::Gap);
    assert_eq!(player.pin().last(), Some(PinEvent::Silence));
    assert_eq!(player.pin().tones().len(), 1);

    clock.advance(9);
    assert_eq!(player.tick(), TickOutcome::Gap);
    clock.advance(1);
    assert!(matches!(player.tick(), TickOutcome::NoteStarted(_)));
    assert_eq!(player.pin().tones().len(), 2);
}

#[test]
fn test_tone_uses_volume_intensity() {
    let clock = TestClock::default();
    let mut player = Player::with_config(RecordingPin::default(), &clock, no_gap());
    player.load(SCENARIO, 11);
    player.start();
    player.tick();
    assert_eq!(player.pin().last(), Some(PinEvent::Intensity(70)));

    // takes effect from the next note only
    player.set_volume(1);
    assert_eq!(player.pin().last(), Some(PinEvent::Intensity(70)));

    clock.advance(501);
    player.tick();
    assert_eq!(player.pin().last(), Some(PinEvent::Intensity(4)));
}

#[test]
fn test_restart_rewinds_without_double_trigger() {
    let clock = TestClock::default();
    let mut player = Player::with_config(RecordingPin::default(), &clock, no_gap());
    player.load(SCENARIO, 5);
    player.start();
    player.tick();
    clock.advance(501);
    player.tick();

    player.start();
    assert_eq!(player.pin().last(), Some(PinEvent::Silence));
    let first = player.tick();
    assert_eq!(
        first,
        TickOutcome::NoteStarted(Note { pitch: 4186 >> 3, duration_ms: 500 })
    );
    assert_eq!(player.tick(), TickOutcome::Waiting);
    assert_eq!(player.pin().tones().len(), 3);
}

#[test]
fn test_pause_keeps_position() {
    let clock = TestClock::default();
    let mut player = Player::with_config(RecordingPin::default(), &clock, no_gap());
    player.load(SCENARIO, 5);
    player.start();
    player.tick();

    player.pause();
    assert_eq!(player.state(), PlaybackState::Paused);
    assert_eq!(player.pin().last(), Some(PinEvent::Silence));

    clock.advance(10_000);
    assert_eq!(player.tick(), TickOutcome::Idle);

    player.resume();
    assert_eq!(player.state(), PlaybackState::Playing);
    clock.advance(501);
    // second note, not a restart from the first
    assert_eq!(
        player.tick(),
        TickOutcome::NoteStarted(Note { pitch: 6272 >> 3, duration_ms: 250 })
    );
}

/// Known limitation: resume gives the interrupted note a fresh full window
/// (in silence) instead of only its remaining time.
#[test]
fn test_resume_restarts_note_window() {
    let clock = TestClock::default();
    let mut player = Player::with_config(RecordingPin::default(), &clock, no_gap());
    player.load(SCENARIO, 5);
    player.start();
    player.tick();

    clock.advance(400);
    player.pause();
    clock.advance(50);
    player.resume();
    let tones_before = player.pin().tones().len();

    // only 100ms of the note were left, but the full 500ms window applies
    clock.advance(101);
    assert_eq!(player.tick(), TickOutcome::Waiting);
    assert_eq!(player.pin().tones().len(), tones_before);

    clock.advance(400);
    assert!(matches!(player.tick(), TickOutcome::NoteStarted(_)));
}

#[test]
fn test_resume_from_ready_continues_at_cursor() {
    let clock = TestClock::default();
    let mut player = Player::with_config(RecordingPin::default(), &clock, no_gap());
    player.load(SCENARIO, 5);

    player.resume();
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(
        player.tick(),
        TickOutcome::NoteStarted(Note { pitch: 4186 >> 3, duration_ms: 500 })
    );
}

#[test]
fn test_stop_from_any_state() {
    let clock = TestClock::default();
    let mut player = Player::with_config(RecordingPin::default(), &clock, no_gap());

    player.stop();
    assert_eq!(player.state(), PlaybackState::Unready);

    player.load(SCENARIO, 5);
    player.start();
    player.tick();
    player.pause();
    player.stop();
    assert_eq!(player.state(), PlaybackState::Ready);
    assert_eq!(player.pin().last(), Some(PinEvent::Silence));
    assert!(player.has_more_notes());
}

fn decode_all(player: &mut Player<'_, RecordingPin, &TestClock>) -> Vec<Note> {
    let mut notes = Vec::new();
    while let Some(note) = player.decode_next() {
        notes.push(note);
    }
    notes
}

#[test]
fn test_reset_then_decode_is_repeatable() {
    let clock = TestClock::default();
    let mut player = Player::new(RecordingPin::default(), &clock);
    player.load("t:d=8,o=6,b=200:c,d#.,e5,16p,2f#7..,h", 5);

    let first = decode_all(&mut player);
    assert_eq!(first.len(), 6);
    assert!(!player.has_more_notes());

    player.reset();
    let second = decode_all(&mut player);
    assert_eq!(first, second);
}

#[test]
fn test_decode_next_noop_when_paused() {
    let clock = TestClock::default();
    let mut player = Player::with_config(RecordingPin::default(), &clock, no_gap());
    player.load(SCENARIO, 5);
    player.start();
    player.tick();
    player.pause();
    assert_eq!(player.decode_next(), None);
}

#[test]
fn test_empty_note_section_finishes_immediately() {
    let clock = TestClock::default();
    let mut player = Player::new(RecordingPin::default(), &clock);
    player.load("silent:b=90:", 5);
    player.start();

    assert_eq!(player.tick(), TickOutcome::Finished);
    assert_eq!(player.state(), PlaybackState::Ready);
    assert!(player.pin().tones().is_empty());
}
