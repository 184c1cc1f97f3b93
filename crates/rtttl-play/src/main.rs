//! rtttl-play - decode and play RTTTL ring tones

mod pin;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rtttl::{Note, PlaybackState, Player, PlayerConfig, Settings, SystemClock, TickOutcome, Tune};
use rtttlconf::RtttlConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::pin::LogPin;

/// Decode and play RTTTL ring tones
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (replaces ./rtttl.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print tune settings and the decoded note table
    Decode {
        #[command(flatten)]
        source: TuneSource,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play a tune in real time through a logging pin
    Play {
        #[command(flatten)]
        source: TuneSource,

        /// Volume step 0-11
        #[arg(long, allow_negative_numbers = true)]
        volume: Option<i32>,

        /// Silence between notes in milliseconds
        #[arg(long)]
        gap_ms: Option<u32>,

        /// Tick interval of the driver loop in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,
    },

    /// Print the effective configuration and where it came from
    Config,
}

#[derive(Args, Debug)]
struct TuneSource {
    /// Tune text, e.g. "x:d=4,o=5,b=120:c,8g,,2p"
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    tune: Option<String>,

    /// Read the tune from a file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl TuneSource {
    fn read(&self) -> Result<String> {
        match (&self.tune, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("reading tune from {}", path.display())),
            (None, None) => anyhow::bail!("no tune given"),
        }
    }
}

#[derive(Debug, Serialize)]
struct DecodeReport<'a> {
    name: &'a str,
    settings: Settings,
    whole_note_ms: u32,
    notes: Vec<Note>,
}

impl<'a> DecodeReport<'a> {
    fn new(tune: &Tune<'a>) -> Self {
        Self {
            name: tune.name(),
            settings: tune.settings(),
            whole_note_ms: tune.whole_note_ms(),
            notes: tune.notes().collect(),
        }
    }

    fn total_ms(&self) -> u64 {
        self.notes.iter().map(|n| n.duration_ms as u64).sum()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = RtttlConfig::load_with_sources_from(cli.config.as_deref())
        .context("loading configuration")?;

    init_tracing(&config.telemetry.log_level);
    debug!(files = ?sources.files, env = ?sources.env_overrides, "configuration loaded");

    match cli.command {
        Command::Decode { source, json } => decode(&source.read()?, json),
        Command::Play {
            source,
            volume,
            gap_ms,
            tick_ms,
        } => {
            let mut playback = config.playback.clone();
            if let Some(v) = volume {
                playback.volume = v;
            }
            if let Some(v) = gap_ms {
                playback.gap_ms = v;
            }
            if let Some(v) = tick_ms {
                playback.tick_ms = v;
            }
            play(&source.read()?, &playback)
        }
        Command::Config => {
            show_config(&config, &sources.files, &sources.env_overrides);
            Ok(())
        }
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn decode(text: &str, json: bool) -> Result<()> {
    let tune = Tune::parse(text);
    let report = DecodeReport::new(&tune);

    if json {
        let out = serde_json::to_string_pretty(&report).context("serializing notes")?;
        println!("{}", out);
        return Ok(());
    }

    println!("name:       {}", report.name);
    println!(
        "settings:   d={} o={} b={}",
        report.settings.fraction, report.settings.octave, report.settings.tempo
    );
    println!("whole note: {} ms", report.whole_note_ms);
    println!("notes:      {} ({} ms)", report.notes.len(), report.total_ms());
    println!();
    println!("{:>4}  {:>6}  {:>6}", "#", "pitch", "ms");
    for (i, note) in report.notes.iter().enumerate() {
        if note.is_pause() {
            println!("{:>4}  {:>6}  {:>6}", i + 1, "-", note.duration_ms);
        } else {
            println!("{:>4}  {:>6}  {:>6}", i + 1, note.pitch, note.duration_ms);
        }
    }

    Ok(())
}

fn play(text: &str, playback: &rtttlconf::PlaybackConfig) -> Result<()> {
    let player_config = PlayerConfig {
        gap_ms: playback.gap_ms,
        min_audible_pitch: playback.min_audible_pitch,
    };
    let tick = Duration::from_millis(playback.tick_ms);

    let mut player = Player::with_config(LogPin::new(), SystemClock::new(), player_config);
    player.load(text, playback.volume);

    let Some(tune) = player.tune() else {
        anyhow::bail!("tune failed to load");
    };
    info!(
        name = tune.name(),
        volume = player.volume(),
        gap_ms = playback.gap_ms,
        tick_ms = playback.tick_ms,
        "playing"
    );

    let began = Instant::now();
    player.start();
    while player.state() == PlaybackState::Playing {
        if player.tick() == TickOutcome::Finished {
            break;
        }
        thread::sleep(tick);
    }

    if !player.pin().is_quiet() {
        warn!("pin still sounding after playback");
    }
    info!(
        tones = player.pin().tones(),
        elapsed_ms = began.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}

fn show_config(config: &RtttlConfig, files: &[PathBuf], env: &[String]) {
    print!("{}", config.to_toml());
    println!();
    if files.is_empty() {
        println!("# no config files found, using defaults");
    }
    for path in files {
        println!("# file: {}", display_path(path));
    }
    for name in env {
        println!("# env: {}", name);
    }
}

fn display_path(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
