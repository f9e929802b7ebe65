//! keyreplay - Main Entry Point
//!
//! Inspects and replays recorded keystroke sessions from the command line.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use keyreplay::{
    config::ReplayConfig,
    document::share,
    session::{format_duration, player::apply_event},
    deserialize_events, KeystrokePlayer, SessionRecording, TextDocument,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "keyreplay", version, about = "Replay recorded keystroke sessions")]
struct Cli {
    /// Path to a TOML config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a session onto an in-memory document and print the result
    Replay {
        /// Session file, or a bare JSON event log
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Playback speed multiplier (0.25 to 4)
        #[arg(long)]
        speed: Option<f64>,

        /// Starting text, overriding the session's initial text
        #[arg(long, value_name = "FILE")]
        initial: Option<PathBuf>,

        /// Apply every event immediately, ignoring timing
        #[arg(long)]
        fast: bool,
    },

    /// Print metadata and statistics about a session
    Inspect {
        /// Session file, or a bare JSON event log
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ReplayConfig::load_or_default(cli.config.as_deref());

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Replay {
            file,
            speed,
            initial,
            fast,
        } => {
            let mut recording = load_recording(&file)?;
            if let Some(initial) = initial {
                recording.initial_text = std::fs::read_to_string(&initial)
                    .with_context(|| format!("Failed to read {}", initial.display()))?;
            }

            let text = if fast {
                fast_replay(&recording)
            } else {
                timed_replay(&config, recording, speed)?
            };
            print!("{}", text);
        }
        Command::Inspect { file } => {
            let recording = load_recording(&file)?;
            print_metadata(&file, &recording);
        }
    }

    Ok(())
}

/// Load a session file, falling back to a bare event log
fn load_recording(path: &Path) -> Result<SessionRecording> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if let Ok(recording) = serde_json::from_str::<SessionRecording>(&json) {
        return Ok(recording);
    }

    let events = deserialize_events(&json);
    if events.is_empty() {
        bail!("{} contains no replayable events", path.display());
    }
    tracing::debug!("Loaded bare event log with {} events", events.len());
    Ok(SessionRecording::from_events(String::new(), events))
}

/// Apply every event back to back
fn fast_replay(recording: &SessionRecording) -> String {
    let mut doc = TextDocument::new(recording.initial_text.clone());
    for (index, event) in recording.events.iter().enumerate() {
        if let Err(e) = apply_event(&mut doc, event) {
            tracing::warn!("Skipping event {}: {}", index, e);
        }
    }
    doc.as_str().to_string()
}

/// Replay with the recorded timing
fn timed_replay(
    config: &ReplayConfig,
    recording: SessionRecording,
    speed: Option<f64>,
) -> Result<String> {
    let options = config
        .playback
        .player_options()
        .with_speed(speed.unwrap_or(config.playback.speed));

    let text = keyreplay::runtime::run_local(async move {
        let doc = share(TextDocument::new(recording.initial_text.clone()));
        let done = Rc::new(tokio::sync::Notify::new());
        let notify = Rc::clone(&done);

        let options = options
            .on_progress(|current, total| {
                tracing::debug!("Replayed {}/{} events", current, total);
            })
            .on_complete(move || notify.notify_one());

        let player = KeystrokePlayer::new(recording.events, options);
        tracing::info!(
            "Replaying {} events at {}x",
            player.total_events(),
            player.speed()
        );
        player.play(doc.clone())?;
        done.notified().await;

        let text = doc.borrow().as_str().to_string();
        Ok::<_, keyreplay::ReplayError>(text)
    })??;

    Ok(text)
}

fn print_metadata(path: &Path, recording: &SessionRecording) {
    let counts = recording.edit_counts();
    println!("Session: {}", path.display());
    println!("Name: {}", recording.metadata.name);
    if let Some(description) = &recording.metadata.description {
        println!("Description: {}", description);
    }
    println!(
        "Recorded at: {}",
        recording.metadata.recorded_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("Duration: {}", format_duration(recording.duration_ms()));
    println!("Events: {}", recording.event_count());
    println!("  inserts:  {}", counts.inserts);
    println!("  deletes:  {}", counts.deletes);
    println!("  replaces: {}", counts.replaces);
    println!("Initial text: {} bytes", recording.initial_text.len());
}
