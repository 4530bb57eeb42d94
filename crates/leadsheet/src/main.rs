//! leadsheet - transcribe an audio recording into an elementary chord chart.
//!
//! Runs an external automatic-music-transcription tool over the input
//! audio, saves the resulting MIDI, groups detected note onsets into
//! tenth-of-a-second buckets, and prints one chord label per bucket.

mod config;
mod report;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use chord_naming::bucket_onsets;
use config::LeadsheetConfig;
use pitch_transcribe::{CommandTranscriber, Transcriber};

#[derive(Parser, Debug)]
#[command(name = "leadsheet")]
#[command(about = "Transcribe audio into an elementary chord chart")]
#[command(version)]
struct Cli {
    /// Audio file to transcribe
    #[arg(default_value = "musica.wav")]
    audio: PathBuf,

    /// Where to save the transcribed MIDI
    #[arg(short, long, default_value = "resultado_final.mid")]
    output: PathBuf,

    /// Config file (default: ./leadsheet.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// External transcriber program (overrides config)
    #[arg(short, long)]
    transcriber: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut config =
        LeadsheetConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(program) = cli.transcriber {
        config.transcriber = program;
    }

    if !cli.audio.exists() {
        bail!("input file '{}' does not exist", cli.audio.display());
    }

    info!(audio = %cli.audio.display(), "reading input");
    info!(program = %config.transcriber, "analyzing audio");

    let transcriber = CommandTranscriber::new(config.transcriber.clone())
        .with_args(config.transcriber_args.clone());
    let transcription = transcriber
        .transcribe(&cli.audio)
        .context("transcription failed")?;

    transcription
        .document
        .write_to(&cli.output)
        .with_context(|| format!("writing MIDI to '{}'", cli.output.display()))?;

    let buckets = bucket_onsets(transcription.events.iter().map(|e| (e.start, e.pitch)));

    print!("{}", report::chord_chart(&buckets));
    println!("\nMIDI saved as '{}'", cli.output.display());

    Ok(())
}
