//! The transcription adapter: an external AMT tool behind a trait seam.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::events::NoteEvent;
use crate::smf::MidiDocument;
use crate::{Error, Result};

/// A completed transcription: the MIDI document and its note events.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub document: MidiDocument,
    pub events: Vec<NoteEvent>,
}

/// Seam for the opaque audio-to-MIDI inference backend.
///
/// Production uses [`CommandTranscriber`]; tests substitute stub
/// implementations.
pub trait Transcriber {
    fn transcribe(&self, audio: &Path) -> Result<Transcription>;
}

/// Runs an external AMT program in a temporary output directory and reads
/// back the MIDI it emits.
///
/// The program is invoked as `<program> [extra args] <output-dir> <audio>`
/// and is expected to write `<audio-stem>_basic_pitch.mid` into the output
/// directory, the naming of the default `basic-pitch` CLI.
pub struct CommandTranscriber {
    program: String,
    extra_args: Vec<String>,
}

impl CommandTranscriber {
    pub const DEFAULT_PROGRAM: &'static str = "basic-pitch";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    fn output_name(audio: &Path) -> PathBuf {
        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        PathBuf::from(format!("{stem}_basic_pitch.mid"))
    }
}

impl Default for CommandTranscriber {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl Transcriber for CommandTranscriber {
    fn transcribe(&self, audio: &Path) -> Result<Transcription> {
        let out_dir = tempfile::tempdir()?;
        info!(
            program = %self.program,
            audio = %audio.display(),
            "running transcriber"
        );

        let output = Command::new(&self.program)
            .args(&self.extra_args)
            .arg(out_dir.path())
            .arg(audio)
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::TranscriberFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let midi_path = out_dir.path().join(Self::output_name(audio));
        if !midi_path.exists() {
            return Err(Error::MissingOutput(midi_path));
        }

        let bytes = std::fs::read(&midi_path)?;
        debug!(bytes = bytes.len(), path = %midi_path.display(), "read transcriber output");

        let document = MidiDocument::from_bytes(bytes);
        let events = document.events()?;
        info!(events = events.len(), "transcription complete");

        Ok(Transcription { document, events })
    }
}
