//! Audio-to-MIDI transcription boundary.
//!
//! Wraps an external automatic-music-transcription tool behind the
//! [`Transcriber`] trait and turns its Standard MIDI File output into
//! [`NoteEvent`]s with onset and offset times in seconds.

pub mod events;
pub mod smf;
pub mod transcriber;

pub use events::NoteEvent;
pub use smf::{extract_events, MidiDocument};
pub use transcriber::{CommandTranscriber, Transcriber, Transcription};

use std::path::PathBuf;

/// Errors from the transcription boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to run transcriber '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("transcriber '{program}' failed ({status}): {stderr}")]
    TranscriberFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("transcriber produced no output at {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("MIDI parse error: {0}")]
    MidiParse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
