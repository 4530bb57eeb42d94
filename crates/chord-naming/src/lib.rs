//! Pitch-class naming and elementary chord identification.
//!
//! Everything here is pure and synchronous: fixed pitch-class tables,
//! MIDI-number-to-note-name conversion, grouping of note onsets into
//! tenth-of-a-second buckets, and labeling a set of pitch names as a
//! major/minor triad or a plain note list.

pub mod buckets;
pub mod chords;
pub mod pitch;

pub use buckets::{bucket_onsets, TimeBucket};
pub use chords::identify_chord;
pub use pitch::{midi_to_note_name, note_name, pitch_class_number};
