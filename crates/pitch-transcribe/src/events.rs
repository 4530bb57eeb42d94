use serde::{Deserialize, Serialize};

/// A detected note with onset and offset in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub start: f64,
    pub end: f64,
    pub pitch: u8,
    pub velocity: u8,
}

impl NoteEvent {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}
