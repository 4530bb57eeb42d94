//! Fixed pitch-class tables and MIDI-number-to-note-name conversion.

/// Canonical spellings for the 12 pitch classes, sharps preferred.
pub const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Canonical name for a pitch class. Index taken modulo 12.
pub fn note_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES_SHARP[(pitch_class % 12) as usize]
}

/// Pitch-class number for a note name, folding flat spellings onto sharps.
///
/// The table has 17 entries (12 sharps/naturals plus 5 flats). Returns
/// `None` for anything else.
pub fn pitch_class_number(name: &str) -> Option<u8> {
    let num = match name {
        "C" => 0,
        "C#" | "Db" => 1,
        "D" => 2,
        "D#" | "Eb" => 3,
        "E" => 4,
        "F" => 5,
        "F#" | "Gb" => 6,
        "G" => 7,
        "G#" | "Ab" => 8,
        "A" => 9,
        "A#" | "Bb" => 10,
        "B" => 11,
        _ => return None,
    };
    Some(num)
}

/// Convert a MIDI pitch number to a note name with octave, e.g. 60 → `C4`.
///
/// Octave follows the MIDI convention `floor(pitch / 12) - 1`, so pitch 0
/// is `C-1`.
pub fn midi_to_note_name(pitch: u8) -> String {
    let octave = (pitch / 12) as i16 - 1;
    format!("{}{}", note_name(pitch % 12), octave)
}
