//! Elementary chord identification from sets of pitch names.

use crate::pitch::{note_name, pitch_class_number};

// Interval bitmasks over the 12 pitch classes.
const MAJOR_TRIAD: u16 = 1 << 0 | 1 << 4 | 1 << 7;
const MINOR_TRIAD: u16 = 1 << 0 | 1 << 3 | 1 << 7;

/// Drop digit characters from a pitch name, leaving the pitch-class name.
/// `C#4` → `C#`, `C-1` → `C-`.
fn strip_octave(name: &str) -> String {
    name.chars().filter(|c| !c.is_ascii_digit()).collect()
}

/// Intervals of `pitch_classes` relative to `root`, as a bitmask.
fn to_interval_mask(pitch_classes: &[u8], root: u8) -> u16 {
    let mut mask = 0u16;
    for &pc in pitch_classes {
        mask |= 1 << ((pc + 12 - root) % 12);
    }
    mask
}

/// Label a collection of pitch names with an elementary chord name.
///
/// Octave suffixes are stripped and pitch classes deduplicated in
/// first-encounter order. An empty input yields the empty string; fewer
/// than 3 distinct classes yields a `Note(s):` listing. Otherwise each
/// distinct class is tried as a root in ascending numeric order, and the
/// first one whose interval set contains a major (`{0,4,7}`) or minor
/// (`{0,3,7}`) triad names the chord. When no root matches, the fallback
/// is a `Notes:` listing of all distinct classes.
///
/// Names outside the fixed pitch-class table never take part in the
/// interval math but still appear in listings. Total: no input panics.
///
/// Root selection ignores which note was played lowest or first, so a
/// four-note cluster that embeds more than one triad is labeled by its
/// lowest matching pitch class, not necessarily the intended root (an
/// added-sixth chord comes back as the major triad on its lowest class).
pub fn identify_chord<S: AsRef<str>>(notes: &[S]) -> String {
    let mut classes: Vec<String> = Vec::new();
    for note in notes {
        let class = strip_octave(note.as_ref());
        if !classes.contains(&class) {
            classes.push(class);
        }
    }

    if classes.is_empty() {
        return String::new();
    }
    if classes.len() < 3 {
        return format!("Note(s): {}", classes.join(", "));
    }

    let mut numbers: Vec<u8> = classes
        .iter()
        .filter_map(|c| pitch_class_number(c))
        .collect();
    numbers.sort_unstable();
    numbers.dedup();

    for &root in &numbers {
        let intervals = to_interval_mask(&numbers, root);
        if intervals & MAJOR_TRIAD == MAJOR_TRIAD {
            return format!("{} Major", note_name(root));
        }
        if intervals & MINOR_TRIAD == MINOR_TRIAD {
            return format!("{} Minor", note_name(root));
        }
    }

    format!("Notes: {}", classes.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_empty_label() {
        let notes: [&str; 0] = [];
        assert_eq!(identify_chord(&notes), "");
    }

    #[test]
    fn single_note() {
        assert_eq!(identify_chord(&["C4"]), "Note(s): C");
    }

    #[test]
    fn two_notes() {
        assert_eq!(identify_chord(&["C4", "E4"]), "Note(s): C, E");
    }

    #[test]
    fn duplicate_across_octaves_is_one_note() {
        assert_eq!(identify_chord(&["C3", "C4", "C5"]), "Note(s): C");
    }

    #[test]
    fn c_major_triad() {
        assert_eq!(identify_chord(&["C4", "E4", "G4"]), "C Major");
    }

    #[test]
    fn c_minor_triad_with_flat_spelling() {
        assert_eq!(identify_chord(&["C4", "Eb4", "G4"]), "C Minor");
    }

    #[test]
    fn a_minor_triad() {
        assert_eq!(identify_chord(&["A3", "C4", "E4"]), "A Minor");
    }

    #[test]
    fn no_triad_falls_back_to_note_list() {
        assert_eq!(identify_chord(&["C4", "D4", "F#4"]), "Notes: C, D, F#");
    }

    #[test]
    fn octave_relabeling_is_invariant() {
        let close = identify_chord(&["C4", "E4", "G4"]);
        let spread = identify_chord(&["C2", "E5", "G7"]);
        assert_eq!(close, spread);
    }

    #[test]
    fn input_order_is_invariant_for_triads() {
        assert_eq!(identify_chord(&["G4", "C4", "E4"]), "C Major");
        assert_eq!(identify_chord(&["E4", "G4", "C5"]), "C Major");
    }

    #[test]
    fn first_inversion_still_named_by_root() {
        // E in the bass does not move the root: intervals are computed
        // from every candidate in ascending class order.
        assert_eq!(identify_chord(&["E3", "G3", "C4"]), "C Major");
    }

    #[test]
    fn unrecognized_names_drop_from_interval_math() {
        // C-1 strips to "C-", which is not in the table; the remaining
        // classes still form a triad.
        assert_eq!(identify_chord(&["C-1", "C4", "E4", "G4"]), "C Major");
    }

    #[test]
    fn unrecognized_names_stay_in_listings() {
        assert_eq!(identify_chord(&["C-1", "D4"]), "Note(s): C-, D");
    }

    // Known limitation: with 4+ classes the lowest matching class wins,
    // which can mislabel added-tone chords. C6 (C E G A) contains both a
    // C major and an A minor triad; C is tried first.
    #[test]
    fn added_sixth_labeled_by_lowest_matching_class() {
        assert_eq!(identify_chord(&["C4", "E4", "G4", "A4"]), "C Major");
    }

    #[test]
    fn sharp_roots_use_sharp_spelling() {
        assert_eq!(identify_chord(&["F#4", "A#4", "C#5"]), "F# Major");
        assert_eq!(identify_chord(&["Gb4", "Bb4", "Db5"]), "F# Major");
    }
}
