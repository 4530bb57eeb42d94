//! Grouping of note onsets into tenth-of-a-second buckets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pitch::midi_to_note_name;

/// The pitch names judged simultaneous at one rounded onset time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    /// Onset rounded to one decimal place, in seconds.
    pub time: f64,
    /// Deduplicated pitch names, sorted lexicographically.
    pub notes: Vec<String>,
}

/// Group `(onset_seconds, pitch)` pairs into buckets keyed by the onset
/// rounded to a tenth of a second.
///
/// Onsets that round to the same tenth merge into one bucket. Each
/// bucket's pitch names are deduplicated and sorted, and buckets come
/// back in ascending time order regardless of input order.
pub fn bucket_onsets<I>(onsets: I) -> Vec<TimeBucket>
where
    I: IntoIterator<Item = (f64, u8)>,
{
    // Keyed by integer tenths so ordering never depends on float keys.
    let mut buckets: BTreeMap<i64, Vec<String>> = BTreeMap::new();

    for (start, pitch) in onsets {
        let tenths = (start * 10.0).round() as i64;
        buckets
            .entry(tenths)
            .or_default()
            .push(midi_to_note_name(pitch));
    }

    buckets
        .into_iter()
        .map(|(tenths, mut notes)| {
            notes.sort();
            notes.dedup();
            TimeBucket {
                time: tenths as f64 / 10.0,
                notes,
            }
        })
        .collect()
}
