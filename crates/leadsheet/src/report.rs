//! Chord-chart report formatting.

use chord_naming::{identify_chord, TimeBucket};

// Header inherited verbatim from the source system's report.
const HEADER: &str = "TEMPO      | ACORDE / NOTAS";
const RULE_WIDTH: usize = 30;

/// Render the two-column chord chart for a sequence of time buckets.
///
/// One row per bucket: the time as `<t>s` left-justified to 10 columns,
/// then ` | `, then the chord label. Ends with a trailing newline.
pub fn chord_chart(buckets: &[TimeBucket]) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    for bucket in buckets {
        let label = identify_chord(&bucket.notes);
        let time = format!("{:.1}s", bucket.time);
        out.push_str(&format!("{time:<10} | {label}\n"));
    }

    out
}
