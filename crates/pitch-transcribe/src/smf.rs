//! Standard MIDI File reading and writing for the transcription boundary.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};

use crate::events::NoteEvent;
use crate::{Error, Result};

const DEFAULT_TEMPO_USEC: u32 = 500_000; // 120 BPM
const DEFAULT_PPQ: u16 = 480;

#[derive(Debug, Clone, Copy)]
struct TempoChange {
    tick: u64,
    microseconds_per_beat: u32,
}

/// Piecewise tick-to-seconds conversion over a file's tempo map.
#[derive(Debug, Clone)]
struct TempoMap {
    ppq: u16,
    changes: Vec<TempoChange>,
}

impl TempoMap {
    fn new(ppq: u16, mut changes: Vec<TempoChange>) -> Self {
        changes.sort_by_key(|c| c.tick);
        changes.dedup_by(|a, b| {
            a.tick == b.tick && a.microseconds_per_beat == b.microseconds_per_beat
        });

        // Files with no tempo meta default to 120 BPM from tick 0.
        if changes.first().map_or(true, |c| c.tick > 0) {
            changes.insert(
                0,
                TempoChange {
                    tick: 0,
                    microseconds_per_beat: DEFAULT_TEMPO_USEC,
                },
            );
        }

        Self { ppq, changes }
    }

    /// Seconds elapsed from tick 0 to `tick`.
    fn tick_to_seconds(&self, tick: u64) -> f64 {
        let mut seconds = 0.0;
        let mut segment_start = 0u64;
        let mut usec_per_beat = DEFAULT_TEMPO_USEC;

        for change in &self.changes {
            if change.tick >= tick {
                break;
            }
            seconds += ticks_to_secs(change.tick - segment_start, usec_per_beat, self.ppq);
            segment_start = change.tick;
            usec_per_beat = change.microseconds_per_beat;
        }

        seconds + ticks_to_secs(tick - segment_start, usec_per_beat, self.ppq)
    }
}

fn ticks_to_secs(delta_ticks: u64, usec_per_beat: u32, ppq: u16) -> f64 {
    delta_ticks as f64 * usec_per_beat as f64 / (ppq as f64 * 1_000_000.0)
}

/// Extract note events from a parsed SMF.
///
/// Pairs note-on/note-off per (channel, key) with a pending stack, closes
/// unterminated notes at each track's final tick, converts absolute ticks
/// to seconds via the tempo map, and sorts by onset then pitch.
pub fn extract_events(smf: &Smf) -> Vec<NoteEvent> {
    let ppq = match smf.header.timing {
        midly::Timing::Metrical(ticks) => ticks.as_int(),
        midly::Timing::Timecode(_, _) => DEFAULT_PPQ,
    };

    let mut tempo_changes = Vec::new();
    // (onset_tick, offset_tick, pitch, velocity)
    let mut raw: Vec<(u64, u64, u8, u8)> = Vec::new();

    for track in &smf.tracks {
        let mut current_tick: u64 = 0;
        let mut pending: HashMap<(u8, u8), Vec<(u64, u8)>> = HashMap::new();

        for event in track {
            current_tick += event.delta.as_int() as u64;

            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => {
                    tempo_changes.push(TempoChange {
                        tick: current_tick,
                        microseconds_per_beat: tempo.as_int(),
                    });
                }
                TrackEventKind::Midi { channel, message } => {
                    let ch = channel.as_int();
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            pending
                                .entry((ch, key.as_int()))
                                .or_default()
                                .push((current_tick, vel.as_int()));
                        }
                        MidiMessage::NoteOff { key, .. } | MidiMessage::NoteOn { key, .. } => {
                            // vel=0 NoteOn is NoteOff
                            if let Some(stack) = pending.get_mut(&(ch, key.as_int())) {
                                if let Some((onset, velocity)) = stack.pop() {
                                    raw.push((onset, current_tick, key.as_int(), velocity));
                                }
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        for ((_, pitch), stack) in &pending {
            for &(onset, velocity) in stack {
                raw.push((onset, current_tick, *pitch, velocity));
            }
        }
    }

    let map = TempoMap::new(ppq, tempo_changes);

    let mut events: Vec<NoteEvent> = raw
        .into_iter()
        .map(|(onset, offset, pitch, velocity)| NoteEvent {
            start: map.tick_to_seconds(onset),
            end: map.tick_to_seconds(offset),
            pitch,
            velocity,
        })
        .collect();

    events.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.pitch.cmp(&b.pitch)));
    events
}

/// The transcriber's symbolic output, carried as raw SMF bytes.
#[derive(Debug, Clone)]
pub struct MidiDocument {
    bytes: Vec<u8>,
}

impl MidiDocument {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parse the document and extract its note events.
    pub fn events(&self) -> Result<Vec<NoteEvent>> {
        let smf = Smf::parse(&self.bytes).map_err(|e| Error::MidiParse(e.to_string()))?;
        Ok(extract_events(&smf))
    }

    /// Persist the document to disk.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Build a format-0 SMF from note events at 120 BPM and 480 PPQ.
    ///
    /// Lets non-subprocess backends and tests produce a writable document.
    pub fn from_events(events: &[NoteEvent]) -> Self {
        // At 500_000 usec/beat and 480 PPQ one second is 960 ticks.
        let secs_to_ticks = |secs: f64| (secs * 960.0).round().max(0.0) as u64;

        let mut timed: Vec<(u64, [u8; 3])> = Vec::new();
        for event in events {
            // Data bytes must stay below 0x80.
            let pitch = event.pitch.min(127);
            let velocity = event.velocity.clamp(1, 127);
            timed.push((secs_to_ticks(event.start), [0x90, pitch, velocity]));
            timed.push((secs_to_ticks(event.end), [0x80, pitch, 0]));
        }

        // Note-offs before note-ons at the same tick.
        timed.sort_by(|a, b| {
            a.0.cmp(&b.0).then_with(|| {
                let a_is_off = a.1[0] & 0xF0 == 0x80;
                let b_is_off = b.1[0] & 0xF0 == 0x80;
                b_is_off.cmp(&a_is_off)
            })
        });

        let mut track = Vec::new();
        write_vlq(&mut track, 0);
        track.extend_from_slice(&[
            0xFF,
            0x51,
            0x03,
            (DEFAULT_TEMPO_USEC >> 16) as u8,
            (DEFAULT_TEMPO_USEC >> 8) as u8,
            DEFAULT_TEMPO_USEC as u8,
        ]);

        let mut last_tick = 0u64;
        for (tick, data) in timed {
            write_vlq(&mut track, (tick - last_tick) as u32);
            track.extend_from_slice(&data);
            last_tick = tick;
        }

        write_vlq(&mut track, 0);
        track.extend_from_slice(&[0xFF, 0x2F, 0x00]);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"MThd");
        bytes.extend_from_slice(&6u32.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes()); // format 0
        bytes.extend_from_slice(&1u16.to_be_bytes());
        bytes.extend_from_slice(&DEFAULT_PPQ.to_be_bytes());
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(track.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&track);

        Self { bytes }
    }
}

/// Write a variable-length quantity to a byte buffer.
fn write_vlq(buf: &mut Vec<u8>, mut value: u32) {
    if value == 0 {
        buf.push(0);
        return;
    }

    let mut bytes = Vec::new();
    bytes.push((value & 0x7F) as u8);
    value >>= 7;

    while value > 0 {
        bytes.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }

    bytes.reverse();
    buf.extend_from_slice(&bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event(start: f64, end: f64, pitch: u8) -> NoteEvent {
        NoteEvent {
            start,
            end,
            pitch,
            velocity: 100,
        }
    }

    #[test]
    fn vlq_small_values() {
        let mut buf = Vec::new();
        write_vlq(&mut buf, 0);
        write_vlq(&mut buf, 0x7F);
        assert_eq!(buf, vec![0x00, 0x7F]);
    }

    #[test]
    fn vlq_multi_byte() {
        let mut buf = Vec::new();
        write_vlq(&mut buf, 480);
        assert_eq!(buf, vec![0x83, 0x60]);

        buf.clear();
        write_vlq(&mut buf, 0x4000);
        assert_eq!(buf, vec![0x81, 0x80, 0x00]);
    }

    #[test]
    fn default_tempo_tick_to_seconds() {
        let map = TempoMap::new(480, vec![]);
        assert_eq!(map.tick_to_seconds(0), 0.0);
        assert_eq!(map.tick_to_seconds(480), 0.5);
        assert_eq!(map.tick_to_seconds(960), 1.0);
    }

    #[test]
    fn tempo_change_shifts_later_events() {
        // 120 BPM for the first beat, then 60 BPM.
        let map = TempoMap::new(
            480,
            vec![
                TempoChange {
                    tick: 0,
                    microseconds_per_beat: 500_000,
                },
                TempoChange {
                    tick: 480,
                    microseconds_per_beat: 1_000_000,
                },
            ],
        );
        assert_eq!(map.tick_to_seconds(480), 0.5);
        assert_eq!(map.tick_to_seconds(960), 1.5);
    }

    #[test]
    fn from_events_parses_with_midly() {
        let doc = MidiDocument::from_events(&[event(0.0, 0.5, 60), event(0.5, 1.0, 64)]);
        let smf = Smf::parse(doc.as_bytes()).expect("generated SMF should be valid");
        assert_eq!(smf.header.format, midly::Format::SingleTrack);
        assert_eq!(smf.tracks.len(), 1);
    }

    #[test]
    fn from_events_round_trips_through_extraction() {
        let original = vec![event(0.0, 0.5, 60), event(0.0, 0.5, 64), event(1.0, 1.5, 67)];
        let doc = MidiDocument::from_events(&original);
        let extracted = doc.events().unwrap();

        assert_eq!(extracted.len(), 3);
        assert_eq!(extracted[0].pitch, 60);
        assert_eq!(extracted[1].pitch, 64);
        assert_eq!(extracted[2].pitch, 67);
        assert!((extracted[0].start - 0.0).abs() < 1e-9);
        assert!((extracted[2].start - 1.0).abs() < 1e-9);
        assert!((extracted[2].end - 1.5).abs() < 1e-9);
    }

    #[test]
    fn extraction_sorts_by_onset_then_pitch() {
        let doc = MidiDocument::from_events(&[event(1.0, 1.5, 72), event(0.0, 0.5, 60)]);
        let extracted = doc.events().unwrap();
        assert_eq!(extracted[0].pitch, 60);
        assert_eq!(extracted[1].pitch, 72);
    }

    #[test]
    fn write_to_persists_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mid");

        let doc = MidiDocument::from_events(&[event(0.0, 0.5, 60)]);
        doc.write_to(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, doc.as_bytes());
    }

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let doc = MidiDocument::from_bytes(vec![1, 2, 3, 4]);
        assert!(matches!(doc.events(), Err(Error::MidiParse(_))));
    }
}
