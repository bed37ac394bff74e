use crate::foundation::{
    error::{PodreelError, PodreelResult},
    time::{Segment, TimeSpan},
};

/// One utterance as reported by a transcriber, before validation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptEntry {
    /// Utterance text.
    pub text: String,
    /// Utterance start in seconds.
    pub start: f64,
    /// Utterance end in seconds.
    pub end: f64,
}

/// A timed piece of on-screen text.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionEntry {
    /// Non-empty caption text.
    pub text: String,
    /// Display interval on the timeline.
    pub span: TimeSpan,
}

/// An ordered sequence of caption entries.
///
/// Invariant: entries are sorted by start and do not overlap
/// (`entries[i].span.end <= entries[i+1].span.start`). Gaps are allowed;
/// silence between utterances is normal.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionTrack {
    entries: Vec<CaptionEntry>,
}

impl CaptionTrack {
    /// Build a track from raw transcriber output.
    ///
    /// Entries are trimmed, empty entries dropped, the sequence sorted by
    /// start time, and overlaps repaired (see [`CaptionTrack::repair`]).
    /// Fails with [`PodreelError::MalformedTranscript`] when any entry has
    /// `end <= start` or non-finite timing.
    pub fn from_transcript(transcript: &[TranscriptEntry]) -> PodreelResult<Self> {
        let mut entries = Vec::with_capacity(transcript.len());
        for raw in transcript {
            let text = raw.text.trim();
            if text.is_empty() {
                continue;
            }
            let span = TimeSpan::new(raw.start, raw.end).map_err(|_| {
                PodreelError::malformed_transcript(format!(
                    "utterance '{text}' has invalid timing {}..{}",
                    raw.start, raw.end
                ))
            })?;
            entries.push(CaptionEntry {
                text: text.to_owned(),
                span,
            });
        }
        entries.sort_by(|a, b| a.span.start.total_cmp(&b.span.start));
        Ok(Self {
            entries: repair_overlaps(entries),
        })
    }

    /// Synthesize one placeholder caption per segment, labeled by 1-based
    /// position. The last line of defense for caption availability; never
    /// fails.
    pub fn fallback_from_segments(segments: &[Segment]) -> Self {
        let entries = segments
            .iter()
            .enumerate()
            .map(|(i, seg)| CaptionEntry {
                text: format!("Segment {}", i + 1),
                span: seg.span,
            })
            .collect();
        Self { entries }
    }

    /// Ordered caption entries.
    pub fn entries(&self) -> &[CaptionEntry] {
        &self.entries
    }

    /// Whether the track has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All caption text joined by single spaces (topic extraction input).
    pub fn joined_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&entry.text);
        }
        out
    }

    /// Re-run overlap repair on the track. Idempotent; running repair twice
    /// yields the same track as running it once.
    pub fn repair(self) -> Self {
        Self {
            entries: repair_overlaps(self.entries),
        }
    }
}

/// Build a caption track from an optional transcript with a segmentation
/// fallback.
///
/// Absent transcription (transcriber unavailable or failed upstream) yields
/// the placeholder track; this path never raises.
pub fn build(
    transcript: Option<&[TranscriptEntry]>,
    fallback_segments: &[Segment],
) -> PodreelResult<CaptionTrack> {
    match transcript {
        Some(entries) => CaptionTrack::from_transcript(entries),
        None => Ok(CaptionTrack::fallback_from_segments(fallback_segments)),
    }
}

/// Clip the earlier of two overlapping entries to the later one's start; drop
/// the earlier entry entirely when clipping would leave a zero or negative
/// duration. Input must already be sorted by start.
fn repair_overlaps(entries: Vec<CaptionEntry>) -> Vec<CaptionEntry> {
    let mut out: Vec<CaptionEntry> = Vec::with_capacity(entries.len());
    let mut iter = entries.into_iter().peekable();
    while let Some(mut entry) = iter.next() {
        if let Some(next) = iter.peek() {
            if entry.span.end > next.span.start {
                if next.span.start <= entry.span.start {
                    // Fully shadowed by the next entry.
                    continue;
                }
                entry.span = TimeSpan {
                    start: entry.span.start,
                    end: next.span.start,
                };
            }
        }
        out.push(entry);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/captions/track.rs"]
mod tests;
