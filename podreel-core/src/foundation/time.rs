use crate::foundation::error::{PodreelError, PodreelResult};

/// Tolerance in seconds used when comparing accumulated span arithmetic
/// against a total duration. Absorbs floating point drift across a timeline.
pub const SPAN_EPSILON: f64 = 1e-3;

/// A half-open interval `[start, end)` on the master timeline, in seconds.
///
/// Immutable once created; [`TimeSpan::new`] rejects invalid spans up front
/// rather than deferring to a renderer-time failure.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeSpan {
    /// Start time in seconds (>= 0).
    pub start: f64,
    /// End time in seconds (> start).
    pub end: f64,
}

impl TimeSpan {
    /// Create a span, validating `0 <= start < end` and finiteness.
    pub fn new(start: f64, end: f64) -> PodreelResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(PodreelError::invalid_input(format!(
                "time span bounds must be finite (got {start}..{end})"
            )));
        }
        if start < 0.0 {
            return Err(PodreelError::invalid_input(format!(
                "time span start must be >= 0 (got {start})"
            )));
        }
        if end <= start {
            return Err(PodreelError::invalid_input(format!(
                "time span end must be > start (got {start}..{end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Span length in seconds.
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Whether `t` falls inside the half-open interval.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// Visual treatment category of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SegmentKind {
    /// Ordinary narrated content.
    Content,
}

/// A non-overlapping interval on the master timeline, assigned one visual
/// treatment downstream.
///
/// An ordered sequence of segments produced by the segmenter is gapless and
/// covers `[0, total]`; see [`validate_cover`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Timeline placement.
    pub span: TimeSpan,
    /// Treatment category.
    pub kind: SegmentKind,
    /// Position in the sequence (0-based).
    pub index: usize,
}

/// Validate that `segments` is an ordered, gapless, non-overlapping cover of
/// `[0, total_sec]` within [`SPAN_EPSILON`].
pub fn validate_cover(segments: &[Segment], total_sec: f64) -> PodreelResult<()> {
    let Some(first) = segments.first() else {
        return Err(PodreelError::empty_timeline(
            "segment sequence must be non-empty",
        ));
    };
    if first.span.start.abs() > SPAN_EPSILON {
        return Err(PodreelError::invalid_input(format!(
            "segment cover must start at 0 (got {})",
            first.span.start
        )));
    }
    for pair in segments.windows(2) {
        if (pair[0].span.end - pair[1].span.start).abs() > SPAN_EPSILON {
            return Err(PodreelError::invalid_input(format!(
                "segment cover has a gap or overlap at index {}: {} -> {}",
                pair[1].index, pair[0].span.end, pair[1].span.start
            )));
        }
    }
    let last = segments[segments.len() - 1];
    if (last.span.end - total_sec).abs() > SPAN_EPSILON {
        return Err(PodreelError::invalid_input(format!(
            "segment cover must end at {total_sec} (got {})",
            last.span.end
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/time.rs"]
mod tests;
