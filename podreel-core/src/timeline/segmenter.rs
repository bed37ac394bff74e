use crate::foundation::{
    error::{PodreelError, PodreelResult},
    time::{SPAN_EPSILON, Segment, SegmentKind, TimeSpan},
};

/// Inputs for the adaptive (energy-informed) segmentation policy.
///
/// The energy samples drive the segment *length* choice, not per-segment cut
/// points: a scalar threshold is derived (mean energy x a fixed damping
/// factor) and a uniform segment length bounded to
/// `[min_segment_sec, max_segment_sec]` is used for contiguous fixed-length
/// segments. Precise boundary detection via local energy minima is a future
/// extension of this policy, not part of the current contract.
#[derive(Clone, Debug)]
pub struct AdaptiveParams<'a> {
    /// Per-frame RMS energy samples.
    pub energy: &'a [f32],
    /// Energy frame rate in frames per second of audio.
    pub sample_rate: u32,
    /// Lower bound on the derived segment length, in seconds.
    pub min_segment_sec: f64,
    /// Upper bound on the derived segment length, in seconds.
    pub max_segment_sec: f64,
}

impl<'a> AdaptiveParams<'a> {
    /// Default bounds: segments between 2 and 8 seconds.
    pub fn new(energy: &'a [f32], sample_rate: u32) -> Self {
        Self {
            energy,
            sample_rate,
            min_segment_sec: 2.0,
            max_segment_sec: 8.0,
        }
    }
}

/// Timeline allocation policy for [`segment`].
#[derive(Clone, Debug)]
pub enum SegmentPolicy<'a> {
    /// Exactly `item_count` segments of equal duration.
    EqualDivision {
        /// Number of segments to produce (>= 1).
        item_count: usize,
    },
    /// Segments of `chunk_sec` each; the last is truncated to fit.
    FixedChunk {
        /// Target chunk length in seconds (> 0).
        chunk_sec: f64,
    },
    /// Energy-informed uniform length; see [`AdaptiveParams`].
    Adaptive(AdaptiveParams<'a>),
}

/// Damping factor applied to the mean energy when deriving the adaptive
/// threshold.
const ENERGY_DAMPING: f64 = 0.5;

/// Partition `[0, total_sec]` into an ordered, gapless, non-overlapping
/// sequence of segments under `policy`.
///
/// Pure function of its declared inputs; results are reproducible. When the
/// audio analyzer is unavailable, callers substitute
/// [`SegmentPolicy::FixedChunk`] transparently instead of calling the
/// adaptive policy with fabricated samples.
pub fn segment(total_sec: f64, policy: &SegmentPolicy<'_>) -> PodreelResult<Vec<Segment>> {
    if !total_sec.is_finite() || total_sec <= 0.0 {
        return Err(PodreelError::invalid_input(format!(
            "total duration must be finite and > 0 (got {total_sec})"
        )));
    }

    match policy {
        SegmentPolicy::EqualDivision { item_count } => equal_division(total_sec, *item_count),
        SegmentPolicy::FixedChunk { chunk_sec } => fixed_chunk(total_sec, *chunk_sec),
        SegmentPolicy::Adaptive(params) => adaptive(total_sec, params),
    }
}

fn equal_division(total_sec: f64, item_count: usize) -> PodreelResult<Vec<Segment>> {
    if item_count == 0 {
        return Err(PodreelError::invalid_input(
            "equal-division item_count must be >= 1",
        ));
    }

    let n = item_count as f64;
    let mut out = Vec::with_capacity(item_count);
    for i in 0..item_count {
        let start = total_sec * (i as f64) / n;
        let end = if i + 1 == item_count {
            total_sec
        } else {
            total_sec * ((i + 1) as f64) / n
        };
        out.push(Segment {
            span: TimeSpan::new(start, end)?,
            kind: SegmentKind::Content,
            index: i,
        });
    }
    Ok(out)
}

fn fixed_chunk(total_sec: f64, chunk_sec: f64) -> PodreelResult<Vec<Segment>> {
    if !chunk_sec.is_finite() || chunk_sec <= 0.0 {
        return Err(PodreelError::invalid_input(format!(
            "fixed-chunk length must be finite and > 0 (got {chunk_sec})"
        )));
    }

    let mut count = (total_sec / chunk_sec).ceil() as usize;
    count = count.max(1);
    // A ceil() pushed over an integer boundary by float noise would leave a
    // trailing segment of (near-)zero length; drop it.
    while count > 1 && (count - 1) as f64 * chunk_sec >= total_sec - SPAN_EPSILON {
        count -= 1;
    }

    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let start = chunk_sec * (i as f64);
        let end = if i + 1 == count {
            total_sec
        } else {
            chunk_sec * ((i + 1) as f64)
        };
        out.push(Segment {
            span: TimeSpan::new(start, end)?,
            kind: SegmentKind::Content,
            index: i,
        });
    }
    Ok(out)
}

fn adaptive(total_sec: f64, params: &AdaptiveParams<'_>) -> PodreelResult<Vec<Segment>> {
    if params.min_segment_sec <= 0.0 || params.max_segment_sec < params.min_segment_sec {
        return Err(PodreelError::invalid_input(
            "adaptive bounds must satisfy 0 < min_segment_sec <= max_segment_sec",
        ));
    }

    let mean_energy = if params.energy.is_empty() {
        0.0
    } else {
        params.energy.iter().map(|&e| f64::from(e)).sum::<f64>() / params.energy.len() as f64
    };
    let threshold = mean_energy * ENERGY_DAMPING;
    tracing::debug!(
        threshold,
        sample_rate = params.sample_rate,
        samples = params.energy.len(),
        "derived adaptive energy threshold"
    );

    let derived = (total_sec / 10.0)
        .min(params.max_segment_sec)
        .max(params.min_segment_sec)
        .min(total_sec);
    fixed_chunk(total_sec, derived)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/segmenter.rs"]
mod tests;
