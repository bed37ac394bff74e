use super::*;

use crate::foundation::time::validate_cover;

#[test]
fn equal_division_covers_exactly() {
    for (total, count) in [(30.0, 3), (10.0, 1), (7.0, 4), (0.5, 7)] {
        let segs = segment(total, &SegmentPolicy::EqualDivision { item_count: count }).unwrap();
        assert_eq!(segs.len(), count);
        validate_cover(&segs, total).unwrap();
        let expected = total / count as f64;
        for (i, seg) in segs.iter().enumerate() {
            assert_eq!(seg.index, i);
            assert!((seg.span.duration() - expected).abs() < SPAN_EPSILON);
        }
        assert_eq!(segs[0].span.start, 0.0);
        assert_eq!(segs[count - 1].span.end, total);
    }
}

#[test]
fn equal_division_rejects_zero_items() {
    assert!(matches!(
        segment(10.0, &SegmentPolicy::EqualDivision { item_count: 0 }),
        Err(PodreelError::InvalidInput(_))
    ));
}

#[test]
fn fixed_chunk_truncates_last_segment() {
    let segs = segment(12.0, &SegmentPolicy::FixedChunk { chunk_sec: 5.0 }).unwrap();
    assert_eq!(segs.len(), 3);
    validate_cover(&segs, 12.0).unwrap();
    assert!((segs[0].span.duration() - 5.0).abs() < SPAN_EPSILON);
    assert!((segs[1].span.duration() - 5.0).abs() < SPAN_EPSILON);
    assert!((segs[2].span.duration() - 2.0).abs() < SPAN_EPSILON);
}

#[test]
fn fixed_chunk_drops_zero_length_trailing_segment() {
    let segs = segment(10.0, &SegmentPolicy::FixedChunk { chunk_sec: 5.0 }).unwrap();
    assert_eq!(segs.len(), 2);
    validate_cover(&segs, 10.0).unwrap();
    assert!((segs[1].span.duration() - 5.0).abs() < SPAN_EPSILON);
}

#[test]
fn fixed_chunk_count_matches_ceil() {
    for (total, chunk) in [(9.9, 2.0), (0.3, 0.1), (61.0, 8.0)] {
        let segs = segment(total, &SegmentPolicy::FixedChunk { chunk_sec: chunk }).unwrap();
        let expected = (total / chunk).ceil() as usize;
        // The evenly-divisible case drops its zero-length tail.
        assert!(segs.len() == expected || segs.len() + 1 == expected);
        validate_cover(&segs, total).unwrap();
        for seg in &segs[..segs.len() - 1] {
            assert!((seg.span.duration() - chunk).abs() < SPAN_EPSILON);
        }
    }
}

#[test]
fn fixed_chunk_rejects_bad_length() {
    assert!(segment(10.0, &SegmentPolicy::FixedChunk { chunk_sec: 0.0 }).is_err());
    assert!(segment(10.0, &SegmentPolicy::FixedChunk { chunk_sec: -1.0 }).is_err());
    assert!(segment(10.0, &SegmentPolicy::FixedChunk { chunk_sec: f64::NAN }).is_err());
}

#[test]
fn segment_rejects_non_positive_duration() {
    assert!(segment(0.0, &SegmentPolicy::EqualDivision { item_count: 1 }).is_err());
    assert!(segment(-5.0, &SegmentPolicy::FixedChunk { chunk_sec: 1.0 }).is_err());
}

#[test]
fn adaptive_length_is_bounded() {
    let energy = vec![0.2f32; 1000];

    // Long audio: total/10 exceeds the max bound, so segments run max long.
    let segs = segment(200.0, &SegmentPolicy::Adaptive(AdaptiveParams::new(&energy, 86))).unwrap();
    validate_cover(&segs, 200.0).unwrap();
    assert!((segs[0].span.duration() - 8.0).abs() < SPAN_EPSILON);

    // Short audio: total/10 is under the min bound, clamped up to min.
    let segs = segment(10.0, &SegmentPolicy::Adaptive(AdaptiveParams::new(&energy, 86))).unwrap();
    validate_cover(&segs, 10.0).unwrap();
    assert!((segs[0].span.duration() - 2.0).abs() < SPAN_EPSILON);
}

#[test]
fn adaptive_handles_empty_energy() {
    let segs = segment(60.0, &SegmentPolicy::Adaptive(AdaptiveParams::new(&[], 0))).unwrap();
    validate_cover(&segs, 60.0).unwrap();
    // 60 / 10 = 6s derived length within [2, 8].
    assert!((segs[0].span.duration() - 6.0).abs() < SPAN_EPSILON);
}

#[test]
fn adaptive_rejects_inverted_bounds() {
    let params = AdaptiveParams {
        energy: &[],
        sample_rate: 0,
        min_segment_sec: 5.0,
        max_segment_sec: 2.0,
    };
    assert!(segment(60.0, &SegmentPolicy::Adaptive(params)).is_err());
}

#[test]
fn policies_are_reproducible() {
    let energy = vec![0.5f32; 64];
    let a = segment(33.3, &SegmentPolicy::Adaptive(AdaptiveParams::new(&energy, 86))).unwrap();
    let b = segment(33.3, &SegmentPolicy::Adaptive(AdaptiveParams::new(&energy, 86))).unwrap();
    assert_eq!(a, b);
}
