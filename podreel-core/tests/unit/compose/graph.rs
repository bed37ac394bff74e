use super::*;

use crate::{
    captions::track::TranscriptEntry,
    config::CaptionStyle,
    timeline::segmenter::{SegmentPolicy, segment},
    visuals::resolve::resolve_color_only,
};

fn audio(duration_sec: f64) -> AudioRef {
    AudioRef {
        path: PathBuf::from("/in/narration.mp3"),
        duration_sec,
    }
}

fn bindings(total: f64, count: usize, config: &VideoConfig) -> Vec<VisualBinding> {
    let segs = segment(total, &SegmentPolicy::EqualDivision { item_count: count }).unwrap();
    resolve_color_only(&segs, config)
}

fn track(entries: &[(&str, f64, f64)]) -> CaptionTrack {
    let raw: Vec<TranscriptEntry> = entries
        .iter()
        .map(|(text, start, end)| TranscriptEntry {
            text: (*text).to_owned(),
            start: *start,
            end: *end,
        })
        .collect();
    CaptionTrack::from_transcript(&raw).unwrap()
}

#[test]
fn empty_bindings_are_rejected() {
    let config = VideoConfig::default();
    assert!(matches!(
        compose(&[], None, &audio(10.0), None, &config),
        Err(PodreelError::EmptyTimeline(_))
    ));
}

#[test]
fn duration_mismatch_is_rejected() {
    let config = VideoConfig::default();
    let binds = bindings(9.5, 2, &config);
    let result = compose(&binds, None, &audio(10.0), None, &config);
    match result {
        Err(PodreelError::DurationMismatch {
            expected_sec,
            actual_sec,
        }) => {
            assert_eq!(expected_sec, 10.0);
            assert!((actual_sec - 9.5).abs() < SPAN_EPSILON);
        }
        other => panic!("expected duration mismatch, got {other:?}"),
    }
}

#[test]
fn landscape_layer_census() {
    let config = VideoConfig::default();
    let binds = bindings(30.0, 3, &config);
    let captions = track(&[("hello world", 0.0, 2.0), ("next point", 2.0, 5.0)]);

    let graph = compose(&binds, Some(&captions), &audio(30.0), None, &config).unwrap();

    assert_eq!(graph.duration_sec, 30.0);
    assert_eq!(graph.fps, config.fps);
    assert_eq!(graph.layers_at(Z_AUDIO).count(), 1);
    assert_eq!(graph.layers_at(Z_BASE).count(), 3);
    assert_eq!(graph.layers_at(Z_CAPTION_BACKDROP).count(), 2);
    assert_eq!(graph.layers_at(Z_CAPTION_TEXT).count(), 2);
    assert_eq!(graph.layers_at(Z_HOOK).count(), 0);
    assert_eq!(graph.layers.len(), 8);
}

#[test]
fn layers_are_sorted_by_z_with_insertion_order_preserved() {
    let config = VideoConfig::default();
    let binds = bindings(30.0, 3, &config);
    let captions = track(&[("one", 0.0, 2.0), ("two", 2.0, 5.0)]);

    let graph = compose(&binds, Some(&captions), &audio(30.0), Some("Hook"), &config).unwrap();

    let zs: Vec<i32> = graph.layers.iter().map(|l| l.z_order).collect();
    let mut sorted = zs.clone();
    sorted.sort();
    assert_eq!(zs, sorted);

    // Base visuals keep timeline order within their level.
    let starts: Vec<f64> = graph.visual_bindings().map(|b| b.segment.span.start).collect();
    assert!(starts.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn disabled_captions_compose_no_caption_layers() {
    let mut config = VideoConfig::default();
    config.captions_enabled = false;
    let binds = bindings(10.0, 2, &config);
    let captions = track(&[("hidden", 0.0, 2.0)]);

    let graph = compose(&binds, Some(&captions), &audio(10.0), None, &config).unwrap();
    assert_eq!(graph.layers_at(Z_CAPTION_BACKDROP).count(), 0);
    assert_eq!(graph.layers_at(Z_CAPTION_TEXT).count(), 0);
}

#[test]
fn modern_style_uppercases_and_backs_text() {
    let config = VideoConfig::default();
    let binds = bindings(10.0, 2, &config);
    let captions = track(&[("hello world", 0.0, 2.0)]);

    let graph = compose(&binds, Some(&captions), &audio(10.0), None, &config).unwrap();
    let text_layer = graph.layers_at(Z_CAPTION_TEXT).next().unwrap();
    match &text_layer.content {
        LayerContent::CaptionText(text) => {
            assert_eq!(text.text, "HELLO WORLD");
            assert_eq!(text.color_rgba8, [255, 221, 51, 255]);
        }
        other => panic!("expected caption text, got {other:?}"),
    }
    assert_eq!(graph.layers_at(Z_CAPTION_BACKDROP).count(), 1);
}

#[test]
fn minimal_style_skips_backdrop_and_keeps_case() {
    let mut config = VideoConfig::default();
    config.caption_style = CaptionStyle::Minimal;
    let binds = bindings(10.0, 2, &config);
    let captions = track(&[("hello world", 0.0, 2.0)]);

    let graph = compose(&binds, Some(&captions), &audio(10.0), None, &config).unwrap();
    assert_eq!(graph.layers_at(Z_CAPTION_BACKDROP).count(), 0);
    let text_layer = graph.layers_at(Z_CAPTION_TEXT).next().unwrap();
    match &text_layer.content {
        LayerContent::CaptionText(text) => assert_eq!(text.text, "hello world"),
        other => panic!("expected caption text, got {other:?}"),
    }
}

#[test]
fn portrait_adds_background_fill_and_centers_visuals() {
    let mut config = VideoConfig::default();
    config.resolution = Resolution {
        width: 1080,
        height: 1920,
    };
    config.caption_style = CaptionStyle::Mobile;
    let binds = bindings(10.0, 2, &config);

    let graph = compose(&binds, None, &audio(10.0), Some("Big hook"), &config).unwrap();

    // Fill plus the two visuals share the base level; fill is inserted first.
    let base: Vec<_> = graph.layers_at(Z_BASE).collect();
    assert_eq!(base.len(), 3);
    assert!(matches!(
        base[0].content,
        LayerContent::BackgroundFill {
            color_rgb: [20, 20, 30]
        }
    ));
    for layer in &base[1..] {
        assert_eq!(
            layer.positioning,
            Positioning::Anchored {
                x: AnchorX::Center,
                y: AnchorY::Center,
            }
        );
    }

    let hook = graph.layers_at(Z_HOOK).next().unwrap();
    assert_eq!(hook.span.start, 0.0);
    assert_eq!(hook.span.end, 3.0);
    assert_eq!(
        hook.positioning,
        Positioning::Anchored {
            x: AnchorX::Center,
            y: AnchorY::Top,
        }
    );
}

#[test]
fn hook_is_clamped_to_short_audio() {
    let config = VideoConfig::default();
    let binds = bindings(2.0, 1, &config);
    let graph = compose(&binds, None, &audio(2.0), Some("  Hook  "), &config).unwrap();

    let hook = graph.layers_at(Z_HOOK).next().unwrap();
    assert_eq!(hook.span.end, 2.0);
    match &hook.content {
        LayerContent::CaptionText(text) => assert_eq!(text.text, "Hook"),
        other => panic!("expected hook text, got {other:?}"),
    }
}

#[test]
fn blank_hook_is_ignored() {
    let config = VideoConfig::default();
    let binds = bindings(10.0, 2, &config);
    let graph = compose(&binds, None, &audio(10.0), Some("   "), &config).unwrap();
    assert_eq!(graph.layers_at(Z_HOOK).count(), 0);
}
