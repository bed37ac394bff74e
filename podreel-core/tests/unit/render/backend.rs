use super::*;

use crate::{
    captions::track::{CaptionTrack, TranscriptEntry},
    compose::graph::compose,
    config::{Resolution, VideoConfig},
    timeline::segmenter::{SegmentPolicy, segment},
    visuals::resolve::resolve_color_only,
};

fn graph_with_captions(total: f64, count: usize, texts: &[(&str, f64, f64)]) -> RenderGraph {
    let config = VideoConfig::default();
    let segs = segment(total, &SegmentPolicy::EqualDivision { item_count: count }).unwrap();
    let bindings = resolve_color_only(&segs, &config);
    let raw: Vec<TranscriptEntry> = texts
        .iter()
        .map(|(text, start, end)| TranscriptEntry {
            text: (*text).to_owned(),
            start: *start,
            end: *end,
        })
        .collect();
    let captions = CaptionTrack::from_transcript(&raw).unwrap();
    let audio = AudioRef {
        path: PathBuf::from("/in/narration.mp3"),
        duration_sec: total,
    };
    compose(&bindings, Some(&captions), &audio, None, &config).unwrap()
}

fn graph_without_captions(total: f64, count: usize) -> RenderGraph {
    let config = VideoConfig::default();
    let segs = segment(total, &SegmentPolicy::EqualDivision { item_count: count }).unwrap();
    let bindings = resolve_color_only(&segs, &config);
    let audio = AudioRef {
        path: PathBuf::from("/in/narration.mp3"),
        duration_sec: total,
    };
    compose(&bindings, None, &audio, None, &config).unwrap()
}

#[test]
fn escaping_covers_filtergraph_metacharacters() {
    assert_eq!(escape_drawtext("hello world"), "hello world");
    assert_eq!(escape_drawtext("it's 50%"), "it\\'s 50\\%");
    assert_eq!(escape_drawtext("a:b,c;d=e"), "a\\:b\\,c\\;d\\=e");
    assert_eq!(escape_drawtext("[x]\\y"), "\\[x\\]\\\\y");
}

#[test]
fn filter_complex_scales_and_concatenates_each_input() {
    let graph = graph_without_captions(10.0, 2);
    let filter = build_filter_complex(&graph);

    assert!(filter.contains("[1:v]scale=1920:1080:force_original_aspect_ratio=decrease"));
    assert!(filter.contains("[2:v]scale="));
    assert!(filter.contains("pad=1920:1080:(ow-iw)/2:(oh-ih)/2:color=0x000000"));
    assert!(filter.contains("[v0][v1]concat=n=2:v=1:a=0[vout]"));
    assert!(!filter.contains("[base]"));
    assert!(!filter.contains("drawtext"));
}

#[test]
fn filter_complex_applies_boundary_fades() {
    let graph = graph_without_captions(10.0, 2);
    let filter = build_filter_complex(&graph);

    // Interior boundary only: first segment fades out, second fades in.
    assert!(filter.contains("fade=t=out:st=4.500:d=0.500[v0]"));
    assert!(filter.contains("fade=t=in:st=0:d=0.500"));
    assert_eq!(filter.matches("fade=").count(), 2);
}

#[test]
fn filter_complex_draws_captions_over_the_base() {
    let graph = graph_with_captions(10.0, 2, &[("hello world", 0.0, 2.0)]);
    let filter = build_filter_complex(&graph);

    assert!(filter.contains("concat=n=2:v=1:a=0[base]"));
    assert!(filter.contains("[base]drawtext=text=HELLO WORLD"));
    assert!(filter.contains("fontcolor=0xffdd33@1.00"));
    assert!(filter.contains("y=h-text_h-80"));
    assert!(filter.contains(":box=1:boxcolor=black@0.60:boxborderw=20"));
    assert!(filter.contains(":enable='between(t,0.000,2.000)'"));
    assert!(filter.ends_with("[vout]"));
}

#[test]
fn filter_complex_pads_with_vertical_fill_in_portrait() {
    let mut config = VideoConfig::default();
    config.resolution = Resolution {
        width: 1080,
        height: 1920,
    };
    let segs = segment(10.0, &SegmentPolicy::EqualDivision { item_count: 2 }).unwrap();
    let bindings = resolve_color_only(&segs, &config);
    let audio = AudioRef {
        path: PathBuf::from("/in/narration.mp3"),
        duration_sec: 10.0,
    };
    let graph = compose(&bindings, None, &audio, None, &config).unwrap();

    let filter = build_filter_complex(&graph);
    assert!(filter.contains("scale=1080:1920:"));
    assert!(filter.contains("color=0x14141e"));
}

#[test]
fn drawtext_font_size_scales_with_frame_height() {
    let mut config = VideoConfig::default();
    config.resolution = Resolution {
        width: 960,
        height: 540,
    };
    let segs = segment(10.0, &SegmentPolicy::EqualDivision { item_count: 1 }).unwrap();
    let bindings = resolve_color_only(&segs, &config);
    let captions =
        CaptionTrack::from_transcript(&[TranscriptEntry {
            text: "scaled".to_owned(),
            start: 0.0,
            end: 2.0,
        }])
        .unwrap();
    let audio = AudioRef {
        path: PathBuf::from("/in/narration.mp3"),
        duration_sec: 10.0,
    };
    let graph = compose(&bindings, Some(&captions), &audio, None, &config).unwrap();

    // Modern style is 60px at 1080p; half-height frame halves it.
    let filter = build_filter_complex(&graph);
    assert!(filter.contains("fontsize=30"));
}

#[test]
fn concat_list_repeats_the_final_frame() {
    let config = VideoConfig::default();
    let segs = segment(12.0, &SegmentPolicy::FixedChunk { chunk_sec: 5.0 }).unwrap();
    let bindings = resolve_color_only(&segs, &config);
    let sources = vec![
        PathBuf::from("/work/card_000.png"),
        PathBuf::from("/work/card_001.png"),
        PathBuf::from("/work/card_002.png"),
    ];

    let list = build_concat_list(&bindings, &sources);
    let expected = "file '/work/card_000.png'\nduration 5.0000\n\
                    file '/work/card_001.png'\nduration 5.0000\n\
                    file '/work/card_002.png'\nduration 2.0000\n\
                    file '/work/card_002.png'\n";
    assert_eq!(list, expected);
}

#[test]
fn backend_kinds_are_reported() {
    assert_eq!(FilterGraphBackend.kind(), BackendKind::FilterGraph);
    assert_eq!(ConcatBackend.kind(), BackendKind::Concat);
}
