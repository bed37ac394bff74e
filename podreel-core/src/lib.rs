//! Podreel turns a narrated audio track plus timed captions into a rendered
//! video.
//!
//! The engine partitions a fixed audio duration into visual segments, builds
//! a validated caption track, binds each segment to a visual source, and
//! composes everything into a declarative, backend-agnostic render graph
//! that an ffmpeg-based backend flattens into the output file.
//!
//! # Pipeline overview
//!
//! 1. **Segment**: `duration + policy -> Vec<Segment>` (gapless, ordered
//!    cover of the timeline)
//! 2. **Caption**: `transcript | fallback -> CaptionTrack` (validated,
//!    non-overlapping)
//! 3. **Resolve**: `segments + assets -> Vec<VisualBinding>` (slides, b-roll
//!    cards, or placeholders)
//! 4. **Compose**: `bindings + captions + audio -> RenderGraph` (layered,
//!    timed, no pixels)
//! 5. **Render**: `RenderGraph -> media file` via the system `ffmpeg` binary
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: segmentation, captioning, and resolution
//!   are pure functions of their declared inputs.
//! - **Scoped runs**: every run owns a temp workspace removed on every exit
//!   path; nothing persists across runs beyond the immutable [`VideoConfig`].
//! - **Degrade, don't abort**: a missing transcriber, analyzer, or asset
//!   provider falls back to placeholder behavior; only contract violations
//!   and missing required inputs abort a run.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod captions;
mod compose;
mod config;
mod foundation;
mod media;
mod render;
mod run;
mod timeline;
mod visuals;

pub use captions::track::{CaptionEntry, CaptionTrack, TranscriptEntry, build as build_captions};
pub use captions::transcribe::{
    Transcriber, WhisperCliTranscriber, is_whisper_on_path, parse_whisper_json,
};
pub use compose::graph::{
    AnchorX, AnchorY, AudioRef, CaptionText, LayerContent, Positioning, RenderGraph, RenderLayer,
    Z_AUDIO, Z_BASE, Z_CAPTION_BACKDROP, Z_CAPTION_TEXT, Z_HOOK, compose,
};
pub use config::{CaptionStyle, CaptionStyleParams, OutputFormat, Resolution, VideoConfig};
pub use foundation::error::{PodreelError, PodreelResult};
pub use foundation::time::{SPAN_EPSILON, Segment, SegmentKind, TimeSpan, validate_cover};
pub use media::probe::{
    AudioAnalysis, AudioAnalyzer, FfprobeAnalyzer, is_ffprobe_on_path, parse_ffprobe_duration,
    probe_duration_secs,
};
pub use render::backend::{
    BackendKind, ConcatBackend, FilterGraphBackend, RendererBackend, build_concat_list,
    build_filter_complex, create_backend, escape_drawtext, has_drawtext_filter, is_ffmpeg_on_path,
};
pub use run::{
    RunEnv, RunReport, RunRequest, RunWorkspace, VisualStyle, generate_batch, generate_video,
};
pub use timeline::segmenter::{AdaptiveParams, SegmentPolicy, segment};
pub use visuals::inventory::{SLIDE_EXTENSIONS, VisualAssetRef, discover_slides};
pub use visuals::resolve::{
    AssetProvider, VisualBinding, materialize_cards, resolve_broll,
    resolve_color_only, resolve_slides,
};
pub use visuals::topics::{
    DEFAULT_TOPIC_PAIR, KeywordTopicExtractor, TOPIC_VOCABULARY, TopicExtractor,
};
