use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    captions::{track::CaptionTrack, transcribe::Transcriber},
    compose::graph::{AudioRef, RenderGraph, compose},
    config::VideoConfig,
    foundation::{
        error::{PodreelError, PodreelResult},
        time::Segment,
    },
    media::probe::{AudioAnalyzer, AudioAnalysis},
    render::backend::RendererBackend,
    timeline::segmenter::{AdaptiveParams, SegmentPolicy, segment},
    visuals::{
        inventory::discover_slides,
        resolve::{AssetProvider, VisualBinding, resolve_broll, resolve_color_only, resolve_slides},
        topics::KeywordTopicExtractor,
    },
};

/// Visual style selector for one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualStyle {
    /// One discovered slide image per segment.
    Slides,
    /// Topic-matched b-roll cards/footage.
    Broll,
    /// Placeholder cards with captions as the main visual.
    CaptionsOnly,
}

/// Inputs for a single video-generation run.
#[derive(Clone, Debug)]
pub struct RunRequest {
    /// Narration audio file.
    pub audio: PathBuf,
    /// Directory of slide images (slides mode).
    pub assets_dir: Option<PathBuf>,
    /// Final output media path.
    pub out_path: PathBuf,
    /// Visual style.
    pub style: VisualStyle,
    /// Short-form hook text shown during the opening seconds (portrait
    /// targets).
    pub hook_text: Option<String>,
    /// Write the sidecar metadata document next to the output.
    pub write_metadata: bool,
}

/// Borrowed external collaborators shared by one or more runs.
///
/// Runs are fully isolated from each other; everything here is immutable
/// borrow-only, so a single env can serve a parallel batch.
pub struct RunEnv<'a> {
    /// Speech-to-text collaborator; absence triggers fallback captioning.
    pub transcriber: Option<&'a dyn Transcriber>,
    /// Audio feature extraction; must at minimum report a duration.
    pub analyzer: &'a dyn AudioAnalyzer,
    /// Stock footage source; absence degrades b-roll to synthetic cards.
    pub provider: Option<&'a dyn AssetProvider>,
    /// Renderer backend that flattens the graph into pixels.
    pub backend: &'a dyn RendererBackend,
}

/// Result summary of one successful run; mirrors the sidecar metadata
/// document.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RunReport {
    /// Input narration audio.
    pub input_audio: PathBuf,
    /// Output media file.
    pub output_video: PathBuf,
    /// Style used for the run.
    pub style: VisualStyle,
    /// Total duration in seconds.
    pub duration_sec: f64,
    /// The segment cover used for the base visual track.
    pub segments: Vec<Segment>,
    /// The caption track (placeholder entries when no transcriber ran).
    pub captions: CaptionTrack,
}

/// A per-run scratch directory, removed on every exit path.
///
/// Replaces accumulating agent-lifetime temp state with an explicit scoped
/// resource; `Drop` guarantees removal for success, caught failure, and
/// propagated failure alike.
#[derive(Debug)]
pub struct RunWorkspace {
    dir: tempfile::TempDir,
}

impl RunWorkspace {
    /// Create a fresh workspace under the system temp directory.
    pub fn create() -> PodreelResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix("podreel-run-")
            .tempdir()
            .context("create run workspace")?;
        Ok(Self { dir })
    }

    /// Workspace root path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Execute one full video-generation run: analyze, segment, caption, resolve
/// visuals, compose, render, then move the output into place.
///
/// Strictly sequential; each stage's output is the next stage's required
/// input. Partial output files are never left at `req.out_path`: the render
/// targets a sibling `.part` file that is renamed only on success.
#[tracing::instrument(skip_all, fields(audio = %req.audio.display(), style = ?req.style))]
pub fn generate_video(
    req: &RunRequest,
    config: &VideoConfig,
    env: &RunEnv<'_>,
) -> PodreelResult<RunReport> {
    config.validate()?;
    let workspace = RunWorkspace::create()?;

    let analysis = env.analyzer.analyze(&req.audio)?;
    let total_sec = analysis.duration_sec;
    tracing::debug!(total_sec, "analyzed narration audio");

    let (segments, slides) = plan_segments(req, config, &analysis, total_sec)?;
    let captions = build_captions(req, env, &segments, workspace.path());
    let bindings = resolve_visuals(req, config, env, &segments, slides, &captions)?;

    let audio = AudioRef {
        path: req.audio.clone(),
        duration_sec: total_sec,
    };
    let caption_track = config.captions_enabled.then_some(&captions);
    let graph = compose(
        &bindings,
        caption_track,
        &audio,
        req.hook_text.as_deref(),
        config,
    )?;

    render_into_place(env.backend, &graph, &req.out_path, workspace.path())?;

    let report = RunReport {
        input_audio: req.audio.clone(),
        output_video: req.out_path.clone(),
        style: req.style,
        duration_sec: total_sec,
        segments,
        captions,
    };
    if req.write_metadata {
        write_metadata(&report)?;
    }
    Ok(report)
}

/// Execute independent runs in parallel, one worker per run.
///
/// Runs share no mutable state beyond the immutable config and env, so no
/// locking is required; each failure is reported in its slot without
/// affecting the others.
pub fn generate_batch(
    requests: &[RunRequest],
    config: &VideoConfig,
    env: &RunEnv<'_>,
) -> Vec<PodreelResult<RunReport>> {
    requests
        .par_iter()
        .map(|req| generate_video(req, config, env))
        .collect()
}

fn plan_segments(
    req: &RunRequest,
    config: &VideoConfig,
    analysis: &AudioAnalysis,
    total_sec: f64,
) -> PodreelResult<(Vec<Segment>, Option<Vec<PathBuf>>)> {
    match req.style {
        VisualStyle::Slides => {
            // Slides mode drives the segmenter: one segment per asset.
            let dir = req.assets_dir.as_deref().ok_or_else(|| {
                PodreelError::no_assets("slides mode requires a visual assets directory")
            })?;
            let slides = discover_slides(dir)?;
            if slides.is_empty() {
                return Err(PodreelError::no_assets(format!(
                    "no images found in '{}'",
                    dir.display()
                )));
            }
            let segments = segment(
                total_sec,
                &SegmentPolicy::EqualDivision {
                    item_count: slides.len(),
                },
            )?;
            Ok((segments, Some(slides)))
        }
        VisualStyle::Broll => {
            let policy = if analysis.energy.is_empty() {
                // Analyzer could not extract features; degrade transparently.
                SegmentPolicy::FixedChunk {
                    chunk_sec: config.default_slide_sec,
                }
            } else {
                SegmentPolicy::Adaptive(AdaptiveParams::new(
                    &analysis.energy,
                    analysis.sample_rate,
                ))
            };
            Ok((segment(total_sec, &policy)?, None))
        }
        VisualStyle::CaptionsOnly => {
            let segments = segment(
                total_sec,
                &SegmentPolicy::FixedChunk {
                    chunk_sec: config.default_slide_sec,
                },
            )?;
            Ok((segments, None))
        }
    }
}

fn build_captions(
    req: &RunRequest,
    env: &RunEnv<'_>,
    segments: &[Segment],
    workdir: &Path,
) -> CaptionTrack {
    if let Some(transcriber) = env.transcriber {
        match transcriber
            .transcribe(&req.audio, workdir)
            .and_then(|entries| CaptionTrack::from_transcript(&entries))
        {
            Ok(track) if !track.is_empty() => return track,
            Ok(_) => {
                tracing::warn!("transcriber produced no usable entries; using fallback captions");
            }
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed; using fallback captions");
            }
        }
    }
    CaptionTrack::fallback_from_segments(segments)
}

fn resolve_visuals(
    req: &RunRequest,
    config: &VideoConfig,
    env: &RunEnv<'_>,
    segments: &[Segment],
    slides: Option<Vec<PathBuf>>,
    captions: &CaptionTrack,
) -> PodreelResult<Vec<VisualBinding>> {
    match req.style {
        VisualStyle::Slides => {
            let slides = slides.unwrap_or_default();
            resolve_slides(segments, &slides, config)
        }
        VisualStyle::Broll => Ok(resolve_broll(
            segments,
            &captions.joined_text(),
            &KeywordTopicExtractor,
            env.provider,
            config,
        )),
        VisualStyle::CaptionsOnly => Ok(resolve_color_only(segments, config)),
    }
}

fn render_into_place(
    backend: &dyn RendererBackend,
    graph: &RenderGraph,
    out_path: &Path,
    workdir: &Path,
) -> PodreelResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }

    // Stage next to the destination so the final rename stays on one
    // filesystem.
    let staged = staged_path(out_path);
    if let Err(e) = backend.render(graph, &staged, workdir) {
        let _ = std::fs::remove_file(&staged);
        return Err(e);
    }
    if let Err(e) = std::fs::rename(&staged, out_path) {
        let _ = std::fs::remove_file(&staged);
        return Err(anyhow::Error::new(e)
            .context(format!(
                "move '{}' into place at '{}'",
                staged.display(),
                out_path.display()
            ))
            .into());
    }
    Ok(())
}

fn staged_path(out_path: &Path) -> PathBuf {
    let mut name = out_path.file_name().unwrap_or_default().to_owned();
    name.push(".part");
    out_path.with_file_name(name)
}

fn write_metadata(report: &RunReport) -> PodreelResult<()> {
    let path = report.output_video.with_extension("json");
    let body = serde_json::to_string_pretty(report)
        .context("serialize run metadata")?;
    std::fs::write(&path, body)
        .with_context(|| format!("write metadata '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote sidecar metadata");
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/run.rs"]
mod tests;
