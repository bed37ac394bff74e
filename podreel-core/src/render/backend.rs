use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    compose::graph::{
        AnchorY, AudioRef, CaptionText, LayerContent, Positioning, RenderGraph, RenderLayer,
        Z_CAPTION_BACKDROP,
    },
    foundation::error::{PodreelError, PodreelResult},
    visuals::resolve::{VisualBinding, materialize_cards},
};

/// Which renderer backend implementation is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Full-featured ffmpeg filter-graph render: letterboxing, per-edge
    /// fades, drawtext captions with box backdrops.
    FilterGraph,
    /// ffmpeg concat-demuxer render: faster, fewer features (no captions, no
    /// transitions).
    Concat,
}

/// Renderer backend capability interface.
///
/// Consumes a render graph exactly once and emits the output media file.
/// Implementations are selected at startup by availability probing
/// ([`create_backend`]), never branched on inline throughout business logic.
pub trait RendererBackend: Send + Sync {
    /// Which implementation this is.
    fn kind(&self) -> BackendKind;

    /// Flatten `graph` into a media file at `out_path`. `workdir` is a
    /// scratch directory owned by the current run.
    fn render(&self, graph: &RenderGraph, out_path: &Path, workdir: &Path) -> PodreelResult<()>;
}

/// Whether the `ffmpeg` binary is available on PATH.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Whether this ffmpeg build ships the `drawtext` filter (needs libfreetype).
pub fn has_drawtext_filter() -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-filters"])
        .stderr(Stdio::null())
        .output()
        .map(|out| {
            out.status.success() && String::from_utf8_lossy(&out.stdout).contains("drawtext")
        })
        .unwrap_or(false)
}

/// Select a renderer backend by probing the environment.
///
/// Prefers the filter-graph backend; degrades to the concat backend when
/// `drawtext` is unavailable. Fails with [`PodreelError::RendererFailure`]
/// when no ffmpeg is present at all.
pub fn create_backend() -> PodreelResult<Box<dyn RendererBackend>> {
    if !is_ffmpeg_on_path() {
        return Err(PodreelError::renderer(
            "ffmpeg is required for video output, but was not found on PATH",
        ));
    }
    if has_drawtext_filter() {
        Ok(Box::new(FilterGraphBackend))
    } else {
        tracing::warn!("ffmpeg lacks the drawtext filter; captions and fades will be skipped");
        Ok(Box::new(ConcatBackend))
    }
}

fn audio_layer(graph: &RenderGraph) -> PodreelResult<&AudioRef> {
    graph
        .layers
        .iter()
        .find_map(|l| match &l.content {
            LayerContent::Audio(audio) => Some(audio),
            _ => None,
        })
        .ok_or_else(|| PodreelError::renderer("render graph carries no audio layer"))
}

fn run_ffmpeg(mut cmd: Command) -> PodreelResult<()> {
    let output = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            PodreelError::renderer(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PodreelError::renderer(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Full-featured backend: one still input per visual binding, scaled and
/// padded into the target frame, per-edge fades, captions drawn with
/// `drawtext`, narration mapped from the audio input.
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterGraphBackend;

impl RendererBackend for FilterGraphBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::FilterGraph
    }

    #[tracing::instrument(skip(self, graph))]
    fn render(&self, graph: &RenderGraph, out_path: &Path, workdir: &Path) -> PodreelResult<()> {
        let audio = audio_layer(graph)?;
        let bindings: Vec<VisualBinding> = graph.visual_bindings().cloned().collect();
        let sources = materialize_cards(&bindings, workdir)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error"]);
        cmd.arg("-i").arg(&audio.path);
        for (binding, source) in bindings.iter().zip(&sources) {
            cmd.args(["-loop", "1", "-t"])
                .arg(format!("{:.4}", binding.segment.span.duration()))
                .arg("-i")
                .arg(source);
        }

        cmd.arg("-filter_complex").arg(build_filter_complex(graph));
        cmd.args(["-map", "[vout]", "-map", "0:a"]);
        cmd.args([
            "-c:v",
            "libx264",
            "-preset",
            "medium",
            "-crf",
            "23",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-b:a",
            "192k",
        ]);
        cmd.arg("-r").arg(graph.fps.to_string());
        cmd.arg("-t").arg(format!("{:.4}", graph.duration_sec));
        cmd.args(["-movflags", "+faststart"]).arg(out_path);

        run_ffmpeg(cmd)
    }
}

/// Build the complete `-filter_complex` string for a graph.
///
/// Pure string construction; unit-testable without ffmpeg. Input 0 is the
/// audio, inputs `1..=n` are the visual sources in timeline order.
pub fn build_filter_complex(graph: &RenderGraph) -> String {
    let w = graph.resolution.width;
    let h = graph.resolution.height;
    let pad_rgb = graph
        .layers
        .iter()
        .find_map(|l| match l.content {
            LayerContent::BackgroundFill { color_rgb } => Some(color_rgb),
            _ => None,
        })
        .unwrap_or([0, 0, 0]);
    let pad_color = format!("0x{:02x}{:02x}{:02x}", pad_rgb[0], pad_rgb[1], pad_rgb[2]);

    let bindings: Vec<&VisualBinding> = graph.visual_bindings().collect();
    let mut chains = Vec::with_capacity(bindings.len() + 2);
    for (i, binding) in bindings.iter().enumerate() {
        let dur = binding.segment.span.duration();
        let mut chain = format!(
            "[{idx}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color={pad_color},setsar=1",
            idx = i + 1
        );
        if let Some(t) = binding.transition_in {
            chain.push_str(&format!(",fade=t=in:st=0:d={t:.3}"));
        }
        if let Some(t) = binding.transition_out {
            chain.push_str(&format!(",fade=t=out:st={:.3}:d={t:.3}", dur - t));
        }
        chain.push_str(&format!("[v{i}]"));
        chains.push(chain);
    }

    let inputs: String = (0..bindings.len()).map(|i| format!("[v{i}]")).collect();
    let mut concat = format!("{inputs}concat=n={}:v=1:a=0", bindings.len());

    let text_layers: Vec<&RenderLayer> = graph
        .layers
        .iter()
        .filter(|l| matches!(l.content, LayerContent::CaptionText(_)))
        .collect();
    if text_layers.is_empty() {
        concat.push_str("[vout]");
        chains.push(concat);
        return chains.join(";");
    }

    concat.push_str("[base]");
    chains.push(concat);

    let mut overlay = String::from("[base]");
    for (i, layer) in text_layers.iter().enumerate() {
        let LayerContent::CaptionText(text) = &layer.content else {
            continue;
        };
        if i > 0 {
            overlay.push(',');
        }
        overlay.push_str(&drawtext_filter(graph, layer, text, h));
    }
    overlay.push_str("[vout]");
    chains.push(overlay);

    chains.join(";")
}

fn drawtext_filter(graph: &RenderGraph, layer: &RenderLayer, text: &CaptionText, h: u32) -> String {
    // Font sizes in the style table are relative to a 1080p frame.
    let font_size = ((u64::from(text.font_size_px) * u64::from(h)) / 1080).max(1);
    let color = format!(
        "0x{:02x}{:02x}{:02x}@{:.2}",
        text.color_rgba8[0],
        text.color_rgba8[1],
        text.color_rgba8[2],
        f64::from(text.color_rgba8[3]) / 255.0
    );
    let y_expr = match layer.positioning {
        Positioning::Anchored {
            y: AnchorY::Bottom, ..
        } => format!("h-text_h-{}", text.margin_px),
        Positioning::Anchored {
            y: AnchorY::LowerThird,
            ..
        } => "h*0.72".to_owned(),
        Positioning::Anchored {
            y: AnchorY::Top, ..
        } => text.margin_px.to_string(),
        _ => "(h-text_h)/2".to_owned(),
    };

    let mut filter = format!(
        "drawtext=text={}:fontsize={font_size}:fontcolor={color}:borderw=2:bordercolor=black:\
         x=(w-text_w)/2:y={y_expr}",
        escape_drawtext(&text.text)
    );

    // A backdrop layer with the same span renders as a drawtext box.
    let backdrop = graph.layers_at(Z_CAPTION_BACKDROP).find_map(|b| {
        if b.span != layer.span {
            return None;
        }
        match b.content {
            LayerContent::CaptionBackdrop {
                opacity,
                padding_px,
            } => Some((opacity, padding_px)),
            _ => None,
        }
    });
    if let Some((opacity, padding_px)) = backdrop {
        filter.push_str(&format!(
            ":box=1:boxcolor=black@{opacity:.2}:boxborderw={padding_px}"
        ));
    }

    filter.push_str(&format!(
        ":enable='between(t,{:.3},{:.3})'",
        layer.span.start, layer.span.end
    ));
    filter
}

/// Escape text for use as a `drawtext` value inside a filtergraph.
pub fn escape_drawtext(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '\'' | ':' | '%' | ',' | ';' | '[' | ']' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Fewer-features backend over the ffmpeg concat demuxer.
///
/// Writes a concat list of the visual sources with per-segment durations and
/// muxes the narration in one pass. Captions and transitions are not
/// rendered; the sidecar metadata still carries them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConcatBackend;

impl RendererBackend for ConcatBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Concat
    }

    #[tracing::instrument(skip(self, graph))]
    fn render(&self, graph: &RenderGraph, out_path: &Path, workdir: &Path) -> PodreelResult<()> {
        let audio = audio_layer(graph)?;
        let bindings: Vec<VisualBinding> = graph.visual_bindings().cloned().collect();
        let sources = materialize_cards(&bindings, workdir)?;
        if graph.layers_at(crate::compose::graph::Z_CAPTION_TEXT).next().is_some() {
            tracing::warn!("concat backend cannot draw captions; skipping overlay layers");
        }

        let list = build_concat_list(&bindings, &sources);
        let list_path = workdir.join("concat.txt");
        std::fs::write(&list_path, list)
            .with_context(|| format!("write concat list '{}'", list_path.display()))?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .arg("-i")
            .arg(&audio.path);
        cmd.args([
            "-fps_mode",
            "vfr",
            "-pix_fmt",
            "yuv420p",
            "-c:v",
            "libx264",
            "-preset",
            "medium",
            "-crf",
            "23",
            "-c:a",
            "aac",
            "-b:a",
            "192k",
            "-shortest",
        ]);
        cmd.arg("-r").arg(graph.fps.to_string());
        cmd.arg(out_path);

        run_ffmpeg(cmd)
    }
}

/// Build the concat-demuxer list body: one `file`/`duration` pair per
/// binding, with the final frame repeated so its duration is honored.
pub fn build_concat_list(bindings: &[VisualBinding], sources: &[PathBuf]) -> String {
    let mut out = String::new();
    for (binding, source) in bindings.iter().zip(sources) {
        out.push_str(&format!(
            "file '{}'\nduration {:.4}\n",
            source.display(),
            binding.segment.span.duration()
        ));
    }
    if let Some(last) = sources.last() {
        out.push_str(&format!("file '{}'\n", last.display()));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
