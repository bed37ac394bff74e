use std::path::PathBuf;

use crate::{
    captions::track::{CaptionEntry, CaptionTrack},
    config::{CaptionStyleParams, Resolution, VideoConfig},
    foundation::{
        error::{PodreelError, PodreelResult},
        time::{SPAN_EPSILON, TimeSpan},
    },
    visuals::resolve::VisualBinding,
};

/// Z-order of the audio layer (non-visual, below everything).
pub const Z_AUDIO: i32 = -1;
/// Z-order of the base visual track (and the vertical background fill).
pub const Z_BASE: i32 = 0;
/// Z-order of caption backdrops.
pub const Z_CAPTION_BACKDROP: i32 = 1;
/// Z-order of caption text.
pub const Z_CAPTION_TEXT: i32 = 2;
/// Z-order of the short-form hook text.
pub const Z_HOOK: i32 = 3;

/// Horizontal anchor reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AnchorX {
    /// Left edge.
    Left,
    /// Horizontal center.
    Center,
    /// Right edge.
    Right,
}

/// Vertical anchor reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AnchorY {
    /// Top edge.
    Top,
    /// Vertical center.
    Center,
    /// Bottom edge.
    Bottom,
    /// Lower third of the frame (mobile/bold captions).
    LowerThird,
}

/// Placement of a layer within the output frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Positioning {
    /// The layer fills the whole frame.
    FullFrame,
    /// The layer is anchored at the given references, sized by its content
    /// (letterboxed for visuals, text bounds for captions).
    Anchored {
        /// Horizontal reference.
        x: AnchorX,
        /// Vertical reference.
        y: AnchorY,
    },
}

/// The narration audio consumed by the renderer backend.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioRef {
    /// Path to the audio file.
    pub path: PathBuf,
    /// Audio duration in seconds, as reported by the analyzer.
    pub duration_sec: f64,
}

/// Caption text presentation carried by a caption-text layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionText {
    /// Display text, already uppercased when the style asks for it.
    pub text: String,
    /// Font size in pixels at 1080p.
    pub font_size_px: u32,
    /// Text color as straight-alpha RGBA8.
    pub color_rgba8: [u8; 4],
    /// Margin from the anchored edge in pixels.
    pub margin_px: u32,
}

/// What a render layer contains.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LayerContent {
    /// One visual binding of the base track.
    Visual(VisualBinding),
    /// Opaque backdrop behind a caption entry, sized to the text bounds by
    /// the renderer.
    CaptionBackdrop {
        /// Backdrop opacity in `[0, 1]`.
        opacity: f64,
        /// Padding around the text bounds in pixels.
        padding_px: u32,
    },
    /// Styled caption text for one entry.
    CaptionText(CaptionText),
    /// The narration audio track.
    Audio(AudioRef),
    /// Full-bleed solid fill behind letterboxed content (vertical variant).
    BackgroundFill {
        /// Fill color as RGB8.
        color_rgb: [u8; 3],
    },
}

/// One timed, positioned element of the render graph.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderLayer {
    /// Layer payload.
    pub content: LayerContent,
    /// Time extent on the master timeline.
    pub span: TimeSpan,
    /// Stacking order; see the `Z_*` constants.
    pub z_order: i32,
    /// Placement within the frame.
    pub positioning: Positioning,
}

/// A declarative, backend-agnostic description of timed, layered visual and
/// audio elements.
///
/// Layers are ordered by z, insertion order preserved within a level. Built
/// once per run, immutable, consumed exactly once by the renderer backend.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderGraph {
    /// Layers ordered by (z, insertion).
    pub layers: Vec<RenderLayer>,
    /// Total run length in seconds; equals the audio duration.
    pub duration_sec: f64,
    /// Output canvas dimensions.
    pub resolution: Resolution,
    /// Output frame rate.
    pub fps: u32,
}

impl RenderGraph {
    /// Layers at a given z level, in insertion order.
    pub fn layers_at(&self, z: i32) -> impl Iterator<Item = &RenderLayer> {
        self.layers.iter().filter(move |l| l.z_order == z)
    }

    /// The base visual bindings in timeline order.
    pub fn visual_bindings(&self) -> impl Iterator<Item = &VisualBinding> {
        self.layers.iter().filter_map(|l| match &l.content {
            LayerContent::Visual(binding) => Some(binding),
            _ => None,
        })
    }
}

/// Background fill used behind letterboxed content in the vertical variant.
const VERTICAL_FILL_RGB: [u8; 3] = [20, 20, 30];

/// Seconds the short-form hook text stays on screen.
const HOOK_SEC: f64 = 3.0;

/// Assemble the final layered structure: base visual track, caption overlay,
/// audio, and the vertical/short-form extras when the target aspect is
/// portrait.
///
/// The composer never touches pixels; transitions consume the edge seconds of
/// adjacent segments rather than inserting extra duration, so the total run
/// length is preserved exactly. Fails with [`PodreelError::EmptyTimeline`]
/// when `bindings` is empty and [`PodreelError::DurationMismatch`] when the
/// bindings do not cover the audio duration within [`SPAN_EPSILON`].
#[tracing::instrument(skip_all, fields(bindings = bindings.len()))]
pub fn compose(
    bindings: &[VisualBinding],
    captions: Option<&CaptionTrack>,
    audio: &AudioRef,
    hook_text: Option<&str>,
    config: &VideoConfig,
) -> PodreelResult<RenderGraph> {
    if bindings.is_empty() {
        return Err(PodreelError::empty_timeline(
            "composer requires at least one visual binding",
        ));
    }
    let covered: f64 = bindings.iter().map(|b| b.segment.span.duration()).sum();
    if (covered - audio.duration_sec).abs() > SPAN_EPSILON {
        return Err(PodreelError::DurationMismatch {
            expected_sec: audio.duration_sec,
            actual_sec: covered,
        });
    }

    let full_span = TimeSpan::new(0.0, audio.duration_sec)?;
    let portrait = config.resolution.is_portrait();
    let mut layers = Vec::new();

    layers.push(RenderLayer {
        content: LayerContent::Audio(audio.clone()),
        span: full_span,
        z_order: Z_AUDIO,
        positioning: Positioning::FullFrame,
    });

    if portrait {
        // Full-bleed fill behind the letterboxed landscape content.
        layers.push(RenderLayer {
            content: LayerContent::BackgroundFill {
                color_rgb: VERTICAL_FILL_RGB,
            },
            span: full_span,
            z_order: Z_BASE,
            positioning: Positioning::FullFrame,
        });
    }

    let content_positioning = if portrait {
        Positioning::Anchored {
            x: AnchorX::Center,
            y: AnchorY::Center,
        }
    } else {
        Positioning::FullFrame
    };
    for binding in bindings {
        layers.push(RenderLayer {
            content: LayerContent::Visual(binding.clone()),
            span: binding.segment.span,
            z_order: Z_BASE,
            positioning: content_positioning,
        });
    }

    if config.captions_enabled
        && let Some(track) = captions
    {
        let params = config.caption_style.params();
        for entry in track.entries() {
            push_caption_layers(&mut layers, entry, &params);
        }
    }

    if let Some(hook) = hook_text
        && !hook.trim().is_empty()
    {
        let hook_end = HOOK_SEC.min(audio.duration_sec);
        layers.push(RenderLayer {
            content: LayerContent::CaptionText(CaptionText {
                text: hook.trim().to_owned(),
                font_size_px: 70,
                color_rgba8: [255, 255, 255, 255],
                margin_px: 200,
            }),
            span: TimeSpan::new(0.0, hook_end)?,
            z_order: Z_HOOK,
            positioning: Positioning::Anchored {
                x: AnchorX::Center,
                y: AnchorY::Top,
            },
        });
    }

    // Stable by construction for most paths, but caption pairs interleave
    // backdrop/text; normalize to (z, insertion) order.
    layers.sort_by_key(|l| l.z_order);

    Ok(RenderGraph {
        layers,
        duration_sec: audio.duration_sec,
        resolution: config.resolution,
        fps: config.fps,
    })
}

fn push_caption_layers(
    layers: &mut Vec<RenderLayer>,
    entry: &CaptionEntry,
    params: &CaptionStyleParams,
) {
    let positioning = Positioning::Anchored {
        x: AnchorX::Center,
        y: params.anchor_y,
    };
    if params.backdrop {
        layers.push(RenderLayer {
            content: LayerContent::CaptionBackdrop {
                opacity: params.backdrop_opacity,
                padding_px: 20,
            },
            span: entry.span,
            z_order: Z_CAPTION_BACKDROP,
            positioning,
        });
    }
    let text = if params.uppercase {
        entry.text.to_uppercase()
    } else {
        entry.text.clone()
    };
    layers.push(RenderLayer {
        content: LayerContent::CaptionText(CaptionText {
            text,
            font_size_px: params.font_size_px,
            color_rgba8: params.color_rgba8,
            margin_px: params.margin_px,
        }),
        span: entry.span,
        z_order: Z_CAPTION_TEXT,
        positioning,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/compose/graph.rs"]
mod tests;
