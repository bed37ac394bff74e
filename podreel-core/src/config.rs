use crate::foundation::error::{PodreelError, PodreelResult};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Whether the target frame is taller than wide (short-form/vertical).
    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }
}

/// Caption presentation presets. A configuration-driven enum, not a subclass
/// hierarchy; see [`CaptionStyle::params`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionStyle {
    /// Uppercase bottom-anchored text over an opaque backdrop.
    #[default]
    Modern,
    /// Bottom-anchored text, no backdrop.
    Minimal,
    /// Larger scale, lower-third anchor, backdrop.
    Bold,
    /// Largest scale for small screens, lower-third anchor.
    Mobile,
}

/// Resolved presentation parameters for one caption style.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionStyleParams {
    /// Font size in pixels at 1080p; the renderer scales proportionally.
    pub font_size_px: u32,
    /// Uppercase the caption text.
    pub uppercase: bool,
    /// Draw an opaque backdrop sized to the text bounds.
    pub backdrop: bool,
    /// Backdrop opacity in `[0, 1]` (ignored when `backdrop` is false).
    pub backdrop_opacity: f64,
    /// Vertical anchor for the caption block.
    pub anchor_y: crate::compose::graph::AnchorY,
    /// Margin from the anchored edge in pixels.
    pub margin_px: u32,
    /// Text color as straight-alpha RGBA8.
    pub color_rgba8: [u8; 4],
}

impl CaptionStyle {
    /// Presentation parameter table for this style.
    pub fn params(self) -> CaptionStyleParams {
        use crate::compose::graph::AnchorY;
        match self {
            CaptionStyle::Modern => CaptionStyleParams {
                font_size_px: 60,
                uppercase: true,
                backdrop: true,
                backdrop_opacity: 0.6,
                anchor_y: AnchorY::Bottom,
                margin_px: 80,
                color_rgba8: [255, 221, 51, 255],
            },
            CaptionStyle::Minimal => CaptionStyleParams {
                font_size_px: 48,
                uppercase: false,
                backdrop: false,
                backdrop_opacity: 0.0,
                anchor_y: AnchorY::Bottom,
                margin_px: 50,
                color_rgba8: [255, 255, 255, 255],
            },
            CaptionStyle::Bold => CaptionStyleParams {
                font_size_px: 72,
                uppercase: true,
                backdrop: true,
                backdrop_opacity: 0.6,
                anchor_y: AnchorY::LowerThird,
                margin_px: 0,
                color_rgba8: [255, 255, 255, 255],
            },
            CaptionStyle::Mobile => CaptionStyleParams {
                font_size_px: 80,
                uppercase: false,
                backdrop: false,
                backdrop_opacity: 0.0,
                anchor_y: AnchorY::LowerThird,
                margin_px: 0,
                color_rgba8: [255, 255, 255, 255],
            },
        }
    }
}

/// Output container format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// H.264 + AAC in an MP4 container.
    #[default]
    Mp4,
}

/// Process-wide video generation configuration.
///
/// Created once at startup, passed by reference to every component that needs
/// it, never mutated after construction.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoConfig {
    /// Output canvas dimensions.
    pub resolution: Resolution,
    /// Output frame rate.
    pub fps: u32,
    /// Cross-fade duration in seconds at interior segment boundaries.
    pub transition_sec: f64,
    /// Chunk length in seconds for fixed-chunk segmentation and the
    /// captions-only style.
    pub default_slide_sec: f64,
    /// Compose caption overlay layers.
    pub captions_enabled: bool,
    /// Caption presentation preset.
    pub caption_style: CaptionStyle,
    /// Apply transitions at the first/last boundary too, not only interior
    /// ones.
    pub edge_transitions: bool,
    /// Output container format.
    pub output_format: OutputFormat,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            fps: 30,
            transition_sec: 0.5,
            default_slide_sec: 5.0,
            captions_enabled: true,
            caption_style: CaptionStyle::default(),
            edge_transitions: false,
            output_format: OutputFormat::default(),
        }
    }
}

impl VideoConfig {
    /// Validate configuration invariants.
    pub fn validate(&self) -> PodreelResult<()> {
        if self.resolution.width == 0 || self.resolution.height == 0 {
            return Err(PodreelError::invalid_input(
                "resolution width/height must be > 0",
            ));
        }
        if !self.resolution.width.is_multiple_of(2) || !self.resolution.height.is_multiple_of(2) {
            // Default settings target yuv420p output for maximum compatibility.
            return Err(PodreelError::invalid_input(
                "resolution width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.fps == 0 {
            return Err(PodreelError::invalid_input("fps must be > 0"));
        }
        if !self.transition_sec.is_finite() || self.transition_sec < 0.0 {
            return Err(PodreelError::invalid_input(
                "transition_sec must be finite and >= 0",
            ));
        }
        if !self.default_slide_sec.is_finite() || self.default_slide_sec <= 0.0 {
            return Err(PodreelError::invalid_input(
                "default_slide_sec must be finite and > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
