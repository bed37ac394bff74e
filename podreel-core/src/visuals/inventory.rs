use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::PodreelResult;

/// Image extensions accepted as slide assets (matched case-insensitively).
pub const SLIDE_EXTENSIONS: [&str; 5] = ["bmp", "jpeg", "jpg", "png", "tiff"];

/// Discover slide images in `dir`, sorted lexicographically by file name for
/// a deterministic segment assignment.
///
/// Returns an empty list when the directory holds no matching files; slides
/// mode turns that into [`crate::PodreelError::NoAssetsFound`] downstream.
pub fn discover_slides(dir: &Path) -> PodreelResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("read slide directory '{}'", dir.display()))?;

    let mut slides = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list slide directory '{}'", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                SLIDE_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false);
        if matches {
            slides.push(path);
        }
    }

    slides.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(slides)
}

/// Reference to the visual source rendered for one segment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum VisualAssetRef {
    /// A discovered or provider-fetched image file.
    StaticImage {
        /// Path to the image.
        path: PathBuf,
    },
    /// A generated solid-color card labeled with a topic.
    SyntheticCard {
        /// Topic label shown on the card.
        label: String,
        /// Deterministic color seed derived from the label.
        color_seed: u64,
    },
    /// A neutral card used when no assets and no provider are available.
    PlaceholderCard,
}

impl VisualAssetRef {
    /// Build a synthetic card for `label` with a deterministic color seed.
    pub fn synthetic_card(label: impl Into<String>) -> Self {
        let label = label.into();
        let color_seed = xxhash_rust::xxh3::xxh3_64(label.as_bytes());
        Self::SyntheticCard { label, color_seed }
    }

    /// Card fill color. Seeded cards land in the original muted palette
    /// (dark blue-grey range); the placeholder is a fixed dark slate.
    pub fn card_rgb(&self) -> [u8; 3] {
        match self {
            VisualAssetRef::SyntheticCard { color_seed, .. } => {
                let r = 20 + (color_seed & 0xff) % 21;
                let g = 20 + ((color_seed >> 8) & 0xff) % 21;
                let b = 40 + ((color_seed >> 16) & 0xff) % 21;
                [r as u8, g as u8, b as u8]
            }
            VisualAssetRef::PlaceholderCard => [20, 20, 30],
            VisualAssetRef::StaticImage { .. } => [0, 0, 0],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/visuals/inventory.rs"]
mod tests;
