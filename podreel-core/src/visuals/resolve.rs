use std::path::{Path, PathBuf};

use crate::{
    config::VideoConfig,
    foundation::{
        error::{PodreelError, PodreelResult},
        time::Segment,
    },
    visuals::{
        inventory::VisualAssetRef,
        topics::{DEFAULT_TOPIC_PAIR, TopicExtractor},
    },
};

/// External source of stock or generated imagery keyed by topic.
pub trait AssetProvider: Send + Sync {
    /// Fetch an asset for `topic` covering `duration_sec`. `Ok(None)` means
    /// the provider has nothing for this topic; errors are treated the same
    /// way per segment (degrade to a synthetic card).
    fn fetch(&self, topic: &str, duration_sec: f64) -> PodreelResult<Option<PathBuf>>;
}

/// One segment bound to its visual source, with boundary transitions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualBinding {
    /// The timeline segment this binding covers.
    pub segment: Segment,
    /// The visual source rendered for the segment.
    pub asset: VisualAssetRef,
    /// Cross-fade-in duration in seconds, absent at the first boundary
    /// unless edge transitions are configured.
    pub transition_in: Option<f64>,
    /// Cross-fade-out duration in seconds, absent at the last boundary
    /// unless edge transitions are configured.
    pub transition_out: Option<f64>,
}

/// Bind each segment to its slide image, 1:1 in order.
///
/// Slides mode drives the segmenter rather than the reverse (duration per
/// slide = total / slide count), so the two sequences must already agree in
/// length. Fails with [`PodreelError::NoAssetsFound`] when `slides` is empty.
pub fn resolve_slides(
    segments: &[Segment],
    slides: &[PathBuf],
    config: &VideoConfig,
) -> PodreelResult<Vec<VisualBinding>> {
    if slides.is_empty() {
        return Err(PodreelError::no_assets(
            "slides mode requires at least one image asset",
        ));
    }
    if segments.len() != slides.len() {
        return Err(PodreelError::invalid_input(format!(
            "slides mode expects one segment per slide (got {} segments, {} slides)",
            segments.len(),
            slides.len()
        )));
    }

    let mut bindings = segments
        .iter()
        .zip(slides)
        .map(|(segment, path)| VisualBinding {
            segment: *segment,
            asset: VisualAssetRef::StaticImage { path: path.clone() },
            transition_in: None,
            transition_out: None,
        })
        .collect();
    assign_transitions(&mut bindings, config);
    Ok(bindings)
}

/// Bind each segment to topic-matched footage or a synthetic card.
///
/// Topics come from `extractor` over the caption text and are cycled
/// round-robin when fewer topics than segments exist. Provider failures are
/// non-fatal per segment; the whole operation never fails.
pub fn resolve_broll(
    segments: &[Segment],
    caption_text: &str,
    extractor: &dyn TopicExtractor,
    provider: Option<&dyn AssetProvider>,
    config: &VideoConfig,
) -> Vec<VisualBinding> {
    let mut topics = extractor.extract(caption_text);
    if topics.is_empty() {
        // Extractors must return at least one topic, but a broken one must
        // not take the run down.
        tracing::warn!("topic extractor returned no topics; using defaults");
        topics = DEFAULT_TOPIC_PAIR.iter().map(|t| (*t).to_owned()).collect();
    }
    tracing::debug!(?topics, "extracted b-roll topics");

    let mut bindings = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let topic = &topics[i % topics.len()];
        let asset = fetch_or_card(provider, topic, segment.span.duration());
        bindings.push(VisualBinding {
            segment: *segment,
            asset,
            transition_in: None,
            transition_out: None,
        });
    }
    assign_transitions(&mut bindings, config);
    bindings
}

/// Bind every segment to a placeholder card. Never fails.
pub fn resolve_color_only(segments: &[Segment], config: &VideoConfig) -> Vec<VisualBinding> {
    let mut bindings = segments
        .iter()
        .map(|segment| VisualBinding {
            segment: *segment,
            asset: VisualAssetRef::PlaceholderCard,
            transition_in: None,
            transition_out: None,
        })
        .collect();
    assign_transitions(&mut bindings, config);
    bindings
}

fn fetch_or_card(
    provider: Option<&dyn AssetProvider>,
    topic: &str,
    duration_sec: f64,
) -> VisualAssetRef {
    match provider.map(|p| p.fetch(topic, duration_sec)) {
        Some(Ok(Some(path))) => VisualAssetRef::StaticImage { path },
        Some(Ok(None)) => VisualAssetRef::synthetic_card(topic),
        Some(Err(e)) => {
            tracing::warn!(topic, error = %e, "asset provider failed; using synthetic card");
            VisualAssetRef::synthetic_card(topic)
        }
        None => VisualAssetRef::synthetic_card(topic),
    }
}

/// Assign cross-fade durations at segment boundaries. Interior boundaries
/// always transition; the first in-edge and last out-edge only when
/// configured.
fn assign_transitions(bindings: &mut Vec<VisualBinding>, config: &VideoConfig) {
    if config.transition_sec <= 0.0 {
        return;
    }
    let last = bindings.len().saturating_sub(1);
    for (i, binding) in bindings.iter_mut().enumerate() {
        // A fade may not consume more than the segment itself.
        let t = config.transition_sec.min(binding.segment.span.duration());
        if i > 0 || config.edge_transitions {
            binding.transition_in = Some(t);
        }
        if i < last || config.edge_transitions {
            binding.transition_out = Some(t);
        }
    }
}

/// Materialize card bindings as solid PNG files inside `workdir` so file-based
/// renderer backends can treat every visual uniformly.
///
/// Returns one path per binding; image bindings pass through unchanged.
pub fn materialize_cards(
    bindings: &[VisualBinding],
    workdir: &Path,
) -> PodreelResult<Vec<PathBuf>> {
    use anyhow::Context as _;

    // Cards only carry a flat color; a small canvas upscales cleanly.
    const CARD_W: u32 = 320;
    const CARD_H: u32 = 180;

    let mut paths = Vec::with_capacity(bindings.len());
    for (i, binding) in bindings.iter().enumerate() {
        match &binding.asset {
            VisualAssetRef::StaticImage { path } => paths.push(path.clone()),
            card => {
                let [r, g, b] = card.card_rgb();
                let img = image::RgbImage::from_pixel(CARD_W, CARD_H, image::Rgb([r, g, b]));
                let path = workdir.join(format!("card_{i:03}.png"));
                img.save(&path)
                    .with_context(|| format!("write card image '{}'", path.display()))?;
                paths.push(path);
            }
        }
    }
    Ok(paths)
}

#[cfg(test)]
#[path = "../../tests/unit/visuals/resolve.rs"]
mod tests;
