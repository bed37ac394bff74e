/// Convenience result type used across Podreel.
pub type PodreelResult<T> = Result<T, PodreelError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Variants split along the propagation policy: everything with a defined
/// fallback (missing transcriber, missing analyzer energy, provider failure)
/// is handled by the pipeline and logged; the variants here surface only when
/// a run must abort or a caller violated a contract.
#[derive(thiserror::Error, Debug)]
pub enum PodreelError {
    /// Bad policy parameters or caller-provided data. Fatal for the run.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Transcriber output with broken timing. Recoverable via fallback
    /// captioning at the pipeline level.
    #[error("malformed transcript: {0}")]
    MalformedTranscript(String),

    /// Slides mode with an empty asset inventory. Fatal; slides mode is
    /// asset-driven by definition.
    #[error("no assets found: {0}")]
    NoAssetsFound(String),

    /// Composer received an empty binding sequence. Indicates an upstream
    /// contract violation.
    #[error("empty timeline: {0}")]
    EmptyTimeline(String),

    /// Sum of binding durations disagrees with the audio duration beyond
    /// tolerance. Indicates an upstream contract violation.
    #[error("duration mismatch: bindings cover {actual_sec}s, audio runs {expected_sec}s")]
    DurationMismatch {
        /// Audio duration in seconds.
        expected_sec: f64,
        /// Sum of visual binding durations in seconds.
        actual_sec: f64,
    },

    /// Asset provider could not be reached. Non-fatal per segment; surfaced
    /// only when a caller asks for a hard provider requirement.
    #[error("asset provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Renderer backend failed or is missing entirely. Fatal, carries the
    /// backend's own message.
    #[error("renderer failure: {0}")]
    RendererFailure(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PodreelError {
    /// Build a [`PodreelError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`PodreelError::MalformedTranscript`] value.
    pub fn malformed_transcript(msg: impl Into<String>) -> Self {
        Self::MalformedTranscript(msg.into())
    }

    /// Build a [`PodreelError::NoAssetsFound`] value.
    pub fn no_assets(msg: impl Into<String>) -> Self {
        Self::NoAssetsFound(msg.into())
    }

    /// Build a [`PodreelError::EmptyTimeline`] value.
    pub fn empty_timeline(msg: impl Into<String>) -> Self {
        Self::EmptyTimeline(msg.into())
    }

    /// Build a [`PodreelError::ProviderUnavailable`] value.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Build a [`PodreelError::RendererFailure`] value.
    pub fn renderer(msg: impl Into<String>) -> Self {
        Self::RendererFailure(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
