use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    captions::track::TranscriptEntry,
    foundation::error::{PodreelError, PodreelResult},
};

/// Speech-to-text collaborator.
///
/// Implementations may be slow and blocking; the pipeline treats a failed or
/// absent transcriber identically (fallback captioning), so implementations
/// should report failures rather than fabricate entries.
pub trait Transcriber: Send + Sync {
    /// Transcribe `audio` into timed utterances. `workdir` is a scratch
    /// directory owned by the current run.
    fn transcribe(&self, audio: &Path, workdir: &Path) -> PodreelResult<Vec<TranscriptEntry>>;
}

/// Whether the `whisper` CLI is available on PATH.
pub fn is_whisper_on_path() -> bool {
    Command::new("whisper")
        .arg("--help")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Transcriber backed by the `whisper` command-line tool.
///
/// Invokes `whisper <audio> --model <model> --output_format json
/// --output_dir <workdir>` and parses the produced segments file.
#[derive(Clone, Debug)]
pub struct WhisperCliTranscriber {
    /// Whisper model name (e.g. `base`).
    pub model: String,
}

impl Default for WhisperCliTranscriber {
    fn default() -> Self {
        Self {
            model: "base".to_owned(),
        }
    }
}

#[derive(serde::Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(serde::Deserialize)]
struct WhisperSegment {
    text: String,
    start: f64,
    end: f64,
}

impl Transcriber for WhisperCliTranscriber {
    #[tracing::instrument(skip(self))]
    fn transcribe(&self, audio: &Path, workdir: &Path) -> PodreelResult<Vec<TranscriptEntry>> {
        let output = Command::new("whisper")
            .arg(audio)
            .args(["--model", &self.model, "--output_format", "json"])
            .arg("--output_dir")
            .arg(workdir)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                PodreelError::malformed_transcript(format!(
                    "failed to spawn whisper (is it installed and on PATH?): {e}"
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PodreelError::malformed_transcript(format!(
                "whisper exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let json_path = whisper_output_path(audio, workdir)?;
        let body = std::fs::read_to_string(&json_path)
            .with_context(|| format!("read whisper output '{}'", json_path.display()))?;
        parse_whisper_json(&body)
    }
}

/// Path of the JSON file whisper writes for `audio` inside `output_dir`.
fn whisper_output_path(audio: &Path, output_dir: &Path) -> PodreelResult<PathBuf> {
    let stem = audio
        .file_stem()
        .ok_or_else(|| {
            PodreelError::invalid_input(format!(
                "audio path '{}' has no file stem",
                audio.display()
            ))
        })?
        .to_owned();
    let mut name = stem;
    name.push(".json");
    Ok(output_dir.join(name))
}

/// Parse the whisper JSON document into raw transcript entries.
pub fn parse_whisper_json(body: &str) -> PodreelResult<Vec<TranscriptEntry>> {
    let parsed: WhisperOutput = serde_json::from_str(body)
        .map_err(|e| PodreelError::malformed_transcript(format!("whisper JSON: {e}")))?;
    Ok(parsed
        .segments
        .into_iter()
        .map(|seg| TranscriptEntry {
            text: seg.text,
            start: seg.start,
            end: seg.end,
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/captions/transcribe.rs"]
mod tests;
