use std::{
    path::Path,
    process::{Command, Stdio},
};

use crate::foundation::error::{PodreelError, PodreelResult};

/// Audio features produced by an analyzer.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioAnalysis {
    /// Total audio duration in seconds.
    pub duration_sec: f64,
    /// Per-frame RMS energy samples. Empty when the analyzer cannot extract
    /// features; the pipeline then substitutes fixed-chunk segmentation.
    pub energy: Vec<f32>,
    /// Energy frame rate in frames per second of audio.
    pub sample_rate: u32,
}

/// Audio feature extraction seam.
pub trait AudioAnalyzer: Send + Sync {
    /// Analyze the audio file at `path`. Must at minimum report a duration;
    /// a run with no duration has nothing to time against and aborts.
    fn analyze(&self, path: &Path) -> PodreelResult<AudioAnalysis>;
}

/// Whether the `ffprobe` binary is available on PATH.
pub fn is_ffprobe_on_path() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Analyzer backed by the system `ffprobe` binary.
///
/// Reports the container duration and no energy samples, which makes the
/// segmenter fall back to the fixed-chunk policy. A feature-extracting
/// analyzer would fill [`AudioAnalysis::energy`] instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfprobeAnalyzer;

impl AudioAnalyzer for FfprobeAnalyzer {
    fn analyze(&self, path: &Path) -> PodreelResult<AudioAnalysis> {
        Ok(AudioAnalysis {
            duration_sec: probe_duration_secs(path)?,
            energy: Vec::new(),
            sample_rate: 0,
        })
    }
}

/// Probe the duration of a media file in seconds via `ffprobe`.
pub fn probe_duration_secs(path: &Path) -> PodreelResult<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            PodreelError::invalid_input(format!(
                "failed to spawn ffprobe (is it installed and on PATH?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PodreelError::invalid_input(format!(
            "ffprobe exited with status {} for '{}': {}",
            output.status,
            path.display(),
            stderr.trim()
        )));
    }

    parse_ffprobe_duration(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the single duration line `ffprobe` prints with the options above.
pub fn parse_ffprobe_duration(stdout: &str) -> PodreelResult<f64> {
    let trimmed = stdout.trim();
    let duration: f64 = trimmed.parse().map_err(|_| {
        PodreelError::invalid_input(format!("unparseable ffprobe duration '{trimmed}'"))
    })?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(PodreelError::invalid_input(format!(
            "ffprobe reported a non-positive duration ({duration})"
        )));
    }
    Ok(duration)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
