use std::path::PathBuf;

use clap::Parser;
use podreel::{
    CaptionStyle, FfprobeAnalyzer, Resolution, RunEnv, RunRequest, VideoConfig, VisualStyle,
    WhisperCliTranscriber, create_backend, generate_video, is_whisper_on_path,
};

#[derive(Parser, Debug)]
#[command(name = "podreel", version, about = "Turn narrated audio into a rendered video")]
struct Cli {
    /// Input narration audio file.
    audio: PathBuf,

    /// Directory of slide images (slides style).
    visuals: Option<PathBuf>,

    /// Output video path.
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Visual style: slides, broll, or captions-only.
    #[arg(short, long, default_value = "broll", value_parser = parse_style)]
    style: VisualStyle,

    /// Output resolution as WIDTHxHEIGHT.
    #[arg(long, default_value = "1920x1080", value_parser = parse_resolution)]
    resolution: Resolution,

    /// Output frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Caption style: modern, minimal, bold, or mobile.
    #[arg(long = "caption-style", default_value = "modern", value_parser = parse_caption_style)]
    caption_style: CaptionStyle,

    /// Disable on-screen captions.
    #[arg(long, default_value_t = false)]
    no_captions: bool,

    /// Hook text shown during the opening seconds.
    #[arg(long)]
    hook: Option<String>,

    /// Whisper model used for transcription (when whisper is on PATH).
    #[arg(long, default_value = "base")]
    whisper_model: String,

    /// Skip transcription even when whisper is available.
    #[arg(long, default_value_t = false)]
    no_transcribe: bool,

    /// Write a sidecar metadata JSON next to the output.
    #[arg(long, default_value_t = false)]
    metadata: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn parse_style(s: &str) -> Result<VisualStyle, String> {
    match s {
        "slides" => Ok(VisualStyle::Slides),
        "broll" => Ok(VisualStyle::Broll),
        "captions-only" => Ok(VisualStyle::CaptionsOnly),
        other => Err(format!(
            "unknown style '{other}' (expected slides, broll, or captions-only)"
        )),
    }
}

fn parse_caption_style(s: &str) -> Result<CaptionStyle, String> {
    match s {
        "modern" => Ok(CaptionStyle::Modern),
        "minimal" => Ok(CaptionStyle::Minimal),
        "bold" => Ok(CaptionStyle::Bold),
        "mobile" => Ok(CaptionStyle::Mobile),
        other => Err(format!(
            "unknown caption style '{other}' (expected modern, minimal, bold, or mobile)"
        )),
    }
}

fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width: u32 = w.parse().map_err(|_| format!("bad width '{w}'"))?;
    let height: u32 = h.parse().map_err(|_| format!("bad height '{h}'"))?;
    Ok(Resolution { width, height })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config = VideoConfig {
        resolution: cli.resolution,
        fps: cli.fps,
        captions_enabled: !cli.no_captions,
        caption_style: cli.caption_style,
        ..VideoConfig::default()
    };

    let transcriber = if cli.no_transcribe {
        None
    } else if is_whisper_on_path() {
        Some(WhisperCliTranscriber {
            model: cli.whisper_model.clone(),
        })
    } else {
        tracing::warn!("whisper not found on PATH; captions fall back to segment labels");
        None
    };

    let analyzer = FfprobeAnalyzer;
    let backend = create_backend()?;
    let env = RunEnv {
        transcriber: transcriber
            .as_ref()
            .map(|t| t as &dyn podreel::Transcriber),
        analyzer: &analyzer,
        provider: None,
        backend: backend.as_ref(),
    };

    let req = RunRequest {
        audio: cli.audio,
        assets_dir: cli.visuals,
        out_path: cli.output,
        style: cli.style,
        hook_text: cli.hook,
        write_metadata: cli.metadata,
    };

    let report = generate_video(&req, &config, &env)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    eprintln!(
        "wrote {} ({:.1}s, {} segments)",
        report.output_video.display(),
        report.duration_sec,
        report.segments.len()
    );
    Ok(())
}
