//! FFmpeg Runner Module
//!
//! Executes the overlay render: one ffmpeg invocation per request,
//! consuming the compiled drawtext chain and producing the encoded
//! output file. Also probes sources for duration/audio via ffprobe.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::overlay::OverlayChain;

use super::{detect_system_ffmpeg, FFmpegError, FFmpegInfo, FFmpegResult};

/// Characters of ffmpeg stderr kept in the surfaced error message; the
/// full output goes to operator-side logs only.
const DIAGNOSTIC_TAIL_CHARS: usize = 500;

// =============================================================================
// Types
// =============================================================================

/// Progress information for a running render
#[derive(Debug, Clone)]
pub struct RenderProgress {
    /// Current output position in seconds
    pub out_time_sec: f64,
    /// Progress percentage (0.0 - 100.0), when source duration is known
    pub percent: Option<f32>,
}

/// Source media facts consumed by the render path
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    /// Duration in seconds
    pub duration_sec: f64,
    /// Whether the source carries an audio stream
    pub has_audio: bool,
}

/// Fixed output encoding parameters.
///
/// The defaults are the streaming-friendly low-latency contract: H.264 +
/// AAC, ultrafast preset, faststart container layout, audio passed
/// through when present.
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    /// Video codec (e.g. "libx264")
    pub video_codec: String,
    /// Audio codec (e.g. "aac")
    pub audio_codec: String,
    /// Encoder preset
    pub preset: String,
    /// Encoder tune
    pub tune: String,
    /// Audio bitrate (e.g. "192k")
    pub audio_bitrate: String,
    /// Container movflags
    pub movflags: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "ultrafast".to_string(),
            tune: "zerolatency".to_string(),
            audio_bitrate: "192k".to_string(),
            movflags: "+faststart".to_string(),
        }
    }
}

// =============================================================================
// Runner
// =============================================================================

/// FFmpeg runner for render and probe operations
#[derive(Clone)]
pub struct FFmpegRunner {
    info: Arc<FFmpegInfo>,
}

impl FFmpegRunner {
    /// Creates a runner from a detected FFmpeg installation
    pub fn new(info: FFmpegInfo) -> Self {
        Self {
            info: Arc::new(info),
        }
    }

    /// Creates a runner by detecting the system FFmpeg installation
    pub fn from_system() -> FFmpegResult<Self> {
        Ok(Self::new(detect_system_ffmpeg()?))
    }

    pub fn info(&self) -> &FFmpegInfo {
        &self.info
    }

    /// Probes a media file for duration and audio presence.
    pub async fn probe(&self, input: &Path) -> FFmpegResult<SourceInfo> {
        if !input.exists() {
            return Err(FFmpegError::InvalidInput(format!(
                "Input file does not exist: {}",
                input.display()
            )));
        }

        let output = tokio::process::Command::new(&self.info.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                &input.to_string_lossy(),
            ])
            .output()
            .await
            .map_err(FFmpegError::ProcessError)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FFmpegError::ProbeError(format!(
                "FFprobe failed: {}",
                stderr
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        parse_probe_output(&json_str)
    }

    /// Renders the compiled overlay chain onto the source video.
    ///
    /// The chain's final handle is mapped as the output video stream;
    /// audio is passed through when present (`-map 0:a?`). When `deadline`
    /// elapses the subprocess is killed and reaped before
    /// [`FFmpegError::Timeout`] is returned; an abandoned wait never
    /// leaves a renderer running.
    pub async fn render_overlays(
        &self,
        input: &Path,
        chain: &OverlayChain,
        settings: &EncodeSettings,
        output: &Path,
        duration_hint: Option<f64>,
        progress_tx: Option<mpsc::Sender<RenderProgress>>,
        deadline: Option<Duration>,
    ) -> FFmpegResult<()> {
        if !input.exists() {
            return Err(FFmpegError::InvalidInput(format!(
                "Input file does not exist: {}",
                input.display()
            )));
        }
        if chain.is_empty() {
            return Err(FFmpegError::InvalidInput(
                "Overlay chain has no operations".to_string(),
            ));
        }

        let args = build_render_args(input, chain, settings, output);
        debug!("ffmpeg args: {:?}", args);

        let mut cmd = tokio::process::Command::new(&self.info.ffmpeg_path);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(FFmpegError::ProcessError)?;

        if let Some(tx) = progress_tx {
            if let Some(stdout) = child.stdout.take() {
                spawn_progress_reader(stdout, duration_hint, tx);
            }
        }

        // Collect stderr concurrently so a chatty renderer cannot fill the
        // pipe and stall itself.
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                use tokio::io::AsyncReadExt;
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        let status = match deadline {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(waited) => waited.map_err(FFmpegError::ProcessError)?,
                Err(_) => {
                    warn!("render deadline elapsed, killing ffmpeg");
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    return Err(FFmpegError::Timeout(limit.as_secs()));
                }
            },
            None => child.wait().await.map_err(FFmpegError::ProcessError)?,
        };

        let diagnostics = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            debug!("ffmpeg stderr:\n{}", diagnostics);
            return Err(FFmpegError::ExecutionFailed(format!(
                "ffmpeg exited with {}: {}",
                status,
                diagnostic_tail(&diagnostics, DIAGNOSTIC_TAIL_CHARS).trim()
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Builds the full ffmpeg argument list for an overlay render.
pub fn build_render_args(
    input: &Path,
    chain: &OverlayChain,
    settings: &EncodeSettings,
    output: &Path,
) -> Vec<String> {
    vec![
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-filter_complex".to_string(),
        chain.to_filter_complex(),
        "-map".to_string(),
        format!("[{}]", chain.final_label()),
        "-map".to_string(),
        "0:a?".to_string(),
        "-c:v".to_string(),
        settings.video_codec.clone(),
        "-preset".to_string(),
        settings.preset.clone(),
        "-tune".to_string(),
        settings.tune.clone(),
        "-c:a".to_string(),
        settings.audio_codec.clone(),
        "-b:a".to_string(),
        settings.audio_bitrate.clone(),
        "-movflags".to_string(),
        settings.movflags.clone(),
        "-progress".to_string(),
        "pipe:1".to_string(),
        "-y".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

fn spawn_progress_reader(
    stdout: tokio::process::ChildStdout,
    duration_hint: Option<f64>,
    tx: mpsc::Sender<RenderProgress>,
) {
    tokio::spawn(async move {
        use tokio::io::{AsyncBufReadExt, BufReader};
        let reader = BufReader::new(stdout);
        let mut lines = reader.lines();
        let mut current_time = 0.0f64;

        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(value) = line.strip_prefix("out_time_ms=") {
                // out_time_ms is microseconds despite the name
                let us: u64 = value.trim().parse().unwrap_or(0);
                current_time = us as f64 / 1_000_000.0;
            } else if line.starts_with("progress=") {
                let percent = duration_hint
                    .filter(|d| *d > 0.0)
                    .map(|d| ((current_time / d) * 100.0).min(100.0) as f32);

                let update = RenderProgress {
                    out_time_sec: current_time,
                    percent,
                };
                if tx.send(update).await.is_err() {
                    break;
                }
            }
        }
    });
}

/// Parses ffprobe JSON output into the facts the render path needs.
fn parse_probe_output(json_str: &str) -> FFmpegResult<SourceInfo> {
    let json: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FFmpegError::ParseError(format!("Failed to parse FFprobe output: {}", e)))?;

    let duration_sec = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    let has_audio = json
        .get("streams")
        .and_then(|s| s.as_array())
        .is_some_and(|streams| {
            streams
                .iter()
                .any(|s| s.get("codec_type").and_then(|c| c.as_str()) == Some("audio"))
        });

    Ok(SourceInfo {
        duration_sec,
        has_audio,
    })
}

/// Last `max_chars` characters of a diagnostic blob.
fn diagnostic_tail(s: &str, max_chars: usize) -> &str {
    match s.char_indices().rev().nth(max_chars.saturating_sub(1)) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::CaptionCue;
    use crate::style::{ResolvedStyle, StyleConfig};
    use std::path::PathBuf;

    fn test_chain() -> OverlayChain {
        let style = ResolvedStyle::resolve_with_fonts(&StyleConfig::default(), &[]).unwrap();
        let cues = vec![
            CaptionCue::new(1, 0.5, 3.0, "Hello"),
            CaptionCue::new(2, 3.5, 6.0, "World"),
        ];
        OverlayChain::compile(&cues, &style)
    }

    #[test]
    fn test_encode_settings_default_contract() {
        let settings = EncodeSettings::default();
        assert_eq!(settings.video_codec, "libx264");
        assert_eq!(settings.audio_codec, "aac");
        assert_eq!(settings.preset, "ultrafast");
        assert_eq!(settings.tune, "zerolatency");
        assert_eq!(settings.movflags, "+faststart");
        assert_eq!(settings.audio_bitrate, "192k");
    }

    #[test]
    fn test_build_render_args() {
        let chain = test_chain();
        let args = build_render_args(
            &PathBuf::from("/tmp/in.mp4"),
            &chain,
            &EncodeSettings::default(),
            &PathBuf::from("/tmp/out.mp4"),
        );

        let joined = args.join(" ");
        assert!(joined.starts_with("-i /tmp/in.mp4 -filter_complex "));
        assert!(joined.contains("-map [v2]"));
        assert!(joined.contains("-map 0:a?"));
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-preset ultrafast"));
        assert!(joined.contains("-tune zerolatency"));
        assert!(joined.contains("-b:a 192k"));
        assert!(joined.contains("-movflags +faststart"));
        assert!(joined.ends_with("-y /tmp/out.mp4"));
    }

    #[test]
    fn test_render_args_carry_full_chain() {
        let chain = test_chain();
        let args = build_render_args(
            &PathBuf::from("in.mp4"),
            &chain,
            &EncodeSettings::default(),
            &PathBuf::from("out.mp4"),
        );

        let complex_pos = args.iter().position(|a| a == "-filter_complex").unwrap();
        let complex = &args[complex_pos + 1];
        assert_eq!(complex, &chain.to_filter_complex());
        assert_eq!(complex.matches("drawtext=").count(), 2);
    }

    #[test]
    fn test_parse_probe_output() {
        let json = r#"{
            "format": { "duration": "10.5", "format_name": "mp4" },
            "streams": [
                { "codec_type": "video", "codec_name": "h264" },
                { "codec_type": "audio", "codec_name": "aac" }
            ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.duration_sec, 10.5);
        assert!(info.has_audio);
    }

    #[test]
    fn test_parse_probe_output_no_audio() {
        let json = r#"{
            "format": { "duration": "2.0" },
            "streams": [ { "codec_type": "video" } ]
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert!(!info.has_audio);
    }

    #[test]
    fn test_parse_probe_output_invalid_json() {
        assert!(matches!(
            parse_probe_output("not json"),
            Err(FFmpegError::ParseError(_))
        ));
    }

    #[test]
    fn test_diagnostic_tail() {
        assert_eq!(diagnostic_tail("short", 500), "short");
        let long = "x".repeat(600);
        assert_eq!(diagnostic_tail(&long, 500).len(), 500);
    }
}
