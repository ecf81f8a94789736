//! Render Engine Seam
//!
//! The external renderer as a dependency object: consumes a source file
//! and a compiled overlay chain, produces an encoded output file. The
//! FFmpeg-backed implementation is the production engine; tests substitute
//! failing or recording doubles.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::ffmpeg::{EncodeSettings, FFmpegRunner, RenderProgress};
use crate::overlay::OverlayChain;
use crate::CoreResult;

/// External renderer consuming a filter chain and producing a video file.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Renders `chain` onto `input`, writing the encoded result to
    /// `output`. Must kill any spawned work when `deadline` elapses and
    /// surface the distinguished timeout error.
    async fn render(
        &self,
        input: &Path,
        chain: &OverlayChain,
        settings: &EncodeSettings,
        output: &Path,
        deadline: Duration,
    ) -> CoreResult<()>;
}

/// FFmpeg-backed render engine.
pub struct FfmpegEngine {
    runner: FFmpegRunner,
}

impl FfmpegEngine {
    pub fn new(runner: FFmpegRunner) -> Self {
        Self { runner }
    }

    /// Builds an engine from the system FFmpeg installation.
    pub fn from_system() -> CoreResult<Self> {
        Ok(Self::new(FFmpegRunner::from_system()?))
    }
}

#[async_trait]
impl RenderEngine for FfmpegEngine {
    async fn render(
        &self,
        input: &Path,
        chain: &OverlayChain,
        settings: &EncodeSettings,
        output: &Path,
        deadline: Duration,
    ) -> CoreResult<()> {
        // Probe is best-effort: it only feeds progress percentage and logs.
        let source = match self.runner.probe(input).await {
            Ok(info) => {
                info!(
                    duration_sec = info.duration_sec,
                    has_audio = info.has_audio,
                    "source probed"
                );
                Some(info)
            }
            Err(e) => {
                warn!("source probe failed: {}", e);
                None
            }
        };

        let (tx, mut rx) = mpsc::channel::<RenderProgress>(16);
        let progress_task = tokio::spawn(async move {
            while let Some(progress) = rx.recv().await {
                match progress.percent {
                    Some(percent) => debug!(
                        out_time_sec = progress.out_time_sec,
                        percent, "render progress"
                    ),
                    None => debug!(out_time_sec = progress.out_time_sec, "render progress"),
                }
            }
        });

        let result = self
            .runner
            .render_overlays(
                input,
                chain,
                settings,
                output,
                source.map(|s| s.duration_sec),
                Some(tx),
                Some(deadline),
            )
            .await;

        let _ = progress_task.await;
        result.map_err(Into::into)
    }
}
