//! Render Orchestrator
//!
//! Sequences a single render request: validate, fetch the source video to
//! scratch, compile the overlay chain, invoke the renderer under a
//! deadline, upload the result, then best-effort bookkeeping. Strictly
//! sequential: one fetch, one renderer invocation, one upload. Scratch
//! files are uniquely named so concurrent requests on the same host never
//! collide, and both are removed on every path. Project-store updates are
//! fire-and-forget relative to the response.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::RenderConfig;
use crate::ffmpeg::EncodeSettings;
use crate::overlay::OverlayChain;
use crate::storage::{ObjectStore, ProjectPatch, ProjectStore, ResourceKind};
use crate::style::ResolvedStyle;
use crate::{new_request_id, CoreError, CoreResult};

use super::{RenderEngine, RenderOutcome, RenderPhase, RenderRequest};

/// Orchestrates the render pipeline against explicit dependency objects.
///
/// The project store is an optional capability: when absent, bookkeeping
/// is skipped entirely rather than failing.
pub struct RenderOrchestrator {
    http: reqwest::Client,
    engine: Arc<dyn RenderEngine>,
    object_store: Arc<dyn ObjectStore>,
    project_store: Option<Arc<dyn ProjectStore>>,
    config: RenderConfig,
}

impl RenderOrchestrator {
    pub fn new(
        engine: Arc<dyn RenderEngine>,
        object_store: Arc<dyn ObjectStore>,
        project_store: Option<Arc<dyn ProjectStore>>,
        config: RenderConfig,
    ) -> CoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            engine,
            object_store,
            project_store,
            config,
        })
    }

    /// Runs one render request to completion.
    ///
    /// Input validation happens before any external call. Any fatal error
    /// aborts the remaining steps; scratch cleanup and bookkeeping still
    /// run. On success the object-store URL of the rendered output is
    /// returned.
    pub async fn render(&self, request: RenderRequest) -> CoreResult<RenderOutcome> {
        validate_request(&request)?;

        let request_id = new_request_id();
        let scratch = self.config.scratch_dir();
        let stamp = Utc::now().timestamp_millis();
        let input_path = scratch.join(format!("lyricforge-in-{stamp}-{request_id}.mp4"));
        let output_path = scratch.join(format!("lyricforge-out-{stamp}-{request_id}.mp4"));

        let mut phase = RenderPhase::Received;
        info!(
            request_id = %request_id,
            cues = request.lyrics.len(),
            phase = phase.as_str(),
            "render request accepted"
        );

        let result = self
            .run_pipeline(&request, &input_path, &output_path, &request_id, &mut phase)
            .await;

        if result.is_err() {
            phase = RenderPhase::Failed;
        }

        remove_scratch(&input_path).await;
        remove_scratch(&output_path).await;

        phase = self.record_outcome(&request, &result, phase).await;
        if phase != RenderPhase::Failed {
            phase = RenderPhase::Done;
        }

        match &result {
            Ok(outcome) => info!(
                request_id = %request_id,
                url = %outcome.url,
                phase = phase.as_str(),
                "render completed"
            ),
            Err(e) => warn!(
                request_id = %request_id,
                error = %e,
                phase = phase.as_str(),
                "render failed"
            ),
        }

        result
    }

    async fn run_pipeline(
        &self,
        request: &RenderRequest,
        input_path: &Path,
        output_path: &Path,
        request_id: &str,
        phase: &mut RenderPhase,
    ) -> CoreResult<RenderOutcome> {
        // Fetch the source video into scratch. Non-success is fatal, no retry.
        let response = self
            .http
            .get(&request.video_url)
            .send()
            .await
            .map_err(|e| CoreError::FetchFailed(format!("Failed to download source video: {}", e)))?;
        if !response.status().is_success() {
            return Err(CoreError::FetchFailed(format!(
                "Source video fetch returned {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoreError::FetchFailed(format!("Failed to read source video: {}", e)))?;
        tokio::fs::write(input_path, &bytes).await?;
        advance(phase, RenderPhase::SourceFetched, request_id);

        let style = ResolvedStyle::resolve(&request.style)?;
        let chain = OverlayChain::compile(&request.lyrics, &style);
        advance(phase, RenderPhase::Compiled, request_id);

        advance(phase, RenderPhase::Rendering, request_id);
        self.engine
            .render(
                input_path,
                &chain,
                &EncodeSettings::default(),
                output_path,
                Duration::from_secs(self.config.timeout_secs),
            )
            .await?;

        let rendered = tokio::fs::read(output_path).await?;
        let receipt = self
            .object_store
            .upload(rendered, ResourceKind::Video, &self.config.output_folder)
            .await
            .map_err(|e| CoreError::UploadFailed(e.to_string()))?;
        advance(phase, RenderPhase::Uploaded, request_id);

        Ok(RenderOutcome { url: receipt.url })
    }

    /// Best-effort bookkeeping; failures are swallowed and never change
    /// the response returned to the caller.
    async fn record_outcome(
        &self,
        request: &RenderRequest,
        result: &CoreResult<RenderOutcome>,
        phase: RenderPhase,
    ) -> RenderPhase {
        let (Some(project_id), Some(store)) =
            (request.project_id.as_ref(), self.project_store.as_ref())
        else {
            return phase;
        };

        let patch = match result {
            Ok(outcome) => ProjectPatch::completed(&outcome.url),
            Err(e) if e.is_client_error() => return phase,
            Err(e) => ProjectPatch::failed(&e.to_string()),
        };

        match store.update_fields(project_id, &patch).await {
            Ok(()) => {
                debug!(project_id = %project_id, "project record updated");
                if phase == RenderPhase::Failed {
                    phase
                } else {
                    RenderPhase::StoreUpdated
                }
            }
            Err(e) => {
                warn!(project_id = %project_id, "project store update failed (ignored): {}", e);
                if phase == RenderPhase::Failed {
                    phase
                } else {
                    RenderPhase::StoreUpdateFailed
                }
            }
        }
    }
}

fn advance(phase: &mut RenderPhase, next: RenderPhase, request_id: &str) {
    *phase = next;
    debug!(request_id, phase = next.as_str(), "phase transition");
}

fn validate_request(request: &RenderRequest) -> CoreResult<()> {
    if request.video_url.trim().is_empty() {
        return Err(CoreError::InvalidRequest("videoUrl is required".to_string()));
    }
    if request.lyrics.is_empty() {
        return Err(CoreError::InvalidRequest(
            "lyrics must be a non-empty sequence".to_string(),
        ));
    }
    request.style.validate()
}

/// Best-effort scratch removal; delete failures are swallowed.
async fn remove_scratch(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove scratch file {}: {}", path.display(), e),
    }
}
