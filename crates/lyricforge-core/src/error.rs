//! Lyricforge Error Definitions
//!
//! Defines the error taxonomy used throughout the render pipeline.
//! Input errors are the only 4xx-equivalent class; everything else is a
//! server-side failure. Bookkeeping (project store) errors never appear
//! here; they are swallowed at the orchestrator and logged only.

use thiserror::Error;

use crate::ffmpeg::FFmpegError;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Input Errors (4xx-equivalent, rejected before any external call)
    // =========================================================================
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // =========================================================================
    // Pipeline Errors (fatal, no retry)
    // =========================================================================
    #[error("Source fetch failed: {0}")]
    FetchFailed(String),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Render timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// True for errors caused by the caller's input (the 4xx-equivalent
    /// class); false for upstream/engine/store failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

impl From<FFmpegError> for CoreError {
    fn from(err: FFmpegError) -> Self {
        match err {
            FFmpegError::Timeout(secs) => Self::Timeout(secs),
            other => Self::RenderFailed(other.to_string()),
        }
    }
}
