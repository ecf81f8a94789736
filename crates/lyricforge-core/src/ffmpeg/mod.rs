//! FFmpeg Integration Module
//!
//! Drives the external renderer: system binary discovery, source probing,
//! and overlay-chain rendering with fixed streaming-friendly encode
//! parameters. FFmpeg is treated strictly as an external collaborator:
//! it consumes a filter chain and produces an encoded file.

mod detection;
mod runner;

pub use detection::*;
pub use runner::*;

/// FFmpeg-related error types
#[derive(Debug, thiserror::Error)]
pub enum FFmpegError {
    #[error("FFmpeg not found. Install FFmpeg or add it to PATH.")]
    NotFound,

    #[error("FFmpeg execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid input file: {0}")]
    InvalidInput(String),

    #[error("FFprobe error: {0}")]
    ProbeError(String),

    #[error("Process error: {0}")]
    ProcessError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Render timed out after {0} seconds")]
    Timeout(u64),
}

pub type FFmpegResult<T> = Result<T, FFmpegError>;
