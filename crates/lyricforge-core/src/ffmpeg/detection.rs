//! FFmpeg Detection Module
//!
//! Locates system-installed ffmpeg/ffprobe binaries: common install
//! locations first, then a PATH search.

use std::path::PathBuf;
use std::process::Command;

use super::{FFmpegError, FFmpegResult};

/// Information about a detected FFmpeg installation
#[derive(Debug, Clone)]
pub struct FFmpegInfo {
    /// Path to the ffmpeg binary
    pub ffmpeg_path: PathBuf,
    /// Path to the ffprobe binary
    pub ffprobe_path: PathBuf,
    /// FFmpeg version string
    pub version: String,
}

/// Detects FFmpeg from the system.
pub fn detect_system_ffmpeg() -> FFmpegResult<FFmpegInfo> {
    let ffmpeg_path = find_binary("ffmpeg")?;
    let ffprobe_path = find_binary("ffprobe")?;
    let version = get_ffmpeg_version(&ffmpeg_path)?;

    Ok(FFmpegInfo {
        ffmpeg_path,
        ffprobe_path,
        version,
    })
}

/// Common install locations checked before falling back to PATH.
fn common_binary_dirs() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        vec![
            PathBuf::from("C:\\ffmpeg\\bin"),
            PathBuf::from("C:\\Program Files\\ffmpeg\\bin"),
        ]
    }

    #[cfg(not(target_os = "windows"))]
    {
        vec![
            PathBuf::from("/usr/bin"),
            PathBuf::from("/usr/local/bin"),
            PathBuf::from("/opt/homebrew/bin"),
        ]
    }
}

fn find_binary(name: &str) -> FFmpegResult<PathBuf> {
    #[cfg(target_os = "windows")]
    let file_name = format!("{name}.exe");

    #[cfg(not(target_os = "windows"))]
    let file_name = name.to_string();

    for dir in common_binary_dirs() {
        let candidate = dir.join(&file_name);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // Fall back to PATH search using `where` (Windows) or `which` (Unix)
    #[cfg(target_os = "windows")]
    let lookup = "where";

    #[cfg(not(target_os = "windows"))]
    let lookup = "which";

    let output = Command::new(lookup)
        .arg(name)
        .output()
        .map_err(|_| FFmpegError::NotFound)?;

    if output.status.success() {
        let path_str = String::from_utf8_lossy(&output.stdout);
        if let Some(first_line) = path_str.lines().next() {
            let trimmed = first_line.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }
    }

    Err(FFmpegError::NotFound)
}

/// Reads the version line from `ffmpeg -version`.
fn get_ffmpeg_version(ffmpeg_path: &PathBuf) -> FFmpegResult<String> {
    let output = Command::new(ffmpeg_path)
        .arg("-version")
        .output()
        .map_err(|_| FFmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FFmpegError::NotFound);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout
        .lines()
        .next()
        .unwrap_or("unknown")
        .trim()
        .to_string();

    Ok(version)
}
