//! Storage Data Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::captions::CaptionCue;
use crate::style::StyleConfig;
use crate::ProjectId;

/// Resource kind accepted by the object store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Video,
    Raw,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Raw => "raw",
        }
    }
}

/// Lifecycle status of a project record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Uploaded,
    Rendering,
    Completed,
    Error,
}

/// Per-render metadata document kept in the `projects` collection.
///
/// Created at upload time, mutated once at render completion (status
/// `completed`, `finalUrl` set) or on failure (status `error`,
/// `errorMessage` set).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub video_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srt_url: Option<String>,
    pub lyrics: Vec<CaptionCue>,
    pub style: StyleConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// Creates a fresh record in the `uploaded` state.
    pub fn new(id: &str, video_url: &str, lyrics: Vec<CaptionCue>, style: StyleConfig) -> Self {
        Self {
            id: id.to_string(),
            video_url: video_url.to_string(),
            srt_url: None,
            lyrics,
            style,
            final_url: None,
            status: ProjectStatus::Uploaded,
            error_message: None,
            created_at: Utc::now(),
        }
    }
}
