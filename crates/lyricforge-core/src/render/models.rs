//! Render Request/Response Models

use serde::{Deserialize, Serialize};

use crate::captions::CaptionCue;
use crate::style::StyleConfig;
use crate::ProjectId;

/// A render request: source video reference, timed captions, style preset,
/// and an optional project identifier for bookkeeping.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    /// Fetchable URL of the source video
    pub video_url: String,
    /// Ordered caption sequence; must be non-empty
    pub lyrics: Vec<CaptionCue>,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
}

/// A successful render result
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutcome {
    /// Object-store location of the rendered output
    pub url: String,
}

/// Linear pipeline states; no backward transitions. `Failed` is terminal
/// and reachable from any non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPhase {
    Received,
    SourceFetched,
    Compiled,
    Rendering,
    Uploaded,
    StoreUpdated,
    StoreUpdateFailed,
    Done,
    Failed,
}

impl RenderPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::SourceFetched => "source-fetched",
            Self::Compiled => "compiled",
            Self::Rendering => "rendering",
            Self::Uploaded => "uploaded",
            Self::StoreUpdated => "store-updated",
            Self::StoreUpdateFailed => "store-update-failed",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::sample_cues;

    #[test]
    fn test_request_deserializes_from_wire_shape() {
        let json = r#"{
            "videoUrl": "https://cdn.example/in.mp4",
            "lyrics": [{"index":1,"startTime":0.5,"endTime":3.0,"text":"Hello"}],
            "style": {"fontSize": 40, "animation": "fade"},
            "projectId": "p1"
        }"#;

        let request: RenderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.video_url, "https://cdn.example/in.mp4");
        assert_eq!(request.lyrics.len(), 1);
        assert_eq!(request.style.font_size, 40.0);
        assert_eq!(request.project_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_request_style_defaults_when_absent() {
        let json = r#"{"videoUrl": "https://x/y.mp4", "lyrics": []}"#;
        let request: RenderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.style.font_size, 32.0);
        assert!(request.project_id.is_none());
    }

    #[test]
    fn test_outcome_wire_shape() {
        let outcome = RenderOutcome {
            url: "https://cdn.example/out.mp4".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"url":"https://cdn.example/out.mp4"}"#
        );
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(RenderPhase::SourceFetched.as_str(), "source-fetched");
        assert_eq!(RenderPhase::StoreUpdateFailed.as_str(), "store-update-failed");
    }

    #[test]
    fn test_request_round_trip() {
        let request = RenderRequest {
            video_url: "https://x/y.mp4".to_string(),
            lyrics: sample_cues(),
            style: Default::default(),
            project_id: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("projectId"));
        let back: RenderRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lyrics.len(), 4);
    }
}
