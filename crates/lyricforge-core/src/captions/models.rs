//! Caption Data Models

use serde::{Deserialize, Serialize};

use crate::TimeSec;

/// One timed caption entry.
///
/// Cues are immutable once parsed and keep their source-document order;
/// no sorting by time is ever applied. Out-of-order or overlapping cues
/// are passed through unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionCue {
    /// Sequence index from the source document (1-based, not required unique)
    pub index: u32,
    /// Window start in seconds
    pub start_time: TimeSec,
    /// Window end in seconds (> start)
    pub end_time: TimeSec,
    /// Caption text; may be empty
    pub text: String,
}

impl CaptionCue {
    /// Creates a new cue
    pub fn new(index: u32, start_time: TimeSec, end_time: TimeSec, text: &str) -> Self {
        Self {
            index,
            start_time,
            end_time,
            text: text.to_string(),
        }
    }

    /// Window duration in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_time - self.start_time
    }
}

/// Fixed fallback fixture used when no caption file is supplied.
///
/// This is a static sample, not inferred from content.
pub fn sample_cues() -> Vec<CaptionCue> {
    vec![
        CaptionCue::new(1, 0.5, 3.0, "Welcome to Lyricforge"),
        CaptionCue::new(2, 3.5, 6.0, "Create beautiful lyric videos"),
        CaptionCue::new(3, 6.5, 9.0, "With stunning animations"),
        CaptionCue::new(4, 9.5, 12.0, "And professional styles"),
    ]
}
