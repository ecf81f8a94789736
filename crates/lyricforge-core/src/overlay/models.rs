//! Overlay Operation Model

use std::path::PathBuf;

use crate::style::{escape_drawtext_text, Rgb, Rgba};
use crate::TimeSec;

/// One instruction compositing a single text cue onto a visual stream for
/// its active time window.
///
/// Outside `[window_start, window_end]` the operation has no visible
/// effect: visibility is a window-gated enable condition, not trimming.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayOp {
    /// Drawtext-escaped caption text
    pub text: String,
    pub window_start: TimeSec,
    pub window_end: TimeSec,
    /// Horizontal position expression
    pub x_expr: String,
    /// Vertical position expression (time-parametrized for slide/pop)
    pub y_expr: String,
    /// Alpha expression (time-parametrized for fade)
    pub alpha_expr: String,
    /// Caption box background color with alpha
    pub box_color: Rgba,
    /// Foreground text color
    pub font_color: Rgb,
    /// Font size in pixels
    pub font_size_px: u32,
    /// Explicit host font file; `None` uses the renderer default
    pub font_file: Option<PathBuf>,
}

impl OverlayOp {
    /// Renders the operation as a single drawtext filter between two
    /// stream labels: `[in]drawtext=...[out]`.
    pub fn to_filter_string(&self, input_label: &str, output_label: &str) -> String {
        let mut filter = format!(
            "drawtext=text='{}':fontcolor=0x{}:fontsize={}:x='{}':y='{}':box=1:boxcolor=0x{}@{}:boxborderw=10:alpha='{}':enable='between(t,{},{})'",
            self.text,
            self.font_color.to_hex(),
            self.font_size_px,
            self.x_expr,
            self.y_expr,
            self.box_color.rgb.to_hex(),
            self.box_color.alpha,
            self.alpha_expr,
            self.window_start,
            self.window_end,
        );

        if let Some(font_file) = &self.font_file {
            filter.push_str(&format!(
                ":fontfile='{}'",
                escape_drawtext_text(&font_file.to_string_lossy())
            ));
        }

        format!("[{input_label}]{filter}[{output_label}]")
    }
}
