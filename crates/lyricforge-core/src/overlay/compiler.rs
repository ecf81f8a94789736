//! Overlay Chain Compiler
//!
//! Builds the ordered drawtext chain for a caption sequence. Stream
//! handles are generated from a monotonic counter so no two operations
//! ever write to the same label: operation 0 consumes the decoded video
//! stream `0:v` and produces `v1`, operation *i* consumes `v{i}` and
//! produces `v{i+1}`. The last handle is what the encode stage maps.

use crate::captions::CaptionCue;
use crate::style::{escape_drawtext_text, ResolvedStyle};

use super::OverlayOp;

/// Stream label of the decoded source video
pub const SOURCE_VIDEO_LABEL: &str = "0:v";

/// An ordered, append-only chain of overlay operations.
///
/// Built once per render request and never mutated afterwards. Chaining
/// guarantees a deterministic stacking order: cues with overlapping
/// windows stay simultaneously visible because each operation is
/// independently time-gated.
#[derive(Clone, Debug)]
pub struct OverlayChain {
    ops: Vec<OverlayOp>,
}

impl OverlayChain {
    /// Compiles one operation per cue, in document order.
    ///
    /// Cues with empty or whitespace text still produce a (harmless,
    /// invisible) operation. Callers validate against empty cue
    /// sequences before compiling; see the render orchestrator.
    pub fn compile(cues: &[CaptionCue], style: &ResolvedStyle) -> Self {
        let ops = cues
            .iter()
            .map(|cue| OverlayOp {
                text: escape_drawtext_text(&cue.text),
                window_start: cue.start_time,
                window_end: cue.end_time,
                x_expr: style.x_expr().to_string(),
                y_expr: style.y_expr(cue.start_time, cue.end_time),
                alpha_expr: style.alpha_expr(cue.start_time, cue.end_time),
                box_color: style.box_color,
                font_color: style.font_color,
                font_size_px: style.font_size_px,
                font_file: style.font_file.clone(),
            })
            .collect();

        Self { ops }
    }

    /// The compiled operations, in document order.
    pub fn ops(&self) -> &[OverlayOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Input stream label consumed by operation `index`.
    fn input_label(&self, index: usize) -> String {
        if index == 0 {
            SOURCE_VIDEO_LABEL.to_string()
        } else {
            format!("v{index}")
        }
    }

    /// Output stream label produced by operation `index`.
    fn output_label(&self, index: usize) -> String {
        format!("v{}", index + 1)
    }

    /// The final output handle, handed to the encode stage.
    pub fn final_label(&self) -> String {
        format!("v{}", self.ops.len())
    }

    /// Assembles the full `filter_complex` string: one drawtext filter per
    /// operation, `;`-joined, each consuming the previous output handle.
    pub fn to_filter_complex(&self) -> String {
        self.ops
            .iter()
            .enumerate()
            .map(|(i, op)| op.to_filter_string(&self.input_label(i), &self.output_label(i)))
            .collect::<Vec<_>>()
            .join(";")
    }
}
