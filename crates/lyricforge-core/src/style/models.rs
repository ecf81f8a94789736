//! Style Configuration Models

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// =============================================================================
// Enumerated Variants
// =============================================================================

/// Caption animation kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    /// Alpha ramp in/out at the window edges
    Fade,
    /// Text eases up into its anchor at window start
    Slide,
    /// Text snaps down onto its anchor shortly after window start
    Pop,
    /// No time-based modulation
    #[default]
    None,
}

/// Horizontal alignment of caption text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical position of captions on screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Top,
    Middle,
    #[default]
    Bottom,
}

// =============================================================================
// Colors
// =============================================================================

/// RGB color value (0-255 per channel)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Converts to a 6-hex-digit string (e.g. `ff0000`)
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// RGB color with a separate alpha channel in [0,1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl Rgba {
    pub fn new(rgb: Rgb, alpha: f64) -> Self {
        Self {
            rgb,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

// =============================================================================
// Style Configuration
// =============================================================================

/// User-chosen caption style preset.
///
/// This is a closed record: unknown `animation`/`align`/`position` values
/// are rejected at the serde boundary rather than silently defaulted.
/// Color strings are loose on purpose (`#RRGGBB`, bare 6-hex, or
/// `rgba(r,g,b,a)`) and normalized by the resolver with documented
/// fallbacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    pub font_family: String,
    /// Font size in pixels; must be positive
    pub font_size: f64,
    /// Foreground text color
    pub color: String,
    /// Caption box background color, optionally carrying alpha
    pub background: String,
    pub animation: Animation,
    pub align: Align,
    pub position: Position,
    /// Static text opacity in [0,1]
    pub opacity: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 32.0,
            color: "#ffffff".to_string(),
            background: "rgba(0,0,0,0.5)".to_string(),
            animation: Animation::None,
            align: Align::Center,
            position: Position::Bottom,
            opacity: 1.0,
        }
    }
}

impl StyleConfig {
    /// Validates numeric fields; color strings are handled by the resolver
    /// fallbacks and never fail.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.font_size > 0.0) {
            return Err(CoreError::InvalidRequest(format!(
                "fontSize must be positive, got {}",
                self.font_size
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(CoreError::InvalidRequest(format!(
                "opacity must be within [0,1], got {}",
                self.opacity
            )));
        }
        Ok(())
    }
}
