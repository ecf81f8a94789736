//! Style Resolver
//!
//! Normalizes a `StyleConfig` into renderer primitives: hex colors with
//! separate alpha, fixed-margin anchor expressions, per-cue animation
//! expressions, a host font file, and drawtext-safe text escaping.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::{Align, Animation, Position, Rgb, Rgba, StyleConfig};
use crate::{CoreResult, TimeSec};

// =============================================================================
// Constants
// =============================================================================

/// Horizontal margin from the frame edge, in pixels
pub const MARGIN_X: u32 = 50;

/// Vertical margin from the frame edge, in pixels
pub const MARGIN_Y: u32 = 50;

/// Background box alpha used when the background color carries none
pub const DEFAULT_BACKGROUND_ALPHA: f64 = 0.1;

/// Fade ramp duration at each window edge, in seconds
const FADE_RAMP_SEC: f64 = 0.25;

/// Slide ease-in duration, in seconds
const SLIDE_RAMP_SEC: f64 = 0.3;

/// Slide start offset below the anchor, in pixels
const SLIDE_OFFSET_PX: u32 = 20;

/// Pop hold duration, in seconds
const POP_HOLD_SEC: f64 = 0.2;

/// Pop offset above the anchor, in pixels
const POP_OFFSET_PX: u32 = 5;

/// Ordered host font candidates; the first that exists is used. When none
/// exist, no font file is set and the renderer's built-in default applies.
pub const FONT_CANDIDATES: &[&str] = &[
    "C:/Windows/Fonts/arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
];

// =============================================================================
// Color Normalization
// =============================================================================

fn rgba_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)rgba\s*\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*([0-9.]+)\s*\)")
            .expect("valid regex")
    })
}

/// Parses an `rgba(r,g,b,a)` string. Out-of-range components are clamped
/// (r/g/b to [0,255], alpha to [0,1]), never an error.
pub fn parse_rgba(color: &str) -> Option<Rgba> {
    let caps = rgba_pattern().captures(color)?;

    let channel = |i: usize| -> Option<u8> {
        let value: f64 = caps.get(i)?.as_str().parse().ok()?;
        Some(value.clamp(0.0, 255.0) as u8)
    };

    let rgb = Rgb::new(channel(1)?, channel(2)?, channel(3)?);
    let alpha: f64 = caps.get(4)?.as_str().parse().ok()?;

    Some(Rgba::new(rgb, alpha))
}

fn parse_hex6(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    Some(Rgb::new(
        u8::from_str_radix(&hex[0..2], 16).ok()?,
        u8::from_str_radix(&hex[2..4], 16).ok()?,
        u8::from_str_radix(&hex[4..6], 16).ok()?,
    ))
}

/// Resolves a color string to an RGB triple, dropping any alpha.
///
/// Accepts `#RRGGBB`, a bare 6-hex-digit string, or `rgba(r,g,b,a)`;
/// anything else resolves to `fallback`.
pub fn resolve_color(color: &str, fallback: Rgb) -> Rgb {
    let color = color.trim();

    if let Some(stripped) = color.strip_prefix('#') {
        if let Some(rgb) = parse_hex6(stripped) {
            return rgb;
        }
    }
    if let Some(rgba) = parse_rgba(color) {
        return rgba.rgb;
    }
    if let Some(rgb) = parse_hex6(color) {
        return rgb;
    }

    debug!("unresolvable color '{}', using fallback", color);
    fallback
}

/// Resolves a color string to RGB plus alpha.
///
/// Alpha comes from the `rgba(...)` alpha channel when present, else
/// `default_alpha`.
pub fn resolve_color_with_alpha(color: &str, default_alpha: f64, fallback: Rgb) -> Rgba {
    let rgb = resolve_color(color, fallback);
    let alpha = parse_rgba(color).map_or(default_alpha, |c| c.alpha);
    Rgba::new(rgb, alpha)
}

// =============================================================================
// Text Escaping
// =============================================================================

/// Escapes caption text for the drawtext filter: backslashes doubled,
/// colons and single quotes backslash-escaped, so literal text is never
/// interpreted as filter syntax.
pub fn escape_drawtext_text(text: &str) -> String {
    text.replace('\\', r"\\")
        .replace(':', r"\:")
        .replace('\'', r"\'")
}

// =============================================================================
// Font Selection
// =============================================================================

/// Returns the first existing font file from `candidates`.
pub fn find_font_file(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

// =============================================================================
// Resolved Style
// =============================================================================

/// A style preset normalized into renderer primitives.
///
/// Anchor expressions use drawtext's frame variables (`w`, `h`, `text_w`,
/// `text_h`); animation expressions are produced per cue, parametrized on
/// that cue's own window.
#[derive(Clone, Debug)]
pub struct ResolvedStyle {
    pub font_color: Rgb,
    pub box_color: Rgba,
    pub font_size_px: u32,
    pub font_file: Option<PathBuf>,
    pub opacity: f64,
    pub animation: Animation,
    x_anchor: String,
    y_anchor: String,
}

impl ResolvedStyle {
    /// Resolves a validated configuration, probing the host font list.
    pub fn resolve(config: &StyleConfig) -> CoreResult<Self> {
        Self::resolve_with_fonts(config, FONT_CANDIDATES)
    }

    /// Like [`resolve`](Self::resolve) with an explicit font candidate list.
    pub fn resolve_with_fonts(config: &StyleConfig, fonts: &[&str]) -> CoreResult<Self> {
        config.validate()?;

        Ok(Self {
            font_color: resolve_color(&config.color, Rgb::white()),
            box_color: resolve_color_with_alpha(
                &config.background,
                DEFAULT_BACKGROUND_ALPHA,
                Rgb::black(),
            ),
            font_size_px: config.font_size.round() as u32,
            font_file: find_font_file(fonts),
            opacity: config.opacity,
            animation: config.animation,
            x_anchor: x_anchor(config.align),
            y_anchor: y_anchor(config.position),
        })
    }

    /// Horizontal position expression; no animation moves text horizontally.
    pub fn x_expr(&self) -> &str {
        &self.x_anchor
    }

    /// Vertical position expression for a cue window `[start, end]`.
    pub fn y_expr(&self, start: TimeSec, _end: TimeSec) -> String {
        let anchor = &self.y_anchor;
        match self.animation {
            Animation::Slide => format!(
                "if(between(t,{start},{start}+{SLIDE_RAMP_SEC}), {anchor}+{SLIDE_OFFSET_PX}*(1-((t-{start})/{SLIDE_RAMP_SEC})), {anchor})"
            ),
            Animation::Pop => format!(
                "if(between(t,{start},{start}+{POP_HOLD_SEC}), {anchor}-{POP_OFFSET_PX}, {anchor})"
            ),
            Animation::Fade | Animation::None => anchor.clone(),
        }
    }

    /// Alpha expression for a cue window `[start, end]`.
    ///
    /// Fade ramps 0 → configured opacity over the first quarter second and
    /// back down over the last; everything else is the static opacity.
    pub fn alpha_expr(&self, start: TimeSec, end: TimeSec) -> String {
        match self.animation {
            Animation::Fade => {
                let o = self.opacity;
                format!(
                    "if(between(t,{start},{start}+{FADE_RAMP_SEC}),{o}*(t-{start})/{FADE_RAMP_SEC}, if(between(t,{end}-{FADE_RAMP_SEC},{end}),{o}*({end}-t)/{FADE_RAMP_SEC},{o}))"
                )
            }
            _ => format!("{}", self.opacity),
        }
    }
}

/// Vertical anchor expression for a position preset (50px margins).
fn y_anchor(position: Position) -> String {
    match position {
        Position::Top => format!("{MARGIN_Y}"),
        Position::Middle => "(h-text_h)/2".to_string(),
        Position::Bottom => format!("h-text_h-{MARGIN_Y}"),
    }
}

/// Horizontal anchor expression for an alignment preset (50px margins).
fn x_anchor(align: Align) -> String {
    match align {
        Align::Left => format!("{MARGIN_X}"),
        Align::Center => "(w-text_w)/2".to_string(),
        Align::Right => format!("w-text_w-{MARGIN_X}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // -------------------------------------------------------------------------
    // Color Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_resolve_hash_hex() {
        assert_eq!(resolve_color("#ff0000", Rgb::white()).to_hex(), "ff0000");
        assert_eq!(resolve_color("#00FF7f", Rgb::white()).to_hex(), "00ff7f");
    }

    #[test]
    fn test_resolve_bare_hex() {
        assert_eq!(resolve_color("336699", Rgb::white()).to_hex(), "336699");
    }

    #[test]
    fn test_resolve_rgba_drops_alpha() {
        let rgb = resolve_color("rgba(16, 32, 64, 0.5)", Rgb::white());
        assert_eq!(rgb.to_hex(), "102040");
    }

    #[test]
    fn test_resolve_rgba_round_trips_channels() {
        // Hex encoding of (r,g,b) for in-range rgba input.
        let rgba = parse_rgba("rgba(255, 0, 128, 0.25)").unwrap();
        assert_eq!(rgba.rgb.to_hex(), "ff0080");
        assert_eq!(rgba.alpha, 0.25);
    }

    #[test]
    fn test_rgba_clamps_out_of_range_components() {
        let rgba = parse_rgba("rgba(300, 0, 0, 2.0)").unwrap();
        assert_eq!(rgba.rgb.r, 255);
        assert_eq!(rgba.alpha, 1.0);
    }

    #[test]
    fn test_unresolvable_color_falls_back() {
        assert_eq!(resolve_color("", Rgb::white()), Rgb::white());
        assert_eq!(resolve_color("cornflowerblue", Rgb::white()), Rgb::white());
        assert_eq!(resolve_color("#ff00", Rgb::black()), Rgb::black());
    }

    #[test]
    fn test_alpha_defaults_without_rgba() {
        let rgba = resolve_color_with_alpha("#000000", 0.1, Rgb::black());
        assert_eq!(rgba.alpha, 0.1);
        assert_eq!(rgba.rgb, Rgb::black());
    }

    #[test]
    fn test_alpha_taken_from_rgba() {
        let rgba = resolve_color_with_alpha("rgba(0,0,0,0.5)", 0.1, Rgb::black());
        assert_eq!(rgba.alpha, 0.5);
        assert_eq!(rgba.rgb.to_hex(), "000000");
    }

    // -------------------------------------------------------------------------
    // Escaping Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_escape_drawtext_text() {
        assert_eq!(escape_drawtext_text(r"a\b"), r"a\\b");
        assert_eq!(escape_drawtext_text("10:30"), r"10\:30");
        assert_eq!(escape_drawtext_text("don't"), r"don\'t");
        assert_eq!(escape_drawtext_text("plain"), "plain");
    }

    // -------------------------------------------------------------------------
    // Font Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_find_font_file_picks_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("font.ttf");
        let mut f = std::fs::File::create(&font).unwrap();
        f.write_all(b"\0").unwrap();

        let missing = dir.path().join("missing.ttf");
        let candidates = [missing.to_str().unwrap(), font.to_str().unwrap()];
        assert_eq!(find_font_file(&candidates), Some(font));
    }

    #[test]
    fn test_find_font_file_none_when_absent() {
        assert_eq!(find_font_file(&["/nonexistent/font.ttf"]), None);
        assert_eq!(find_font_file(&[]), None);
    }

    // -------------------------------------------------------------------------
    // Anchor and Animation Expression Tests
    // -------------------------------------------------------------------------

    fn resolved(config: &StyleConfig) -> ResolvedStyle {
        ResolvedStyle::resolve_with_fonts(config, &[]).unwrap()
    }

    #[test]
    fn test_anchor_expressions() {
        let mut config = StyleConfig::default();
        config.align = Align::Left;
        config.position = Position::Top;
        let style = resolved(&config);
        assert_eq!(style.x_expr(), "50");
        assert_eq!(style.y_expr(0.0, 1.0), "50");

        config.align = Align::Right;
        config.position = Position::Middle;
        let style = resolved(&config);
        assert_eq!(style.x_expr(), "w-text_w-50");
        assert_eq!(style.y_expr(0.0, 1.0), "(h-text_h)/2");

        config.align = Align::Center;
        config.position = Position::Bottom;
        let style = resolved(&config);
        assert_eq!(style.x_expr(), "(w-text_w)/2");
        assert_eq!(style.y_expr(0.0, 1.0), "h-text_h-50");
    }

    #[test]
    fn test_static_alpha_without_fade() {
        let mut config = StyleConfig::default();
        config.opacity = 0.8;
        let style = resolved(&config);
        assert_eq!(style.alpha_expr(1.0, 4.0), "0.8");
    }

    #[test]
    fn test_fade_ramps_to_configured_opacity() {
        let mut config = StyleConfig::default();
        config.animation = Animation::Fade;
        config.opacity = 0.9;
        let style = resolved(&config);

        let expr = style.alpha_expr(0.5, 3.0);
        assert_eq!(
            expr,
            "if(between(t,0.5,0.5+0.25),0.9*(t-0.5)/0.25, if(between(t,3-0.25,3),0.9*(3-t)/0.25,0.9))"
        );
    }

    #[test]
    fn test_slide_eases_into_anchor() {
        let mut config = StyleConfig::default();
        config.animation = Animation::Slide;
        let style = resolved(&config);

        let expr = style.y_expr(2.0, 5.0);
        assert_eq!(
            expr,
            "if(between(t,2,2+0.3), h-text_h-50+20*(1-((t-2)/0.3)), h-text_h-50)"
        );
        // Horizontal position is unaffected by slide.
        assert_eq!(style.x_expr(), "(w-text_w)/2");
    }

    #[test]
    fn test_pop_offsets_above_anchor() {
        let mut config = StyleConfig::default();
        config.animation = Animation::Pop;
        config.position = Position::Top;
        let style = resolved(&config);

        assert_eq!(style.y_expr(1.0, 2.0), "if(between(t,1,1+0.2), 50-5, 50)");
    }

    #[test]
    fn test_example_scenario_resolution() {
        // style {color:#ff0000, background:rgba(0,0,0,0.5), opacity:0.9,
        // animation:fade, align:center, position:bottom}
        let config = StyleConfig {
            color: "#ff0000".to_string(),
            background: "rgba(0,0,0,0.5)".to_string(),
            opacity: 0.9,
            animation: Animation::Fade,
            align: Align::Center,
            position: Position::Bottom,
            ..StyleConfig::default()
        };
        let style = resolved(&config);

        assert_eq!(style.font_color.to_hex(), "ff0000");
        assert_eq!(style.box_color.rgb.to_hex(), "000000");
        assert_eq!(style.box_color.alpha, 0.5);
        assert!(style.alpha_expr(0.0, 4.0).contains("0.9*"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = StyleConfig::default();
        config.opacity = 2.0;
        assert!(ResolvedStyle::resolve_with_fonts(&config, &[]).is_err());
    }
}
