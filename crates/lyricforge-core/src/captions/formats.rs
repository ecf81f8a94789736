//! SRT Caption Format
//!
//! Parses and exports the SubRip document format:
//!
//! ```text
//! 1
//! 00:00:01,000 --> 00:00:04,000
//! First caption text
//!
//! 2
//! 00:00:05,500 --> 00:00:08,000
//! Second caption text
//! with multiple lines
//! ```
//!
//! Malformed input is dropped, never fatal: blocks with fewer than three
//! lines or a timestamp line that does not match the two-timestamp pattern
//! are skipped silently and the rest of the document still parses.

use std::sync::OnceLock;

use regex::Regex;

use super::CaptionCue;
use crate::TimeSec;

fn block_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid regex"))
}

fn timestamp_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})")
            .expect("valid regex")
    })
}

/// Parses an SRT document into cues.
///
/// Blocks are separated by blank lines; each block is an index line, a
/// `start --> end` timestamp line, then one or more text lines. Inline
/// `<...>` markup is stripped from the text; multi-line text keeps its
/// line breaks. An index line that does not parse falls back to the
/// 1-based block position. No timestamp ordering or overlap validation is
/// performed.
pub fn parse_srt(content: &str) -> Vec<CaptionCue> {
    let mut cues = Vec::new();

    for (block_pos, block) in block_separator().split(content.trim()).enumerate() {
        let lines: Vec<&str> = block.trim().lines().collect();
        if lines.len() < 3 {
            continue;
        }

        let Some(caps) = timestamp_line().captures(lines[1]) else {
            continue;
        };
        let (Some(start), Some(end)) = (
            parse_timestamp(caps.get(1).map_or("", |m| m.as_str())),
            parse_timestamp(caps.get(2).map_or("", |m| m.as_str())),
        ) else {
            continue;
        };

        let index = lines[0]
            .trim()
            .parse::<u32>()
            .unwrap_or(block_pos as u32 + 1);
        let text = strip_markup_tags(&lines[2..].join("\n"));

        cues.push(CaptionCue {
            index,
            start_time: start,
            end_time: end,
            text,
        });
    }

    cues
}

/// Parses an SRT timestamp (`HH:MM:SS,mmm`) into seconds.
///
/// Splits on the comma into whole-seconds and millisecond components:
/// `h*3600 + m*60 + s + ms/1000`.
pub fn parse_timestamp(ts: &str) -> Option<TimeSec> {
    let (time, millis) = ts.trim().split_once(',')?;

    let mut parts = time.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let millis: f64 = millis.parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0)
}

/// Formats seconds as an SRT timestamp (`00:00:00,000`).
pub fn format_timestamp(seconds: TimeSec) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, ms)
}

/// Exports cues back to SRT format.
pub fn export_srt(cues: &[CaptionCue]) -> String {
    let mut output = String::new();

    for cue in cues {
        output.push_str(&format!("{}\n", cue.index));
        output.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(cue.start_time),
            format_timestamp(cue.end_time)
        ));
        output.push_str(&cue.text);
        output.push_str("\n\n");
    }

    output.trim_end().to_string()
}

/// Strips inline `<...>` markup tags from caption text.
fn strip_markup_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Parsing Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_basic() {
        let srt = "1\n00:00:00,500 --> 00:00:03,000\nHello\n";

        let cues = parse_srt(srt);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].start_time, 0.5);
        assert_eq!(cues[0].end_time, 3.0);
        assert_eq!(cues[0].text, "Hello");
    }

    #[test]
    fn test_parse_multiple_blocks() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello World\n\n2\n00:00:05,500 --> 00:00:08,000\nSecond caption\n";

        let cues = parse_srt(srt);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Hello World");
        assert_eq!(cues[1].start_time, 5.5);
        assert_eq!(cues[1].index, 2);
    }

    #[test]
    fn test_parse_multiline_text_keeps_line_breaks() {
        let srt = "1\n00:00:00,000 --> 00:00:05,000\nLine one\nLine two\nLine three\n";

        let cues = parse_srt(srt);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Line one\nLine two\nLine three");
    }

    #[test]
    fn test_parse_strips_markup_tags() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\n<i>Hello</i> <b>World</b>\n";

        let cues = parse_srt(srt);
        assert_eq!(cues[0].text, "Hello World");
    }

    #[test]
    fn test_parse_skips_short_blocks() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\n\n2\n00:00:05,000 --> 00:00:08,000\nKept\n";

        // First block has only two lines (index + timestamps, no text).
        let cues = parse_srt(srt);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Kept");
    }

    #[test]
    fn test_parse_skips_bad_timestamp_blocks() {
        let srt = "1\n00:00:invalid --> 00:00:04,000\nDropped\n\n2\n00:00:05,000 --> 00:00:08,000\nKept\n";

        let cues = parse_srt(srt);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Kept");
    }

    #[test]
    fn test_parse_unparseable_index_falls_back_to_position() {
        let srt = "not-a-number\n00:00:01,000 --> 00:00:02,000\nHello\n";

        let cues = parse_srt(srt);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].index, 1);
    }

    #[test]
    fn test_parse_preserves_out_of_order_cues() {
        let srt = "1\n00:00:10,000 --> 00:00:12,000\nLater\n\n2\n00:00:01,000 --> 00:00:03,000\nEarlier\n";

        // Document order is preserved; no sort by time.
        let cues = parse_srt(srt);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "Later");
        assert_eq!(cues[1].text, "Earlier");
    }

    #[test]
    fn test_parse_crlf_and_padded_blank_lines() {
        let srt = "1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nSecond\r\n";

        let cues = parse_srt(srt);
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].text, "Second");
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse_srt("").is_empty());
        assert!(parse_srt("\n\n\n").is_empty());
    }

    // -------------------------------------------------------------------------
    // Timestamp Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_timestamp_values() {
        assert_eq!(parse_timestamp("00:00:01,500"), Some(1.5));
        assert_eq!(parse_timestamp("00:01:30,000"), Some(90.0));
        assert_eq!(parse_timestamp("01:30:00,000"), Some(5400.0));
        assert_eq!(parse_timestamp("00:00:00,100"), Some(0.1));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("00:00:01.500"), None);
        assert_eq!(parse_timestamp("not a timestamp"), None);
        assert_eq!(parse_timestamp("00:01,000"), None);
    }

    #[test]
    fn test_format_timestamp_values() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(1.5), "00:00:01,500");
        assert_eq!(format_timestamp(90.0), "00:01:30,000");
        assert_eq!(format_timestamp(5400.0), "01:30:00,000");
    }

    // -------------------------------------------------------------------------
    // Round-trip Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_roundtrip_millisecond_precision() {
        let original = vec![
            CaptionCue::new(1, 0.5, 3.0, "First caption"),
            CaptionCue::new(2, 5.543, 8.021, "Second\nMultiline"),
        ];

        let srt = export_srt(&original);
        let parsed = parse_srt(&srt);

        assert_eq!(parsed.len(), original.len());
        for (a, b) in original.iter().zip(parsed.iter()) {
            assert!((a.start_time - b.start_time).abs() < 0.0005);
            assert!((a.end_time - b.end_time).abs() < 0.0005);
            assert_eq!(a.text, b.text);
        }
    }
}
