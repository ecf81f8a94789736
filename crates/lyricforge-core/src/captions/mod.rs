//! Caption Parsing and Models
//!
//! Timed caption cues and the SRT document format.

pub mod formats;

mod models;
pub use models::*;
