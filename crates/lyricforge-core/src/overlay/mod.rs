//! Overlay Compilation
//!
//! Translates caption cues plus a resolved style into an ordered,
//! append-only chain of time-gated drawtext operations, each consuming
//! the previous operation's output stream handle.

mod models;
pub use models::*;

mod compiler;
pub use compiler::*;
