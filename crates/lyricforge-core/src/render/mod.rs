//! Render Orchestration
//!
//! The end-to-end pipeline: validate → fetch source → compile overlays →
//! invoke renderer → upload → best-effort bookkeeping, with best-effort
//! scratch cleanup on every path.

mod engine;
pub use engine::*;

mod models;
pub use models::*;

mod orchestrator;
pub use orchestrator::*;
