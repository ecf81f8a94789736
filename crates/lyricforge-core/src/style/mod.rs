//! Style Configuration and Resolution
//!
//! A user-facing style preset (`StyleConfig`) and its normalization into
//! renderer primitives (`ResolvedStyle`): hex colors with separate alpha,
//! pixel anchor expressions, time-parametrized animation expressions, and
//! a host font file.

mod models;
pub use models::*;

mod resolver;
pub use resolver::*;
