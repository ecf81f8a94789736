//! Core Type Definitions
//!
//! Fundamental aliases shared across the engine.

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Project unique identifier (assigned by the project store)
pub type ProjectId = String;

/// Render request identifier (ULID, generated per render)
pub type RequestId = String;

/// Generates a fresh render request identifier.
pub fn new_request_id() -> RequestId {
    ulid::Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = new_request_id();
        let b = new_request_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 26);
    }
}
