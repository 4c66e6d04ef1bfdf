//! Error types for the tracer
//!
//! Most tracer conditions are silent no-ops (tracing disabled, no sink,
//! thread locked out). The variants here cover the few cases that surface.

use thiserror::Error;

/// Errors reported by the tracer and its collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The identity provider could not determine the calling thread
    #[error("cannot determine thread id: {0}")]
    IdentityUnavailable(String),

    /// A configuration value is out of range
    #[error("invalid tracer configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TraceError>;

/// Returns the string form of `err` truncated to `max` characters.
pub fn truncate_error(err: &dyn std::error::Error, max: usize) -> String {
    let msg = err.to_string();
    match msg.char_indices().nth(max) {
        Some((byte_idx, _)) => msg[..byte_idx].to_string(),
        None => msg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_error_display() {
        let err = TraceError::IdentityUnavailable("no thread-local".to_string());
        assert_eq!(err.to_string(), "cannot determine thread id: no thread-local");
    }

    #[test]
    fn test_truncate_error_shortens() {
        let err = TraceError::InvalidConfig("capacity".to_string());
        assert_eq!(truncate_error(&err, 7), "invalid");
    }

    #[test]
    fn test_truncate_error_keeps_short_messages() {
        let err = TraceError::InvalidConfig("x".to_string());
        assert_eq!(truncate_error(&err, 1000), err.to_string());
    }

    #[test]
    fn test_truncate_error_respects_char_boundaries() {
        let err = TraceError::InvalidConfig("ñññ".to_string());
        let truncated = truncate_error(&err, 32);
        assert_eq!(truncated, "invalid tracer configuration: ññ");
    }
}
