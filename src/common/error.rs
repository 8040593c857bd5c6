//! Error types for the wire codec
//!
//! Event generation itself cannot fail. The only fallible surface is moving
//! events in and out of byte buffers.

use thiserror::Error;

/// Wire encoding/decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Caller-provided output buffer cannot hold the serialized data
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Input ended before a complete structure was read
    #[error("Truncated input: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// Input continues after the event footer
    #[error("{0} trailing bytes after event footer")]
    TrailingBytes(usize),
}

impl WireError {
    /// Create a buffer-too-small error
    pub fn buffer_too_small(needed: usize, available: usize) -> Self {
        Self::BufferTooSmall { needed, available }
    }

    /// Create a truncated-input error
    pub fn truncated(needed: usize, available: usize) -> Self {
        Self::Truncated { needed, available }
    }
}

/// Result type alias using WireError
pub type WireResult<T> = Result<T, WireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_too_small_message() {
        let err = WireError::buffer_too_small(106, 10);
        let msg = err.to_string();
        assert!(msg.contains("Buffer too small"));
        assert!(msg.contains("106"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_truncated_message() {
        let err = WireError::truncated(78, 3);
        assert!(err.to_string().contains("Truncated"));
    }

    #[test]
    fn test_trailing_bytes_message() {
        let err = WireError::TrailingBytes(4);
        assert_eq!(err.to_string(), "4 trailing bytes after event footer");
    }
}
