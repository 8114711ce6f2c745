//! Error types for posekit

use thiserror::Error;

/// Main error type for posekit operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient anchors: need at least 2 known frames, found {found}")]
    InsufficientAnchors { found: usize },

    #[error("Invalid frame rate: {fps} (must be finite and positive)")]
    InvalidRate { fps: f64 },

    #[error("Frame {frame} out of range for sequence of length {len}")]
    OutOfRange { frame: usize, len: usize },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for posekit operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn shape<S: Into<String>>(message: S) -> Self {
        Error::ShapeMismatch(message.into())
    }
}

/// Validate a sampling rate, rejecting zero, negative and non-finite values
pub fn check_rate(fps: f64) -> Result<f64> {
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(Error::InvalidRate { fps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rate() {
        assert_eq!(check_rate(30.0).unwrap(), 30.0);
        assert!(matches!(check_rate(0.0), Err(Error::InvalidRate { .. })));
        assert!(matches!(check_rate(-60.0), Err(Error::InvalidRate { .. })));
        assert!(matches!(check_rate(f64::NAN), Err(Error::InvalidRate { .. })));
        assert!(matches!(check_rate(f64::INFINITY), Err(Error::InvalidRate { .. })));
    }

    #[test]
    fn test_error_messages() {
        let err = Error::OutOfRange { frame: 12, len: 10 };
        assert_eq!(err.to_string(), "Frame 12 out of range for sequence of length 10");

        let err = Error::InsufficientAnchors { found: 1 };
        assert!(err.to_string().contains("found 1"));
    }
}
