//! Error handling for nueva-dsp
//!
//! The processing primitives themselves never fail: bad numbers in, bad
//! numbers out. Errors only come from the strict entry points that check
//! parameters up front, and from parameter (de)serialization.

use thiserror::Error;

/// Result type alias for nueva-dsp operations
pub type Result<T> = std::result::Result<T, DspError>;

/// Main error type for nueva-dsp operations
#[derive(Error, Debug)]
pub enum DspError {
    #[error("Invalid parameter: {param} = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: f64,
        expected: String,
    },

    #[error("Unknown distortion type: {name} (valid types: soft, hard, tube)")]
    UnknownDistortionType { name: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DspError {
    /// Build an `InvalidParameter` error
    pub fn invalid_parameter(
        param: impl Into<String>,
        value: f64,
        expected: impl Into<String>,
    ) -> Self {
        DspError::InvalidParameter {
            param: param.into(),
            value,
            expected: expected.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            DspError::InvalidParameter { .. } => "INVALID_PARAMETER",
            DspError::UnknownDistortionType { .. } => "UNKNOWN_DISTORTION_TYPE",
            DspError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable by fixing the caller's input
    pub fn is_recoverable(&self) -> bool {
        match self {
            DspError::InvalidParameter { .. } => true,
            DspError::UnknownDistortionType { .. } => true,
            DspError::Serialization(_) => false,
        }
    }
}

/// Fail with `InvalidParameter` unless `value` is finite and strictly positive
pub(crate) fn require_positive(param: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        tracing::debug!(param, value, "rejecting non-positive parameter");
        Err(DspError::invalid_parameter(param, value, "a finite value > 0"))
    }
}
