//! Error types for DSP configuration.

use thiserror::Error;

/// Result type for DSP configuration.
pub type DspResult<T> = Result<T, ConfigError>;

/// Errors raised when a processor configuration cannot be used.
///
/// Only construction-time constants are validated. Runtime parameter setters
/// clamp silently and never fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value lies outside its documented range.
    #[error("'{field}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: f32,
        /// Lowest accepted value.
        min: f32,
        /// Highest accepted value.
        max: f32,
    },

    /// A value that must be strictly positive is not.
    #[error("'{field}' must be positive, got {value}")]
    NonPositive {
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
}

impl ConfigError {
    /// Checks `value` against an inclusive range.
    pub fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> DspResult<()> {
        // NaN fails both comparisons and is rejected here too.
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(Self::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }

    /// Checks that `value` is strictly positive.
    pub fn check_positive(field: &'static str, value: f32) -> DspResult<()> {
        if value > 0.0 {
            Ok(())
        } else {
            Err(Self::NonPositive { field, value })
        }
    }
}
