//! Error types for the audio engine.

use std::fmt;

use thiserror::Error;
use vocodergal_dsp::ConfigError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Which side of the duplex stream an error concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Microphone input.
    Capture,
    /// Speaker output, which also drives the audio callback.
    Render,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointKind::Capture => f.write_str("capture"),
            EndpointKind::Render => f.write_str("render"),
        }
    }
}

/// Errors raised by the engine's control surface.
///
/// Nothing here crosses into the audio callback; inside the callback every
/// condition is handled by rendering silence.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine or processor configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// An endpoint could not be opened.
    #[error("failed to open {endpoint} endpoint: {reason}")]
    OpenFailed {
        /// The endpoint that failed.
        endpoint: EndpointKind,
        /// Backend-specific detail.
        reason: String,
    },

    /// An endpoint opened but would not start running.
    #[error("failed to start {endpoint} endpoint: {reason}")]
    StartFailed {
        /// The endpoint that failed.
        endpoint: EndpointKind,
        /// Backend-specific detail.
        reason: String,
    },

    /// No device is available for an endpoint.
    #[error("no {endpoint} device available")]
    NoDevice {
        /// The endpoint without a device.
        endpoint: EndpointKind,
    },

    /// The device cannot provide the requested stream format.
    #[error("unsupported {endpoint} format: {detail}")]
    UnsupportedFormat {
        /// The endpoint concerned.
        endpoint: EndpointKind,
        /// What was requested or offered.
        detail: String,
    },
}

impl EngineError {
    /// Creates an open failure.
    pub fn open_failed(endpoint: EndpointKind, reason: impl Into<String>) -> Self {
        Self::OpenFailed {
            endpoint,
            reason: reason.into(),
        }
    }

    /// Creates a start failure.
    pub fn start_failed(endpoint: EndpointKind, reason: impl Into<String>) -> Self {
        Self::StartFailed {
            endpoint,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_endpoint() {
        let err = EngineError::open_failed(EndpointKind::Capture, "device busy");
        assert_eq!(err.to_string(), "failed to open capture endpoint: device busy");

        let err = EngineError::NoDevice {
            endpoint: EndpointKind::Render,
        };
        assert_eq!(err.to_string(), "no render device available");
    }

    #[test]
    fn test_config_error_converts() {
        let err: EngineError = ConfigError::NonPositive {
            field: "sample_rate",
            value: 0.0,
        }
        .into();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        assert!(err.to_string().contains("sample_rate"));
    }
}
