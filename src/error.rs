//! Error types for the triode stage model.
//!
//! This module provides a unified error type [`TriodeError`] for the
//! configuration-time failures of the crate. The per-sample processing path
//! never produces an error: everything here is raised while building or
//! setting up stages, or by the CLI/WASM front-ends.

use thiserror::Error;

/// Result type alias using [`TriodeError`].
pub type Result<T> = std::result::Result<T, TriodeError>;

/// Unified error type for all triode_core operations.
#[derive(Error, Debug)]
pub enum TriodeError {
    // ============ Configuration Errors ============
    /// Tube name outside the fixed tube table
    #[error("Unknown tube type '{name}' (expected one of: ecc82, 12au7, ecc83, 12ax7)")]
    UnknownTubeType { name: String },

    /// Invalid circuit parameter value
    #[error("Invalid parameter '{param}' (value: {value:.3e}): {message}")]
    InvalidParameter {
        param: &'static str,
        value: f64,
        message: String,
    },

    /// Invalid sampling rate passed to setup
    #[error("Invalid sample rate {sample_rate}: must be positive and finite")]
    InvalidSampleRate { sample_rate: f64 },

    /// A chain was built without any stage
    #[error("Stage chain has no stages")]
    EmptyChain,

    // ============ I/O Errors ============
    /// Error reading audio input
    #[error("Audio input error: {message}")]
    AudioInputError { message: String },

    /// Error writing audio output
    #[error("Audio output error: {message}")]
    AudioOutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl TriodeError {
    /// Create an unknown tube type error
    pub fn unknown_tube(name: impl Into<String>) -> Self {
        Self::UnknownTubeType { name: name.into() }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(param: &'static str, value: f64, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param,
            value,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TriodeError::unknown_tube("6L6");
        assert!(err.to_string().contains("'6L6'"));

        let err = TriodeError::invalid_parameter("rk", -1.0, "must be positive");
        let msg = err.to_string();
        assert!(msg.contains("'rk'"));
        assert!(msg.contains("must be positive"));
    }
}
