//! Unified error types for the room-light controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! driver loop's error handling uniform.  Every variant is fatal to the
//! operation that raised it: the core never retries.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Error)]
pub enum Error {
    /// The bridge process could not be run, timed out, or exited non-zero.
    #[error("bridge transport: {0}")]
    BridgeTransport(String),
    /// The remote board answered with a fault marker.
    #[error("bridge device: {0}")]
    BridgeDevice(String),
    /// The bridge answered, but not with exactly one well-formed line.
    #[error("bridge protocol: {0}")]
    BridgeProtocol(String),
    /// The camera could not be opened.
    #[error("camera: {0}")]
    Camera(#[from] CameraError),
    /// Person detection failed for a captured frame.
    #[error("detector: {0}")]
    Detector(String),
}

impl Error {
    /// True for the errors raised by the hardware bridge.
    pub fn is_bridge(&self) -> bool {
        matches!(
            self,
            Self::BridgeTransport(_) | Self::BridgeDevice(_) | Self::BridgeProtocol(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Camera errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CameraError {
    /// The capture device is missing or refused to open.
    #[error("cannot open camera {device}: {reason}")]
    Open { device: String, reason: String },
    /// A session was requested while another one is still active.
    #[error("camera already in use")]
    Busy,
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    #[error("validation failed: {0}")]
    ValidationFailed(&'static str),
    /// The config file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid JSON for [`SystemConfig`](crate::config::SystemConfig).
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
