//! Error types for thumbnail-dl
//!
//! This module provides the error taxonomy for the library:
//! - Network failures from the byte fetcher (non-OK status, transport, timeout)
//! - Decode failures when fetched bytes are not a usable image
//! - Engine lifecycle misuse (starting twice, operating after shutdown)
//! - Configuration and serialization errors
//!
//! Network and decode errors never reach the thumbnail listener: the engine
//! logs them and moves on to the next pending target.

use std::time::Duration;
use thiserror::Error;

use crate::engine::EngineState;

/// Result type alias for thumbnail-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for thumbnail-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetch.timeout")
        key: Option<String>,
    },

    /// Fetching bytes from a URL failed
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Fetched bytes could not be decoded into an image
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Operation is not valid in the engine's current lifecycle state
    #[error("cannot {operation} while engine is {state}")]
    InvalidState {
        /// The operation that was attempted (e.g., "start")
        operation: &'static str,
        /// The state that prevented it
        state: EngineState,
    },

    /// The worker thread panicked before it could be joined cleanly
    #[error("thumbnail worker panicked")]
    WorkerPanicked,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Byte fetcher failures
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Server answered with something other than `200 OK`
    #[error("{status}: with {url}")]
    Status {
        /// Status line text (e.g., "404 Not Found")
        status: String,
        /// The URL that was requested
        url: String,
    },

    /// Connection or body transfer failed
    #[error("request to {url} failed: {message}")]
    Transport {
        /// The URL that was requested
        url: String,
        /// Underlying transport error text
        message: String,
    },

    /// Request did not complete within the configured timeout
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout {
        /// The URL that was requested
        url: String,
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// URL could not be parsed
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Parser error text
        reason: String,
    },
}

/// Image decode failures
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Zero-length body
    #[error("empty image data")]
    Empty,

    /// Bytes do not match any supported image format
    #[error("unsupported image format")]
    UnsupportedFormat,

    /// Format was recognized but the data is corrupt or truncated
    #[error("malformed image: {0}")]
    Malformed(String),
}

impl Error {
    /// Machine-readable error code, used as a structured log field
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Network(NetworkError::Status { .. }) => "http_status",
            Error::Network(NetworkError::Transport { .. }) => "transport_error",
            Error::Network(NetworkError::Timeout { .. }) => "timeout",
            Error::Network(NetworkError::InvalidUrl { .. }) => "invalid_url",
            Error::Decode(_) => "decode_error",
            Error::InvalidState { .. } => "invalid_state",
            Error::WorkerPanicked => "worker_panicked",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(_) => DecodeError::UnsupportedFormat,
            other => DecodeError::Malformed(other.to_string()),
        }
    }
}
