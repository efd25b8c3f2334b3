//! Error taxonomy for the request pipeline.
//!
//! [`PubSubError`] has one variant per failure kind a request can hit, from
//! validation through response parsing. The executor never recovers from any
//! of them; each reaches the caller wrapped in a [`RequestFailure`] so the
//! [`StatusResponse`] always travels with the error.
//!
//! [`TransportError`] is the error type of the [`crate::HttpTransport`] port.
//! [`ConfigError`] covers configuration loading.

use thiserror::Error;

use crate::StatusResponse;

// ---------------------------------------------------------------------------
// Stable validation messages (matched literally by consumers)
// ---------------------------------------------------------------------------

pub const MISSING_CHANNEL_GROUP: &str = "Missing Channel Group";
pub const MISSING_SUBSCRIBE_KEY: &str = "Missing Subscribe Key";
pub const MISSING_PUBLISH_KEY: &str = "Missing Publish Key";
pub const MISSING_CHANNEL: &str = "Missing Channel";
pub const MISSING_CHANNEL_OR_GROUP: &str = "Missing Channel or Channel Group";

// ---------------------------------------------------------------------------
// Request errors
// ---------------------------------------------------------------------------

/// Every way a single request can fail.
#[derive(Debug, Error)]
pub enum PubSubError {
    /// The descriptor rejected its own inputs. No I/O took place.
    #[error("Validation error: {message}")]
    Validation {
        /// One of the stable messages in this module.
        message: String,
    },

    /// Building the path, query, or body failed. No I/O took place.
    #[error("Request construction failed: {message}")]
    RequestConstruction { message: String },

    /// Transport-level failure: connect, DNS, TLS, timeout, or body read.
    #[error("Connection error: {0}")]
    Connection(#[from] TransportError),

    /// The server answered with a status of 400 or above.
    ///
    /// The body is kept so callers can inspect the server message.
    #[error("HTTP error {status_code}: {}", String::from_utf8_lossy(.body))]
    Http { status_code: u16, body: Vec<u8> },

    /// The body was not valid JSON or did not have the required shape.
    #[error("Response parsing error: {message}")]
    ResponseParsing {
        message: String,
        /// Raw body, kept for diagnostics.
        body: Vec<u8>,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The request's cancellation token fired before completion.
    #[error("Request cancelled")]
    Cancelled,
}

impl PubSubError {
    /// Creates a [`PubSubError::Validation`] from a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a [`PubSubError::RequestConstruction`] from a message.
    pub fn construction(message: impl Into<String>) -> Self {
        Self::RequestConstruction {
            message: message.into(),
        }
    }

    /// Creates a [`PubSubError::ResponseParsing`] that keeps a copy of `body`.
    pub fn parsing(
        message: impl Into<String>,
        body: &[u8],
        source: Option<serde_json::Error>,
    ) -> Self {
        Self::ResponseParsing {
            message: message.into(),
            body: body.to_vec(),
            source,
        }
    }

    /// Response body attached to the error, for HTTP and parsing failures.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Http { body, .. } | Self::ResponseParsing { body, .. } => Some(body),
            _ => None,
        }
    }

    /// HTTP status code, for HTTP failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------

/// A [`PubSubError`] together with the status of the request that produced it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RequestFailure {
    /// Status record; `is_error` is always `true`.
    pub status: StatusResponse,
    /// The underlying failure.
    pub error: PubSubError,
}

impl RequestFailure {
    /// Wraps `error`, marking `status` as failed and recording the message.
    pub fn new(mut status: StatusResponse, error: PubSubError) -> Self {
        status.is_error = true;
        status.error_message = Some(error.to_string());
        Self { status, error }
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Coarse classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Could not establish a connection (DNS, refused, TLS handshake).
    Connect,
    /// A connect or request deadline elapsed.
    Timeout,
    /// Any other failure, including reading the response body.
    Other,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Other => "transport",
        })
    }
}

/// Failure reported by an [`crate::HttpTransport`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was present but could not be interpreted.
    #[error("Invalid value for {variable}: {value:?}")]
    InvalidValue { variable: String, value: String },
}
