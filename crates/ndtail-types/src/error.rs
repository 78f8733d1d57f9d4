//! Error hierarchy for ndtail.

use thiserror::Error;

/// Errors from establishing or reading an NDJSON stream.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// The request could not be constructed (bad URL, header name/value).
    #[error("Request error: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("HTTP error {status}: {status_text}")]
    Connection { status: u16, status_text: String },

    /// The server answered with a success status but no readable body.
    #[error("Response body unavailable")]
    StreamUnavailable,

    /// The body could not be decoded into lines.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Transport-level failure while sending or reading.
    #[error("Network error: {0}")]
    Network(String),
}
