//! Error types for the AppThwack client.
//!
//! Two domain error kinds cover everything the API contract can violate:
//! - [`ApiError`]: the server answered outside the expected status code or
//!   content-type. Carries the observed and expected values plus the
//!   response body. Never retried.
//! - [`ValidationError`]: a payload or argument failed a local check
//!   (missing required field, missing file extension, missing API key, or
//!   a scheduling operation the project's platform does not support).
//!
//! Transport, I/O, and JSON failures from the underlying crates are wrapped
//! transparently. Every failure is terminal for the call that produced it.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for AppThwack client operations.
#[derive(Debug, Error)]
pub enum ThwackError {
    /// The API answered outside the expected contract.
    #[error("appthwack api error: {0}")]
    Api(#[from] ApiError),

    /// A payload or argument failed a local validation check.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// HTTP client error (connect, timeout, request build).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error (reading an app binary, writing an archive).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors describing an unexpected response from the AppThwack API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The response status code did not match the expected one.
    #[error("got status code {actual}; expected {expected} with response {body}")]
    UnexpectedStatus {
        /// Status code the endpoint contract expects.
        expected: u16,
        /// Status code the server actually returned.
        actual: u16,
        /// Raw response body, for diagnostics.
        body: String,
    },

    /// The response content-type did not match the expected one.
    #[error("got content-type {actual:?}; expected {expected} with response {body}")]
    UnexpectedContentType {
        /// Content-type the endpoint contract expects.
        expected: &'static str,
        /// Content-type header the server actually returned, if any.
        actual: Option<String>,
        /// Raw response body, for diagnostics.
        body: String,
    },
}

/// Errors raised by local validation, before or after a request.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// No API key was provided (argument or `APPTHWACK_API_KEY`).
    #[error("appthwack api key must be provided")]
    MissingApiKey,

    /// Invalid environment variable value.
    #[error("invalid env var {key}: {reason}")]
    InvalidEnv {
        /// The environment variable key.
        key: &'static str,
        /// The reason for invalidity.
        reason: &'static str,
    },

    /// A decoded JSON payload is missing a required field.
    #[error("invalid decoded json for {record}: missing required field `{field}`")]
    MissingField {
        /// Record kind being decoded.
        record: &'static str,
        /// First required field found missing.
        field: &'static str,
    },

    /// A decoded JSON payload has the wrong shape (object vs array).
    #[error("invalid decoded json for {record}: expected {expected}")]
    UnexpectedShape {
        /// Record kind being decoded.
        record: &'static str,
        /// Shape the decoder expected ("a json object" / "a json array").
        expected: &'static str,
    },

    /// An upload path has no file extension.
    #[error("path must contain a file extension: {path}")]
    MissingExtension {
        /// The offending local path.
        path: PathBuf,
    },

    /// A scheduling operation was invoked on the wrong project platform.
    #[error("{test} runs are not supported on {platform} projects")]
    UnsupportedTestKind {
        /// Test harness that was requested (e.g. "junit").
        test: &'static str,
        /// Platform of the project the call was made on.
        platform: &'static str,
    },
}

/// Result type alias for AppThwack client operations.
pub type Result<T> = std::result::Result<T, ThwackError>;
