//! Error types for the rekap-core library.

use thiserror::Error;

/// Main error type for the rekap library.
#[derive(Error, Debug)]
pub enum RekapError {
    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The batch holds more documents than the configured limit.
    #[error("batch of {requested} documents exceeds the limit of {limit}")]
    BatchTooLarge { requested: usize, limit: usize },
}

/// Errors raised while extracting one document.
///
/// These never escape the extraction client: they are turned into an
/// error-tagged result row instead.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The request never produced an HTTP response.
    #[error("request to extraction service failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("extraction service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The service answered without any message content.
    #[error("extraction service returned an empty response")]
    EmptyResponse,

    /// No `{ ... }` object could be located in the response text.
    #[error("no JSON object found in model output")]
    NoJsonPayload,

    /// The located payload is not a valid JSON object.
    #[error("model output is not valid JSON: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}

/// Result type for the rekap library.
pub type Result<T> = std::result::Result<T, RekapError>;
