//! Error types for marcacheck
//!
//! Each external-call component owns its failure enum and collapses it into
//! a value before returning to the caller. Only `AppError` (startup) and the
//! HTTP layer's client-input rejection ever reach a boundary.

use thiserror::Error;

/// Failure of a single advisory call against the generative model
#[derive(Error, Debug)]
pub enum AdvisoryFailure {
    /// Transport-level failure (DNS, TLS, connect, timeout)
    #[error("Model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The model API answered with a non-success status
    #[error("Model API returned HTTP {status}: {body}")]
    ApiStatus { status: u16, body: String },

    /// The API answered but carried no text (safety block, empty candidate list)
    #[error("Model reply had no text: {0}")]
    EmptyReply(String),

    /// No JSON object could be located in the reply text
    #[error("No JSON object in model reply")]
    NoJsonObject,

    /// The JSON object did not match the expected shape
    #[error("Malformed advisory JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A field was present but unusable
    #[error("Invalid advisory field {field}: {details}")]
    InvalidField { field: &'static str, details: String },

    /// Configuration prevented the call (e.g. missing credential)
    #[error("Model client misconfigured: {0}")]
    Misconfigured(String),
}

/// Failure of a single registry probe
#[derive(Error, Debug)]
pub enum ProbeFailure {
    /// Browser process could not be started
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// Navigation to the search form failed
    #[error("Failed to navigate to {url}: {details}")]
    Navigation { url: String, details: String },

    /// A required element never appeared or could not be driven
    #[error("Element {selector} unavailable: {details}")]
    Element { selector: String, details: String },

    /// A bounded wait elapsed
    #[error("{stage} timed out after {duration_ms}ms")]
    Timeout { stage: &'static str, duration_ms: u64 },

    /// Any other driver error
    #[error("Browser driver error: {0}")]
    Driver(String),
}

/// Startup and configuration errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Listener could not be bound
    #[error("Cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for startup operations
pub type Result<T> = std::result::Result<T, AppError>;

impl ProbeFailure {
    /// Short machine-friendly label used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeFailure::Launch(_) => "launch",
            ProbeFailure::Navigation { .. } => "navigation",
            ProbeFailure::Element { .. } => "element",
            ProbeFailure::Timeout { .. } => "timeout",
            ProbeFailure::Driver(_) => "driver",
        }
    }
}
