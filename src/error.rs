//! Error types for the digest pipeline.

use std::path::PathBuf;

/// Top-level error type for a digest run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Configuration-related errors. Always fatal, raised before any output.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Feed catalog {path} could not be loaded: {reason}")]
    Catalog { path: PathBuf, reason: String },

    #[error("Prepared metadata {path} is malformed: {reason}")]
    PreparedMeta { path: PathBuf, reason: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single feed failed to retrieve or parse.
#[derive(Debug, thiserror::Error)]
pub enum SourceFetchError {
    #[error("Feed {feed} request failed: {reason}")]
    Http { feed: String, reason: String },

    #[error("Feed {feed} returned status {status}")]
    Status { feed: String, status: u16 },

    #[error("Feed {feed} could not be parsed: {reason}")]
    Parse { feed: String, reason: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid request for {provider}: {reason}")]
    InvalidRequest { provider: String, reason: String },
}

/// Archive (Notion) errors. Never escape the archiver.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Archive request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Archive store returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Mail delivery errors. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("SMTP send failed: {0}")]
    SendFailed(String),
}

/// Result type alias for the digest pipeline.
pub type Result<T> = std::result::Result<T, Error>;
