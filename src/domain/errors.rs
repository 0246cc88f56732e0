//! Domain errors for the issuestar pipeline.

use thiserror::Error;

/// Pipeline-level errors.
///
/// Per-call failures (date query, note listing) are surfaced as typed
/// variants so the orchestrator branches on them consciously; only
/// connection-level failures at startup abort the whole run.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Tracker request failed ({context}): {message}")]
    TrackerRequest { context: String, message: String },

    #[error("Tracker returned HTTP {status} ({context}): {body}")]
    TrackerStatus {
        status: u16,
        context: String,
        body: String,
    },

    #[error("Malformed tracker payload ({context}): {message}")]
    MalformedPayload { context: String, message: String },

    #[error("Warehouse error: {0}")]
    Warehouse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type EtlResult<T> = Result<T, EtlError>;

impl From<sqlx::Error> for EtlError {
    fn from(err: sqlx::Error) -> Self {
        EtlError::Warehouse(err.to_string())
    }
}

impl From<serde_json::Error> for EtlError {
    fn from(err: serde_json::Error) -> Self {
        EtlError::MalformedPayload {
            context: "json".to_string(),
            message: err.to_string(),
        }
    }
}
