use std::time::Duration;

use thiserror::Error;

/// Errors talking to the Ollama inference service
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or connection failure
    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with a body that is not the expected envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

/// Errors surfaced by the email processor
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No emails to process")]
    NoEmails,

    #[error("Confidence threshold {0} must be between 0 and 1")]
    InvalidThreshold(f64),

    #[error("Classification unavailable for email {email_id}: {reason}")]
    ClassificationUnavailable { email_id: String, reason: String },
}
