//! Error types for the `out` pipeline.

use thiserror::Error;

/// Errors while looking up the previous build of a job.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Build name is not `<n>` or `<n>.<rerun>`
    #[error("invalid build name '{0}'")]
    InvalidBuildName(String),

    /// `username`/`password` missing from the resource source
    #[error("basic auth credentials are required to query build history")]
    MissingCredentials,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Concourse answered with a non-success status
    #[error("unexpected response status code: '{status}'! Body: {body}")]
    Status { status: u16, body: String },

    #[error("malformed build response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors delivering a message to the webhook, after retries are exhausted.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request failed: {source}! Payload: {payload}")]
    Transport {
        #[source]
        source: reqwest::Error,
        payload: String,
    },

    #[error("unexpected response status code: '{status}'! Body: {body} Payload: {payload}")]
    Status {
        status: u16,
        body: String,
        payload: String,
    },
}

/// Fatal errors of the `out` step. Each variant names the failed stage.
#[derive(Debug, Error)]
pub enum OutError {
    #[error("discord webhook url cannot be blank")]
    MissingWebhookUrl,

    #[error("error getting last build status: {0}")]
    History(#[from] HistoryError),

    #[error("error sending discord message: {0}")]
    Delivery(#[from] DeliveryError),
}
