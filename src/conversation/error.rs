//! Error types for the conversation client.

use thiserror::Error;

use super::identity::IdentityError;

/// Reasons a submission could not produce bot replies.
///
/// None of these stop the client: each one degrades to a fixed apology turn.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay could not be reached.
    #[error("relay request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The relay answered with a non-success status.
    #[error("relay returned status {0}")]
    HttpStatus(u16),

    /// The relay body is not a JSON array.
    #[error("malformed relay reply: {0}")]
    MalformedReply(#[from] serde_json::Error),

    /// No sender identity could be loaded or created.
    #[error("sender identity unavailable: {0}")]
    Identity(#[from] IdentityError),
}

/// Convenience result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
