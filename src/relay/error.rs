//! Error types for the relay endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Body returned for an invalid inbound payload.
pub const BAD_REQUEST_MESSAGE: &str = "Invalid payload. Expect { sender: string, message: string }";

/// Body returned when the downstream webhook cannot be reached.
pub const GATEWAY_FAILURE_MESSAGE: &str = "Failed to connect to Rasa server";

/// Errors produced while relaying a chat message.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound payload is not `{ sender: string, message: string }`.
    #[error("bad request: {0}")]
    BadRequest(&'static str),

    /// Forwarding to the downstream webhook failed.
    #[error("gateway failure: {0}")]
    GatewayFailure(#[from] reqwest::Error),
}

impl RelayError {
    /// HTTP status reported to the caller.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::GatewayFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message reported to the caller. Never includes the underlying cause.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => BAD_REQUEST_MESSAGE,
            Self::GatewayFailure(_) => GATEWAY_FAILURE_MESSAGE,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            Self::BadRequest(reason) => tracing::debug!("Rejected relay payload: {reason}"),
            Self::GatewayFailure(err) => tracing::warn!("Relay to webhook failed: {err}"),
        }

        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}
