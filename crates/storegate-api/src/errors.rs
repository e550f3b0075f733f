//! Error types for the HTTP layer.
//!
//! Handshake failures map to HTTP statuses here. Client-visible bodies stay
//! generic; the detailed reason is logged server-side with structured fields
//! so that a failing check can be diagnosed without disclosing it to the
//! caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storegate_core::{DomainError, FlowError};
use tracing::{error, warn};

/// Interactive handshake handler errors with HTTP status code mapping.
///
/// - `400 Bad Request`: the `shop` parameter is missing or malformed
/// - `502 Bad Gateway`: the authorize/authenticate collaborator failed
/// - `503 Service Unavailable`: the session store failed (infrastructure,
///   not a trust decision)
/// - `500 Internal Server Error`: a collaborator violated its contract
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    /// The `shop` query/body parameter was not supplied.
    #[error("missing shop parameter")]
    MissingShop,

    /// The supplied `shop` parameter is not a valid platform hostname.
    #[error("invalid shop parameter: {0}")]
    InvalidShop(#[from] DomainError),

    /// The flow controller or one of its collaborators failed.
    #[error("handshake failed: {0}")]
    Flow(#[from] FlowError),
}

impl IntoResponse for HandshakeError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::MissingShop | Self::InvalidShop(_) => {
                warn!(error = %self, "Rejecting handshake request");
                (
                    StatusCode::BAD_REQUEST,
                    "Missing or invalid shop parameter.",
                )
            }
            Self::Flow(FlowError::Session(_)) => {
                error!(error = %self, "Session store failed during handshake");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable.",
                )
            }
            Self::Flow(FlowError::InternalConsistency { .. }) => {
                error!(error = %self, "Collaborator contract violation");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
            Self::Flow(FlowError::Authorize { .. } | FlowError::Authenticate { .. }) => {
                error!(error = %self, "Platform collaborator failed");
                (StatusCode::BAD_GATEWAY, "Upstream platform error.")
            }
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
