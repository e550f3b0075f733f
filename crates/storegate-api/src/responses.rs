//! Response payloads for the HTTP layer.
//!
//! Rendering is an external collaborator's concern: the handshake endpoints
//! return page *data* (JSON), not markup.

use serde::{Deserialize, Serialize};

/// Acknowledgement returned for an accepted webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    /// Always `"ok"`; the gate decision already happened in middleware.
    pub status: String,
}

/// Data for the login entry page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPageResponse {
    /// Domain the login page is bound to, when one was supplied.
    pub shop_domain: Option<String>,
}

/// Data for the full-page redirect to the platform authorization screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectPageResponse {
    /// Platform authorization URL.
    pub auth_url: String,

    /// Domain the redirect is bound to.
    pub shop_domain: String,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status.
    pub status: String,

    /// Crate version of the running service.
    pub version: String,
}
