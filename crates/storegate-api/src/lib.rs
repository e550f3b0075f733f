//! # Storegate HTTP Layer
//!
//! Thin transport layer over the trust-establishment core.
//!
//! This crate provides:
//! - the webhook endpoint, guarded by the [`WebhookGate`] middleware
//! - the interactive handshake endpoints (login page data, authorization
//!   redirect, authenticate callback)
//! - a liveness endpoint
//!
//! Handlers only translate between HTTP and the core's types; every trust
//! decision lives in `storegate-core`. Rejections surface as a fixed 401
//! with one of two generic bodies — the specific reason is logged
//! server-side and never echoed to the caller.

// Public modules
pub mod errors;
pub mod responses;

use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use errors::HandshakeError;
use responses::{HealthResponse, LoginPageResponse, RedirectPageResponse, WebhookAck};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use storegate_core::{
    GateDecision, HandshakeRequest, OAuthFlowController, RejectReason, SecretProvider, ShopDomain,
    WebhookGate, WebhookRequest,
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};

/// Fixed body returned when the signature or domain header fails.
pub const INVALID_SIGNATURE_BODY: &str = "Invalid webhook signature.";

/// Fixed body returned for every tenant-resolution rejection.
pub const INVALID_SHOP_BODY: &str = "Invalid shop.";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration for the service
    pub config: ServiceConfig,

    /// Gate deciding webhook acceptance
    pub gate: Arc<WebhookGate>,

    /// Controller driving the interactive handshake
    pub flow: Arc<OAuthFlowController>,

    /// Provider of the shared webhook secret
    pub secrets: Arc<dyn SecretProvider>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: ServiceConfig,
        gate: Arc<WebhookGate>,
        flow: Arc<OAuthFlowController>,
        secrets: Arc<dyn SecretProvider>,
    ) -> Self {
        Self {
            config,
            gate,
            flow,
            secrets,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Webhook endpoint settings
    pub webhook: WebhookConfig,

    /// Interactive handshake settings
    pub auth: AuthConfig,

    /// Platform application credentials
    pub platform: PlatformConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Validate cross-field constraints that serde defaults cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unusable values (zero port,
    /// zero body limit, route paths without a leading slash).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            });
        }

        if self.server.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be non-zero".to_string(),
            });
        }

        for (name, path) in [
            ("webhook.endpoint_path", &self.webhook.endpoint_path),
            ("auth.login_path", &self.auth.login_path),
            ("auth.home_path", &self.auth.home_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    message: format!("{} must start with '/'", name),
                });
            }
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum webhook body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_seconds: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Webhook endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook endpoint path
    pub endpoint_path: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/webhook".to_string(),
        }
    }
}

/// Interactive handshake configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Route of the login entry point
    pub login_path: String,

    /// Default landing destination after authentication
    pub home_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: "/authenticate/login".to_string(),
            home_path: "/".to_string(),
        }
    }
}

/// Platform application credentials and dev seeding.
///
/// The secret configured here is consumed by the service binary's literal
/// secret provider; production deployments should source it from a vault
/// instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Public API key of the platform application
    pub api_key: String,

    /// Shared API secret used for webhook HMAC computation
    pub api_secret: String,

    /// Comma-separated access scopes requested during authorization
    pub scopes: String,

    /// Redirect URI registered with the platform application
    pub redirect_uri: String,

    /// Shop domains seeded into the development tenant store at startup
    pub seed_shops: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Error type for configuration validation failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Error type for server startup failures
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("failed to bind {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("server failed: {message}")]
    ServerFailed { message: String },
}

// ============================================================================
// HTTP Server
// ============================================================================

/// Create HTTP router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let webhook_routes = Router::new()
        .route(&state.config.webhook.endpoint_path, post(ack_webhook))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            webhook_gate_middleware,
        ));

    // The login route must be registered at the same path the authenticate
    // handler redirects to, so it comes from the same config field.
    let auth_routes = Router::new()
        .route(&state.config.auth.login_path, get(handle_login))
        .route("/authenticate/oauth", get(handle_oauth))
        .route("/authenticate", get(handle_authenticate));

    let health_routes = Router::new().route("/health", get(handle_health_check));

    Router::new()
        .merge(webhook_routes)
        .merge(auth_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive())
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns [`ServiceError`] when the configuration is invalid, the listen
/// address cannot be bound, or the server fails while running.
pub async fn start_server(
    config: ServiceConfig,
    gate: Arc<WebhookGate>,
    flow: Arc<OAuthFlowController>,
    secrets: Arc<dyn SecretProvider>,
) -> Result<(), ServiceError> {
    config.validate()?;

    let shutdown_timeout =
        std::time::Duration::from_secs(config.server.shutdown_timeout_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(config, gate, flow, secrets);
    let app = create_router(state);

    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: addr.clone(),
                message: e.to_string(),
            })?;

    info!("Starting HTTP server on {}", addr);

    let shutdown_signal = async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C signal handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
            _ = terminate => {
                info!("Received SIGTERM, initiating graceful shutdown with {}s timeout", shutdown_timeout.as_secs());
            },
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

// ============================================================================
// Webhook Gate Middleware
// ============================================================================

/// Run every inbound webhook through the gate before any business handler.
///
/// The raw body is buffered once, used verbatim for HMAC verification, and
/// restored untouched for the inner handler on acceptance. Rejections map to
/// a fixed 401 with a generic body; the specific reason stays in the server
/// logs. Store and secret-provider failures are infrastructure failures and
/// surface as 503, never as 401.
#[instrument(skip_all)]
pub async fn webhook_gate_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let body_bytes = match axum::body::to_bytes(body, state.config.server.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) if is_length_limit_error(&e) => {
            warn!(error = %e, "Webhook body exceeds the configured size limit");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
        Err(e) => {
            warn!(error = %e, "Failed to read webhook body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let header_map: HashMap<String, String> = parts
        .headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_lowercase(),
                v.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();

    let webhook_request = WebhookRequest::from_http_headers(&header_map, body_bytes.clone());

    let secret = match state.secrets.api_secret().await {
        Ok(secret) => secret,
        Err(e) => {
            error!(error = %e, "Secret provider failed; cannot verify webhook");
            return StatusCode::SERVICE_UNAVAILABLE.into_response();
        }
    };

    match state.gate.accept(&webhook_request, &secret).await {
        Ok(GateDecision::Allow) => {
            let request = Request::from_parts(parts, Body::from(body_bytes));
            next.run(request).await
        }
        Ok(GateDecision::Reject(reason)) => {
            // Reason detail is server-side only; the response body must not
            // reveal which check failed beyond the two fixed messages.
            warn!(reason = reason.as_str(), "Rejecting webhook");
            let body = match reason {
                RejectReason::InvalidSignature => INVALID_SIGNATURE_BODY,
                RejectReason::UnknownShop
                | RejectReason::DeletedShop
                | RejectReason::InvalidSession => INVALID_SHOP_BODY,
            };
            (StatusCode::UNAUTHORIZED, body).into_response()
        }
        Err(e) => {
            error!(error = %e, "Tenant store failed during webhook gating");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

/// Whether a body-buffering failure was caused by the size limit rather than
/// a transport read error. The limit error sits somewhere in the source
/// chain, wrapped by the body collection machinery.
fn is_length_limit_error(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        if err.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

/// Acknowledge a webhook that passed the gate.
///
/// Business processing of deliveries is the surrounding application's
/// concern; this default handler simply acknowledges receipt.
#[instrument(skip_all)]
async fn ack_webhook(body: Bytes) -> Json<WebhookAck> {
    info!(size_bytes = body.len(), "Webhook accepted");
    Json(WebhookAck {
        status: "ok".to_string(),
    })
}

// ============================================================================
// Handshake Handlers
// ============================================================================

/// Query parameters for the interactive handshake entry points.
#[derive(Debug, Clone, Deserialize)]
pub struct HandshakeParams {
    /// Tenant domain, as supplied by the platform.
    pub shop: Option<String>,

    /// Authorization code, present on the callback leg.
    pub code: Option<String>,
}

/// Login entry point: supplies the page data for the external renderer.
#[instrument(skip(state))]
async fn handle_login(
    State(state): State<AppState>,
    Query(params): Query<HandshakeParams>,
) -> Json<LoginPageResponse> {
    // The login page tolerates an absent or malformed shop parameter; the
    // user can still type a domain into the form.
    let shop_domain = params.shop.and_then(|raw| ShopDomain::new(raw).ok());
    let page = state.flow.enter_login(shop_domain);

    Json(LoginPageResponse {
        shop_domain: page.shop_domain.map(|d| d.as_str().to_string()),
    })
}

/// Authorization leg: supplies the full-page redirect data for the platform
/// authorization screen.
#[instrument(skip(state))]
async fn handle_oauth(
    State(state): State<AppState>,
    Query(params): Query<HandshakeParams>,
) -> Result<Json<RedirectPageResponse>, HandshakeError> {
    let shop = params.shop.ok_or(HandshakeError::MissingShop)?;
    let shop_domain = ShopDomain::new(shop)?;

    let page = state.flow.begin_authorization(&shop_domain).await?;

    Ok(Json(RedirectPageResponse {
        auth_url: page.auth_url,
        shop_domain: page.shop_domain.as_str().to_string(),
    }))
}

/// Authenticate callback: runs the handshake and issues the next redirect.
#[instrument(skip(state))]
async fn handle_authenticate(
    State(state): State<AppState>,
    Query(params): Query<HandshakeParams>,
) -> Result<Redirect, HandshakeError> {
    let request = HandshakeRequest {
        shop: params.shop,
        code: params.code,
    };

    let redirect = state.flow.complete_authentication(&request).await?;

    let target = match &redirect {
        storegate_core::FlowRedirect::Login => state.config.auth.login_path.clone(),
        storegate_core::FlowRedirect::Authorization { auth_url } => auth_url.clone(),
        storegate_core::FlowRedirect::ReturnTo(target) => target.clone(),
        storegate_core::FlowRedirect::Home => state.config.auth.home_path.clone(),
    };

    info!(%target, "Handshake redirect issued");
    Ok(Redirect::to(&target))
}

// ============================================================================
// Health Handler
// ============================================================================

/// Liveness endpoint
async fn handle_health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
