//! Interactive authorization handshake orchestration.
//!
//! [`OAuthFlowController`] drives the handshake that establishes a tenant's
//! installed state: the login entry page, the authorization-code leg, and the
//! post-authorization redirect decision. The cryptographic exchange with the
//! remote platform is not performed here; the controller only decides which
//! leg of the flow to take, delegating to the injected authorize and
//! authenticate actions.
//!
//! The handshake resolves exactly one of three mutually exclusive outcomes
//! per invocation — needs login, needs authorization, authenticated — and the
//! mapping is exhaustive at the type level ([`AuthOutcome`]), so a
//! double-redirect or an ambiguous branch cannot be expressed.

use crate::{SessionStore, ShopDomain, StoreError};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Session key under which a post-authentication destination is stashed.
pub const RETURN_TO_KEY: &str = "return_to";

// ============================================================================
// Collaborator Interfaces
// ============================================================================

/// Result of the external authorize action: the URL the user must visit to
/// grant the integration access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeResult {
    /// Platform authorization URL for this tenant.
    pub url: String,
}

/// Inbound interactive request snapshot handed to the authenticate action.
#[derive(Debug, Clone, Default)]
pub struct HandshakeRequest {
    /// The `shop` query/body parameter, if supplied.
    pub shop: Option<String>,

    /// The authorization code returned by the platform, if present.
    pub code: Option<String>,
}

/// Raw result of the external authenticate action.
///
/// `status` is the action's tri-state verdict: `None` means something is
/// structurally wrong with the request, `Some(false)` means no valid
/// authorization code yet, `Some(true)` means the handshake is complete.
/// `Option<bool>` makes the three values mutually exclusive and exhaustive
/// at compile time; no fourth value is representable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticateOutcome {
    /// Authorization URL to redirect to when `status` is `Some(false)`.
    pub url: Option<String>,

    /// Tri-state handshake verdict.
    pub status: Option<bool>,
}

/// Interface for the external authorize action.
///
/// Computes the platform authorization URL for a tenant. The remote call is
/// synchronous from the flow's point of view; its own fatal errors propagate
/// and are not retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizeAction: Send + Sync {
    /// Produce the authorization URL for the given shop.
    async fn authorize(&self, shop: &ShopDomain) -> Result<AuthorizeResult, FlowError>;
}

/// Interface for the external authenticate action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthenticateAction: Send + Sync {
    /// Run the authenticate action over an inbound interactive request.
    async fn authenticate(
        &self,
        request: &HandshakeRequest,
    ) -> Result<AuthenticateOutcome, FlowError>;
}

// ============================================================================
// Outcomes
// ============================================================================

/// Tri-state result of the handshake orchestration.
///
/// Exactly one variant holds per invocation; produced fresh each call, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Something is structurally wrong (e.g. missing or invalid shop);
    /// the caller must redirect to the login entry point.
    NeedsLogin,

    /// No valid authorization code yet; the caller must redirect the user to
    /// the supplied authorization URL.
    NeedsAuthorization {
        /// Platform authorization URL.
        auth_url: String,
    },

    /// Handshake complete.
    Authenticated,
}

impl AuthOutcome {
    /// The handshake state this outcome lands in.
    pub fn state(&self) -> FlowState {
        match self {
            Self::NeedsLogin => FlowState::Failed,
            Self::NeedsAuthorization { .. } => FlowState::AwaitingCode,
            Self::Authenticated => FlowState::Authenticated,
        }
    }
}

/// States of the interactive handshake, reported for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Login page shown; nothing established yet.
    Start,

    /// User sent to the platform; waiting for an authorization code.
    AwaitingCode,

    /// Handshake complete.
    Authenticated,

    /// Structurally broken request; back to login.
    Failed,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::AwaitingCode => "awaiting_code",
            Self::Authenticated => "authenticated",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Data for the login entry page. Rendering is an external collaborator's
/// concern; this component only supplies the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPage {
    /// Domain the login page is bound to, when one was supplied.
    pub shop_domain: Option<ShopDomain>,
}

/// Data for the full-page redirect to the platform authorization screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPage {
    /// Platform authorization URL.
    pub auth_url: String,

    /// Domain the redirect is bound to.
    pub shop_domain: ShopDomain,
}

/// HTTP-level redirect decision after `complete_authentication`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowRedirect {
    /// Redirect to the login entry point.
    Login,

    /// Redirect the user to the platform authorization URL.
    Authorization {
        /// Platform authorization URL.
        auth_url: String,
    },

    /// Redirect to the previously stashed destination, now consumed.
    ReturnTo(String),

    /// Redirect to the default landing destination.
    Home,
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while orchestrating the handshake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// The authorize action failed fatally.
    #[error("authorize action failed: {message}")]
    Authorize { message: String },

    /// The authenticate action failed fatally.
    #[error("authenticate action failed: {message}")]
    Authenticate { message: String },

    /// The session store failed while consuming the return-to value.
    #[error("session store failed: {0}")]
    Session(#[from] StoreError),

    /// A collaborator violated its contract (e.g. "needs authorization"
    /// without an authorization URL). Fatal, not a recoverable branch.
    #[error("collaborator contract violation: {message}")]
    InternalConsistency { message: String },
}

// ============================================================================
// OAuthFlowController
// ============================================================================

/// Orchestrates the interactive authorization handshake.
///
/// A standalone component invoked by a thin transport-layer handler, not
/// inherited behavior: the authorize and authenticate actions, and the
/// session store used for the return-to destination, are injected
/// explicitly. The controller holds no cross-request state.
pub struct OAuthFlowController {
    authorize: Arc<dyn AuthorizeAction>,
    authenticate: Arc<dyn AuthenticateAction>,
    sessions: Arc<dyn SessionStore>,
}

impl OAuthFlowController {
    /// Create a controller over the given collaborators.
    pub fn new(
        authorize: Arc<dyn AuthorizeAction>,
        authenticate: Arc<dyn AuthenticateAction>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            authorize,
            authenticate,
            sessions,
        }
    }

    /// Produce the login entry page bound to the given domain.
    ///
    /// Always lands in [`FlowState::Start`].
    #[instrument(skip(self))]
    pub fn enter_login(&self, shop_domain: Option<ShopDomain>) -> LoginPage {
        info!(state = %FlowState::Start, "Entering login");
        LoginPage { shop_domain }
    }

    /// Begin the authorization leg for a shop.
    ///
    /// The public contract is simply "redirect target = authorization URL",
    /// independent of success or failure of the eventual grant.
    ///
    /// # Errors
    ///
    /// Fatal errors of the authorize action propagate unchanged; they are
    /// not retried here.
    #[instrument(skip(self), fields(shop = %shop_domain))]
    pub async fn begin_authorization(
        &self,
        shop_domain: &ShopDomain,
    ) -> Result<RedirectPage, FlowError> {
        let result = self.authorize.authorize(shop_domain).await?;

        info!(state = %FlowState::AwaitingCode, "Redirecting to authorization URL");
        Ok(RedirectPage {
            auth_url: result.url,
            shop_domain: shop_domain.clone(),
        })
    }

    /// Complete the authenticate leg and decide the next redirect.
    ///
    /// Maps the action's tri-state verdict to an [`AuthOutcome`] and, when
    /// authenticated, consumes the stashed return-to destination exactly
    /// once (read, then clear) before falling back to the default landing
    /// destination.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InternalConsistency`] when the action reports
    /// "needs authorization" without supplying an authorization URL, and
    /// propagates authenticate-action and session-store failures.
    #[instrument(skip(self, request), fields(shop = request.shop.as_deref().unwrap_or("")))]
    pub async fn complete_authentication(
        &self,
        request: &HandshakeRequest,
    ) -> Result<FlowRedirect, FlowError> {
        let raw = self.authenticate.authenticate(request).await?;

        let outcome = match raw.status {
            None => AuthOutcome::NeedsLogin,
            Some(false) => {
                let auth_url = raw.url.ok_or_else(|| FlowError::InternalConsistency {
                    message: "authenticate action reported 'needs authorization' \
                              without an authorization URL"
                        .to_string(),
                })?;
                AuthOutcome::NeedsAuthorization { auth_url }
            }
            Some(true) => AuthOutcome::Authenticated,
        };

        info!(state = %outcome.state(), "Handshake outcome resolved");

        match outcome {
            AuthOutcome::NeedsLogin => {
                warn!("Structurally invalid handshake request; back to login");
                Ok(FlowRedirect::Login)
            }
            AuthOutcome::NeedsAuthorization { auth_url } => {
                Ok(FlowRedirect::Authorization { auth_url })
            }
            AuthOutcome::Authenticated => self.post_authentication_redirect().await,
        }
    }

    /// Decide where an authenticated request lands.
    ///
    /// Consumes the stashed return-to destination exactly once: the value is
    /// read and then cleared before the redirect is returned, so a second
    /// authenticated request in the same session falls back to home.
    async fn post_authentication_redirect(&self) -> Result<FlowRedirect, FlowError> {
        match self.sessions.get(RETURN_TO_KEY).await? {
            Some(target) => {
                self.sessions.forget(RETURN_TO_KEY).await?;
                info!(%target, "Consumed stashed return-to destination");
                Ok(FlowRedirect::ReturnTo(target))
            }
            None => Ok(FlowRedirect::Home),
        }
    }
}

impl fmt::Debug for OAuthFlowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthFlowController").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
