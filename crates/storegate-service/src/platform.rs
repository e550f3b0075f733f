//! Platform-facing authorize/authenticate actions for the service binary.
//!
//! [`PlatformAuthorizeAction`] builds the real authorization URL for the
//! platform's grant screen. [`DevAuthenticateAction`] is the development
//! stand-in for the authenticate action: the actual token exchange with the
//! remote platform is a deployment concern behind the
//! [`AuthenticateAction`] trait, but the tri-state verdict contract is
//! implemented faithfully here so the whole flow can be exercised locally.

use crate::store::MemoryTenantStore;
use async_trait::async_trait;
use std::sync::Arc;
use storegate_core::{
    AuthenticateAction, AuthenticateOutcome, AuthorizeAction, AuthorizeResult, FlowError,
    HandshakeRequest, ShopDomain,
};
use tracing::{info, instrument};
use url::Url;

// ============================================================================
// PlatformAuthorizeAction
// ============================================================================

/// Builds the platform authorization URL for a shop.
///
/// URL construction only; the grant itself happens on the platform's side
/// after the user is redirected there.
#[derive(Debug, Clone)]
pub struct PlatformAuthorizeAction {
    api_key: String,
    scopes: String,
    redirect_uri: String,
}

impl PlatformAuthorizeAction {
    /// Create an action for the given application credentials.
    pub fn new(api_key: String, scopes: String, redirect_uri: String) -> Self {
        Self {
            api_key,
            scopes,
            redirect_uri,
        }
    }
}

#[async_trait]
impl AuthorizeAction for PlatformAuthorizeAction {
    #[instrument(skip(self), fields(shop = %shop))]
    async fn authorize(&self, shop: &ShopDomain) -> Result<AuthorizeResult, FlowError> {
        let mut url = Url::parse(&format!("https://{}/admin/oauth/authorize", shop)).map_err(
            |e| FlowError::Authorize {
                message: format!("cannot build authorization URL: {}", e),
            },
        )?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.api_key)
            .append_pair("scope", &self.scopes)
            .append_pair("redirect_uri", &self.redirect_uri);

        Ok(AuthorizeResult {
            url: url.to_string(),
        })
    }
}

// ============================================================================
// DevAuthenticateAction
// ============================================================================

/// Development authenticate action over the in-memory tenant store.
///
/// Implements the tri-state verdict contract:
/// - missing or malformed `shop` → status `None`
/// - no authorization code → status `Some(false)` with the authorization URL
/// - code present → installs the tenant and returns status `Some(true)`
///
/// The code itself is not exchanged with the platform; any non-empty code is
/// accepted. That is what makes this a development adapter.
pub struct DevAuthenticateAction {
    authorize: Arc<dyn AuthorizeAction>,
    store: Arc<MemoryTenantStore>,
}

impl DevAuthenticateAction {
    /// Create an action over the given authorize action and tenant store.
    pub fn new(authorize: Arc<dyn AuthorizeAction>, store: Arc<MemoryTenantStore>) -> Self {
        Self { authorize, store }
    }
}

#[async_trait]
impl AuthenticateAction for DevAuthenticateAction {
    #[instrument(skip(self, request), fields(shop = request.shop.as_deref().unwrap_or("")))]
    async fn authenticate(
        &self,
        request: &HandshakeRequest,
    ) -> Result<AuthenticateOutcome, FlowError> {
        let Some(domain) = request
            .shop
            .as_deref()
            .and_then(|raw| ShopDomain::new(raw).ok())
        else {
            return Ok(AuthenticateOutcome {
                url: None,
                status: None,
            });
        };

        match request.code.as_deref() {
            None | Some("") => {
                let result = self.authorize.authorize(&domain).await?;
                Ok(AuthenticateOutcome {
                    url: Some(result.url),
                    status: Some(false),
                })
            }
            Some(_) => {
                let tenant = self.store.install(&domain).await;
                info!(tenant_id = %tenant.id, "Development handshake completed");
                Ok(AuthenticateOutcome {
                    url: None,
                    status: Some(true),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
