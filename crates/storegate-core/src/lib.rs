//! # Storegate Core
//!
//! Request-level trust establishment for a multi-tenant storefront-platform
//! integration.
//!
//! This crate contains the domain logic for two trust decisions:
//!
//! - accepting or rejecting inbound signed webhook deliveries from the
//!   platform ([`WebhookGate`])
//! - driving the interactive authorization handshake that establishes a
//!   tenant's installed state ([`OAuthFlowController`])
//!
//! ## Architecture
//!
//! The core follows clean architecture principles:
//! - Business logic depends only on trait abstractions
//! - Infrastructure implementations (tenant store, session store, the
//!   platform authorize/authenticate actions) are injected at runtime
//! - No component retains cross-request mutable state
//!
//! ## Usage
//!
//! ```rust
//! use storegate_core::{ShopDomain, TenantId};
//!
//! let domain = ShopDomain::new("example.myshopify.com").unwrap();
//! let tenant_id = TenantId::new(42);
//! assert_eq!(domain.as_str(), "example.myshopify.com");
//! ```

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Domain Identifier Types
// ============================================================================

/// Numeric identifier assigned to a tenant by the tenant store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TenantId(u64);

impl TenantId {
    /// Create new tenant ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform-assigned hostname identifying a tenant.
///
/// Immutable value object. Construction normalizes the input (trimmed,
/// lowercased) and validates it against the platform domain grammar, so a
/// `ShopDomain` in hand is always a usable lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Maximum hostname length accepted by the platform.
    pub const MAX_LENGTH: usize = 255;

    /// Create new shop domain with validation
    ///
    /// # Validation Rules
    /// - Must be non-empty after trimming
    /// - Must be at most 255 characters
    /// - Labels contain only ASCII alphanumerics and hyphens
    /// - Labels must not start or end with a hyphen
    /// - Must contain at least two labels separated by dots
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_ascii_lowercase();

        if value.is_empty() {
            return Err(DomainError::Required);
        }

        if value.len() > Self::MAX_LENGTH {
            return Err(DomainError::TooLong {
                max_length: Self::MAX_LENGTH,
            });
        }

        let labels: Vec<&str> = value.split('.').collect();
        if labels.len() < 2 {
            return Err(DomainError::InvalidFormat { domain: value });
        }

        for label in &labels {
            if label.is_empty()
                || label.starts_with('-')
                || label.ends_with('-')
                || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                return Err(DomainError::InvalidFormat { domain: value });
            }
        }

        Ok(Self(value))
    }

    /// Get string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ShopDomain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// Tenant Record
// ============================================================================

/// Resolved record for a shop domain.
///
/// Owned by the external tenant store; this core never creates or deletes a
/// tenant, only reads the record and reports on its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    /// Store-assigned identifier.
    pub id: TenantId,

    /// Platform-assigned hostname.
    pub domain: ShopDomain,

    /// Whether the integration is currently installed for this tenant.
    pub installed: bool,

    /// Whether the record is soft-deleted (retained for audit/recovery).
    pub deleted: bool,

    /// Whether the store holds an access token for this tenant. The token
    /// itself never crosses this boundary, only its presence.
    pub has_access_token: bool,
}

impl Tenant {
    /// Create an active, installed tenant record with a stored access token.
    pub fn new(id: TenantId, domain: ShopDomain) -> Self {
        Self {
            id,
            domain,
            installed: true,
            deleted: false,
            has_access_token: true,
        }
    }

    /// Mark this record as soft-deleted.
    pub fn soft_deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    /// Mark this record as lacking a stored access token.
    pub fn without_access_token(mut self) -> Self {
        self.has_access_token = false;
        self
    }
}

// ============================================================================
// Shared Secret
// ============================================================================

/// Per-tenant-class shared secret used for webhook HMAC computation.
///
/// Zeroized on drop. The `Debug` representation never reveals the value.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ApiSecret(Vec<u8>);

impl ApiSecret {
    /// Wrap a raw secret value.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// Get the raw secret bytes for keyed-digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for ApiSecret {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiSecret").field(&"<REDACTED>").finish()
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error type for shop domain validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("shop domain is required")]
    Required,

    #[error("shop domain '{domain}' does not match the platform domain grammar")]
    InvalidFormat { domain: String },

    #[error("shop domain exceeds maximum length of {max_length}")]
    TooLong { max_length: usize },
}

/// Error type for tenant/session store failures.
///
/// Store failures are infrastructure failures, not trust decisions: they
/// propagate to the caller's generic error handling (5xx at the transport
/// boundary) and are never converted into a 401.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    /// Convenience constructor for backend failures.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Error type for secret provider failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    #[error("api secret is not configured")]
    NotConfigured,

    #[error("secret provider unavailable: {0}")]
    ProviderUnavailable(String),
}

// ============================================================================
// Module declarations
// ============================================================================

/// Webhook signature computation and constant-time verification
pub mod signature;

/// Tenant resolution over the external tenant store
pub mod resolver;

/// Session context construction and validation
pub mod session;

/// Webhook acceptance gate
pub mod gate;

/// Interactive authorization handshake orchestration
pub mod flow;

// Re-export key types for convenience
pub use flow::{
    AuthOutcome, AuthenticateAction, AuthenticateOutcome, AuthorizeAction, AuthorizeResult,
    FlowError, FlowRedirect, FlowState, HandshakeRequest, LoginPage, OAuthFlowController,
    RedirectPage, RETURN_TO_KEY,
};
pub use gate::{GateDecision, RejectReason, WebhookGate, WebhookRequest};
pub use resolver::{Resolution, ShopResolver, TenantStore};
pub use session::{SessionContext, SessionStore, SessionValidator};
pub use signature::{HmacVerifier, SecretProvider};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
