//! Session context construction and validation.
//!
//! A [`SessionContext`] is built when a tenant is resolved and discarded at
//! the end of request processing; it is never persisted by this core. The
//! [`SessionStore`] trait is the boundary to the surrounding framework's
//! request-scoped session storage and is used by the handshake flow for the
//! stashed return-to destination.

use crate::{StoreError, Tenant, TenantId};
use async_trait::async_trait;

// ============================================================================
// SessionContext
// ============================================================================

/// Association between a resolved tenant and a validity flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    /// Identity of the tenant this context was built for.
    pub tenant_id: TenantId,

    /// Whether the session is usable for authenticated work.
    pub valid: bool,
}

impl SessionContext {
    /// Create a context with an explicit validity flag.
    pub fn new(tenant_id: TenantId, valid: bool) -> Self {
        Self { tenant_id, valid }
    }

    /// Build the context for a freshly resolved tenant.
    ///
    /// The context is valid when the store holds an access token for the
    /// tenant and the record is not soft-deleted.
    pub fn for_tenant(tenant: &Tenant) -> Self {
        Self {
            tenant_id: tenant.id,
            valid: tenant.has_access_token && !tenant.deleted,
        }
    }
}

// ============================================================================
// SessionValidator
// ============================================================================

/// Checks that an existing session context is still valid for a tenant.
///
/// Pure check; never mutates the session store. Session assignment is an
/// external collaborator's responsibility, invoked before this check.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionValidator;

impl SessionValidator {
    /// Returns false if no context is associated, the tenant is flagged
    /// deleted, the context's recorded tenant identity does not match the
    /// resolved tenant, or the context itself is flagged invalid.
    pub fn is_valid(tenant: &Tenant, context: Option<&SessionContext>) -> bool {
        let Some(context) = context else {
            return false;
        };

        if tenant.deleted {
            return false;
        }

        if context.tenant_id != tenant.id {
            return false;
        }

        context.valid
    }
}

// ============================================================================
// SessionStore
// ============================================================================

/// Interface for request-scoped session storage.
///
/// Scoped to the current request/user context by the implementation; this
/// core only reads and clears values through it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value by key.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stash a value under a key.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value by key. Removing an absent key is not an error.
    async fn forget(&self, key: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
