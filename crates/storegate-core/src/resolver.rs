//! Tenant resolution over the external tenant store.
//!
//! [`ShopResolver`] turns a [`ShopDomain`] into a [`Resolution`] through a
//! single point-in-time read of the injected [`TenantStore`]. There is no
//! caching and no retry; a store failure propagates as
//! [`StoreError::Unavailable`] rather than being folded into a "not found"
//! answer, because an unavailable store is not a trust decision.

use crate::{ShopDomain, StoreError, Tenant};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

// ============================================================================
// TenantStore
// ============================================================================

/// Interface for the external tenant store.
///
/// The single capability this core requires from persistence: an exact-domain
/// lookup that can optionally surface soft-deleted records. Implementable
/// over any backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Find a tenant by exact domain match.
    ///
    /// When `include_soft_deleted` is false, a soft-deleted record must be
    /// reported as absent (`Ok(None)`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the store cannot answer.
    async fn find_by_domain(
        &self,
        domain: &ShopDomain,
        include_soft_deleted: bool,
    ) -> Result<Option<Tenant>, StoreError>;
}

// ============================================================================
// Resolution
// ============================================================================

/// Outcome of resolving a shop domain.
///
/// `FoundDeleted` is distinct from `NotFound` because the interactive flow
/// must distinguish "never installed" from "was installed, now removed" to
/// choose the correct recovery path. Webhook validation treats
/// `FoundDeleted` as a rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No tenant record matches the domain.
    NotFound,

    /// An active tenant record matches the domain.
    FoundActive(Tenant),

    /// A soft-deleted tenant record matches the domain.
    FoundDeleted(Tenant),
}

// ============================================================================
// ShopResolver
// ============================================================================

/// Resolves a shop domain to a tenant record.
pub struct ShopResolver {
    store: Arc<dyn TenantStore>,
}

impl ShopResolver {
    /// Create a resolver over the given tenant store.
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }

    /// Resolve a domain to a tenant, tagging soft-deleted records.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from the underlying store unchanged.
    #[instrument(skip(self), fields(shop = %domain))]
    pub async fn resolve(
        &self,
        domain: &ShopDomain,
        include_soft_deleted: bool,
    ) -> Result<Resolution, StoreError> {
        let record = self
            .store
            .find_by_domain(domain, include_soft_deleted)
            .await?;

        let resolution = match record {
            None => Resolution::NotFound,
            Some(tenant) if tenant.deleted => {
                if include_soft_deleted {
                    Resolution::FoundDeleted(tenant)
                } else {
                    // A compliant store already filtered this record out;
                    // enforce the contract here for stores that do not.
                    Resolution::NotFound
                }
            }
            Some(tenant) => Resolution::FoundActive(tenant),
        };

        Ok(resolution)
    }
}

impl std::fmt::Debug for ShopResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
