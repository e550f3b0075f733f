//! In-memory tenant and session stores for development and testing.
//!
//! Production deployments implement [`TenantStore`] and [`SessionStore`]
//! over their real persistence; these adapters exist so that the service
//! binary runs end-to-end without external infrastructure.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use storegate_core::{SessionStore, ShopDomain, StoreError, Tenant, TenantId, TenantStore};
use tokio::sync::RwLock;
use tracing::info;

// ============================================================================
// MemoryTenantStore
// ============================================================================

/// Tenant store backed by an in-process map, with soft-delete support.
#[derive(Debug, Default)]
pub struct MemoryTenantStore {
    tenants: RwLock<HashMap<String, Tenant>>,
    next_id: AtomicU64,
}

impl MemoryTenantStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update the record for `domain`, marking the integration
    /// installed with a stored access token. Reinstalling a soft-deleted
    /// tenant revives the record.
    pub async fn install(&self, domain: &ShopDomain) -> Tenant {
        let mut tenants = self.tenants.write().await;

        let tenant = tenants
            .entry(domain.as_str().to_string())
            .and_modify(|t| {
                t.installed = true;
                t.deleted = false;
                t.has_access_token = true;
            })
            .or_insert_with(|| {
                let id = TenantId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
                Tenant::new(id, domain.clone())
            })
            .clone();

        info!(shop = %domain, tenant_id = %tenant.id, "Tenant installed");
        tenant
    }

    /// Soft-delete the record for `domain`. Returns false when no record
    /// exists.
    pub async fn soft_delete(&self, domain: &ShopDomain) -> bool {
        let mut tenants = self.tenants.write().await;
        match tenants.get_mut(domain.as_str()) {
            Some(tenant) => {
                tenant.deleted = true;
                tenant.installed = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn find_by_domain(
        &self,
        domain: &ShopDomain,
        include_soft_deleted: bool,
    ) -> Result<Option<Tenant>, StoreError> {
        let tenants = self.tenants.read().await;
        let record = tenants
            .get(domain.as_str())
            .filter(|t| include_soft_deleted || !t.deleted)
            .cloned();
        Ok(record)
    }
}

// ============================================================================
// MemorySessionStore
// ============================================================================

/// Session store backed by an in-process map.
///
/// Real deployments scope session values to the current user's cookie
/// session; this adapter uses a single shared scope, which is sufficient for
/// development.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<(), StoreError> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
