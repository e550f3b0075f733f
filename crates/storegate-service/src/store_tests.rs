use super::*;
use storegate_core::SessionStore;

fn domain(raw: &str) -> ShopDomain {
    ShopDomain::new(raw).unwrap()
}

// ============================================================================
// MemoryTenantStore
// ============================================================================

#[tokio::test]
async fn test_install_creates_active_tenant() {
    let store = MemoryTenantStore::new();

    let tenant = store.install(&domain("alpha.myshopify.com")).await;

    assert!(tenant.installed);
    assert!(!tenant.deleted);
    assert!(tenant.has_access_token);

    let found = store
        .find_by_domain(&domain("alpha.myshopify.com"), false)
        .await
        .unwrap();
    assert_eq!(found, Some(tenant));
}

#[tokio::test]
async fn test_install_assigns_distinct_ids() {
    let store = MemoryTenantStore::new();

    let first = store.install(&domain("alpha.myshopify.com")).await;
    let second = store.install(&domain("beta.myshopify.com")).await;

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_reinstall_keeps_id() {
    let store = MemoryTenantStore::new();

    let first = store.install(&domain("alpha.myshopify.com")).await;
    let again = store.install(&domain("alpha.myshopify.com")).await;

    assert_eq!(first.id, again.id);
}

#[tokio::test]
async fn test_find_unknown_domain_returns_none() {
    let store = MemoryTenantStore::new();

    let found = store
        .find_by_domain(&domain("nobody.myshopify.com"), true)
        .await
        .unwrap();

    assert_eq!(found, None);
}

#[tokio::test]
async fn test_soft_deleted_tenant_hidden_from_default_lookup() {
    let store = MemoryTenantStore::new();
    store.install(&domain("alpha.myshopify.com")).await;

    assert!(store.soft_delete(&domain("alpha.myshopify.com")).await);

    let hidden = store
        .find_by_domain(&domain("alpha.myshopify.com"), false)
        .await
        .unwrap();
    assert_eq!(hidden, None);

    let visible = store
        .find_by_domain(&domain("alpha.myshopify.com"), true)
        .await
        .unwrap()
        .unwrap();
    assert!(visible.deleted);
    assert!(!visible.installed);
}

#[tokio::test]
async fn test_soft_delete_unknown_domain_returns_false() {
    let store = MemoryTenantStore::new();

    assert!(!store.soft_delete(&domain("nobody.myshopify.com")).await);
}

#[tokio::test]
async fn test_reinstall_revives_soft_deleted_tenant() {
    let store = MemoryTenantStore::new();
    let original = store.install(&domain("alpha.myshopify.com")).await;
    store.soft_delete(&domain("alpha.myshopify.com")).await;

    let revived = store.install(&domain("alpha.myshopify.com")).await;

    assert_eq!(revived.id, original.id);
    assert!(revived.installed);
    assert!(!revived.deleted);
    assert!(revived.has_access_token);

    let found = store
        .find_by_domain(&domain("alpha.myshopify.com"), false)
        .await
        .unwrap();
    assert!(found.is_some());
}

// ============================================================================
// MemorySessionStore
// ============================================================================

#[tokio::test]
async fn test_session_get_missing_key_returns_none() {
    let store = MemorySessionStore::new();

    assert_eq!(store.get("return_to").await.unwrap(), None);
}

#[tokio::test]
async fn test_session_put_then_get() {
    let store = MemorySessionStore::new();

    store.put("return_to", "/orders").await.unwrap();

    assert_eq!(
        store.get("return_to").await.unwrap(),
        Some("/orders".to_string())
    );
}

#[tokio::test]
async fn test_session_put_overwrites_existing_value() {
    let store = MemorySessionStore::new();

    store.put("return_to", "/orders").await.unwrap();
    store.put("return_to", "/products").await.unwrap();

    assert_eq!(
        store.get("return_to").await.unwrap(),
        Some("/products".to_string())
    );
}

#[tokio::test]
async fn test_session_forget_removes_value() {
    let store = MemorySessionStore::new();

    store.put("return_to", "/orders").await.unwrap();
    store.forget("return_to").await.unwrap();

    assert_eq!(store.get("return_to").await.unwrap(), None);
}

#[tokio::test]
async fn test_session_forget_missing_key_is_ok() {
    let store = MemorySessionStore::new();

    store.forget("return_to").await.unwrap();
}
