use super::*;
use crate::store::MemoryTenantStore;
use storegate_core::TenantStore;

fn authorize_action() -> PlatformAuthorizeAction {
    PlatformAuthorizeAction::new(
        "app-key-123".to_string(),
        "read_products,write_orders".to_string(),
        "https://app.example.com/authenticate".to_string(),
    )
}

fn dev_action() -> (DevAuthenticateAction, Arc<MemoryTenantStore>) {
    let store = Arc::new(MemoryTenantStore::new());
    let action = DevAuthenticateAction::new(Arc::new(authorize_action()), store.clone());
    (action, store)
}

// ============================================================================
// PlatformAuthorizeAction
// ============================================================================

#[tokio::test]
async fn test_authorize_url_targets_shop_grant_screen() {
    let action = authorize_action();
    let shop = ShopDomain::new("alpha.myshopify.com").unwrap();

    let result = action.authorize(&shop).await.unwrap();
    let url = Url::parse(&result.url).unwrap();

    assert_eq!(url.host_str(), Some("alpha.myshopify.com"));
    assert_eq!(url.path(), "/admin/oauth/authorize");
}

#[tokio::test]
async fn test_authorize_url_carries_credentials_as_query() {
    let action = authorize_action();
    let shop = ShopDomain::new("alpha.myshopify.com").unwrap();

    let result = action.authorize(&shop).await.unwrap();
    let url = Url::parse(&result.url).unwrap();
    let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

    assert_eq!(pairs.get("client_id").map(String::as_str), Some("app-key-123"));
    assert_eq!(
        pairs.get("scope").map(String::as_str),
        Some("read_products,write_orders")
    );
    assert_eq!(
        pairs.get("redirect_uri").map(String::as_str),
        Some("https://app.example.com/authenticate")
    );
}

// ============================================================================
// DevAuthenticateAction
// ============================================================================

#[tokio::test]
async fn test_missing_shop_yields_null_status() {
    let (action, _store) = dev_action();

    let outcome = action.authenticate(&HandshakeRequest::default()).await.unwrap();

    assert_eq!(outcome.status, None);
    assert_eq!(outcome.url, None);
}

#[tokio::test]
async fn test_malformed_shop_yields_null_status() {
    let (action, _store) = dev_action();
    let request = HandshakeRequest {
        shop: Some("not a domain".to_string()),
        code: Some("grant-code".to_string()),
    };

    let outcome = action.authenticate(&request).await.unwrap();

    assert_eq!(outcome.status, None);
}

#[tokio::test]
async fn test_missing_code_yields_authorization_url() {
    let (action, _store) = dev_action();
    let request = HandshakeRequest {
        shop: Some("alpha.myshopify.com".to_string()),
        code: None,
    };

    let outcome = action.authenticate(&request).await.unwrap();

    assert_eq!(outcome.status, Some(false));
    let url = outcome.url.expect("authorization URL expected");
    assert!(url.starts_with("https://alpha.myshopify.com/admin/oauth/authorize"));
}

#[tokio::test]
async fn test_empty_code_treated_as_missing() {
    let (action, _store) = dev_action();
    let request = HandshakeRequest {
        shop: Some("alpha.myshopify.com".to_string()),
        code: Some(String::new()),
    };

    let outcome = action.authenticate(&request).await.unwrap();

    assert_eq!(outcome.status, Some(false));
    assert!(outcome.url.is_some());
}

#[tokio::test]
async fn test_code_present_installs_tenant_and_succeeds() {
    let (action, store) = dev_action();
    let request = HandshakeRequest {
        shop: Some("alpha.myshopify.com".to_string()),
        code: Some("grant-code".to_string()),
    };

    let outcome = action.authenticate(&request).await.unwrap();

    assert_eq!(outcome.status, Some(true));
    assert_eq!(outcome.url, None);

    let shop = ShopDomain::new("alpha.myshopify.com").unwrap();
    let tenant = store.find_by_domain(&shop, false).await.unwrap().unwrap();
    assert!(tenant.installed);
    assert!(tenant.has_access_token);
}
