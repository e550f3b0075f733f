//! Tests for [`WebhookGate`].
//!
//! Covers the ordered short-circuit algorithm, the header extraction rules,
//! and the store-failure propagation contract.

use super::*;
use crate::resolver::MockTenantStore;
use crate::{HmacVerifier, ShopResolver, Tenant, TenantId};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

const BODY: &[u8] = b"{\"id\":1}";

fn secret() -> ApiSecret {
    ApiSecret::from("shh")
}

fn signed_request(domain: &str) -> WebhookRequest {
    let signature = HmacVerifier::sign(BODY, &secret());
    WebhookRequest::new(Bytes::from_static(BODY), signature, domain)
}

fn gate_with(store: MockTenantStore) -> WebhookGate {
    WebhookGate::new(ShopResolver::new(Arc::new(store)))
}

fn active_store(domain: &str) -> MockTenantStore {
    let tenant = Tenant::new(TenantId::new(1), ShopDomain::new(domain).unwrap());
    let mut store = MockTenantStore::new();
    store
        .expect_find_by_domain()
        .returning(move |_, _| Ok(Some(tenant.clone())));
    store
}

// ============================================================================
// Header extraction tests
// ============================================================================

mod header_extraction_tests {
    use super::*;

    /// Present headers are picked up from the lowercased header map.
    #[test]
    fn test_headers_extracted() {
        let mut headers = HashMap::new();
        headers.insert(SIGNATURE_HEADER.to_string(), "c2ln".to_string());
        headers.insert(SHOP_DOMAIN_HEADER.to_string(), "shop.example.com".to_string());

        let request = WebhookRequest::from_http_headers(&headers, Bytes::from_static(BODY));
        assert_eq!(request.claimed_signature(), "c2ln");
        assert_eq!(request.claimed_domain(), "shop.example.com");
        assert_eq!(request.body(), BODY);
    }

    /// A missing signature header becomes the empty string, never a skip.
    #[test]
    fn test_missing_headers_become_empty() {
        let request = WebhookRequest::from_http_headers(&HashMap::new(), Bytes::new());
        assert_eq!(request.claimed_signature(), "");
        assert_eq!(request.claimed_domain(), "");
    }
}

// ============================================================================
// accept tests
// ============================================================================

mod accept_tests {
    use super::*;

    /// Correct signature, known active tenant: the request is allowed.
    #[tokio::test]
    async fn test_valid_webhook_allowed() {
        let gate = gate_with(active_store("shop.example.com"));
        let decision = gate
            .accept(&signed_request("shop.example.com"), &secret())
            .await
            .unwrap();

        assert_eq!(decision, GateDecision::Allow);
    }

    /// An empty signature header rejects with `InvalidSignature`.
    #[tokio::test]
    async fn test_empty_signature_rejected() {
        // The gate must reject before touching the store.
        let gate = gate_with(MockTenantStore::new());
        let request = WebhookRequest::new(Bytes::from_static(BODY), "", "shop.example.com");

        let decision = gate.accept(&request, &secret()).await.unwrap();
        assert_eq!(
            decision,
            GateDecision::Reject(RejectReason::InvalidSignature)
        );
    }

    /// A tampered body fails verification against the original signature.
    #[tokio::test]
    async fn test_tampered_body_rejected() {
        let gate = gate_with(MockTenantStore::new());
        let signature = HmacVerifier::sign(BODY, &secret());
        let request = WebhookRequest::new(
            Bytes::from_static(b"{\"id\":2}"),
            signature,
            "shop.example.com",
        );

        let decision = gate.accept(&request, &secret()).await.unwrap();
        assert_eq!(
            decision,
            GateDecision::Reject(RejectReason::InvalidSignature)
        );
    }

    /// A valid signature with an empty domain header still rejects with
    /// `InvalidSignature`.
    #[tokio::test]
    async fn test_empty_domain_rejected_as_invalid_signature() {
        let gate = gate_with(MockTenantStore::new());
        let decision = gate.accept(&signed_request(""), &secret()).await.unwrap();

        assert_eq!(
            decision,
            GateDecision::Reject(RejectReason::InvalidSignature)
        );
    }

    /// A valid signature for a domain with no matching tenant rejects with
    /// `UnknownShop`.
    #[tokio::test]
    async fn test_unknown_shop_rejected() {
        let mut store = MockTenantStore::new();
        store.expect_find_by_domain().returning(|_, _| Ok(None));

        let gate = gate_with(store);
        let decision = gate
            .accept(&signed_request("ghost.example.com"), &secret())
            .await
            .unwrap();

        assert_eq!(decision, GateDecision::Reject(RejectReason::UnknownShop));
    }

    /// A domain header that cannot satisfy the platform grammar cannot match
    /// any tenant and rejects as `UnknownShop` without a store round trip.
    #[tokio::test]
    async fn test_malformed_domain_rejected_as_unknown() {
        let gate = gate_with(MockTenantStore::new());
        let decision = gate
            .accept(&signed_request("not a hostname"), &secret())
            .await
            .unwrap();

        assert_eq!(decision, GateDecision::Reject(RejectReason::UnknownShop));
    }

    /// A soft-deleted tenant rejects with `DeletedShop`.
    #[tokio::test]
    async fn test_deleted_shop_rejected() {
        let tenant = Tenant::new(
            TenantId::new(2),
            ShopDomain::new("gone.example.com").unwrap(),
        )
        .soft_deleted();

        let mut store = MockTenantStore::new();
        store
            .expect_find_by_domain()
            .withf(|_, include_soft_deleted| *include_soft_deleted)
            .returning(move |_, _| Ok(Some(tenant.clone())));

        let gate = gate_with(store);
        let decision = gate
            .accept(&signed_request("gone.example.com"), &secret())
            .await
            .unwrap();

        assert_eq!(decision, GateDecision::Reject(RejectReason::DeletedShop));
    }

    /// An active tenant without a stored access token has no valid session
    /// context and rejects with `InvalidSession`.
    #[tokio::test]
    async fn test_tokenless_tenant_rejected_as_invalid_session() {
        let tenant = Tenant::new(
            TenantId::new(3),
            ShopDomain::new("shop.example.com").unwrap(),
        )
        .without_access_token();

        let mut store = MockTenantStore::new();
        store
            .expect_find_by_domain()
            .returning(move |_, _| Ok(Some(tenant.clone())));

        let gate = gate_with(store);
        let decision = gate
            .accept(&signed_request("shop.example.com"), &secret())
            .await
            .unwrap();

        assert_eq!(decision, GateDecision::Reject(RejectReason::InvalidSession));
    }

    /// A store failure propagates as an error, never as a rejection.
    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockTenantStore::new();
        store
            .expect_find_by_domain()
            .returning(|_, _| Err(StoreError::unavailable("timeout")));

        let gate = gate_with(store);
        let result = gate
            .accept(&signed_request("shop.example.com"), &secret())
            .await;

        assert!(matches!(result, Err(StoreError::Unavailable { .. })));
    }

    /// Calling `accept` twice with an identical request and unchanged store
    /// state yields the same decision both times.
    #[tokio::test]
    async fn test_accept_is_idempotent() {
        let gate = gate_with(active_store("shop.example.com"));
        let request = signed_request("shop.example.com");

        let first = gate.accept(&request, &secret()).await.unwrap();
        let second = gate.accept(&request, &secret()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, GateDecision::Allow);
    }
}
