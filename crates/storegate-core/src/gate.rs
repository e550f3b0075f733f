//! Webhook acceptance gate.
//!
//! Every inbound webhook passes through [`WebhookGate::accept`] before it
//! reaches any business handler. The gate orchestrates signature
//! verification, tenant resolution, and session validation in a fixed order,
//! short-circuiting on the first failure.
//!
//! The specific [`RejectReason`] exists for server-side logging and
//! diagnostics only. The HTTP boundary must respond with a fixed
//! unauthorized status and a generic body so that callers cannot learn which
//! check failed.

use crate::{
    ApiSecret, HmacVerifier, Resolution, SessionContext, SessionValidator, ShopDomain,
    ShopResolver, StoreError,
};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Header carrying the base64-encoded HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "x-shopify-hmac-sha256";

/// Header carrying the claimed tenant domain.
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

// ============================================================================
// WebhookRequest
// ============================================================================

/// Snapshot of an inbound webhook request.
///
/// Holds the raw, unmodified body bytes used verbatim in HMAC computation,
/// plus the claimed signature and domain headers. Constructed per request and
/// discarded after the gate decision.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    body: Bytes,
    claimed_signature: String,
    claimed_domain: String,
}

impl WebhookRequest {
    /// Create a webhook request snapshot from explicit header values.
    ///
    /// A missing signature header must be represented as an empty string,
    /// never as "skip verification".
    pub fn new(
        body: Bytes,
        claimed_signature: impl Into<String>,
        claimed_domain: impl Into<String>,
    ) -> Self {
        Self {
            body,
            claimed_signature: claimed_signature.into(),
            claimed_domain: claimed_domain.into(),
        }
    }

    /// Extract the snapshot from a lowercased HTTP header map.
    ///
    /// Absent headers degrade to empty strings; the gate's verification path
    /// treats them exactly like present-but-wrong values.
    pub fn from_http_headers(headers: &HashMap<String, String>, body: Bytes) -> Self {
        let claimed_signature = headers.get(SIGNATURE_HEADER).cloned().unwrap_or_default();
        let claimed_domain = headers.get(SHOP_DOMAIN_HEADER).cloned().unwrap_or_default();

        Self {
            body,
            claimed_signature,
            claimed_domain,
        }
    }

    /// Raw body bytes, exactly as received.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Claimed signature header value; empty when the header was absent.
    pub fn claimed_signature(&self) -> &str {
        &self.claimed_signature
    }

    /// Claimed domain header value; empty when the header was absent.
    pub fn claimed_domain(&self) -> &str {
        &self.claimed_domain
    }
}

// ============================================================================
// GateDecision
// ============================================================================

/// Outcome of the webhook gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The request is authentic and targets a known, active tenant; forward
    /// it unchanged to the next handler.
    Allow,

    /// The request failed a trust check. The reason stays server-side.
    Reject(RejectReason),
}

/// Why the gate rejected a webhook.
///
/// Never echoed verbatim to the caller; the HTTP layer maps every reason to
/// the same fixed unauthorized status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Signature missing, malformed, or mismatched; or domain header empty.
    InvalidSignature,

    /// No tenant record matches the claimed domain.
    UnknownShop,

    /// The matching tenant record is soft-deleted.
    DeletedShop,

    /// The resolved tenant has no valid session context.
    InvalidSession,
}

impl RejectReason {
    /// Short identifier for structured logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "invalid_signature",
            Self::UnknownShop => "unknown_shop",
            Self::DeletedShop => "deleted_shop",
            Self::InvalidSession => "invalid_session",
        }
    }
}

// ============================================================================
// WebhookGate
// ============================================================================

/// Orchestrates header extraction, HMAC verification, tenant resolution, and
/// session validation for inbound webhooks.
///
/// The gate performs read lookups only; it never mutates tenant or session
/// state, so calling [`accept`](Self::accept) twice with an identical request
/// and unchanged store state yields the same decision both times.
#[derive(Debug)]
pub struct WebhookGate {
    resolver: ShopResolver,
}

impl WebhookGate {
    /// Create a gate over the given resolver.
    pub fn new(resolver: ShopResolver) -> Self {
        Self { resolver }
    }

    /// Accept or reject an inbound webhook request.
    ///
    /// Checks run in order, short-circuiting on the first failure:
    ///
    /// 1. HMAC verification over the raw body; a failed verification or an
    ///    empty domain header rejects with `InvalidSignature`.
    /// 2. Tenant resolution with soft-deleted records included; `NotFound`
    ///    rejects with `UnknownShop`, a soft-deleted record with
    ///    `DeletedShop`.
    /// 3. Session validation on the resolved tenant; failure rejects with
    ///    `InvalidSession`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the tenant store cannot answer. This is an
    /// infrastructure failure, not a trust decision, and must not be masked
    /// as a rejection.
    #[instrument(skip(self, request, secret), fields(shop = %request.claimed_domain()))]
    pub async fn accept(
        &self,
        request: &WebhookRequest,
        secret: &ApiSecret,
    ) -> Result<GateDecision, StoreError> {
        let signature_ok = HmacVerifier::verify(request.body(), request.claimed_signature(), secret);

        if !signature_ok || request.claimed_domain().is_empty() {
            return Ok(self.reject(RejectReason::InvalidSignature));
        }

        // A domain that cannot satisfy the platform grammar cannot match any
        // stored tenant, so it resolves to "unknown" without a store round
        // trip.
        let Ok(domain) = ShopDomain::new(request.claimed_domain()) else {
            return Ok(self.reject(RejectReason::UnknownShop));
        };

        match self.resolver.resolve(&domain, true).await? {
            Resolution::NotFound => Ok(self.reject(RejectReason::UnknownShop)),
            Resolution::FoundDeleted(_) => Ok(self.reject(RejectReason::DeletedShop)),
            Resolution::FoundActive(tenant) => {
                let context = SessionContext::for_tenant(&tenant);
                if !SessionValidator::is_valid(&tenant, Some(&context)) {
                    return Ok(self.reject(RejectReason::InvalidSession));
                }

                debug!(tenant_id = %tenant.id, "Webhook accepted");
                Ok(GateDecision::Allow)
            }
        }
    }

    fn reject(&self, reason: RejectReason) -> GateDecision {
        warn!(reason = reason.as_str(), "Webhook rejected");
        GateDecision::Reject(reason)
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
