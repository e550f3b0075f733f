//! Webhook signature computation and verification.
//!
//! The platform signs every webhook delivery with HMAC-SHA256 over the raw,
//! unmodified request body, keyed by the integration's shared API secret, and
//! transmits the digest base64-encoded in the `x-shopify-hmac-sha256` header.
//! Re-encoding or reformatting the body invalidates the signature, which is
//! why [`HmacVerifier`] operates on raw bytes only.
//!
//! Verification is constant-time with respect to secret-dependent content. A
//! missing or empty claimed signature flows through the same comparison path
//! as a wrong one so that "no header" and "bad signature" are not observably
//! different to a caller measuring response times.

use crate::{ApiSecret, SecretError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// HmacVerifier
// ============================================================================

/// Computes and verifies base64-encoded HMAC-SHA256 webhook signatures.
///
/// Pure functions over their inputs; no side effects, no internal state.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacVerifier;

impl HmacVerifier {
    /// Compute the expected signature for a raw payload.
    ///
    /// Returns the base64-encoded HMAC-SHA256 digest of `raw_body` keyed by
    /// `secret` — the exact value the platform places in the signature
    /// header.
    pub fn sign(raw_body: &[u8], secret: &ApiSecret) -> String {
        // HMAC-SHA256 accepts keys of any length, so construction cannot fail.
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC-SHA256 accepts keys of any length");
        mac.update(raw_body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Verify a claimed signature against the expected digest for `raw_body`.
    ///
    /// The expected digest is always computed and the comparison is always
    /// entered, even when `claimed_signature` is empty; there is no early
    /// return ahead of the constant-time compare. The comparison itself is
    /// constant-time over the signature bytes (the length of the claimed
    /// signature is attacker-supplied and therefore not a secret).
    pub fn verify(raw_body: &[u8], claimed_signature: &str, secret: &ApiSecret) -> bool {
        let expected = Self::sign(raw_body, secret);
        expected
            .as_bytes()
            .ct_eq(claimed_signature.as_bytes())
            .into()
    }
}

// ============================================================================
// SecretProvider
// ============================================================================

/// Interface for retrieving the shared API secret.
///
/// Implementations decide where the secret lives (configuration, a vault,
/// an environment binding). The gate fetches it per request and discards it
/// after the decision.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Return the per-tenant-class shared secret used for HMAC computation.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError`] when the secret is missing or the backing
    /// provider cannot be reached. Provider failures are infrastructure
    /// failures and must not be surfaced as a trust rejection.
    async fn api_secret(&self) -> Result<ApiSecret, SecretError>;
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
