//! Production [`SecretProvider`] implementations for the service binary.
//!
//! | Type | Use | Security |
//! |------|-----|---------|
//! | [`LiteralSecretProvider`] | Dev / CI with a configured secret | Not for production |
//!
//! Vault-backed providers belong to the deployment, not to this crate; the
//! trait boundary in `storegate-core` is where they plug in.

use async_trait::async_trait;
use storegate_core::{ApiSecret, SecretError, SecretProvider};
use tracing::warn;

/// A [`SecretProvider`] backed by a plain-text secret from configuration.
///
/// **Development and testing only.** In production, use a vault-backed
/// implementation so that secrets are never stored in configuration files or
/// environment variables.
///
/// At startup, a `WARN` log line is emitted so that operators are reminded
/// to replace it before going to production.
pub struct LiteralSecretProvider {
    secret: String,
}

impl LiteralSecretProvider {
    /// Construct a new provider with the given literal secret.
    ///
    /// Emits a `WARN` log to remind operators that literal secrets are not
    /// production-safe.
    pub fn new(secret: String) -> Self {
        warn!(
            "LiteralSecretProvider is active — \
             literal secrets in configuration are not safe for production. \
             Migrate to a vault-backed provider before deploying."
        );
        Self { secret }
    }
}

impl std::fmt::Debug for LiteralSecretProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiteralSecretProvider")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

#[async_trait]
impl SecretProvider for LiteralSecretProvider {
    /// Return the configured secret.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::NotConfigured`] when the configured secret is
    /// empty, so that a misconfigured deployment fails closed instead of
    /// verifying signatures against an empty key.
    async fn api_secret(&self) -> Result<ApiSecret, SecretError> {
        if self.secret.is_empty() {
            return Err(SecretError::NotConfigured);
        }
        Ok(ApiSecret::from(self.secret.as_str()))
    }
}

#[cfg(test)]
#[path = "secret_tests.rs"]
mod tests;
