//! Tests for core value types: shop domains, tenant records, and the shared
//! API secret.

use super::*;

// ============================================================================
// ShopDomain tests
// ============================================================================

mod shop_domain_tests {
    use super::*;

    /// A well-formed platform hostname is accepted unchanged.
    #[test]
    fn test_valid_domain_accepted() {
        let domain = ShopDomain::new("example.myshopify.com").unwrap();
        assert_eq!(domain.as_str(), "example.myshopify.com");
    }

    /// Input is normalized: surrounding whitespace trimmed, letters
    /// lowercased.
    #[test]
    fn test_domain_is_normalized() {
        let domain = ShopDomain::new("  Example.MyShopify.COM ").unwrap();
        assert_eq!(domain.as_str(), "example.myshopify.com");
    }

    /// Hyphens are allowed inside labels.
    #[test]
    fn test_hyphenated_labels_accepted() {
        assert!(ShopDomain::new("my-test-shop.example.com").is_ok());
    }

    /// An empty (or all-whitespace) domain is rejected as required.
    #[test]
    fn test_empty_domain_rejected() {
        assert_eq!(ShopDomain::new(""), Err(DomainError::Required));
        assert_eq!(ShopDomain::new("   "), Err(DomainError::Required));
    }

    /// A bare label without a dot is not a platform hostname.
    #[test]
    fn test_single_label_rejected() {
        assert!(matches!(
            ShopDomain::new("localhost"),
            Err(DomainError::InvalidFormat { .. })
        ));
    }

    /// Labels must not start or end with a hyphen.
    #[test]
    fn test_misplaced_hyphen_rejected() {
        assert!(ShopDomain::new("-shop.example.com").is_err());
        assert!(ShopDomain::new("shop-.example.com").is_err());
    }

    /// Characters outside the grammar (underscores, spaces, slashes) are
    /// rejected.
    #[test]
    fn test_invalid_characters_rejected() {
        assert!(ShopDomain::new("shop_1.example.com").is_err());
        assert!(ShopDomain::new("sh op.example.com").is_err());
        assert!(ShopDomain::new("shop.example.com/admin").is_err());
    }

    /// Empty labels (consecutive or leading dots) are rejected.
    #[test]
    fn test_empty_labels_rejected() {
        assert!(ShopDomain::new("shop..example.com").is_err());
        assert!(ShopDomain::new(".example.com").is_err());
        assert!(ShopDomain::new("example.com.").is_err());
    }

    /// Hostnames beyond the maximum length are rejected.
    #[test]
    fn test_overlong_domain_rejected() {
        let long = format!("{}.example.com", "a".repeat(300));
        assert_eq!(
            ShopDomain::new(long),
            Err(DomainError::TooLong { max_length: 255 })
        );
    }

    /// `FromStr` goes through the same validation as `new`.
    #[test]
    fn test_from_str_validates() {
        let parsed: ShopDomain = "shop.example.com".parse().unwrap();
        assert_eq!(parsed.as_str(), "shop.example.com");
        assert!("not a domain".parse::<ShopDomain>().is_err());
    }
}

// ============================================================================
// Tenant tests
// ============================================================================

mod tenant_tests {
    use super::*;

    fn domain() -> ShopDomain {
        ShopDomain::new("shop.example.com").unwrap()
    }

    /// A fresh tenant record is installed, not deleted, and holds a token.
    #[test]
    fn test_new_tenant_is_active() {
        let tenant = Tenant::new(TenantId::new(1), domain());
        assert!(tenant.installed);
        assert!(!tenant.deleted);
        assert!(tenant.has_access_token);
    }

    /// Builder helpers flip the soft-deleted and token-presence flags.
    #[test]
    fn test_builder_flags() {
        let tenant = Tenant::new(TenantId::new(1), domain())
            .soft_deleted()
            .without_access_token();
        assert!(tenant.deleted);
        assert!(!tenant.has_access_token);
    }
}

// ============================================================================
// ApiSecret tests
// ============================================================================

mod api_secret_tests {
    use super::*;

    /// The `Debug` output must not reveal the secret.
    #[test]
    fn test_debug_redacts_secret() {
        let secret = ApiSecret::from("top-secret-value");
        let debug_str = format!("{:?}", secret);

        assert!(
            !debug_str.contains("top-secret-value"),
            "secret must not appear in debug output; got: {}",
            debug_str
        );
        assert!(
            debug_str.contains("<REDACTED>"),
            "debug output should contain <REDACTED>; got: {}",
            debug_str
        );
    }

    /// The raw bytes remain accessible for digest computation.
    #[test]
    fn test_secret_bytes_accessible() {
        let secret = ApiSecret::from("shh");
        assert_eq!(secret.as_bytes(), b"shh");
    }
}
