use super::*;

#[tokio::test]
async fn test_returns_configured_secret() {
    let provider = LiteralSecretProvider::new("hush".to_string());

    let secret = provider.api_secret().await.unwrap();

    assert_eq!(secret, ApiSecret::from("hush"));
}

#[tokio::test]
async fn test_empty_secret_is_not_configured() {
    let provider = LiteralSecretProvider::new(String::new());

    let result = provider.api_secret().await;

    assert!(matches!(result, Err(SecretError::NotConfigured)));
}

#[test]
fn test_debug_redacts_secret() {
    let provider = LiteralSecretProvider::new("hush".to_string());

    let formatted = format!("{:?}", provider);

    assert!(formatted.contains("<REDACTED>"));
    assert!(!formatted.contains("hush"));
}
