//! # Storegate Service
//!
//! Binary entry point for the Storegate HTTP service.
//!
//! This executable:
//! - Loads configuration from environment and files
//! - Initializes logging
//! - Wires the trust-establishment core to development adapters
//! - Starts the HTTP server from storegate-api

mod platform;
mod secret;
mod store;

use platform::{DevAuthenticateAction, PlatformAuthorizeAction};
use secret::LiteralSecretProvider;
use std::sync::Arc;
use store::{MemorySessionStore, MemoryTenantStore};
use storegate_api::{start_server, ServiceConfig};
use storegate_core::{
    AuthorizeAction, OAuthFlowController, ShopDomain, ShopResolver, WebhookGate,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "storegate_service=info,storegate_api=info,storegate_core=info,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Storegate Service");

    // -------------------------------------------------------------------------
    // Load configuration
    //
    // Sources (applied in order — later sources override earlier ones):
    //  1. /etc/storegate/service.yaml      — system-wide defaults
    //  2. ./config/service.yaml            — deployment-local override
    //  3. Path given by SG_CONFIG_FILE env — operator-specified file
    //  4. Environment variables prefixed SG__ (double-underscore separator)
    //     e.g. SG__SERVER__PORT=9090 sets server.port = 9090
    //
    // All configuration fields carry serde defaults, so absent files or an
    // entirely unconfigured environment produces a valid service config. A
    // malformed file or an environment variable that cannot be coerced to
    // the correct type IS a hard error because it indicates
    // deliberate-but-broken operator configuration.
    // -------------------------------------------------------------------------
    let mut config_builder = config::Config::builder()
        .add_source(
            config::File::with_name("/etc/storegate/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name("config/service")
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    // Optional explicit path supplied by the operator.
    if let Ok(explicit_path) = std::env::var("SG_CONFIG_FILE") {
        if !explicit_path.is_empty() {
            config_builder = config_builder.add_source(
                config::File::with_name(&explicit_path)
                    .required(true)
                    .format(config::FileFormat::Yaml),
            );
            info!(path = %explicit_path, "Loading configuration from explicit path");
        }
    }

    let config = match config_builder
        .add_source(config::Environment::with_prefix("SG").separator("__"))
        .build()
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "Failed to build configuration; aborting");
            std::process::exit(3);
        }
    };

    let service_config: ServiceConfig = match config.try_deserialize() {
        Ok(sc) => sc,
        Err(e) => {
            error!(
                error = %e,
                "Could not deserialize service configuration; aborting. \
                 Fix the configuration and restart."
            );
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    // -------------------------------------------------------------------------
    // Wire the core to the development adapters
    //
    // The tenant and session stores are in-memory; real deployments swap in
    // implementations of the storegate-core traits over their persistence.
    // -------------------------------------------------------------------------
    let tenant_store = Arc::new(MemoryTenantStore::new());
    let session_store = Arc::new(MemorySessionStore::new());
    let secrets = Arc::new(LiteralSecretProvider::new(
        service_config.platform.api_secret.clone(),
    ));

    if service_config.platform.api_secret.is_empty() {
        warn!("platform.api_secret is empty; every webhook delivery will be rejected");
    }

    // Seed development tenants so signed webhooks have something to target.
    for raw in &service_config.platform.seed_shops {
        match ShopDomain::new(raw.as_str()) {
            Ok(domain) => {
                tenant_store.install(&domain).await;
            }
            Err(e) => {
                warn!(shop = %raw, error = %e, "Skipping invalid seed shop");
            }
        }
    }

    let authorize: Arc<dyn AuthorizeAction> = Arc::new(PlatformAuthorizeAction::new(
        service_config.platform.api_key.clone(),
        service_config.platform.scopes.clone(),
        service_config.platform.redirect_uri.clone(),
    ));
    let authenticate = Arc::new(DevAuthenticateAction::new(
        authorize.clone(),
        tenant_store.clone(),
    ));

    let gate = Arc::new(WebhookGate::new(ShopResolver::new(tenant_store)));
    let flow = Arc::new(OAuthFlowController::new(
        authorize,
        authenticate,
        session_store,
    ));

    start_server(service_config, gate, flow, secrets).await?;

    Ok(())
}
