// Library exports for the payment recovery service
// main.rs and the integration tests both build the router through here

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use app::AppState;
pub use app_config::{AppConfig, Environment, TestIdentity};
pub use db::{DieselPool, StoreError};
pub use handlers::health::health_check;
pub use services::{
    BackgroundDispatcher, FailureLedger, FailureOutcome, Notifier, RecoveryCorrelator,
    SettingsStore, SuccessOutcome, WebhookVerifier,
};

use services::{
    platform::{
        PlatformAccessChecker, PlatformClient, PlatformIdentityResolver, UserTokenVerifier,
    },
    DevelopmentBypassVerifier, DieselFailureLedger, DieselSettingsStore, EmailService,
    HmacSignatureVerifier,
};

/// Wire the production collaborators around an existing pool
pub fn initialize_app_state(config: AppConfig, pool: DieselPool) -> anyhow::Result<AppState> {
    let ledger: Arc<dyn FailureLedger> = Arc::new(DieselFailureLedger::new(pool.clone()));
    let settings_store: Arc<dyn SettingsStore> = Arc::new(DieselSettingsStore::new(pool));

    let platform = PlatformClient::new(&config.platform)?;
    let identity = Arc::new(PlatformIdentityResolver::new(platform.clone()));

    let tokens = match config.platform.user_token_public_key.as_deref() {
        Some(pem) => UserTokenVerifier::from_es256_pem(pem, &config.platform.app_id)?,
        None => {
            warn!("WHOP_USER_TOKEN_PUBLIC_KEY not set; settings and dashboard requests will be rejected");
            UserTokenVerifier::disabled()
        },
    };
    let access_checker = Arc::new(PlatformAccessChecker::new(platform, tokens));

    let webhook_verifier: Arc<dyn WebhookVerifier> = if config.is_development() {
        warn!("Development mode: webhook signatures are not verified");
        Arc::new(DevelopmentBypassVerifier)
    } else {
        let secret = config
            .platform
            .webhook_secret
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("WHOP_WEBHOOK_SECRET is required outside development"))?;
        Arc::new(HmacSignatureVerifier::new(
            secret,
            config.platform.webhook_tolerance_secs as i64,
        ))
    };

    let notifier = Arc::new(EmailService::new(config.email.clone())?);

    let identity_bypass = config.identity_bypass();
    if let Some(identity) = &identity_bypass {
        warn!(
            "Development identity bypass active: recovery emails go to {}",
            identity.email
        );
    }

    let correlator = RecoveryCorrelator::new(
        ledger.clone(),
        settings_store.clone(),
        identity,
        notifier,
    )
    .with_identity_bypass(identity_bypass);

    info!("Application services initialized");

    Ok(AppState {
        config: Arc::new(config),
        correlator: Arc::new(correlator),
        ledger,
        settings_store,
        access_checker,
        webhook_verifier,
        dispatcher: BackgroundDispatcher::new(),
    })
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", handlers::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
