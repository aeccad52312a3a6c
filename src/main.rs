use std::time::Duration;

use payment_recovery::{
    app_config::AppConfig,
    app_router,
    db::{create_diesel_pool, mask_connection_string, DieselDatabaseConfig},
    initialize_app_state, migrations,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payment_recovery=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        },
    };

    info!(
        "Starting payment recovery service on {} ({})",
        config.server.bind_address, config.server.environment
    );

    if config.has_inert_bypass_flag() {
        warn!(
            "DEV_MODE_BYPASS_WHOP_API is set but ENVIRONMENT is {}; the flag is ignored",
            config.server.environment
        );
    }

    info!(
        "Database URL: {}",
        mask_connection_string(&config.database.url)
    );

    if migrations::should_run_migrations(&config) {
        migrations::run_all_migrations(&config)
            .await
            .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    } else {
        info!("[MIGRATIONS] Embedded migrations disabled");
    }

    let pool = create_diesel_pool(DieselDatabaseConfig::from(&config.database))
        .await
        .map_err(|e| anyhow::anyhow!("Database initialization failed: {}", e))?;
    info!("Database connection pool initialized successfully");

    let bind_address = config.server.bind_address.clone();
    let state = initialize_app_state(config, pool)?;
    let dispatcher = state.dispatcher.clone();

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    dispatcher.shutdown(SHUTDOWN_DRAIN_TIMEOUT).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining requests");
}
