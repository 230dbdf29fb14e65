//! Conduit server entry point

use adapters::{AdapterConfig, AdapterRegistry};
use bus_core::ConfigStore;
use conduit_server::config::ServerConfig;
use conduit_server::db::PgStore;
use conduit_server::handlers::AppState;
use routing::{MessageRouter, Orchestrator};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    info!("starting Conduit server");

    let config = ServerConfig::from_env();

    info!("connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(50)
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store: Arc<dyn ConfigStore> = Arc::new(PgStore::new(pool));

    let registry = Arc::new(AdapterRegistry::new(AdapterConfig {
        request_timeout_seconds: config.request_timeout_seconds,
        amqp_url: config.amqp_url.clone(),
    })?);

    let router = Arc::new(MessageRouter::new(store.clone(), registry));
    let orchestrator = Arc::new(Orchestrator::new(router.clone(), store.clone()));

    let state = AppState {
        store,
        router,
        orchestrator,
    };

    let app = conduit_server::app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);
    info!("  POST /api/v1/messages/process/{{thread_id}}");
    info!("  POST /api/v1/orchestrate/{{process_name}}");
    info!("  POST /api/v1/webhooks/stripe");
    info!("  GET  /health");
    info!("  GET  /metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server exited gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
