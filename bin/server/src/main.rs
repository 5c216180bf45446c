use nexus_ai::{GeminiBackend, ModelDispatcher};
use nexus_conversation::InMemorySessionManager;
use nexus_platform_access::IdentityToolkitClient;
use nexus_records::{InMemoryRecordStore, PgRecordStore, RecordAccess, RecordStore};
use nexus_server::{app, config::ServerConfig, state::AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env()?;
    tracing::info!("Loaded configuration");

    let records: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database and running migrations...");
            let store = PgRecordStore::connect(url)
                .await
                .map_err(|e| format!("failed to open record store: {e}"))?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; keys and presentations are kept in memory");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    let backend = GeminiBackend::new(config.inference.client_config())
        .map_err(|e| format!("failed to create inference client: {e}"))?;
    let dispatcher = ModelDispatcher::with_models(Arc::new(backend), config.inference.models());

    let identity = IdentityToolkitClient::new(config.identity)
        .map_err(|e| format!("failed to create identity client: {e}"))?;

    let app_state = Arc::new(AppState::new(
        dispatcher,
        Arc::new(InMemorySessionManager::with_session_limit(
            config.max_sessions_per_user,
        )),
        RecordAccess::new(records),
        Arc::new(identity),
    ));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app::router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
