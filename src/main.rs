use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use batepapo::{
    api::{create_router, AppState},
    chat::PresenceSweeper,
    config::Config,
    error::AppError,
    storage::{SqliteStorage, Storage},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,batepapo=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting batepapo server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    // Setup database with proper connection pooling
    let db = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    tracing::info!("✅ Database connected: {}", config.database_url);

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

    tracing::info!("✅ Database migrations completed");

    let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::new(db));

    // Create shared application state
    let state = AppState {
        storage: storage.clone(),
        config: config.clone(),
    };

    // Spawn background task for stale-participant eviction
    {
        let sweeper = PresenceSweeper::new(
            storage.clone(),
            Duration::from_secs(config.stale_after_secs),
        );
        let period = Duration::from_secs(config.sweep_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match sweeper.sweep().await {
                    Ok(0) => tracing::debug!("🧹 Presence sweep: nobody stale"),
                    Ok(evicted) => {
                        tracing::info!("🧹 Presence sweep: {} participant(s) evicted", evicted)
                    }
                    Err(e) => tracing::error!("❌ Presence sweep failed: {}", e),
                }
            }
        });
        tracing::info!(
            "✅ Presence sweeper started (every {}s, stale after {}s)",
            config.sweep_interval_secs,
            config.stale_after_secs
        );
    }

    // Build router
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check: http://{}/health", addr);
    tracing::info!("");
    tracing::info!("📚 API Endpoints:");
    tracing::info!("  POST   /participants  - Join the room");
    tracing::info!("  GET    /participants  - List active participants");
    tracing::info!("  POST   /status        - Liveness ping (User header)");
    tracing::info!("  POST   /messages      - Send a message (User header)");
    tracing::info!("  GET    /messages      - Fetch visible messages (User header)");
    tracing::info!("  DELETE /messages/{{id}} - Delete own message");
    tracing::info!("  PUT    /messages/{{id}} - Edit own message");
    tracing::info!("");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
