use message_relay_service::{
    config::Config, db, error::AppError, migrations, routes,
    services::archive::PgMessageArchive, state::AppState, websocket::PresenceRegistry,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "message_relay_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::init_pool(&config.database_url)
        .await
        .map_err(|e| AppError::StartServer(format!("db: {e}")))?;

    // Schema must be in sync before the first append; treat failure as fatal
    migrations::run_all(&db)
        .await
        .map_err(|e| AppError::StartServer(format!("database migrations failed: {e}")))?;

    let archive = PgMessageArchive::new(db, Duration::from_millis(config.archive_timeout_ms));
    let registry = PresenceRegistry::new();

    let state = AppState {
        config: config.clone(),
        registry,
        archive: Arc::new(archive),
    };

    let router = routes::build_router(&config).with_state(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%bind_addr, "starting message-relay-service");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::StartServer(e.to_string()))?;
    axum::serve(listener, router)
        .await
        .map_err(|e| AppError::StartServer(e.to_string()))?;

    Ok(())
}
