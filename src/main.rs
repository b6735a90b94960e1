use session_gate::{
    build_router, cors_layer, AppState, AuthConfig, InMemoryUserRepository,
    PostgresUserRepository, UserRepository,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_gate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting session auth server");

    // Environment is read once here and nowhere else
    let config = AuthConfig::from_env()?;
    info!(?config, "Configuration loaded");

    let user_repository: Arc<dyn UserRepository + Send + Sync> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await.map_err(|e| {
                warn!(error = %e, "Could not connect to database");
                e
            })?;
            let repository = PostgresUserRepository::new(pool);
            repository.ensure_schema().await?;
            info!("Connected to PostgreSQL user store");
            Arc::new(repository)
        }
        None => {
            warn!("DATABASE_URL not set, users are kept in memory only");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let app_state = AppState::new(&config, user_repository)?;
    let app = build_router(app_state).layer(cors_layer(&config)?);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on http://localhost:{}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
