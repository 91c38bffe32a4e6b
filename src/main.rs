use std::sync::Arc;

use ai_trainer::api::{create_routes, AppServices};
use ai_trainer::auth::JwtService;
use ai_trainer::config::{run_migrations, AiConfig, AppConfig, DatabaseConfig};
use ai_trainer::services::GeminiPlanGenerator;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.log_level)),
        )
        .init();

    let db_config = DatabaseConfig::from_env()?;
    let ai_config = AiConfig::from_env()?;

    info!(database = %db_config.redacted_url(), "Connecting to database");
    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    let generator = GeminiPlanGenerator::new(&ai_config)?;
    info!(model = %ai_config.model, "Plan generator configured");

    let jwt_service = JwtService::new(&app_config.jwt_secret, &app_config.jwt_audience);
    let app = create_routes(AppServices::postgres(pool, Arc::new(generator)), jwt_service);

    let address = app_config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!(environment = %app_config.environment, "AI trainer server starting on http://{}", address);
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
