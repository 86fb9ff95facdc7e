use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinic::api::app;
use clinic::config::Config;
use clinic::repository::{PatientRepository, SharedPatientStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic=debug,medical_clinic=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting medical clinic on {}", config.server_addr());

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");

    let store: SharedPatientStore = Arc::new(PatientRepository::new(pool));
    let app = app(store);

    let listener = tokio::net::TcpListener::bind(&config.server_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr()))?;
    tracing::info!("Listening on {}", config.server_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
