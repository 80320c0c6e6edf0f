use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;

use config::Config;
use features::{scoring_systems, series};

#[derive(OpenApi)]
#[openapi(
    paths(
        features::series::handlers::list_series,
        features::series::handlers::get_series_results,
        features::series::handlers::recompute_series_results,
        features::series::handlers::what_if,
        features::scoring_systems::handlers::list_scoring_systems,
        features::scoring_systems::handlers::get_scoring_system,
        features::scoring_systems::handlers::get_effective_codes,
    ),
    components(
        schemas(
            storage::dto::series::SeriesResponse,
            storage::dto::results::SeriesResultsResponse,
            storage::dto::results::SeriesInfo,
            storage::dto::results::RaceColumn,
            storage::dto::results::StandingRow,
            storage::dto::results::CompetitorInfo,
            storage::dto::results::ScoreCell,
            storage::dto::scoring_system::ScoringSystemResponse,
            storage::dto::scoring_system::EffectiveCodeResponse,
            storage::dto::what_if::WhatIfRequest,
        )
    ),
    tags(
        (name = "series", description = "Series standings, recomputation and what-if runs"),
        (name = "scoring-systems", description = "Scoring system inspection"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting series scoring API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let app = Router::new()
        .nest("/api/series", series::routes::routes())
        .nest("/api/scoring-systems", scoring_systems::routes::routes())
        .with_state(db)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .context("Failed to bind server address")?;
    axum::serve(listener, app).await?;

    Ok(())
}
