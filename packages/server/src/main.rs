use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::database::init_db;
use server::seed::{ensure_indexes, seed_role_permissions};
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to the database")?;
    seed_role_permissions(&db)
        .await
        .context("Failed to seed roles")?;
    ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        ranking_policy = ?config.results.ranking_policy,
        missing_scores = ?config.results.missing_scores,
        "Server running at http://{}",
        addr
    );

    let app = server::build_router(AppState { db, config });
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
