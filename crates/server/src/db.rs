use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Create a PostgreSQL connection pool and run migrations.
pub async fn init_pg_pool(config: &upkeep_core::config::PostgresConfig) -> anyhow::Result<PgPool> {
    if !config.is_configured() {
        anyhow::bail!("PostgreSQL not configured: set DATABASE_URL or PG_HOST/PG_USERNAME");
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await
        .with_context(|| format!("failed to connect to PostgreSQL at {}", config.host))?;
    info!(host = %config.host, database = %config.database, "PostgreSQL connected");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("Database migrations applied successfully");

    Ok(pool)
}

/// Cheap liveness probe for `/health`.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
