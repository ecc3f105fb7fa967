//! Connection pools, embedded migrations and database bootstrap.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/momentum-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Tables owned by the schema, parents before children.
pub const TABLES: [&str; 5] = [
    "goals",
    "roadmap_steps",
    "tasks",
    "daily_schedules",
    "daily_reviews",
];

/// Upper bound on pooled connections. Schedule generation holds one
/// connection per in-flight claim transaction.
const MAX_CONNECTIONS: u32 = 8;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(url)
        .await
        .with_context(|| format!("failed to connect to database at {url}"))
}

/// Open the application pool for `config`.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    connect(&config.database_url, MAX_CONNECTIONS).await
}

/// Apply pending embedded migrations. Already-applied ones are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    info!(known = MIGRATOR.iter().count(), "schema is up to date");
    Ok(())
}

/// Create the database named in `config` when the server does not have it.
///
/// Returns `true` when the database was created by this call.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<bool> {
    let name = config
        .database_name()
        .context("database URL does not name a database")?;

    let admin = connect(&config.maintenance_url(), 1).await?;
    let result = create_if_missing(&admin, name).await;
    admin.close().await;

    let created = result?;
    if created {
        info!(db = name, "database created");
    } else {
        info!(db = name, "database already exists");
    }
    Ok(created)
}

async fn create_if_missing(admin: &PgPool, name: &str) -> Result<bool> {
    let present: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(admin)
            .await
            .context("failed to look up database")?;
    if present {
        return Ok(false);
    }

    // Utility statements take no bind parameters.
    let stmt = format!("CREATE DATABASE {}", quote_ident(name));
    admin
        .execute(stmt.as_str())
        .await
        .with_context(|| format!("failed to create database {name}"))?;
    Ok(true)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Row count of every table in [`TABLES`], in that order.
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(&'static str, i64)>> {
    let counts: (i64, i64, i64, i64, i64) = sqlx::query_as(
        "SELECT \
             (SELECT COUNT(*) FROM goals), \
             (SELECT COUNT(*) FROM roadmap_steps), \
             (SELECT COUNT(*) FROM tasks), \
             (SELECT COUNT(*) FROM daily_schedules), \
             (SELECT COUNT(*) FROM daily_reviews)",
    )
    .fetch_one(pool)
    .await
    .context("failed to count table rows")?;

    let (goals, steps, tasks, schedules, reviews) = counts;
    Ok(TABLES
        .into_iter()
        .zip([goals, steps, tasks, schedules, reviews])
        .collect())
}
