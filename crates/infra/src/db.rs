//! PostgreSQL connection and schema bootstrap.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use crate::repository::StoreError;

/// Default upper bound on pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id            BIGSERIAL PRIMARY KEY,
        name          TEXT NOT NULL,
        phone         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL,
        updated_at    TIMESTAMPTZ NOT NULL,
        UNIQUE (name, phone)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS crafts (
        id          BIGSERIAL PRIMARY KEY,
        title       TEXT NOT NULL,
        description TEXT NULL,
        price       BIGINT NOT NULL CHECK (price >= 0),
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id          BIGSERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT NULL,
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Open a connection pool.
#[instrument(skip(url), err)]
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to connect to database: {e}")))
}

/// Create the tables if they do not exist yet. Idempotent.
#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| StoreError::Backend(format!("schema bootstrap failed: {e}")))?;
    }
    tracing::info!(tables = SCHEMA.len(), "database schema ready");
    Ok(())
}
