//! Database configuration and connection pool initialization.
//!
//! The connection string is read from `DATABASE_URL`, the pool size from
//! `DATABASE_MAX_CONNECTIONS` (default 10).
//!
//! # Panics
//!
//! [`init_db_pool`] panics when `DATABASE_URL` is unset or the database is
//! unreachable; this runs once at startup where failing fast is the right
//! behavior.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

/// Initializes the PostgreSQL connection pool shared across request handlers.
///
/// The returned [`PgPool`] is cheaply cloneable; call this once at startup
/// and hand it to the application state.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
