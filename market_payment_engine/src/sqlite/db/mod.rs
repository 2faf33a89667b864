//! # SQLite database methods
//!
//! Low-level SQLite interactions, kept as simple functions that accept a `&mut SqliteConnection`
//! argument. Callers can obtain a connection from a pool, or open a transaction and pass
//! `&mut *tx` when several of these calls must commit together — the callback path relies on
//! exactly that to keep the order/payment pair consistent.

use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod orders;
pub mod payments;

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
