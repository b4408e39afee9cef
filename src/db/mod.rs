pub mod matches;
pub mod players;

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::info;

pub use matches::MatchStore;
pub use players::PlayerNameStore;

/// Open (creating if needed) the SQLite database shared by every store.
pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>> {
    // Create data directory if needed
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .context("Invalid database URL")?
        .create_if_missing(true);

    // Each in-memory connection is its own database, so keep exactly one alive.
    let in_memory = database_url.contains(":memory:");
    let pool = if in_memory {
        SqlitePoolOptions::new().max_connections(1)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    }
    .connect_with(options)
    .await
    .context("Failed to connect to database")?;

    info!(database_url, "Database connected");
    Ok(pool)
}
