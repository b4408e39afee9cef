use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

use crate::models::Match;

/// Names seen in previous matches, kept for autocompletion
pub struct PlayerNameStore {
    pool: Pool<Sqlite>,
}

impl PlayerNameStore {
    pub async fn new(pool: Pool<Sqlite>) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS player_names (
                name TEXT PRIMARY KEY,
                first_seen TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .context("Failed to create player_names table")?;

        info!("Player name store initialized");
        Ok(Self { pool })
    }

    /// Add names not already known. Returns how many were new.
    pub async fn save_player_names<S: AsRef<str>>(&self, names: &[S]) -> Result<u64> {
        let now = Utc::now().to_rfc3339();
        let mut added = 0;

        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            added += sqlx::query("INSERT OR IGNORE INTO player_names (name, first_seen) VALUES (?, ?)")
                .bind(name)
                .bind(&now)
                .execute(&self.pool)
                .await
                .context("Failed to save player name")?
                .rows_affected();
        }

        debug!(added, "Player names saved");
        Ok(added)
    }

    /// Every roster name from both teams of a match
    pub async fn remember_match(&self, m: &Match) -> Result<u64> {
        let names: Vec<&str> = m
            .teams
            .team_a
            .players
            .iter()
            .chain(&m.teams.team_b.players)
            .map(|p| p.name.as_str())
            .collect();
        self.save_player_names(&names).await
    }

    /// In the order they were first saved
    pub async fn load_player_names(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM player_names ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .context("Failed to load player names")?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect;

    #[tokio::test]
    async fn test_names_are_deduplicated() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let store = PlayerNameStore::new(pool).await.unwrap();

        assert_eq!(store.save_player_names(&["Kohli", "Rohit"]).await.unwrap(), 2);
        assert_eq!(store.save_player_names(&["Rohit", " ", "Bumrah "]).await.unwrap(), 1);

        assert_eq!(
            store.load_player_names().await.unwrap(),
            vec!["Kohli", "Rohit", "Bumrah"]
        );
    }

    #[tokio::test]
    async fn test_remember_match_rosters() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let store = PlayerNameStore::new(pool).await.unwrap();

        let mut m = Match::new();
        m.teams.team_a.add_player("Ann");
        m.teams.team_b.add_player("Dee");
        m.teams.team_b.add_player("Ann");

        assert_eq!(store.remember_match(&m).await.unwrap(), 2);
        assert_eq!(store.load_player_names().await.unwrap(), vec!["Ann", "Dee"]);
    }
}
