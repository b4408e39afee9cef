use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Match, Record};

/// SQLite store for the match in progress and the history of finished ones
pub struct MatchStore {
    pool: Pool<Sqlite>,
    history_limit: i64,
}

impl MatchStore {
    /// Create the store over an open pool and initialize its tables
    pub async fn new(pool: Pool<Sqlite>, history_limit: i64) -> Result<Self> {
        let store = Self {
            pool,
            history_limit,
        };
        store.init_schema().await?;

        info!(history_limit, "Match store initialized");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        // Single-row slot for the live snapshot
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS current_match (
                slot INTEGER PRIMARY KEY CHECK (slot = 1),
                match_id TEXT NOT NULL,
                snapshot TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create current_match table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS match_history (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                match_id TEXT NOT NULL UNIQUE,
                team_a TEXT NOT NULL,
                team_b TEXT NOT NULL,
                status TEXT NOT NULL,
                snapshot TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create match_history table")?;

        Ok(())
    }

    /// Overwrite the current-match slot
    pub async fn save_current(&self, m: &Match) -> Result<()> {
        let snapshot = m.to_json().context("Failed to encode match")?;

        sqlx::query(
            r#"
            INSERT INTO current_match (slot, match_id, snapshot, updated_at)
            VALUES (1, ?, ?, ?)
            ON CONFLICT (slot) DO UPDATE SET
                match_id = excluded.match_id,
                snapshot = excluded.snapshot,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(m.id.to_string())
        .bind(snapshot)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save current match")?;

        Ok(())
    }

    /// The saved match, if any. An unreadable snapshot is reported and treated as absent.
    pub async fn load_current(&self) -> Result<Option<Match>> {
        let row = sqlx::query_as::<_, SnapshotRow>("SELECT snapshot FROM current_match WHERE slot = 1")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load current match")?;

        Ok(row.and_then(|r| r.decode()))
    }

    pub async fn clear_current(&self) -> Result<()> {
        sqlx::query("DELETE FROM current_match")
            .execute(&self.pool)
            .await
            .context("Failed to clear current match")?;
        Ok(())
    }

    /// Push a match onto the front of the history, trim the history to its
    /// limit and empty the current-match slot.
    pub async fn save_to_history(&self, m: &Match) -> Result<()> {
        let snapshot = m.to_json().context("Failed to encode match")?;
        let match_id = m.id.to_string();

        let mut tx = self.pool.begin().await?;

        // Re-saving a match moves it back to the front
        sqlx::query("DELETE FROM match_history WHERE match_id = ?")
            .bind(&match_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO match_history (match_id, team_a, team_b, status, snapshot, saved_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&match_id)
        .bind(&m.teams.team_a.name)
        .bind(&m.teams.team_b.name)
        .bind(m.status.as_str())
        .bind(snapshot)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .context("Failed to insert match into history")?;

        let trimmed = sqlx::query(
            r#"
            DELETE FROM match_history
            WHERE seq NOT IN (
                SELECT seq FROM match_history ORDER BY seq DESC LIMIT ?
            )
            "#,
        )
        .bind(self.history_limit)
        .execute(&mut *tx)
        .await
        .context("Failed to trim match history")?
        .rows_affected();

        sqlx::query("DELETE FROM current_match")
            .execute(&mut *tx)
            .await?;

        tx.commit().await.context("Failed to save match to history")?;

        info!(match_id = %m.id, trimmed, "Match saved to history");
        Ok(())
    }

    /// Most recent first
    pub async fn load_history(&self) -> Result<Vec<Match>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            "SELECT snapshot FROM match_history ORDER BY seq DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load match history")?;

        Ok(rows.into_iter().filter_map(|r| r.decode()).collect())
    }

    pub async fn get_from_history(&self, id: Uuid) -> Result<Option<Match>> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            "SELECT snapshot FROM match_history WHERE match_id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch match from history")?;

        Ok(row.and_then(|r| r.decode()))
    }

    /// Returns whether a match was removed
    pub async fn delete_from_history(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM match_history WHERE match_id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete match from history")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_history(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM match_history")
            .execute(&self.pool)
            .await
            .context("Failed to clear match history")?;

        Ok(result.rows_affected())
    }

    pub async fn history_count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM match_history")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count match history")?;

        Ok(row.0)
    }
}

/// Pretty-printed JSON export of a match
pub fn export_json(m: &Match) -> Result<String> {
    let value = m.encode().context("Failed to encode match")?;
    serde_json::to_string_pretty(&value).context("Failed to format match JSON")
}

/// Database row representation
#[derive(sqlx::FromRow)]
struct SnapshotRow {
    snapshot: String,
}

impl SnapshotRow {
    fn decode(self) -> Option<Match> {
        match Match::from_json(&self.snapshot) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!("Skipping unreadable match snapshot: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect;

    async fn store(limit: i64) -> MatchStore {
        let pool = connect("sqlite::memory:").await.unwrap();
        MatchStore::new(pool, limit).await.unwrap()
    }

    fn named(a: &str, b: &str) -> Match {
        let mut m = Match::new();
        m.set_team_names(a, b).unwrap();
        m
    }

    #[tokio::test]
    async fn test_current_slot_roundtrip() {
        let store = store(100).await;
        assert!(store.load_current().await.unwrap().is_none());

        let first = named("Lions", "Tigers");
        store.save_current(&first).await.unwrap();
        let second = named("Hawks", "Eagles");
        store.save_current(&second).await.unwrap();

        let loaded = store.load_current().await.unwrap().unwrap();
        assert_eq!(loaded, second);

        store.clear_current().await.unwrap();
        assert!(store.load_current().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_is_most_recent_first_and_capped() {
        let store = store(2).await;
        let matches: Vec<Match> = ["One", "Two", "Three"]
            .iter()
            .map(|name| named(name, "Rest"))
            .collect();

        store.save_current(&matches[2]).await.unwrap();
        for m in &matches {
            store.save_to_history(m).await.unwrap();
        }

        let history = store.load_history().await.unwrap();
        let names: Vec<&str> = history.iter().map(|m| m.teams.team_a.name.as_str()).collect();
        assert_eq!(names, vec!["Three", "Two"]);
        assert_eq!(store.history_count().await.unwrap(), 2);
        assert!(store.load_current().await.unwrap().is_none());

        assert!(store.get_from_history(matches[0].id).await.unwrap().is_none());
        let found = store.get_from_history(matches[1].id).await.unwrap().unwrap();
        assert_eq!(found.teams.team_a.name, "Two");
    }

    #[tokio::test]
    async fn test_resaving_moves_to_front() {
        let store = store(10).await;
        let a = named("Alpha", "X");
        let b = named("Beta", "Y");
        store.save_to_history(&a).await.unwrap();
        store.save_to_history(&b).await.unwrap();
        store.save_to_history(&a).await.unwrap();

        let history = store.load_history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, a.id);
    }

    #[tokio::test]
    async fn test_delete_and_clear_history() {
        let store = store(10).await;
        let a = named("Alpha", "X");
        let b = named("Beta", "Y");
        store.save_to_history(&a).await.unwrap();
        store.save_to_history(&b).await.unwrap();

        assert!(store.delete_from_history(a.id).await.unwrap());
        assert!(!store.delete_from_history(a.id).await.unwrap());
        assert_eq!(store.clear_history().await.unwrap(), 1);
        assert!(store.load_history().await.unwrap().is_empty());
    }

    #[test]
    fn test_export_json_is_pretty() {
        let m = named("Lions", "Tigers");
        let json = export_json(&m).unwrap();
        assert!(json.contains("\n  \"id\""));
        assert_eq!(Match::from_json(&json).unwrap(), m);
    }
}
