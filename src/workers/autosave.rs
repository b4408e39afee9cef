use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::db::{MatchStore, PlayerNameStore};
use crate::models::{Match, MatchStatus};

/// Worker that persists every snapshot the scorer produces.
///
/// `None` means the match was cleared. Snapshots arrive only after the command
/// that produced them has returned, so a failed store never affects scoring.
pub struct AutosaveWorker {
    match_store: Arc<MatchStore>,
    player_store: Arc<PlayerNameStore>,
    snapshot_rx: mpsc::Receiver<Option<Match>>,
}

impl AutosaveWorker {
    pub fn new(
        match_store: Arc<MatchStore>,
        player_store: Arc<PlayerNameStore>,
        snapshot_rx: mpsc::Receiver<Option<Match>>,
    ) -> Self {
        Self {
            match_store,
            player_store,
            snapshot_rx,
        }
    }

    /// Run until every sender is dropped
    pub async fn run(mut self) {
        info!("Autosave started");

        while let Some(snapshot) = self.snapshot_rx.recv().await {
            self.persist(snapshot).await;
        }

        info!("Autosave channel closed");
    }

    async fn persist(&self, snapshot: Option<Match>) {
        let Some(m) = snapshot else {
            if let Err(e) = self.match_store.clear_current().await {
                error!("Failed to clear current match: {:#}", e);
            }
            return;
        };

        if m.status != MatchStatus::Completed {
            if let Err(e) = self.match_store.save_current(&m).await {
                error!("Failed to autosave match {}: {:#}", m.id, e);
            }
            return;
        }

        match self.match_store.save_to_history(&m).await {
            Ok(()) => {
                let margin = m.result.as_ref().map(|r| r.margin.as_str()).unwrap_or_default();
                info!(
                    "Archived | {} vs {} | {}",
                    m.teams.team_a.name, m.teams.team_b.name, margin
                );
            }
            Err(e) => {
                error!("Failed to archive match {}: {:#}", m.id, e);
                return;
            }
        }

        if let Err(e) = self.player_store.remember_match(&m).await {
            warn!("Failed to remember player names: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect;

    async fn stores() -> (Arc<MatchStore>, Arc<PlayerNameStore>) {
        let pool = connect("sqlite::memory:").await.unwrap();
        let matches = MatchStore::new(pool.clone(), 100).await.unwrap();
        let players = PlayerNameStore::new(pool).await.unwrap();
        (Arc::new(matches), Arc::new(players))
    }

    async fn drain(
        matches: &Arc<MatchStore>,
        players: &Arc<PlayerNameStore>,
        snapshots: Vec<Option<Match>>,
    ) {
        let (tx, rx) = mpsc::channel(8);
        let worker = AutosaveWorker::new(Arc::clone(matches), Arc::clone(players), rx);
        let handle = tokio::spawn(worker.run());
        for snapshot in snapshots {
            tx.send(snapshot).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_live_snapshots_overwrite_current() {
        let (matches, players) = stores().await;
        let first = Match::new();
        let mut second = first.clone();
        second.teams.team_a.add_player("Ann");

        drain(&matches, &players, vec![Some(first), Some(second.clone())]).await;

        assert_eq!(matches.load_current().await.unwrap(), Some(second));
        assert_eq!(matches.history_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_completed_match_is_archived() {
        let (matches, players) = stores().await;
        let mut m = Match::new();
        m.teams.team_a.add_player("Ann");
        m.teams.team_b.add_player("Dee");
        let live = m.clone();
        m.status = MatchStatus::Completed;

        drain(&matches, &players, vec![Some(live), Some(m.clone())]).await;

        assert!(matches.load_current().await.unwrap().is_none());
        let archived = matches.get_from_history(m.id).await.unwrap().unwrap();
        assert_eq!(archived.status, MatchStatus::Completed);
        assert_eq!(players.load_player_names().await.unwrap(), vec!["Ann", "Dee"]);
    }

    #[tokio::test]
    async fn test_cleared_match_empties_slot() {
        let (matches, players) = stores().await;
        drain(&matches, &players, vec![Some(Match::new()), None]).await;
        assert!(matches.load_current().await.unwrap().is_none());
    }
}
