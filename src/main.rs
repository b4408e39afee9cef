use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cricket_scorer::config::Config;
use cricket_scorer::db::{self, MatchStore, PlayerNameStore};
use cricket_scorer::models::{Match, MatchStatus};
use cricket_scorer::scorecard::{encode_match, render_status, share_link};
use cricket_scorer::script::{apply, Instruction, Script};
use cricket_scorer::workers::AutosaveWorker;

/// The scorer's view of one session: the current snapshot and where to send it
struct Session {
    config: Config,
    state: Option<Match>,
    snapshot_tx: mpsc::Sender<Option<Match>>,
}

impl Session {
    async fn step(&mut self, line: usize, instruction: Instruction) {
        let instruction = match instruction {
            Instruction::New(None) => Instruction::New(Some(self.config.match_defaults())),
            other => other,
        };

        let was_completed = self
            .state
            .as_ref()
            .is_some_and(|m| m.status == MatchStatus::Completed);

        let next = match apply(self.state.clone(), &instruction) {
            Ok(next) => next,
            Err(e) => {
                warn!(line, "Rejected: {}", e);
                return;
            }
        };
        self.state = next;

        match &self.state {
            Some(m) => {
                println!("{}", render_status(m));
                if m.status == MatchStatus::Completed && !was_completed {
                    self.print_share_link(m);
                }
            }
            None => println!("Match cleared"),
        }

        if self.snapshot_tx.send(self.state.clone()).await.is_err() {
            error!("Autosave channel closed");
        }
    }

    fn print_share_link(&self, m: &Match) {
        match encode_match(m) {
            Ok(payload) => println!("Share: {}", share_link(&self.config.share_base_url, &payload)),
            Err(e) => warn!("Could not build share link: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cricket_scorer=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cricket-scorer");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    // Initialize database
    let pool = db::connect(&config.database_url).await?;
    let match_store = Arc::new(MatchStore::new(pool.clone(), config.history_limit).await?);
    let player_store = Arc::new(PlayerNameStore::new(pool).await?);

    // Resume whatever was being scored last time
    let state = match_store.load_current().await?;
    match &state {
        Some(m) => info!(
            "Resuming {} vs {} ({})",
            m.teams.team_a.name, m.teams.team_b.name, m.status
        ),
        None => info!("No match in progress"),
    }

    let (snapshot_tx, snapshot_rx) = mpsc::channel(100);
    let autosave = AutosaveWorker::new(Arc::clone(&match_store), player_store, snapshot_rx);
    let autosave_handle = tokio::spawn(autosave.run());

    let mut session = Session {
        config,
        state,
        snapshot_tx,
    };

    match env::args().nth(1) {
        Some(path) => {
            let source = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read script {path}"))?;
            let script = Script::parse(&source)?;
            info!("Replaying {} steps from {}", script.steps.len(), path);
            for step in script.steps {
                session.step(step.line, step.instruction).await;
            }
        }
        None => {
            info!("Reading instructions from stdin");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut line_no = 0;
            while let Some(raw) = lines.next_line().await.context("stdin read error")? {
                line_no += 1;
                match Instruction::parse(&raw) {
                    Ok(Some(instruction)) => session.step(line_no, instruction).await,
                    Ok(None) => {}
                    Err(message) => warn!(line = line_no, "{}", message),
                }
            }
        }
    }

    // Let the worker drain before exiting
    drop(session);
    if let Err(e) = autosave_handle.await {
        error!("Autosave worker failed: {:?}", e);
    }

    info!("Shutting down cricket-scorer");
    Ok(())
}
