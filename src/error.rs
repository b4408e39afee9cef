use thiserror::Error;

use crate::models::{MatchStatus, PlayerId, TeamSlot};

/// Precondition violations raised by the scoring core.
///
/// A failed command never produces a new snapshot; the caller keeps the one it had.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("no active match")]
    NoActiveMatch,

    #[error("{command} is not allowed while the match is {status}")]
    InvalidStatus {
        command: &'static str,
        status: MatchStatus,
    },

    #[error("no over in progress; start a new over first")]
    NoOverInProgress,

    #[error("over {number} is already in progress")]
    OverAlreadyInProgress { number: u32 },

    #[error("no deliveries to undo")]
    NothingToUndo,

    #[error("toss has not been recorded")]
    TossNotRecorded,

    #[error("no innings in progress")]
    InningsNotStarted,

    #[error("match cannot be completed without both innings")]
    MissingInnings,

    #[error("player {id} not found in {team}")]
    PlayerNotFound { id: PlayerId, team: TeamSlot },

    #[error("player {id} is already out")]
    BatterDismissed { id: PlayerId },

    #[error("\"{name}\" already exists in {team}")]
    DuplicatePlayerName { name: String, team: String },

    #[error("invalid delivery: {0}")]
    InvalidDelivery(String),
}
