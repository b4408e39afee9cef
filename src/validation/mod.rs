//! Input checks performed before anything reaches the scoring core.
//!
//! The reducer assumes well-formed payloads; hosts run these first.

mod rules;
mod setup;

pub use rules::{
    normalize_name, validate_no_duplicate_players, validate_overs, validate_player_name,
    validate_runs, validate_team_name, validate_team_size, MAX_OVERS, MAX_PLAYERS, MIN_PLAYERS,
};
pub use setup::{
    validate_both_teams, validate_match_config, validate_new_bowler, validate_opening_players,
    validate_team_setup, validate_wicket,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be less than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("overs must be between 1 and 50, got {0}")]
    OversOutOfRange(u32),

    #[error("team must have between 2 and 15 players, got {0}")]
    TeamSizeOutOfRange(usize),

    #[error("runs cannot exceed 6, got {0}")]
    RunsOutOfRange(u32),

    #[error("duplicate player name: {0}")]
    DuplicatePlayer(String),

    #[error("team names must be different")]
    DuplicateTeamNames,

    #[error("striker and non-striker must be different players")]
    SameBatters,

    #[error("invalid {role} selected")]
    NotInTeam { role: &'static str },

    #[error("bowler cannot bowl consecutive overs")]
    ConsecutiveOvers,

    #[error("no more batters available")]
    NoBattersAvailable,
}
