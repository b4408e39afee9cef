use std::env;

use anyhow::{Context, Result};

use crate::models::{MatchConfig, MatchType, DEFAULT_PLAYERS_PER_TEAM, DEFAULT_TOTAL_OVERS};
use crate::validation::validate_match_config;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path
    pub database_url: String,

    /// Completed matches kept in history
    pub history_limit: i64,

    /// Overs for a match created without explicit settings
    pub default_total_overs: u32,

    /// Squad size for a match created without explicit settings
    pub default_players_per_team: u32,

    /// Base URL share links are built on
    pub share_base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/scorer.db".to_string()),

            history_limit: env::var("HISTORY_LIMIT")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("HISTORY_LIMIT must be a valid number")?,

            default_total_overs: env::var("DEFAULT_TOTAL_OVERS")
                .unwrap_or_else(|_| DEFAULT_TOTAL_OVERS.to_string())
                .parse()
                .context("DEFAULT_TOTAL_OVERS must be a valid number")?,

            default_players_per_team: env::var("DEFAULT_PLAYERS_PER_TEAM")
                .unwrap_or_else(|_| DEFAULT_PLAYERS_PER_TEAM.to_string())
                .parse()
                .context("DEFAULT_PLAYERS_PER_TEAM must be a valid number")?,

            share_base_url: env::var("SHARE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        };

        validate_match_config(&config.match_defaults())
            .context("Invalid default match settings")?;

        Ok(config)
    }

    /// Settings applied to a new match when the scorer gives none
    pub fn match_defaults(&self) -> MatchConfig {
        MatchConfig {
            total_overs: self.default_total_overs,
            players_per_team: self.default_players_per_team,
            match_type: MatchType::Limited,
        }
    }
}
