use serde::{Deserialize, Serialize};

use crate::models::{Ball, ConfigPatch, DismissalKind, Match, MatchConfig, PlayerId, TeamSlot, TossDecision};

/// Every state change a host can request. Serialized as `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    CreateMatch {
        #[serde(default)]
        config: Option<MatchConfig>,
    },

    /// Resume a stored snapshot
    LoadMatch(Box<Match>),

    Configure(ConfigPatch),

    #[serde(rename_all = "camelCase")]
    SetTeams {
        team_a_name: String,
        team_b_name: String,
        #[serde(default)]
        team_a_players: Vec<String>,
        #[serde(default)]
        team_b_players: Vec<String>,
    },

    SetToss {
        winner: TeamSlot,
        decision: TossDecision,
    },

    #[serde(rename_all = "camelCase")]
    StartMatch {
        striker_id: PlayerId,
        non_striker_id: PlayerId,
        bowler_id: PlayerId,
    },

    AddBall(Ball),

    UndoLastBall,

    /// Mid-over new-batter flow: dismiss the striker and send in a replacement
    #[serde(rename_all = "camelCase")]
    AddWicket {
        dismissal_kind: DismissalKind,
        bowler_id: PlayerId,
        #[serde(default)]
        fielder_id: Option<PlayerId>,
        new_batter_id: PlayerId,
    },

    #[serde(rename_all = "camelCase")]
    CompleteOver { new_bowler_id: PlayerId },

    #[serde(rename_all = "camelCase")]
    StartSecondInnings {
        striker_id: PlayerId,
        non_striker_id: PlayerId,
        bowler_id: PlayerId,
    },

    CompleteMatch,

    #[serde(rename_all = "camelCase")]
    SetNewBatter { player_id: PlayerId },

    SwapBatsmen,

    #[serde(rename_all = "camelCase")]
    EditPlayerName {
        team: TeamSlot,
        player_id: PlayerId,
        new_name: String,
    },

    AddPlayer { team: TeamSlot, name: String },

    #[serde(rename_all = "camelCase")]
    RemovePlayer { team: TeamSlot, player_id: PlayerId },

    ClearMatch,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateMatch { .. } => "create match",
            Command::LoadMatch(_) => "load match",
            Command::Configure(_) => "configure",
            Command::SetTeams { .. } => "set teams",
            Command::SetToss { .. } => "set toss",
            Command::StartMatch { .. } => "start match",
            Command::AddBall(_) => "add ball",
            Command::UndoLastBall => "undo last ball",
            Command::AddWicket { .. } => "add wicket",
            Command::CompleteOver { .. } => "complete over",
            Command::StartSecondInnings { .. } => "start second innings",
            Command::CompleteMatch => "complete match",
            Command::SetNewBatter { .. } => "set new batter",
            Command::SwapBatsmen => "swap batsmen",
            Command::EditPlayerName { .. } => "edit player name",
            Command::AddPlayer { .. } => "add player",
            Command::RemovePlayer { .. } => "remove player",
            Command::ClearMatch => "clear match",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
