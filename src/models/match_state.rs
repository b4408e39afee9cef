use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{Innings, PlayerId, Record, Team, TeamSlot};
use crate::error::ScoringError;

pub const DEFAULT_TOTAL_OVERS: u32 = 10;
pub const DEFAULT_PLAYERS_PER_TEAM: u32 = 11;

/// Lifecycle: setup -> live -> innings-break -> live -> completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStatus {
    Setup,
    Live,
    InningsBreak,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Setup => "setup",
            MatchStatus::Live => "live",
            MatchStatus::InningsBreak => "innings-break",
            MatchStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Innings end when the configured overs are bowled
    Limited,
    /// Innings end only on all-out or a successful chase
    Unlimited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    pub total_overs: u32,
    pub players_per_team: u32,
    pub match_type: MatchType,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            total_overs: DEFAULT_TOTAL_OVERS,
            players_per_team: DEFAULT_PLAYERS_PER_TEAM,
            match_type: MatchType::Limited,
        }
    }
}

/// Partial configuration merged over the current one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default)]
    pub total_overs: Option<u32>,
    #[serde(default)]
    pub players_per_team: Option<u32>,
    #[serde(default)]
    pub match_type: Option<MatchType>,
}

impl MatchConfig {
    pub fn merge(&mut self, patch: &ConfigPatch) {
        if let Some(overs) = patch.total_overs {
            self.total_overs = overs;
        }
        if let Some(players) = patch.players_per_team {
            self.players_per_team = players;
        }
        if let Some(match_type) = patch.match_type {
            self.match_type = match_type;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Bowl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toss {
    pub winner: TeamSlot,
    pub decision: TossDecision,
}

impl Toss {
    /// The slot that bats first
    pub fn batting_first(&self) -> TeamSlot {
        match self.decision {
            TossDecision::Bat => self.winner,
            TossDecision::Bowl => self.winner.opponent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teams {
    pub team_a: Team,
    pub team_b: Team,
}

impl Teams {
    pub fn get(&self, slot: TeamSlot) -> &Team {
        match slot {
            TeamSlot::TeamA => &self.team_a,
            TeamSlot::TeamB => &self.team_b,
        }
    }

    pub fn get_mut(&mut self, slot: TeamSlot) -> &mut Team {
        match slot {
            TeamSlot::TeamA => &mut self.team_a,
            TeamSlot::TeamB => &mut self.team_b,
        }
    }

    /// Both rosters at once: `(batting, bowling)` for the given batting slot.
    pub fn split_mut(&mut self, batting: TeamSlot) -> (&mut Team, &mut Team) {
        match batting {
            TeamSlot::TeamA => (&mut self.team_a, &mut self.team_b),
            TeamSlot::TeamB => (&mut self.team_b, &mut self.team_a),
        }
    }

    /// Which slot holds the team with this id
    pub fn slot_of(&self, team_id: Uuid) -> Option<TeamSlot> {
        if self.team_a.id == team_id {
            Some(TeamSlot::TeamA)
        } else if self.team_b.id == team_id {
            Some(TeamSlot::TeamB)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsPair {
    #[serde(default)]
    pub first: Option<Innings>,
    #[serde(default)]
    pub second: Option<Innings>,
}

/// Who is batting, bowling, and at each end
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentState {
    pub batting_team: Option<TeamSlot>,
    pub bowling_team: Option<TeamSlot>,
    #[serde(alias = "strikerId")]
    pub striker_id: Option<PlayerId>,
    #[serde(alias = "nonStrikerId")]
    pub non_striker_id: Option<PlayerId>,
    pub bowler_id: Option<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "teamA")]
    TeamA,
    #[serde(rename = "teamB")]
    TeamB,
    #[serde(rename = "tie")]
    Tie,
}

impl From<TeamSlot> for Winner {
    fn from(slot: TeamSlot) -> Self {
        match slot {
            TeamSlot::TeamA => Winner::TeamA,
            TeamSlot::TeamB => Winner::TeamB,
        }
    }
}

impl Winner {
    pub fn slot(&self) -> Option<TeamSlot> {
        match self {
            Winner::TeamA => Some(TeamSlot::TeamA),
            Winner::TeamB => Some(TeamSlot::TeamB),
            Winner::Tie => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: Winner,
    /// e.g. "7 wickets", "23 runs", "Match tied"
    pub margin: String,
}

/// A complete match: both rosters, toss, up to two innings and the live cursor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,

    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub config: MatchConfig,

    pub teams: Teams,

    #[serde(default)]
    pub toss: Option<Toss>,

    /// 1 or 2
    #[serde(default = "first_innings")]
    pub current_innings: u8,

    #[serde(default)]
    pub innings: InningsPair,

    #[serde(default)]
    pub current_state: CurrentState,

    #[serde(default)]
    pub result: Option<MatchResult>,

    pub status: MatchStatus,
}

fn first_innings() -> u8 {
    1
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl Match {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            config: MatchConfig::default(),
            teams: Teams {
                team_a: Team::new("Team A"),
                team_b: Team::new("Team B"),
            },
            toss: None,
            current_innings: 1,
            innings: InningsPair::default(),
            current_state: CurrentState::default(),
            result: None,
            status: MatchStatus::Setup,
        }
    }

    pub fn ensure_status(
        &self,
        command: &'static str,
        allowed: &[MatchStatus],
    ) -> Result<(), ScoringError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(ScoringError::InvalidStatus {
                command,
                status: self.status,
            })
        }
    }

    pub fn configure(&mut self, patch: &ConfigPatch) -> Result<(), ScoringError> {
        self.ensure_status("configure", &[MatchStatus::Setup])?;
        self.config.merge(patch);
        Ok(())
    }

    pub fn set_team_names(
        &mut self,
        team_a: impl Into<String>,
        team_b: impl Into<String>,
    ) -> Result<(), ScoringError> {
        self.ensure_status("set teams", &[MatchStatus::Setup])?;
        self.teams.team_a.name = team_a.into();
        self.teams.team_b.name = team_b.into();
        Ok(())
    }

    pub fn record_toss(&mut self, winner: TeamSlot, decision: TossDecision) -> Result<(), ScoringError> {
        self.ensure_status("set toss", &[MatchStatus::Setup])?;
        let toss = Toss { winner, decision };
        let batting = toss.batting_first();
        self.toss = Some(toss);
        self.current_state.batting_team = Some(batting);
        self.current_state.bowling_team = Some(batting.opponent());
        Ok(())
    }

    pub fn begin_match(
        &mut self,
        striker_id: PlayerId,
        non_striker_id: PlayerId,
        bowler_id: PlayerId,
    ) -> Result<(), ScoringError> {
        self.ensure_status("start match", &[MatchStatus::Setup])?;
        let toss = self.toss.ok_or(ScoringError::TossNotRecorded)?;
        let batting = toss.batting_first();

        self.open_innings(batting, striker_id, non_striker_id, bowler_id)?;
        self.current_innings = 1;
        self.status = MatchStatus::Live;
        info!(match_id = %self.id, batting = %self.teams.get(batting).name, "match started");
        Ok(())
    }

    pub fn begin_second_innings(
        &mut self,
        striker_id: PlayerId,
        non_striker_id: PlayerId,
        bowler_id: PlayerId,
    ) -> Result<(), ScoringError> {
        self.ensure_status("start second innings", &[MatchStatus::InningsBreak])?;
        let batting = self
            .current_state
            .bowling_team
            .ok_or(ScoringError::InningsNotStarted)?;

        self.open_innings(batting, striker_id, non_striker_id, bowler_id)?;
        self.current_innings = 2;
        self.status = MatchStatus::Live;
        info!(
            match_id = %self.id,
            batting = %self.teams.get(batting).name,
            target = self.target(),
            "second innings started"
        );
        Ok(())
    }

    fn open_innings(
        &mut self,
        batting: TeamSlot,
        striker_id: PlayerId,
        non_striker_id: PlayerId,
        bowler_id: PlayerId,
    ) -> Result<(), ScoringError> {
        let bowling = batting.opponent();
        for id in [striker_id, non_striker_id] {
            if self.teams.get(batting).player(id).is_none() {
                return Err(ScoringError::PlayerNotFound { id, team: batting });
            }
        }
        if self.teams.get(bowling).player(bowler_id).is_none() {
            return Err(ScoringError::PlayerNotFound {
                id: bowler_id,
                team: bowling,
            });
        }

        let mut innings = Innings::new(self.teams.get(batting).id, self.teams.get(bowling).id);
        innings.start_new_over(bowler_id)?;
        innings.start_partnership(striker_id, non_striker_id);

        if self.innings.first.is_none() {
            self.innings.first = Some(innings);
        } else {
            self.innings.second = Some(innings);
        }

        self.current_state = CurrentState {
            batting_team: Some(batting),
            bowling_team: Some(bowling),
            striker_id: Some(striker_id),
            non_striker_id: Some(non_striker_id),
            bowler_id: Some(bowler_id),
        };
        Ok(())
    }

    pub fn current_innings(&self) -> Option<&Innings> {
        match self.current_innings {
            1 => self.innings.first.as_ref(),
            _ => self.innings.second.as_ref(),
        }
    }

    pub fn current_innings_mut(&mut self) -> Option<&mut Innings> {
        match self.current_innings {
            1 => self.innings.first.as_mut(),
            _ => self.innings.second.as_mut(),
        }
    }

    pub fn batting_team(&self) -> Option<&Team> {
        self.current_state.batting_team.map(|slot| self.teams.get(slot))
    }

    pub fn bowling_team(&self) -> Option<&Team> {
        self.current_state.bowling_team.map(|slot| self.teams.get(slot))
    }

    /// Players a side can field. Rosters are filled lazily during play, so the
    /// configured size is the floor.
    pub fn squad_size(&self, slot: TeamSlot) -> u32 {
        (self.teams.get(slot).len() as u32).max(self.config.players_per_team)
    }

    /// First-innings runs + 1, once the second innings has begun
    pub fn target(&self) -> Option<u32> {
        if self.current_innings < 2 {
            return None;
        }
        self.innings.first.as_ref().map(|i| i.score.runs + 1)
    }

    pub fn is_innings_complete(&self) -> bool {
        let (Some(innings), Some(batting)) = (self.current_innings(), self.current_state.batting_team)
        else {
            return false;
        };

        if innings.score.wickets + 1 >= self.squad_size(batting) {
            return true;
        }

        if self.config.match_type == MatchType::Limited
            && innings.score.balls >= self.config.total_overs * 6
        {
            return true;
        }

        matches!(self.target(), Some(target) if innings.score.runs >= target)
    }

    pub fn complete_innings(&mut self) {
        if self.current_innings == 1 {
            self.status = MatchStatus::InningsBreak;
            info!(
                match_id = %self.id,
                runs = self.innings.first.as_ref().map(|i| i.score.runs),
                "first innings complete"
            );
        } else {
            self.complete_match();
        }
    }

    /// Moves to `completed`. The result is only computed when both innings exist.
    pub fn complete_match(&mut self) {
        self.status = MatchStatus::Completed;

        let (Some(first), Some(second)) = (&self.innings.first, &self.innings.second) else {
            return;
        };
        let (Some(chasing), Some(defending)) =
            (self.current_state.batting_team, self.current_state.bowling_team)
        else {
            return;
        };

        let first_score = first.score.runs;
        let second_score = second.score.runs;

        let result = if second_score > first_score {
            let wickets_left = self
                .squad_size(chasing)
                .saturating_sub(1 + second.score.wickets);
            MatchResult {
                winner: chasing.into(),
                margin: format!("{wickets_left} wickets"),
            }
        } else if first_score > second_score {
            MatchResult {
                winner: defending.into(),
                margin: format!("{} runs", first_score - second_score),
            }
        } else {
            MatchResult {
                winner: Winner::Tie,
                margin: "Match tied".to_string(),
            }
        };

        info!(match_id = %self.id, winner = ?result.winner, margin = %result.margin, "match complete");
        self.result = Some(result);
    }

    pub fn swap_batsmen(&mut self) {
        let state = &mut self.current_state;
        std::mem::swap(&mut state.striker_id, &mut state.non_striker_id);
    }

    pub fn set_new_batter(&mut self, batter_id: PlayerId) {
        self.current_state.striker_id = Some(batter_id);
    }

    pub fn set_new_bowler(&mut self, bowler_id: PlayerId) {
        self.current_state.bowler_id = Some(bowler_id);
    }
}

impl Record for Match {
    fn refresh_derived(&mut self) {
        self.teams.team_a.refresh_derived();
        self.teams.team_b.refresh_derived();
        if let Some(innings) = self.innings.first.as_mut() {
            innings.refresh_derived();
        }
        if let Some(innings) = self.innings.second.as_mut() {
            innings.refresh_derived();
        }
    }
}
