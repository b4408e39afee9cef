use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    record::{round2, runs_per_over},
    DismissalKind, PlayerId, Record,
};

/// Batting figures for one player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BattingStats {
    pub runs: u32,
    /// Legal deliveries faced
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    /// Derived: runs per 100 balls, 2 decimals
    pub strike_rate: f64,
    pub is_out: bool,
    #[serde(alias = "dismissalType")]
    pub dismissal_kind: Option<DismissalKind>,
    #[serde(alias = "dismissedBy")]
    pub dismissed_by: Option<PlayerId>,
    #[serde(alias = "fielder")]
    pub fielder_id: Option<PlayerId>,
}

/// Bowling figures for one player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BowlingStats {
    /// Legal deliveries bowled
    pub balls: u32,
    /// Derived: balls / 6
    pub overs: f64,
    pub maidens: u32,
    /// Runs conceded
    pub runs: u32,
    pub wickets: u32,
    /// Derived: runs per over, 2 decimals
    pub economy_rate: f64,
}

/// A participant with incremental batting and bowling figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub batting_stats: BattingStats,
    #[serde(default)]
    pub bowling_stats: BowlingStats,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            batting_stats: BattingStats::default(),
            bowling_stats: BowlingStats::default(),
        }
    }

    /// Runs off the bat from a legal delivery: counts a ball faced.
    pub fn record_runs(&mut self, runs: u32) {
        self.batting_stats.balls += 1;
        self.credit_bat_runs(runs);
    }

    /// Runs off the bat from a no-ball: no ball faced.
    pub fn record_no_ball_runs(&mut self, runs: u32) {
        self.credit_bat_runs(runs);
    }

    /// Reverses [`record_runs`](Self::record_runs) or, with `faced == false`,
    /// [`record_no_ball_runs`](Self::record_no_ball_runs).
    pub fn revert_runs(&mut self, runs: u32, faced: bool) {
        let bat = &mut self.batting_stats;
        bat.runs -= runs;
        if faced {
            bat.balls -= 1;
        }
        match runs {
            4 => bat.fours -= 1,
            6 => bat.sixes -= 1,
            _ => {}
        }
        self.update_strike_rate();
    }

    fn credit_bat_runs(&mut self, runs: u32) {
        let bat = &mut self.batting_stats;
        bat.runs += runs;
        match runs {
            4 => bat.fours += 1,
            6 => bat.sixes += 1,
            _ => {}
        }
        self.update_strike_rate();
    }

    pub fn update_strike_rate(&mut self) {
        let bat = &mut self.batting_stats;
        bat.strike_rate = if bat.balls == 0 {
            0.0
        } else {
            round2(bat.runs as f64 / bat.balls as f64 * 100.0)
        };
    }

    /// Not idempotent-safe: callers apply it once per dismissal.
    pub fn mark_dismissed(
        &mut self,
        kind: DismissalKind,
        bowler_id: Option<PlayerId>,
        fielder_id: Option<PlayerId>,
    ) {
        let bat = &mut self.batting_stats;
        bat.is_out = true;
        bat.dismissal_kind = Some(kind);
        bat.dismissed_by = bowler_id;
        bat.fielder_id = fielder_id;
    }

    pub fn clear_dismissal(&mut self) {
        let bat = &mut self.batting_stats;
        bat.is_out = false;
        bat.dismissal_kind = None;
        bat.dismissed_by = None;
        bat.fielder_id = None;
    }

    pub fn record_delivery(&mut self, runs_conceded: u32, is_wicket: bool, is_legal_delivery: bool) {
        let bowl = &mut self.bowling_stats;
        bowl.runs += runs_conceded;
        if is_legal_delivery {
            bowl.balls += 1;
        }
        if is_wicket {
            bowl.wickets += 1;
        }
        self.update_bowling_rates();
    }

    pub fn revert_delivery(&mut self, runs_conceded: u32, is_wicket: bool, is_legal_delivery: bool) {
        let bowl = &mut self.bowling_stats;
        bowl.runs -= runs_conceded;
        if is_legal_delivery {
            bowl.balls -= 1;
        }
        if is_wicket {
            bowl.wickets -= 1;
        }
        self.update_bowling_rates();
    }

    /// Credits a maiden when the completed over conceded nothing.
    pub fn record_maiden_if_applicable(&mut self, over_runs: u32) -> bool {
        if over_runs == 0 {
            self.bowling_stats.maidens += 1;
            true
        } else {
            false
        }
    }

    pub fn revert_maiden(&mut self) {
        self.bowling_stats.maidens = self.bowling_stats.maidens.saturating_sub(1);
    }

    pub fn update_bowling_rates(&mut self) {
        let bowl = &mut self.bowling_stats;
        bowl.overs = bowl.balls as f64 / 6.0;
        bowl.economy_rate = runs_per_over(bowl.runs, bowl.balls);
    }

    pub fn is_available_to_bat(&self) -> bool {
        !self.batting_stats.is_out
    }
}

impl Record for Player {
    fn refresh_derived(&mut self) {
        self.update_strike_rate();
        self.update_bowling_rates();
    }
}
