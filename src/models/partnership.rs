use serde::{Deserialize, Serialize};

use super::{record::runs_per_over, PlayerId, Record};

/// Runs and balls accrued by two batters while both are in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partnership {
    #[serde(alias = "batsman1Id")]
    pub batter1_id: PlayerId,
    #[serde(alias = "batsman2Id")]
    pub batter2_id: PlayerId,

    /// 1 for the first-wicket stand, 2 for the second, ...
    pub wicket_number: u32,

    #[serde(default)]
    pub runs: u32,

    /// Legal balls only
    #[serde(default)]
    pub balls: u32,

    pub start_score: u32,

    #[serde(default)]
    pub end_score: Option<u32>,

    #[serde(default = "active_default")]
    pub is_active: bool,
}

fn active_default() -> bool {
    true
}

impl Partnership {
    pub fn new(batter1_id: PlayerId, batter2_id: PlayerId, wicket_number: u32, start_score: u32) -> Self {
        Self {
            batter1_id,
            batter2_id,
            wicket_number,
            runs: 0,
            balls: 0,
            start_score,
            end_score: None,
            is_active: true,
        }
    }

    pub fn add_runs(&mut self, runs: u32, is_legal_delivery: bool) {
        self.runs += runs;
        if is_legal_delivery {
            self.balls += 1;
        }
    }

    /// Saturates: a delivery bowled while no partnership was active was never fed in.
    pub fn remove_runs(&mut self, runs: u32, is_legal_delivery: bool) {
        self.runs = self.runs.saturating_sub(runs);
        if is_legal_delivery {
            self.balls = self.balls.saturating_sub(1);
        }
    }

    pub fn end(&mut self, score_at_end: u32) {
        self.is_active = false;
        self.end_score = Some(score_at_end);
    }

    pub fn reopen(&mut self) {
        self.is_active = true;
        self.end_score = None;
    }

    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.batter1_id == player_id || self.batter2_id == player_id
    }

    pub fn run_rate(&self) -> f64 {
        runs_per_over(self.runs, self.balls)
    }
}

impl Record for Partnership {
    fn refresh_derived(&mut self) {}
}
