use serde::{Deserialize, Serialize};

use super::{Ball, PlayerId, Record};

pub const BALLS_PER_OVER: usize = 6;

/// Six legal deliveries by one bowler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Over {
    pub bowler_id: PlayerId,

    /// 1-based position within the innings
    #[serde(alias = "overNumber")]
    pub number: u32,

    #[serde(default)]
    pub balls: Vec<Ball>,

    /// Includes no-ball penalties
    #[serde(default)]
    pub runs: u32,

    #[serde(default)]
    pub wickets: u32,

    #[serde(default)]
    pub is_complete: bool,

    #[serde(default)]
    pub is_maiden: bool,
}

impl Over {
    pub fn new(bowler_id: PlayerId, number: u32) -> Self {
        Self {
            bowler_id,
            number,
            balls: Vec::new(),
            runs: 0,
            wickets: 0,
            is_complete: false,
            is_maiden: false,
        }
    }

    pub fn add_ball(&mut self, ball: Ball) {
        self.runs += ball.total_runs();
        if ball.is_wicket() {
            self.wickets += 1;
        }
        self.balls.push(ball);

        if self.legal_ball_count() == BALLS_PER_OVER {
            self.is_complete = true;
            self.is_maiden = self.runs == 0;
        }
    }

    /// Pops the last delivery and reverses its totals. Returns `None` on an empty over.
    pub fn remove_last_ball(&mut self) -> Option<Ball> {
        let ball = self.balls.pop()?;
        self.runs -= ball.total_runs();
        if ball.is_wicket() {
            self.wickets -= 1;
        }
        self.is_complete = false;
        self.is_maiden = false;
        Some(ball)
    }

    pub fn legal_ball_count(&self) -> usize {
        self.balls.iter().filter(|b| b.is_legal_delivery()).count()
    }

    pub fn total_balls(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Display tokens for each delivery, e.g. `["1", "W", "2wd", "4"]`
    pub fn summary(&self) -> Vec<String> {
        self.balls.iter().map(Ball::display_token).collect()
    }
}

impl Record for Over {
    fn refresh_derived(&mut self) {
        self.runs = self.balls.iter().map(Ball::total_runs).sum();
        self.wickets = self.balls.iter().filter(|b| b.is_wicket()).count() as u32;
        self.is_complete = self.legal_ball_count() == BALLS_PER_OVER;
        self.is_maiden = self.is_complete && self.runs == 0;
    }
}
