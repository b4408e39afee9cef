use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::{
    record::{balls_to_overs, runs_per_over},
    Ball, DismissalKind, ExtraKind, Over, Partnership, PlayerId, Record,
};
use crate::error::ScoringError;

/// Running total for an innings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Score {
    pub runs: u32,
    pub wickets: u32,
    /// Overs notation (completed.legal-balls), derived from `balls`
    pub overs: f64,
    /// Legal deliveries bowled
    pub balls: u32,
}

/// Extras breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Extras {
    pub wides: u32,
    /// One penalty run per no-ball
    pub no_balls: u32,
    pub byes: u32,
    pub leg_byes: u32,
    pub total: u32,
}

impl Extras {
    fn apply(&mut self, ball: &Ball) {
        let (bucket, amount) = match self.bucket(ball) {
            Some(entry) => entry,
            None => return,
        };
        *bucket += amount;
        self.total += amount;
    }

    fn revert(&mut self, ball: &Ball) {
        let (bucket, amount) = match self.bucket(ball) {
            Some(entry) => entry,
            None => return,
        };
        *bucket -= amount;
        self.total -= amount;
    }

    fn bucket(&mut self, ball: &Ball) -> Option<(&mut u32, u32)> {
        match ball.extra? {
            ExtraKind::Wide => Some((&mut self.wides, ball.runs)),
            ExtraKind::NoBall => Some((&mut self.no_balls, 1)),
            ExtraKind::Bye => Some((&mut self.byes, ball.runs)),
            ExtraKind::LegBye => Some((&mut self.leg_byes, ball.runs)),
        }
    }
}

/// Snapshot taken the moment a wicket falls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallOfWicket {
    pub runs: u32,
    pub wickets: u32,
    pub overs: f64,
    #[serde(alias = "batsmanId")]
    pub batter_id: PlayerId,
    pub bowler_id: PlayerId,
    #[serde(alias = "wicketType")]
    pub dismissal_kind: DismissalKind,
    #[serde(default)]
    pub fielder_id: Option<PlayerId>,
}

/// One team's turn at batting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Innings {
    pub batting_team_id: Uuid,
    pub bowling_team_id: Uuid,
    /// Closed overs, oldest first
    #[serde(default)]
    pub overs: Vec<Over>,
    #[serde(default)]
    pub current_over: Option<Over>,
    #[serde(default)]
    pub score: Score,
    #[serde(default)]
    pub extras: Extras,
    /// Ended partnerships, oldest first
    #[serde(default)]
    pub partnerships: Vec<Partnership>,
    #[serde(default)]
    pub current_partnership: Option<Partnership>,
    #[serde(default)]
    pub fall_of_wickets: Vec<FallOfWicket>,
}

impl Innings {
    pub fn new(batting_team_id: Uuid, bowling_team_id: Uuid) -> Self {
        Self {
            batting_team_id,
            bowling_team_id,
            overs: Vec::new(),
            current_over: None,
            score: Score::default(),
            extras: Extras::default(),
            partnerships: Vec::new(),
            current_partnership: None,
            fall_of_wickets: Vec::new(),
        }
    }

    pub fn start_new_over(&mut self, bowler_id: PlayerId) -> Result<(), ScoringError> {
        if let Some(open) = &self.current_over {
            return Err(ScoringError::OverAlreadyInProgress {
                number: open.number,
            });
        }
        let number = self.overs.len() as u32 + 1;
        self.current_over = Some(Over::new(bowler_id, number));
        debug!(number, %bowler_id, "over started");
        Ok(())
    }

    /// Moves the in-progress over (complete or not) into the closed list.
    pub fn complete_over(&mut self) -> bool {
        match self.current_over.take() {
            Some(over) => {
                self.overs.push(over);
                true
            }
            None => false,
        }
    }

    pub fn add_ball(&mut self, ball: Ball) -> Result<(), ScoringError> {
        let over = self
            .current_over
            .as_mut()
            .ok_or(ScoringError::NoOverInProgress)?;
        over.add_ball(ball.clone());

        self.score.runs += ball.total_runs();

        let legal = ball.is_legal_delivery();
        if legal {
            self.score.balls += 1;
            self.score.overs = balls_to_overs(self.score.balls);
        }

        self.extras.apply(&ball);

        if let Some(partnership) = self.current_partnership.as_mut() {
            partnership.add_runs(ball.runs, legal);
        }

        if let Some(wicket) = ball.wicket {
            self.score.wickets += 1;
            self.fall_of_wickets.push(FallOfWicket {
                runs: self.score.runs,
                wickets: self.score.wickets,
                overs: self.score.overs,
                batter_id: ball.batter_id,
                bowler_id: ball.bowler_id,
                dismissal_kind: wicket.kind,
                fielder_id: wicket.fielder_id,
            });
            if let Some(mut partnership) = self.current_partnership.take() {
                partnership.end(self.score.runs);
                self.partnerships.push(partnership);
            }
        }

        if self.current_over.as_ref().is_some_and(|o| o.is_complete) {
            self.complete_over();
        }

        Ok(())
    }

    /// Exact inverse of [`add_ball`](Self::add_ball). Reopens the last closed over
    /// when the in-progress one is empty (an empty in-progress over is discarded).
    pub fn remove_last_ball(&mut self) -> Option<Ball> {
        if self.current_over.as_ref().map_or(true, Over::is_empty) {
            let previous = self.overs.pop()?;
            self.current_over = Some(previous);
        }
        let ball = self.current_over.as_mut()?.remove_last_ball()?;
        let legal = ball.is_legal_delivery();

        if ball.is_wicket() {
            let wicket_number = self.score.wickets;
            self.score.wickets -= 1;
            self.fall_of_wickets.pop();

            if self
                .partnerships
                .last()
                .is_some_and(|p| p.wicket_number == wicket_number)
            {
                if let Some(mut partnership) = self.partnerships.pop() {
                    partnership.reopen();
                    self.current_partnership = Some(partnership);
                }
            }
        }

        if let Some(partnership) = self.current_partnership.as_mut() {
            partnership.remove_runs(ball.runs, legal);
        }

        self.extras.revert(&ball);

        if legal {
            self.score.balls -= 1;
            self.score.overs = balls_to_overs(self.score.balls);
        }

        self.score.runs -= ball.total_runs();

        Some(ball)
    }

    /// Opens a partnership for the next wicket, seeded at the current score.
    pub fn start_partnership(&mut self, batter1_id: PlayerId, batter2_id: PlayerId) {
        self.current_partnership = Some(Partnership::new(
            batter1_id,
            batter2_id,
            self.score.wickets + 1,
            self.score.runs,
        ));
    }

    pub fn run_rate(&self) -> f64 {
        runs_per_over(self.score.runs, self.score.balls)
    }

    pub fn last_over(&self) -> Option<&Over> {
        self.overs.last()
    }

    /// Every delivery in bowling order
    pub fn deliveries(&self) -> impl Iterator<Item = &Ball> {
        self.overs
            .iter()
            .chain(self.current_over.iter())
            .flat_map(|over| over.balls.iter())
    }

    /// All partnerships, ended ones first and the active one last
    pub fn all_partnerships(&self) -> impl Iterator<Item = &Partnership> {
        self.partnerships.iter().chain(self.current_partnership.iter())
    }
}

impl Record for Innings {
    fn refresh_derived(&mut self) {
        self.score.overs = balls_to_overs(self.score.balls);
        self.overs.iter_mut().for_each(Over::refresh_derived);
        if let Some(over) = self.current_over.as_mut() {
            over.refresh_derived();
        }
    }
}
