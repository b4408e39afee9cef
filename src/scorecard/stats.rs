use serde::Serialize;

use crate::models::{
    record::{round2, runs_per_over},
    DismissalKind, Innings, Match, MatchResult, MatchType, PlayerId, Team,
};

pub fn balls_remaining(total_overs: u32, balls_bowled: u32) -> u32 {
    (total_overs * 6).saturating_sub(balls_bowled)
}

/// Runs per over still needed; zero once no balls remain.
pub fn required_run_rate(target: u32, runs: u32, balls_remaining: u32) -> f64 {
    if balls_remaining == 0 {
        return 0.0;
    }
    let needed = target as f64 - runs as f64;
    round2(needed / (balls_remaining as f64 / 6.0))
}

/// Final score at the current run rate over the full allocation
pub fn projected_score(runs: u32, balls_bowled: u32, total_overs: u32) -> u32 {
    if balls_bowled == 0 {
        return 0;
    }
    (runs_per_over(runs, balls_bowled) * total_overs as f64).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    Moderate,
    Difficult,
    VeryDifficult,
}

impl Difficulty {
    fn from_rate(rate: f64) -> Self {
        if rate < 6.0 {
            Difficulty::Easy
        } else if rate < 9.0 {
            Difficulty::Moderate
        } else if rate < 12.0 {
            Difficulty::Difficult
        } else {
            Difficulty::VeryDifficult
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Moderate => write!(f, "moderate"),
            Difficulty::Difficult => write!(f, "difficult"),
            Difficulty::VeryDifficult => write!(f, "very difficult"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAnalysis {
    pub runs_needed: i64,
    pub balls_remaining: u32,
    pub wickets_remaining: u32,
    pub required_run_rate: f64,
    pub is_achievable: bool,
    pub difficulty: Difficulty,
}

pub fn analyze_target(
    target: u32,
    runs: u32,
    balls_remaining: u32,
    wickets_remaining: u32,
) -> TargetAnalysis {
    let rate = required_run_rate(target, runs, balls_remaining);
    TargetAnalysis {
        runs_needed: target as i64 - runs as i64,
        balls_remaining,
        wickets_remaining,
        required_run_rate: rate,
        is_achievable: rate <= 12.0 && wickets_remaining >= 2,
        difficulty: Difficulty::from_rate(rate),
    }
}

/// The chase situation, once the second innings is under way
pub fn chase_analysis(m: &Match) -> Option<TargetAnalysis> {
    let target = m.target()?;
    let innings = m.innings.second.as_ref()?;
    let batting = m.current_state.batting_team?;

    let remaining = match m.config.match_type {
        MatchType::Limited => balls_remaining(m.config.total_overs, innings.score.balls),
        MatchType::Unlimited => 0,
    };
    let wickets = m
        .squad_size(batting)
        .saturating_sub(1 + innings.score.wickets);
    Some(analyze_target(target, innings.score.runs, remaining, wickets))
}

fn name_of(team: &Team, id: PlayerId) -> String {
    team.player(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnershipLine {
    pub wicket_number: u32,
    pub batter1_name: String,
    pub batter2_name: String,
    pub runs: u32,
    pub balls: u32,
    pub run_rate: f64,
    pub is_active: bool,
}

/// Ended partnerships then the active one
pub fn partnerships(innings: &Innings, batting: &Team) -> Vec<PartnershipLine> {
    innings
        .all_partnerships()
        .map(|p| PartnershipLine {
            wicket_number: p.wicket_number,
            batter1_name: name_of(batting, p.batter1_id),
            batter2_name: name_of(batting, p.batter2_id),
            runs: p.runs,
            balls: p.balls,
            run_rate: p.run_rate(),
            is_active: p.is_active,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WicketLine {
    pub runs: u32,
    pub wickets: u32,
    pub overs: f64,
    pub batter_name: String,
    pub batter_runs: u32,
    pub bowler_name: String,
    pub fielder_name: Option<String>,
    pub dismissal_kind: DismissalKind,
}

pub fn fall_of_wickets(innings: &Innings, batting: &Team, bowling: &Team) -> Vec<WicketLine> {
    innings
        .fall_of_wickets
        .iter()
        .map(|fow| WicketLine {
            runs: fow.runs,
            wickets: fow.wickets,
            overs: fow.overs,
            batter_name: name_of(batting, fow.batter_id),
            batter_runs: batting
                .player(fow.batter_id)
                .map_or(0, |p| p.batting_stats.runs),
            bowler_name: name_of(bowling, fow.bowler_id),
            fielder_name: fow
                .fielder_id
                .and_then(|id| bowling.player(id))
                .map(|p| p.name.clone()),
            dismissal_kind: fow.dismissal_kind,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingLine {
    pub id: PlayerId,
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub strike_rate: f64,
    pub is_out: bool,
    pub dismissal_kind: Option<DismissalKind>,
    pub dismissed_by: Option<PlayerId>,
}

/// Everyone who faced a ball or was dismissed, highest score first
pub fn batting_table(team: &Team) -> Vec<BattingLine> {
    let mut lines: Vec<BattingLine> = team
        .players
        .iter()
        .filter(|p| p.batting_stats.balls > 0 || p.batting_stats.is_out)
        .map(|p| {
            let bat = &p.batting_stats;
            BattingLine {
                id: p.id,
                name: p.name.clone(),
                runs: bat.runs,
                balls: bat.balls,
                fours: bat.fours,
                sixes: bat.sixes,
                strike_rate: bat.strike_rate,
                is_out: bat.is_out,
                dismissal_kind: bat.dismissal_kind,
                dismissed_by: bat.dismissed_by,
            }
        })
        .collect();
    lines.sort_by(|a, b| b.runs.cmp(&a.runs));
    lines
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingLine {
    pub id: PlayerId,
    pub name: String,
    pub balls: u32,
    pub maidens: u32,
    pub runs: u32,
    pub wickets: u32,
    pub economy_rate: f64,
}

/// Everyone who bowled a legal ball, most wickets first
pub fn bowling_table(team: &Team) -> Vec<BowlingLine> {
    let mut lines: Vec<BowlingLine> = team
        .players
        .iter()
        .filter(|p| p.bowling_stats.balls > 0)
        .map(|p| {
            let bowl = &p.bowling_stats;
            BowlingLine {
                id: p.id,
                name: p.name.clone(),
                balls: bowl.balls,
                maidens: bowl.maidens,
                runs: bowl.runs,
                wickets: bowl.wickets,
                economy_rate: bowl.economy_rate,
            }
        })
        .collect();
    lines.sort_by(|a, b| b.wickets.cmp(&a.wickets));
    lines
}

pub fn top_scorers(team: &Team, limit: usize) -> Vec<BattingLine> {
    batting_table(team)
        .into_iter()
        .filter(|line| line.balls > 0)
        .take(limit)
        .collect()
}

pub fn top_wicket_takers(team: &Team, limit: usize) -> Vec<BowlingLine> {
    bowling_table(team).into_iter().take(limit).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InningsSummary {
    pub team_name: String,
    pub runs: u32,
    pub wickets: u32,
    pub overs: f64,
    pub run_rate: f64,
    pub extras: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub first_innings: Option<InningsSummary>,
    pub second_innings: Option<InningsSummary>,
    pub result: Option<MatchResult>,
}

fn summarize(m: &Match, innings: &Innings) -> InningsSummary {
    let team_name = m
        .teams
        .slot_of(innings.batting_team_id)
        .map(|slot| m.teams.get(slot).name.clone())
        .unwrap_or_default();
    InningsSummary {
        team_name,
        runs: innings.score.runs,
        wickets: innings.score.wickets,
        overs: innings.score.overs,
        run_rate: innings.run_rate(),
        extras: innings.extras.total,
    }
}

pub fn match_summary(m: &Match) -> MatchSummary {
    MatchSummary {
        first_innings: m.innings.first.as_ref().map(|i| summarize(m, i)),
        second_innings: m.innings.second.as_ref().map(|i| summarize(m, i)),
        result: m.result.clone(),
    }
}
