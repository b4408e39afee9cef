//! Compact scorecard encoding for share links.
//!
//! A completed match is reduced to a positional JSON document (names and figures
//! only, no ids) and packed as unpadded base64url so it fits in a URL fragment.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::award::player_of_match;
use super::format::dismissal_text;
use crate::models::{record::balls_to_overs, Innings, Match, MatchStatus, Team, Winner};

pub const SHARE_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("only completed matches can be shared")]
    NotCompleted,

    #[error("empty share payload")]
    Empty,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid scorecard JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported scorecard version {0}")]
    UnsupportedVersion(u64),
}

/// `[name, runs, balls, fours, sixes, strike rate, out (0/1), dismissal]`
pub type BatterRow = (String, u32, u32, u32, u32, f64, u8, String);

/// `[name, overs, maidens, runs, wickets, economy]`
pub type BowlerRow = (String, f64, u32, u32, u32, f64);

/// `[runs, wickets, overs, batter]`
pub type WicketRow = (u32, u32, f64, String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedResult {
    /// `A`, `B` or `T`
    #[serde(rename = "w")]
    pub winner: String,
    #[serde(rename = "m")]
    pub margin: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedAward {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "s")]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedInnings {
    /// Batting side, `A` or `B`
    #[serde(rename = "bt")]
    pub batting: String,
    /// `[runs, wickets, overs]`
    #[serde(rename = "s")]
    pub score: (u32, u32, f64),
    /// `[total, wides, no-balls, byes, leg-byes]`
    #[serde(rename = "ex")]
    pub extras: [u32; 5],
    #[serde(rename = "b")]
    pub batters: Vec<BatterRow>,
    #[serde(rename = "w")]
    pub bowlers: Vec<BowlerRow>,
    #[serde(rename = "f")]
    pub wickets: Vec<WicketRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedScorecard {
    #[serde(rename = "v")]
    pub version: u64,
    /// `YYYY-MM-DD`
    #[serde(rename = "ts")]
    pub date: String,
    #[serde(rename = "ov")]
    pub overs: u32,
    #[serde(rename = "tA")]
    pub team_a: String,
    #[serde(rename = "tB")]
    pub team_b: String,
    #[serde(rename = "r")]
    pub result: SharedResult,
    #[serde(rename = "mom")]
    pub player_of_match: Option<SharedAward>,
    #[serde(rename = "i1")]
    pub first: Option<SharedInnings>,
    #[serde(rename = "i2")]
    pub second: Option<SharedInnings>,
}

fn shared_innings(m: &Match, innings: &Innings) -> Option<SharedInnings> {
    let slot = m.teams.slot_of(innings.batting_team_id)?;
    let batting: &Team = m.teams.get(slot);
    let bowling: &Team = m.teams.get(slot.opponent());

    let batters = batting
        .players
        .iter()
        .filter(|p| p.batting_stats.balls > 0 || p.batting_stats.is_out)
        .map(|p| {
            let bat = &p.batting_stats;
            (
                p.name.clone(),
                bat.runs,
                bat.balls,
                bat.fours,
                bat.sixes,
                bat.strike_rate,
                u8::from(bat.is_out),
                dismissal_text(p, bowling),
            )
        })
        .collect();

    let bowlers = bowling
        .players
        .iter()
        .filter(|p| p.bowling_stats.balls > 0)
        .map(|p| {
            let bowl = &p.bowling_stats;
            (
                p.name.clone(),
                balls_to_overs(bowl.balls),
                bowl.maidens,
                bowl.runs,
                bowl.wickets,
                bowl.economy_rate,
            )
        })
        .collect();

    let wickets = innings
        .fall_of_wickets
        .iter()
        .map(|fow| {
            let name = batting
                .player(fow.batter_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "?".to_string());
            (fow.runs, fow.wickets, fow.overs, name)
        })
        .collect();

    let extras = &innings.extras;
    Some(SharedInnings {
        batting: slot.code().to_string(),
        score: (innings.score.runs, innings.score.wickets, innings.score.overs),
        extras: [
            extras.total,
            extras.wides,
            extras.no_balls,
            extras.byes,
            extras.leg_byes,
        ],
        batters,
        bowlers,
        wickets,
    })
}

pub fn scorecard(m: &Match) -> Result<SharedScorecard, ShareError> {
    let result = match (&m.status, &m.result) {
        (MatchStatus::Completed, Some(result)) => result,
        _ => return Err(ShareError::NotCompleted),
    };

    let winner = match result.winner {
        Winner::Tie => "T",
        Winner::TeamA => "A",
        Winner::TeamB => "B",
    };

    Ok(SharedScorecard {
        version: SHARE_VERSION,
        date: m.created_at.format("%Y-%m-%d").to_string(),
        overs: m.config.total_overs,
        team_a: m.teams.team_a.name.clone(),
        team_b: m.teams.team_b.name.clone(),
        result: SharedResult {
            winner: winner.to_string(),
            margin: result.margin.clone(),
        },
        player_of_match: player_of_match(m).map(|award| SharedAward {
            name: award.player.name,
            summary: award.summary,
        }),
        first: m.innings.first.as_ref().and_then(|i| shared_innings(m, i)),
        second: m.innings.second.as_ref().and_then(|i| shared_innings(m, i)),
    })
}

/// Encodes a completed match into a URL-fragment payload.
pub fn encode_match(m: &Match) -> Result<String, ShareError> {
    let json = serde_json::to_string(&scorecard(m)?)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_shared(payload: &str) -> Result<SharedScorecard, ShareError> {
    let payload = payload.trim().trim_start_matches('#');
    if payload.is_empty() {
        return Err(ShareError::Empty);
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    let json = String::from_utf8(bytes)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;

    let version = value.get("v").and_then(|v| v.as_u64()).unwrap_or(0);
    if version != SHARE_VERSION {
        return Err(ShareError::UnsupportedVersion(version));
    }

    Ok(serde_json::from_value(value)?)
}

/// `{base}/shared#{payload}`
pub fn share_link(base_url: &str, payload: &str) -> String {
    format!("{}/shared#{}", base_url.trim_end_matches('/'), payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{reduce, Command};
    use crate::models::{Ball, DismissalKind, MatchConfig, MatchType, TeamSlot, TossDecision};

    fn step(m: &Match, command: Command) -> Match {
        reduce(Some(m), command).unwrap().unwrap()
    }

    fn bowl(m: &Match, ball: impl FnOnce(Ball) -> Ball) -> Match {
        let state = &m.current_state;
        let delivery = Ball::new(state.striker_id.unwrap(), state.bowler_id.unwrap());
        step(m, Command::AddBall(ball(delivery)))
    }

    /// One-over match: Rovers make 7/1, Wanderers reply with 3.
    fn completed_match() -> Match {
        let config = MatchConfig {
            total_overs: 1,
            players_per_team: 3,
            match_type: MatchType::Limited,
        };
        let m = reduce(None, Command::CreateMatch { config: Some(config) })
            .unwrap()
            .unwrap();
        let m = step(
            &m,
            Command::SetTeams {
                team_a_name: "Rovers".to_string(),
                team_b_name: "Wanderers".to_string(),
                team_a_players: vec!["Ann".into(), "Bea".into(), "Cat".into()],
                team_b_players: vec!["Dee".into(), "Eve".into(), "Fay".into()],
            },
        );
        let mut m = step(
            &m,
            Command::SetToss {
                winner: TeamSlot::TeamB,
                decision: TossDecision::Bowl,
            },
        );
        let (a, b) = (m.teams.team_a.clone(), m.teams.team_b.clone());
        m = step(
            &m,
            Command::StartMatch {
                striker_id: a.players[0].id,
                non_striker_id: a.players[1].id,
                bowler_id: b.players[0].id,
            },
        );
        m = bowl(&m, |ball| ball.with_runs(4));
        m = bowl(&m, |ball| ball.with_wicket(DismissalKind::Bowled, None));
        m = step(&m, Command::SetNewBatter { player_id: a.players[2].id });
        m = bowl(&m, |ball| ball.with_runs(2));
        m = bowl(&m, |ball| ball.with_runs(1));
        m = bowl(&m, |ball| ball);
        m = bowl(&m, |ball| ball);
        assert_eq!(m.status, MatchStatus::InningsBreak);

        m = step(
            &m,
            Command::StartSecondInnings {
                striker_id: b.players[0].id,
                non_striker_id: b.players[1].id,
                bowler_id: a.players[0].id,
            },
        );
        m = bowl(&m, |ball| ball.with_runs(2));
        m = bowl(&m, |ball| ball.with_runs(1));
        for _ in 0..4 {
            m = bowl(&m, |ball| ball);
        }
        assert_eq!(m.status, MatchStatus::Completed);
        m
    }

    #[test]
    fn test_encode_decode_completed_match() {
        let m = completed_match();
        let payload = encode_match(&m).unwrap();
        assert!(!payload.contains('='));
        assert!(!payload.contains('+') && !payload.contains('/'));

        let card = decode_shared(&payload).unwrap();
        assert_eq!(card, scorecard(&m).unwrap());
        assert_eq!(card.version, 1);
        assert_eq!((card.team_a.as_str(), card.team_b.as_str()), ("Rovers", "Wanderers"));
        assert_eq!(card.result.winner, "A");
        assert_eq!(card.result.margin, "4 runs");

        let first = card.first.as_ref().unwrap();
        assert_eq!(first.batting, "A");
        assert_eq!(first.score, (7, 1, 1.0));
        assert_eq!(first.batters.len(), 3);
        let out = first.batters.iter().find(|row| row.0 == "Ann").unwrap();
        assert_eq!((out.1, out.6, out.7.as_str()), (4, 1, "b Dee"));
        assert_eq!(first.wickets, vec![(4, 1, 0.2, "Ann".to_string())]);
        assert_eq!(first.bowlers[0].0, "Dee");

        let second = card.second.as_ref().unwrap();
        assert_eq!(second.batting, "B");
        assert_eq!(second.score, (3, 0, 1.0));

        let award = card.player_of_match.unwrap();
        assert_eq!(award.name, "Ann");
        assert_eq!(award.summary, "4(2)");
    }

    #[test]
    fn test_share_link() {
        assert_eq!(
            share_link("https://scores.example/", "abc"),
            "https://scores.example/shared#abc"
        );
    }

    #[test]
    fn test_rejects_live_match() {
        assert!(matches!(encode_match(&Match::new()), Err(ShareError::NotCompleted)));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"v":2,"ts":"2024-01-01"}"#);
        assert!(matches!(
            decode_shared(&payload),
            Err(ShareError::UnsupportedVersion(2))
        ));
        assert!(matches!(decode_shared(""), Err(ShareError::Empty)));
        assert!(matches!(decode_shared("!!!"), Err(ShareError::Base64(_))));
    }
}
