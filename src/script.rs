//! Line-oriented scoring scripts.
//!
//! ```text
//! new 10 11
//! teams Lions | Tigers
//! toss a bat
//! open Ann, Bea, Dee      # striker, non-striker, bowler
//! 4
//! wd1
//! W caught Eve
//! batter Cat
//! bowler Fay              # closes the over, Fay bowls the next
//! undo
//! ```
//!
//! Players are referred to by name and onboarded the first time they appear.

use thiserror::Error;

use crate::engine::{reduce, Command};
use crate::error::ScoringError;
use crate::models::{
    Ball, DismissalKind, ExtraKind, Match, MatchConfig, MatchType, PlayerId, TeamSlot,
    TossDecision,
};
use crate::validation::{
    normalize_name, validate_match_config, validate_opening_players, validate_player_name,
    validate_team_name, ValidationError,
};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: ValidationError,
    },

    #[error("line {line}: {source}")]
    Scoring {
        line: usize,
        #[source]
        source: ScoringError,
    },
}

/// Why a single instruction was not applied
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// One delivery as typed by the scorer
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Runs(u32),
    Wicket {
        runs: u32,
        kind: DismissalKind,
        fielder: Option<String>,
    },
    Wide(u32),
    NoBall(u32),
    Bye(u32),
    LegBye(u32),
}

impl Delivery {
    /// `0`..`6`, `W`, `W1 run-out Eve`, `wd`, `wd2`, `nb`, `nb4`, `b1`, `lb2`
    pub fn parse(raw: &str) -> Option<Self> {
        let mut tokens = raw.split_whitespace();
        let head = tokens.next()?.to_lowercase();

        if let Some(rest) = head.strip_prefix('w').filter(|_| !head.starts_with("wd")) {
            let runs = parse_runs(rest, 0)?;
            let kind = match tokens.next() {
                Some(kind) => DismissalKind::parse(kind)?,
                None => DismissalKind::Bowled,
            };
            let fielder: Vec<&str> = tokens.collect();
            let fielder = (!fielder.is_empty()).then(|| fielder.join(" "));
            return Some(Self::Wicket { runs, kind, fielder });
        }

        if tokens.next().is_some() {
            return None;
        }
        if let Some(rest) = head.strip_prefix("wd") {
            return parse_runs(rest, 1).filter(|r| *r > 0).map(Self::Wide);
        }
        if let Some(rest) = head.strip_prefix("nb") {
            return parse_runs(rest, 0).map(Self::NoBall);
        }
        if let Some(rest) = head.strip_prefix("lb") {
            return parse_runs(rest, 1).map(Self::LegBye);
        }
        if let Some(rest) = head.strip_prefix('b') {
            return parse_runs(rest, 1).map(Self::Bye);
        }
        parse_runs(&head, 0).filter(|_| !head.is_empty()).map(Self::Runs)
    }
}

fn parse_runs(raw: &str, default: u32) -> Option<u32> {
    if raw.is_empty() {
        return Some(default);
    }
    let runs: u32 = raw.parse().ok()?;
    (runs <= 6).then_some(runs)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    New(Option<MatchConfig>),
    Teams { team_a: String, team_b: String },
    Player { team: TeamSlot, name: String },
    Toss { winner: TeamSlot, decision: TossDecision },
    Open { striker: String, non_striker: String, bowler: String },
    Second { striker: String, non_striker: String, bowler: String },
    Ball(Delivery),
    Undo,
    Batter(String),
    Bowler(String),
    Swap,
    End,
    Clear,
}

fn parse_slot(raw: &str) -> Result<TeamSlot, String> {
    match raw.to_lowercase().as_str() {
        "a" => Ok(TeamSlot::TeamA),
        "b" => Ok(TeamSlot::TeamB),
        other => Err(format!("unknown team '{other}', expected a or b")),
    }
}

fn parse_trio(rest: &str) -> Result<(String, String, String), String> {
    let names: Vec<String> = rest.split(',').map(|s| s.trim().to_string()).collect();
    match names.as_slice() {
        [s, ns, b] if !s.is_empty() && !ns.is_empty() && !b.is_empty() => {
            Ok((s.clone(), ns.clone(), b.clone()))
        }
        _ => Err("expected: striker, non-striker, bowler".to_string()),
    }
}

impl Instruction {
    /// `Ok(None)` for blank lines and comments.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        let instruction = match keyword.to_lowercase().as_str() {
            "new" => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                if args.is_empty() {
                    Self::New(None)
                } else {
                    let number = |i: usize, default: u32| -> Result<u32, String> {
                        args.get(i)
                            .map_or(Ok(default), |s| s.parse().map_err(|_| format!("invalid number '{s}'")))
                    };
                    let match_type = match args.get(2).map(|s| s.to_lowercase()) {
                        Some(t) if t == "unlimited" => MatchType::Unlimited,
                        _ => MatchType::Limited,
                    };
                    let defaults = MatchConfig::default();
                    Self::New(Some(MatchConfig {
                        total_overs: number(0, defaults.total_overs)?,
                        players_per_team: number(1, defaults.players_per_team)?,
                        match_type,
                    }))
                }
            }
            "teams" => {
                let (a, b) = rest
                    .split_once('|')
                    .ok_or("expected: teams NAME | NAME")?;
                Self::Teams {
                    team_a: a.trim().to_string(),
                    team_b: b.trim().to_string(),
                }
            }
            "player" => {
                let (team, name) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("expected: player a|b NAME")?;
                Self::Player {
                    team: parse_slot(team)?,
                    name: name.trim().to_string(),
                }
            }
            "toss" => {
                let (team, decision) = rest
                    .split_once(char::is_whitespace)
                    .ok_or("expected: toss a|b bat|bowl")?;
                let decision = match decision.trim().to_lowercase().as_str() {
                    "bat" => TossDecision::Bat,
                    "bowl" => TossDecision::Bowl,
                    other => return Err(format!("unknown toss decision '{other}'")),
                };
                Self::Toss {
                    winner: parse_slot(team)?,
                    decision,
                }
            }
            "open" => {
                let (striker, non_striker, bowler) = parse_trio(rest)?;
                Self::Open { striker, non_striker, bowler }
            }
            "second" => {
                let (striker, non_striker, bowler) = parse_trio(rest)?;
                Self::Second { striker, non_striker, bowler }
            }
            "batter" if !rest.is_empty() => Self::Batter(rest.to_string()),
            "bowler" if !rest.is_empty() => Self::Bowler(rest.to_string()),
            "undo" => Self::Undo,
            "swap" => Self::Swap,
            "end" => Self::End,
            "clear" => Self::Clear,
            _ => Self::Ball(
                Delivery::parse(line).ok_or_else(|| format!("unrecognised instruction '{line}'"))?,
            ),
        };
        Ok(Some(instruction))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub line: usize,
    pub instruction: Instruction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut steps = Vec::new();
        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let parsed = Instruction::parse(raw).map_err(|message| ScriptError::Parse { line, message })?;
            if let Some(instruction) = parsed {
                steps.push(Step { line, instruction });
            }
        }
        Ok(Self { steps })
    }
}

fn run(state: Option<Match>, command: Command) -> Result<Option<Match>, ScoringError> {
    reduce(state.as_ref(), command)
}

fn live(state: Option<Match>) -> Result<Match, ScoringError> {
    state.ok_or(ScoringError::NoActiveMatch)
}

/// Looks a player up by name, onboarding them if the roster doesn't have them yet.
fn ensure_player(m: Match, team: TeamSlot, name: &str) -> Result<(Match, PlayerId), StepError> {
    if let Some(player) = m.teams.get(team).player_by_name(name) {
        let id = player.id;
        return Ok((m, id));
    }
    validate_player_name(name)?;
    let m = live(run(
        Some(m),
        Command::AddPlayer {
            team,
            name: name.trim().to_string(),
        },
    )?)?;
    let id = m
        .teams
        .get(team)
        .player_by_name(name)
        .map(|p| p.id)
        .ok_or(ScoringError::NoActiveMatch)?;
    Ok((m, id))
}

fn sides(m: &Match) -> Result<(TeamSlot, TeamSlot), ScoringError> {
    let state = &m.current_state;
    match (state.batting_team, state.bowling_team) {
        (Some(batting), Some(bowling)) => Ok((batting, bowling)),
        _ => Err(ScoringError::TossNotRecorded),
    }
}

fn opening(
    m: Match,
    batting: TeamSlot,
    (striker, non_striker, bowler): (&str, &str, &str),
) -> Result<(Match, PlayerId, PlayerId, PlayerId), StepError> {
    let (m, striker) = ensure_player(m, batting, striker)?;
    let (m, non_striker) = ensure_player(m, batting, non_striker)?;
    let (m, bowler) = ensure_player(m, batting.opponent(), bowler)?;
    validate_opening_players(
        striker,
        non_striker,
        bowler,
        m.teams.get(batting),
        m.teams.get(batting.opponent()),
    )?;
    Ok((m, striker, non_striker, bowler))
}

fn delivery(m: Match, delivery: &Delivery) -> Result<Option<Match>, StepError> {
    let (striker, bowler) = match (m.current_state.striker_id, m.current_state.bowler_id) {
        (Some(striker), Some(bowler)) => (striker, bowler),
        _ => return Err(ScoringError::InningsNotStarted.into()),
    };
    let ball = Ball::new(striker, bowler);

    let (m, ball) = match delivery {
        Delivery::Runs(runs) => (m, ball.with_runs(*runs)),
        Delivery::Wide(runs) => (m, ball.with_extra(ExtraKind::Wide, *runs)),
        Delivery::NoBall(runs) => (m, ball.with_extra(ExtraKind::NoBall, *runs)),
        Delivery::Bye(runs) => (m, ball.with_extra(ExtraKind::Bye, *runs)),
        Delivery::LegBye(runs) => (m, ball.with_extra(ExtraKind::LegBye, *runs)),
        Delivery::Wicket { runs, kind, fielder } => {
            let (m, fielder_id) = match fielder {
                Some(name) => {
                    let (_, bowling) = sides(&m)?;
                    let (m, id) = ensure_player(m, bowling, name)?;
                    (m, Some(id))
                }
                None => (m, None),
            };
            (m, ball.with_runs(*runs).with_wicket(*kind, fielder_id))
        }
    };
    Ok(run(Some(m), Command::AddBall(ball))?)
}

fn validate_team_names(team_a: &str, team_b: &str) -> Result<(), ValidationError> {
    validate_team_name(team_a)?;
    validate_team_name(team_b)?;
    if normalize_name(team_a) == normalize_name(team_b) {
        return Err(ValidationError::DuplicateTeamNames);
    }
    Ok(())
}

/// Applies one instruction, issuing as many commands as it takes.
pub fn apply(state: Option<Match>, instruction: &Instruction) -> Result<Option<Match>, StepError> {
    let next = match instruction {
        Instruction::New(config) => {
            if let Some(config) = config {
                validate_match_config(config)?;
            }
            run(state, Command::CreateMatch { config: config.clone() })
        }
        Instruction::Clear => run(state, Command::ClearMatch),
        Instruction::Teams { team_a, team_b } => {
            validate_team_names(team_a, team_b)?;
            run(
                state,
                Command::SetTeams {
                    team_a_name: team_a.clone(),
                    team_b_name: team_b.clone(),
                    team_a_players: Vec::new(),
                    team_b_players: Vec::new(),
                },
            )
        }
        Instruction::Player { team, name } => {
            validate_player_name(name)?;
            run(
                state,
                Command::AddPlayer {
                    team: *team,
                    name: name.clone(),
                },
            )
        }
        Instruction::Toss { winner, decision } => run(
            state,
            Command::SetToss {
                winner: *winner,
                decision: *decision,
            },
        ),
        Instruction::Open { striker, non_striker, bowler } => {
            let m = live(state)?;
            let (batting, _) = sides(&m)?;
            let (m, striker_id, non_striker_id, bowler_id) =
                opening(m, batting, (striker, non_striker, bowler))?;
            run(
                Some(m),
                Command::StartMatch {
                    striker_id,
                    non_striker_id,
                    bowler_id,
                },
            )
        }
        Instruction::Second { striker, non_striker, bowler } => {
            let m = live(state)?;
            // sides swap when the innings starts
            let (_, next_batting) = sides(&m)?;
            let (m, striker_id, non_striker_id, bowler_id) =
                opening(m, next_batting, (striker, non_striker, bowler))?;
            run(
                Some(m),
                Command::StartSecondInnings {
                    striker_id,
                    non_striker_id,
                    bowler_id,
                },
            )
        }
        Instruction::Ball(d) => return delivery(live(state)?, d),
        Instruction::Undo => run(state, Command::UndoLastBall),
        Instruction::Batter(name) => {
            let m = live(state)?;
            let (batting, _) = sides(&m)?;
            let (m, player_id) = ensure_player(m, batting, name)?;
            run(Some(m), Command::SetNewBatter { player_id })
        }
        Instruction::Bowler(name) => {
            let m = live(state)?;
            let (_, bowling) = sides(&m)?;
            let (m, new_bowler_id) = ensure_player(m, bowling, name)?;
            run(Some(m), Command::CompleteOver { new_bowler_id })
        }
        Instruction::Swap => run(state, Command::SwapBatsmen),
        Instruction::End => run(state, Command::CompleteMatch),
    };
    Ok(next?)
}

/// Runs every step, stopping at the first failure.
pub fn run_script(state: Option<Match>, script: &Script) -> Result<Option<Match>, ScriptError> {
    script.steps.iter().try_fold(state, |state, step| {
        apply(state, &step.instruction).map_err(|e| match e {
            StepError::Invalid(source) => ScriptError::Invalid {
                line: step.line,
                source,
            },
            StepError::Scoring(source) => ScriptError::Scoring {
                line: step.line,
                source,
            },
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchStatus, Winner};

    #[test]
    fn test_parse_deliveries() {
        assert_eq!(Delivery::parse("4"), Some(Delivery::Runs(4)));
        assert_eq!(Delivery::parse("7"), None);
        assert_eq!(Delivery::parse("wd"), Some(Delivery::Wide(1)));
        assert_eq!(Delivery::parse("Wd3"), Some(Delivery::Wide(3)));
        assert_eq!(Delivery::parse("wd0"), None);
        assert_eq!(Delivery::parse("nb"), Some(Delivery::NoBall(0)));
        assert_eq!(Delivery::parse("nb4"), Some(Delivery::NoBall(4)));
        assert_eq!(Delivery::parse("b2"), Some(Delivery::Bye(2)));
        assert_eq!(Delivery::parse("lb"), Some(Delivery::LegBye(1)));
        assert_eq!(
            Delivery::parse("W"),
            Some(Delivery::Wicket {
                runs: 0,
                kind: DismissalKind::Bowled,
                fielder: None
            })
        );
        assert_eq!(
            Delivery::parse("W1 run-out Mitchell Starc"),
            Some(Delivery::Wicket {
                runs: 1,
                kind: DismissalKind::RunOut,
                fielder: Some("Mitchell Starc".to_string())
            })
        );
        assert_eq!(Delivery::parse("W timed-out"), None);
        assert_eq!(Delivery::parse("4 4"), None);
    }

    #[test]
    fn test_parse_instructions() {
        assert_eq!(Instruction::parse("  # comment"), Ok(None));
        assert_eq!(
            Instruction::parse("new 20 11"),
            Ok(Some(Instruction::New(Some(MatchConfig {
                total_overs: 20,
                players_per_team: 11,
                match_type: MatchType::Limited,
            }))))
        );
        assert_eq!(
            Instruction::parse("teams Mumbai Indians | Chennai"),
            Ok(Some(Instruction::Teams {
                team_a: "Mumbai Indians".to_string(),
                team_b: "Chennai".to_string()
            }))
        );
        assert_eq!(
            Instruction::parse("toss B bowl"),
            Ok(Some(Instruction::Toss {
                winner: TeamSlot::TeamB,
                decision: TossDecision::Bowl
            }))
        );
        assert_eq!(
            Instruction::parse("bowler Pat Cummins  # change"),
            Ok(Some(Instruction::Bowler("Pat Cummins".to_string())))
        );
        assert!(Instruction::parse("open Rohit, Gill").is_err());
        assert!(Instruction::parse("toss c bat").is_err());
        assert!(Instruction::parse("bogus").is_err());
    }

    #[test]
    fn test_script_reports_line() {
        let script = Script::parse("new\n\n4\n").unwrap();
        match run_script(None, &script) {
            Err(ScriptError::Scoring { line, source }) => {
                assert_eq!(line, 3);
                assert!(matches!(source, ScoringError::InningsNotStarted));
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            Script::parse("new\nfoo bar"),
            Err(ScriptError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_full_match_from_script() {
        let source = "
            new 1 3
            teams Rovers | Wanderers
            toss a bat
            open Ann, Bea, Dee
            4
            W caught Eve
            batter Cat
            2
            1
            wd
            0
            undo
            0
            0
            second Dee, Eve, Ann
            4
            4
            nb
        ";
        let m = run_script(None, &Script::parse(source).unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(m.teams.team_a.len(), 3);
        assert_eq!(m.teams.team_b.len(), 2);

        let first = m.innings.first.as_ref().unwrap();
        assert_eq!((first.score.runs, first.score.wickets, first.score.balls), (8, 1, 6));
        assert_eq!(first.extras.wides, 1);
        let fow = &first.fall_of_wickets[0];
        let eve = m.teams.team_b.player_by_name("eve").unwrap().id;
        assert_eq!(fow.fielder_id, Some(eve));

        assert_eq!(m.status, MatchStatus::Completed);
        let result = m.result.as_ref().unwrap();
        assert_eq!(result.winner, Winner::TeamB);
        assert_eq!(result.margin, "2 wickets");
    }

    fn rejection(source: &str) -> (usize, ValidationError) {
        match run_script(None, &Script::parse(source).unwrap()) {
            Err(ScriptError::Invalid { line, source }) => (line, source),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_script_rejects_bad_setup() {
        assert_eq!(rejection("new 0 1"), (1, ValidationError::OversOutOfRange(0)));
        assert_eq!(rejection("new 20 1"), (1, ValidationError::TeamSizeOutOfRange(1)));
        assert_eq!(
            rejection("new\nteams R | Wanderers"),
            (2, ValidationError::TooShort { field: "team name", min: 2 })
        );
        assert_eq!(
            rejection("new\nteams Rovers | rovers "),
            (2, ValidationError::DuplicateTeamNames)
        );
        assert_eq!(
            rejection("new\nteams Rovers | Wanderers\nplayer a A"),
            (3, ValidationError::TooShort { field: "player name", min: 2 })
        );
    }

    #[test]
    fn test_script_rejects_bad_openers() {
        let setup = "new 1 3\nteams Rovers | Wanderers\ntoss a bat\n";

        let (line, error) = rejection(&format!("{setup}open Ann, ann, Dee"));
        assert_eq!((line, error), (4, ValidationError::SameBatters));

        // short names are caught when a player is onboarded by name
        let (line, error) = rejection(&format!("{setup}open Ann, B, Dee"));
        assert_eq!(line, 4);
        assert!(matches!(error, ValidationError::TooShort { .. }));

        let innings = format!("{setup}open Ann, Bea, Dee\n0\n0\n0\n0\n0\n0\n");
        let (line, error) = rejection(&format!("{innings}second Dee, Dee, Ann"));
        assert_eq!((line, error), (11, ValidationError::SameBatters));
    }

    #[test]
    fn test_script_rejects_ball_to_dismissed_batter() {
        let source = "
            new 2 3
            teams Rovers | Wanderers
            toss a bat
            open Ann, Bea, Dee
            W
            1
        ";
        match run_script(None, &Script::parse(source).unwrap()) {
            Err(ScriptError::Scoring { line, source }) => {
                assert_eq!(line, 7);
                assert!(matches!(source, ScoringError::BatterDismissed { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
