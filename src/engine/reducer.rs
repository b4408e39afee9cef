//! The command processor.
//!
//! [`reduce`] never touches the snapshot it is given: it clones it, applies the
//! command to the copy and hands the copy back. A failed command returns the error
//! and no snapshot, so the caller's previous snapshot stays valid. That is what
//! makes undo possible without replaying history.

use tracing::{debug, info};

use super::Command;
use crate::error::ScoringError;
use crate::models::{
    Ball, DismissalKind, ExtraKind, Innings, Match, MatchStatus, PlayerId, Team, TeamSlot,
};

/// Applies `command` to a copy of `state`. `Ok(None)` means no active match.
pub fn reduce(state: Option<&Match>, command: Command) -> Result<Option<Match>, ScoringError> {
    debug!(%command, "applying command");

    match command {
        Command::CreateMatch { config } => {
            let mut m = Match::new();
            if let Some(config) = config {
                m.config = config;
            }
            info!(match_id = %m.id, overs = m.config.total_overs, "match created");
            Ok(Some(m))
        }
        Command::LoadMatch(m) => Ok(Some(*m)),
        Command::ClearMatch => Ok(None),
        command => {
            let mut m = state.ok_or(ScoringError::NoActiveMatch)?.clone();
            apply(&mut m, command)?;
            Ok(Some(m))
        }
    }
}

fn apply(m: &mut Match, command: Command) -> Result<(), ScoringError> {
    match command {
        Command::Configure(patch) => m.configure(&patch),
        Command::SetTeams {
            team_a_name,
            team_b_name,
            team_a_players,
            team_b_players,
        } => {
            m.set_team_names(team_a_name, team_b_name)?;
            for name in team_a_players {
                add_player(m, TeamSlot::TeamA, name)?;
            }
            for name in team_b_players {
                add_player(m, TeamSlot::TeamB, name)?;
            }
            Ok(())
        }
        Command::SetToss { winner, decision } => m.record_toss(winner, decision),
        Command::StartMatch {
            striker_id,
            non_striker_id,
            bowler_id,
        } => m.begin_match(striker_id, non_striker_id, bowler_id),
        Command::AddBall(ball) => add_ball(m, ball),
        Command::UndoLastBall => undo_last_ball(m),
        Command::AddWicket {
            dismissal_kind,
            bowler_id,
            fielder_id,
            new_batter_id,
        } => add_wicket(m, dismissal_kind, bowler_id, fielder_id, new_batter_id),
        Command::CompleteOver { new_bowler_id } => complete_over(m, new_bowler_id),
        Command::StartSecondInnings {
            striker_id,
            non_striker_id,
            bowler_id,
        } => m.begin_second_innings(striker_id, non_striker_id, bowler_id),
        Command::CompleteMatch => {
            m.ensure_status("complete match", &[MatchStatus::Live, MatchStatus::InningsBreak])?;
            if m.innings.second.is_none() {
                return Err(ScoringError::MissingInnings);
            }
            m.complete_match();
            Ok(())
        }
        Command::SetNewBatter { player_id } => set_new_batter(m, player_id),
        Command::SwapBatsmen => {
            m.ensure_status("swap batsmen", &[MatchStatus::Live])?;
            m.swap_batsmen();
            Ok(())
        }
        Command::EditPlayerName {
            team,
            player_id,
            new_name,
        } => edit_player_name(m, team, player_id, new_name),
        Command::AddPlayer { team, name } => add_player(m, team, name).map(|_| ()),
        Command::RemovePlayer { team, player_id } => {
            m.ensure_status("remove player", &[MatchStatus::Setup])?;
            m.teams
                .get_mut(team)
                .remove_player(player_id)
                .map(|_| ())
                .ok_or(ScoringError::PlayerNotFound { id: player_id, team })
        }
        Command::CreateMatch { .. } | Command::LoadMatch(_) | Command::ClearMatch => Ok(()),
    }
}

/// The innings being scored and both rosters, borrowed together.
struct ScoringParts<'a> {
    innings: &'a mut Innings,
    batting: &'a mut Team,
    bowling: &'a mut Team,
    batting_slot: TeamSlot,
}

fn scoring_parts(m: &mut Match) -> Result<ScoringParts<'_>, ScoringError> {
    let batting_slot = m
        .current_state
        .batting_team
        .ok_or(ScoringError::InningsNotStarted)?;
    let innings = match m.current_innings {
        1 => m.innings.first.as_mut(),
        _ => m.innings.second.as_mut(),
    }
    .ok_or(ScoringError::InningsNotStarted)?;
    let (batting, bowling) = m.teams.split_mut(batting_slot);
    Ok(ScoringParts {
        innings,
        batting,
        bowling,
        batting_slot,
    })
}

/// Runs charged against the bowler: byes and leg-byes are not.
fn bowler_charge(ball: &Ball) -> u32 {
    match ball.extra {
        Some(ExtraKind::Bye | ExtraKind::LegBye) => 0,
        _ => ball.total_runs(),
    }
}

/// Strike changes on an odd total (no-ball penalty included) unless the batter is out.
fn rotates_strike(ball: &Ball) -> bool {
    ball.total_runs() % 2 == 1 && !ball.is_wicket()
}

fn add_ball(m: &mut Match, ball: Ball) -> Result<(), ScoringError> {
    m.ensure_status("add ball", &[MatchStatus::Live])?;
    if ball.is_wide() && ball.runs == 0 {
        return Err(ScoringError::InvalidDelivery(
            "a wide carries at least the one-run penalty".to_string(),
        ));
    }

    let parts = scoring_parts(m)?;
    match parts.batting.player(ball.batter_id) {
        None => {
            return Err(ScoringError::PlayerNotFound {
                id: ball.batter_id,
                team: parts.batting_slot,
            })
        }
        Some(batter) if batter.batting_stats.is_out => {
            return Err(ScoringError::BatterDismissed { id: ball.batter_id })
        }
        Some(_) => {}
    }
    if parts.bowling.player(ball.bowler_id).is_none() {
        return Err(ScoringError::PlayerNotFound {
            id: ball.bowler_id,
            team: parts.batting_slot.opponent(),
        });
    }

    parts.innings.add_ball(ball.clone())?;

    if let Some(batter) = parts.batting.player_mut(ball.batter_id) {
        match ball.extra {
            None => batter.record_runs(ball.runs),
            Some(ExtraKind::NoBall) if ball.runs > 0 => batter.record_no_ball_runs(ball.runs),
            _ => {}
        }
        if let Some(wicket) = ball.wicket {
            batter.mark_dismissed(wicket.kind, Some(ball.bowler_id), wicket.fielder_id);
        }
    }

    if let Some(bowler) = parts.bowling.player_mut(ball.bowler_id) {
        bowler.record_delivery(bowler_charge(&ball), ball.is_wicket(), ball.is_legal_delivery());
    }

    if rotates_strike(&ball) {
        m.swap_batsmen();
    }

    debug!(token = %ball.display_token(), "ball recorded");

    if m.is_innings_complete() {
        m.complete_innings();
    }
    Ok(())
}

fn undo_last_ball(m: &mut Match) -> Result<(), ScoringError> {
    m.ensure_status("undo last ball", &[MatchStatus::Live, MatchStatus::InningsBreak])?;

    let parts = scoring_parts(m)?;

    // An empty over after a closed one means `CompleteOver` sealed the boundary.
    let sealed = match (&parts.innings.current_over, parts.innings.last_over()) {
        (Some(open), Some(last)) if open.is_empty() => Some((last.bowler_id, last.is_maiden)),
        _ => None,
    };

    let ball = parts
        .innings
        .remove_last_ball()
        .ok_or(ScoringError::NothingToUndo)?;

    if let Some((bowler_id, true)) = sealed {
        if let Some(bowler) = parts.bowling.player_mut(bowler_id) {
            bowler.revert_maiden();
        }
    }

    if let Some(batter) = parts.batting.player_mut(ball.batter_id) {
        match ball.extra {
            None => batter.revert_runs(ball.runs, true),
            Some(ExtraKind::NoBall) if ball.runs > 0 => batter.revert_runs(ball.runs, false),
            _ => {}
        }
        if ball.is_wicket() {
            batter.clear_dismissal();
        }
    }

    if let Some(bowler) = parts.bowling.player_mut(ball.bowler_id) {
        bowler.revert_delivery(bowler_charge(&ball), ball.is_wicket(), ball.is_legal_delivery());
    }

    if let Some((bowler_id, _)) = sealed {
        m.swap_batsmen();
        m.set_new_bowler(bowler_id);
    }
    if rotates_strike(&ball) {
        m.swap_batsmen();
    }

    if ball.is_wicket() {
        let state = &mut m.current_state;
        let at_crease = state.striker_id == Some(ball.batter_id)
            || state.non_striker_id == Some(ball.batter_id);
        if !at_crease {
            state.striker_id = Some(ball.batter_id);
        }
    }

    if m.status == MatchStatus::InningsBreak {
        info!(match_id = %m.id, "innings reopened by undo");
    }
    m.status = MatchStatus::Live;

    debug!(token = %ball.display_token(), "ball undone");
    Ok(())
}

fn add_wicket(
    m: &mut Match,
    kind: DismissalKind,
    bowler_id: PlayerId,
    fielder_id: Option<PlayerId>,
    new_batter_id: PlayerId,
) -> Result<(), ScoringError> {
    m.ensure_status("add wicket", &[MatchStatus::Live])?;
    let striker_id = m
        .current_state
        .striker_id
        .ok_or(ScoringError::InningsNotStarted)?;
    let non_striker_id = m
        .current_state
        .non_striker_id
        .ok_or(ScoringError::InningsNotStarted)?;

    let parts = scoring_parts(m)?;
    if parts.batting.player(new_batter_id).is_none() {
        return Err(ScoringError::PlayerNotFound {
            id: new_batter_id,
            team: parts.batting_slot,
        });
    }
    if let Some(out) = parts.batting.player_mut(striker_id) {
        out.mark_dismissed(kind, Some(bowler_id), fielder_id);
    }

    let innings = parts.innings;
    if let Some(mut ended) = innings.current_partnership.take() {
        ended.end(innings.score.runs);
        innings.partnerships.push(ended);
    }
    innings.start_partnership(new_batter_id, non_striker_id);

    m.set_new_batter(new_batter_id);
    Ok(())
}

fn complete_over(m: &mut Match, new_bowler_id: PlayerId) -> Result<(), ScoringError> {
    m.ensure_status("complete over", &[MatchStatus::Live])?;

    let parts = scoring_parts(m)?;
    if parts.bowling.player(new_bowler_id).is_none() {
        return Err(ScoringError::PlayerNotFound {
            id: new_bowler_id,
            team: parts.batting_slot.opponent(),
        });
    }

    let open = parts
        .innings
        .current_over
        .as_ref()
        .map(|over| (over.number, over.is_empty()));
    match open {
        Some((number, true)) => return Err(ScoringError::OverAlreadyInProgress { number }),
        Some(_) => {
            parts.innings.complete_over();
        }
        None => {}
    }

    let finished = parts
        .innings
        .last_over()
        .ok_or(ScoringError::NoOverInProgress)?;
    if finished.is_complete {
        let runs = finished.runs;
        if let Some(bowler) = parts.bowling.player_mut(finished.bowler_id) {
            bowler.record_maiden_if_applicable(runs);
        }
    }

    parts.innings.start_new_over(new_bowler_id)?;
    m.set_new_bowler(new_bowler_id);
    m.swap_batsmen();
    Ok(())
}

fn set_new_batter(m: &mut Match, player_id: PlayerId) -> Result<(), ScoringError> {
    m.ensure_status("set new batter", &[MatchStatus::Live])?;
    let non_striker_id = m
        .current_state
        .non_striker_id
        .ok_or(ScoringError::InningsNotStarted)?;

    let parts = scoring_parts(m)?;
    match parts.batting.player(player_id) {
        None => {
            return Err(ScoringError::PlayerNotFound {
                id: player_id,
                team: parts.batting_slot,
            })
        }
        Some(batter) if batter.batting_stats.is_out => {
            return Err(ScoringError::BatterDismissed { id: player_id })
        }
        Some(_) => {}
    }
    if parts.innings.current_partnership.is_none() {
        parts.innings.start_partnership(player_id, non_striker_id);
    }

    m.set_new_batter(player_id);
    Ok(())
}

fn edit_player_name(
    m: &mut Match,
    slot: TeamSlot,
    player_id: PlayerId,
    new_name: String,
) -> Result<(), ScoringError> {
    let team = m.teams.get_mut(slot);
    if let Some(existing) = team.player_by_name(&new_name) {
        if existing.id != player_id {
            return Err(ScoringError::DuplicatePlayerName {
                name: new_name,
                team: team.name.clone(),
            });
        }
    }
    let player = team
        .player_mut(player_id)
        .ok_or(ScoringError::PlayerNotFound { id: player_id, team: slot })?;
    player.name = new_name;
    Ok(())
}

fn add_player(m: &mut Match, slot: TeamSlot, name: String) -> Result<PlayerId, ScoringError> {
    m.ensure_status(
        "add player",
        &[MatchStatus::Setup, MatchStatus::Live, MatchStatus::InningsBreak],
    )?;
    let team = m.teams.get_mut(slot);
    if team.player_by_name(&name).is_some() {
        return Err(ScoringError::DuplicatePlayerName {
            name,
            team: team.name.clone(),
        });
    }
    Ok(team.add_player(name).id)
}
