use super::rules::{
    normalize_name, validate_no_duplicate_players, validate_overs, validate_player_name,
    validate_team_name, validate_team_size,
};
use super::ValidationError;
use crate::models::{DismissalKind, MatchConfig, PlayerId, Team};

pub fn validate_match_config(config: &MatchConfig) -> Result<(), ValidationError> {
    validate_overs(config.total_overs)?;
    validate_team_size(config.players_per_team as usize)
}

/// Every problem with one team's name and roster
pub fn validate_team_setup<S: AsRef<str>>(name: &str, players: &[S]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if let Err(e) = validate_team_name(name) {
        errors.push(e);
    }
    if let Err(e) = validate_team_size(players.len()) {
        errors.push(e);
    }
    errors.extend(
        players
            .iter()
            .filter_map(|p| validate_player_name(p.as_ref()).err()),
    );
    errors
}

pub fn validate_both_teams<S: AsRef<str>>(
    (name_a, players_a): (&str, &[S]),
    (name_b, players_b): (&str, &[S]),
) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_team_setup(name_a, players_a);
    errors.extend(validate_team_setup(name_b, players_b));

    if normalize_name(name_a) == normalize_name(name_b) {
        errors.push(ValidationError::DuplicateTeamNames);
    }
    if let Err(e) = validate_no_duplicate_players(players_a, players_b) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_opening_players(
    striker: PlayerId,
    non_striker: PlayerId,
    bowler: PlayerId,
    batting: &Team,
    bowling: &Team,
) -> Result<(), ValidationError> {
    if striker == non_striker {
        return Err(ValidationError::SameBatters);
    }
    if batting.player(striker).is_none() || batting.player(non_striker).is_none() {
        return Err(ValidationError::NotInTeam { role: "batter" });
    }
    if bowling.player(bowler).is_none() {
        return Err(ValidationError::NotInTeam { role: "bowler" });
    }
    Ok(())
}

pub fn validate_wicket(
    kind: DismissalKind,
    fielder: Option<PlayerId>,
    new_batter: Option<PlayerId>,
    batting: &Team,
    bowling: &Team,
) -> Result<(), ValidationError> {
    if batting.available_batters().is_empty() {
        return Err(ValidationError::NoBattersAvailable);
    }
    if new_batter.is_some_and(|id| batting.player(id).is_none()) {
        return Err(ValidationError::NotInTeam { role: "batter" });
    }
    let needs_fielder = matches!(
        kind,
        DismissalKind::Caught | DismissalKind::RunOut | DismissalKind::Stumped
    );
    if needs_fielder && fielder.is_some_and(|id| bowling.player(id).is_none()) {
        return Err(ValidationError::NotInTeam { role: "fielder" });
    }
    Ok(())
}

/// Rejects a bowler taking consecutive overs. The scoring flow does not enforce
/// this; hosts decide whether to.
pub fn validate_new_bowler(
    bowler: PlayerId,
    previous: Option<PlayerId>,
    bowling: &Team,
) -> Result<(), ValidationError> {
    if previous == Some(bowler) {
        return Err(ValidationError::ConsecutiveOvers);
    }
    if bowling.player(bowler).is_none() {
        return Err(ValidationError::NotInTeam { role: "bowler" });
    }
    Ok(())
}
