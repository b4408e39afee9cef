use std::collections::HashSet;

use super::ValidationError;

pub const MAX_OVERS: u32 = 50;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 15;

const TEAM_NAME_LEN: (usize, usize) = (2, 30);
const PLAYER_NAME_LEN: (usize, usize) = (2, 25);

/// Lowercased and trimmed, the form names are compared in
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn validate_length(field: &'static str, name: &str, (min, max): (usize, usize)) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(ValidationError::Required { field });
    }
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    validate_length("team name", name, TEAM_NAME_LEN)
}

pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    validate_length("player name", name, PLAYER_NAME_LEN)
}

pub fn validate_overs(overs: u32) -> Result<(), ValidationError> {
    if overs == 0 || overs > MAX_OVERS {
        return Err(ValidationError::OversOutOfRange(overs));
    }
    Ok(())
}

pub fn validate_team_size(size: usize) -> Result<(), ValidationError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&size) {
        return Err(ValidationError::TeamSizeOutOfRange(size));
    }
    Ok(())
}

/// Runs off a single delivery
pub fn validate_runs(runs: u32) -> Result<(), ValidationError> {
    if runs > 6 {
        return Err(ValidationError::RunsOutOfRange(runs));
    }
    Ok(())
}

/// No name may appear twice across both rosters, ignoring case and padding.
pub fn validate_no_duplicate_players<S: AsRef<str>>(
    team_a: &[S],
    team_b: &[S],
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for name in team_a.iter().chain(team_b) {
        if !seen.insert(normalize_name(name.as_ref())) {
            return Err(ValidationError::DuplicatePlayer(name.as_ref().trim().to_string()));
        }
    }
    Ok(())
}
