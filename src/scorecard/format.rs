use chrono::{DateTime, Utc};

use crate::models::{record::balls_to_overs, BowlingStats, DismissalKind, Player, Score, Team};

/// `5.4`, `0.0`
pub fn format_overs(overs: f64) -> String {
    format!("{overs:.1}")
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}")
}

/// `O-M-R-W`, e.g. `4.0-1-22-3`
pub fn format_bowling_figures(stats: &BowlingStats) -> String {
    format!(
        "{}-{}-{}-{}",
        format_overs(balls_to_overs(stats.balls)),
        stats.maidens,
        stats.runs,
        stats.wickets
    )
}

/// `150/5 (10.0 overs)`
pub fn format_match_score(score: &Score) -> String {
    format!(
        "{}/{} ({} overs)",
        score.runs,
        score.wickets,
        format_overs(score.overs)
    )
}

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%b %d, %Y").to_string()
}

/// Capitalises each word: `"virat KOHLI"` -> `"Virat Kohli"`
pub fn format_player_name(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Scorecard dismissal column; empty for a batter still in.
pub fn dismissal_text(player: &Player, bowling: &Team) -> String {
    let bat = &player.batting_stats;
    let Some(kind) = bat.dismissal_kind.filter(|_| bat.is_out) else {
        return String::new();
    };
    let bowler = bat
        .dismissed_by
        .and_then(|id| bowling.player(id))
        .map(|p| p.name.as_str())
        .unwrap_or_default();

    match kind {
        DismissalKind::Bowled => format!("b {bowler}"),
        DismissalKind::Caught => format!("c ... b {bowler}"),
        DismissalKind::Lbw => format!("lbw b {bowler}"),
        DismissalKind::RunOut => "run out".to_string(),
        DismissalKind::Stumped => format!("st ... b {bowler}"),
        DismissalKind::HitWicket => format!("hit wkt b {bowler}"),
        DismissalKind::RetiredHurt => "retired hurt".to_string(),
        DismissalKind::RetiredOut => "retired out".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_numbers() {
        assert_eq!(format_overs(0.0), "0.0");
        assert_eq!(format_overs(9.4), "9.4");
        assert_eq!(format_rate(12.0), "12.00");

        let stats = BowlingStats {
            balls: 23,
            maidens: 1,
            runs: 31,
            wickets: 2,
            ..Default::default()
        };
        assert_eq!(format_bowling_figures(&stats), "3.5-1-31-2");

        let score = Score {
            runs: 150,
            wickets: 5,
            overs: 10.0,
            balls: 60,
        };
        assert_eq!(format_match_score(&score), "150/5 (10.0 overs)");
    }

    #[test]
    fn test_names_and_dates() {
        assert_eq!(format_player_name("virat KOHLI"), "Virat Kohli");
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(format_date(&at), "Mar 07, 2024");
    }

    #[test]
    fn test_dismissal_text() {
        let mut bowling = Team::new("Australia");
        let starc = bowling.add_player("Starc").id;
        let mut batter = Player::new("Rohit");
        assert_eq!(dismissal_text(&batter, &bowling), "");

        batter.mark_dismissed(DismissalKind::Caught, Some(starc), None);
        assert_eq!(dismissal_text(&batter, &bowling), "c ... b Starc");

        batter.mark_dismissed(DismissalKind::RunOut, Some(starc), None);
        assert_eq!(dismissal_text(&batter, &bowling), "run out");

        batter.mark_dismissed(DismissalKind::Lbw, None, None);
        assert_eq!(dismissal_text(&batter, &bowling), "lbw b ");
    }
}
