use serde::Serialize;

use crate::models::{Match, Player};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerOfMatch {
    pub player: Player,
    pub points: u32,
    /// e.g. `"54(31) & 2/18"`
    pub summary: String,
}

/// Impact points for one player's combined figures.
pub fn impact_points(player: &Player) -> u32 {
    let bat = &player.batting_stats;
    let bowl = &player.bowling_stats;

    let mut points = bat.runs + bat.fours + bat.sixes * 2;
    if bat.balls >= 6 && bat.strike_rate > 120.0 {
        points += 10;
    }
    if bat.runs >= 50 {
        points += 20;
    }
    if bat.runs >= 30 {
        points += 10;
    }

    points += bowl.wickets * 25;
    if bowl.balls >= 6 {
        let economy = bowl.runs as f64 / (bowl.balls as f64 / 6.0);
        if economy < 6.0 {
            points += 15;
        } else if economy < 8.0 {
            points += 5;
        }
    }
    points + bowl.maidens * 10
}

fn summary(player: &Player) -> String {
    let mut parts = Vec::new();
    if player.batting_stats.runs > 0 {
        parts.push(format!(
            "{}({})",
            player.batting_stats.runs, player.batting_stats.balls
        ));
    }
    if player.bowling_stats.wickets > 0 {
        parts.push(format!(
            "{}/{}",
            player.bowling_stats.wickets, player.bowling_stats.runs
        ));
    }
    if parts.is_empty() {
        "Team contribution".to_string()
    } else {
        parts.join(" & ")
    }
}

/// Best performer on the winning side. None without a decided result.
pub fn player_of_match(m: &Match) -> Option<PlayerOfMatch> {
    let slot = m.result.as_ref()?.winner.slot()?;

    let mut best: Option<(&Player, u32)> = None;
    for player in &m.teams.get(slot).players {
        let points = impact_points(player);
        // first highest wins
        if best.map_or(true, |(_, top)| points > top) {
            best = Some((player, points));
        }
    }

    best.map(|(player, points)| PlayerOfMatch {
        player: player.clone(),
        points,
        summary: summary(player),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchResult, MatchStatus, Winner};

    fn decided(winner: Winner) -> Match {
        let mut m = Match::new();
        m.status = MatchStatus::Completed;
        m.result = Some(MatchResult {
            winner,
            margin: "5 runs".to_string(),
        });
        m
    }

    #[test]
    fn test_points_formula() {
        let mut p = Player::new("Hardik");
        for runs in [4, 4, 6, 1, 1, 6, 4, 4, 6, 6, 4, 4] {
            p.record_runs(runs);
        }
        // 50 off 12: 50 + 6 fours + 2*4 sixes + 10 (sr) + 20 + 10
        assert_eq!(impact_points(&p), 104);

        let mut bowler = Player::new("Bumrah");
        for _ in 0..6 {
            bowler.record_delivery(0, false, true);
        }
        bowler.record_delivery(0, true, true);
        bowler.record_maiden_if_applicable(0);
        // 25 wicket + 15 economy + 10 maiden
        assert_eq!(impact_points(&bowler), 50);
    }

    #[test]
    fn test_winner_side_only() {
        let mut m = decided(Winner::TeamB);
        m.teams.team_a.add_player("Star").record_runs(6);
        let hero = m.teams.team_b.add_player("Hero");
        hero.record_runs(2);
        hero.record_delivery(10, true, true);
        m.teams.team_b.add_player("Quiet");

        let award = player_of_match(&m).unwrap();
        assert_eq!(award.player.name, "Hero");
        assert_eq!(award.points, 27);
        assert_eq!(award.summary, "2(1) & 1/10");
    }

    #[test]
    fn test_first_highest_wins_and_fallback_summary() {
        let mut m = decided(Winner::TeamA);
        m.teams.team_a.add_player("First");
        m.teams.team_a.add_player("Second");
        let award = player_of_match(&m).unwrap();
        assert_eq!(award.player.name, "First");
        assert_eq!(award.summary, "Team contribution");
    }

    #[test]
    fn test_no_award_on_tie() {
        let mut m = decided(Winner::Tie);
        m.teams.team_a.add_player("Anyone");
        assert!(player_of_match(&m).is_none());
        assert!(player_of_match(&Match::new()).is_none());
    }
}
