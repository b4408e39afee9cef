use std::fmt::Write as _;

use super::award::player_of_match;
use super::format::{dismissal_text, format_date, format_match_score, format_overs, format_rate};
use super::stats::{batting_table, bowling_table, chase_analysis, fall_of_wickets, partnerships};
use crate::models::{record::balls_to_overs, Innings, Match, MatchStatus};

/// One-line state of play: `Lions 45/2 (5.3 overs) | need 30 off 27 (RRR 6.67, moderate)`
pub fn render_status(m: &Match) -> String {
    let Some(innings) = m.current_innings() else {
        return format!("{} vs {} | {}", m.teams.team_a.name, m.teams.team_b.name, m.status);
    };
    let batting = m
        .teams
        .slot_of(innings.batting_team_id)
        .map(|slot| m.teams.get(slot).name.as_str())
        .unwrap_or_default();

    let mut line = format!("{} {}", batting, format_match_score(&innings.score));

    match (&m.status, &m.result) {
        (MatchStatus::Completed, Some(result)) => match result.winner.slot() {
            Some(slot) => {
                let _ = write!(line, " | {} won by {}", m.teams.get(slot).name, result.margin);
            }
            None => {
                let _ = write!(line, " | {}", result.margin);
            }
        },
        (MatchStatus::InningsBreak, _) => {
            if let Some(first) = &m.innings.first {
                let _ = write!(line, " | innings break, target {}", first.score.runs + 1);
            }
        }
        _ => {
            if let Some(chase) = chase_analysis(m) {
                let _ = write!(
                    line,
                    " | need {} off {} (RRR {}, {})",
                    chase.runs_needed,
                    chase.balls_remaining,
                    format_rate(chase.required_run_rate),
                    chase.difficulty
                );
            } else {
                let _ = write!(line, " | RR {}", format_rate(innings.run_rate()));
            }
        }
    }
    line
}

fn render_innings(out: &mut String, m: &Match, innings: &Innings) {
    let Some(slot) = m.teams.slot_of(innings.batting_team_id) else {
        return;
    };
    let batting = m.teams.get(slot);
    let bowling = m.teams.get(slot.opponent());

    let _ = writeln!(out, "{} {}", batting.name, format_match_score(&innings.score));
    for line in batting_table(batting) {
        let dismissal = batting
            .player(line.id)
            .map(|p| dismissal_text(p, bowling))
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| "not out".to_string());
        let _ = writeln!(
            out,
            "  {:<20} {:<22} {:>3} ({:>3})  4s {:<2} 6s {:<2} SR {}",
            line.name,
            dismissal,
            line.runs,
            line.balls,
            line.fours,
            line.sixes,
            format_rate(line.strike_rate)
        );
    }

    let extras = &innings.extras;
    let _ = writeln!(
        out,
        "  Extras {} (wd {}, nb {}, b {}, lb {})",
        extras.total, extras.wides, extras.no_balls, extras.byes, extras.leg_byes
    );

    let wickets = fall_of_wickets(innings, batting, bowling);
    if !wickets.is_empty() {
        let fow: Vec<String> = wickets
            .iter()
            .map(|w| format!("{}-{} ({}, {})", w.runs, w.wickets, w.batter_name, format_overs(w.overs)))
            .collect();
        let _ = writeln!(out, "  FoW: {}", fow.join(", "));
    }

    for p in partnerships(innings, batting).iter().filter(|p| p.balls > 0) {
        let _ = writeln!(
            out,
            "  P{} {} & {}: {} ({})",
            p.wicket_number, p.batter1_name, p.batter2_name, p.runs, p.balls
        );
    }

    for line in bowling_table(bowling) {
        let _ = writeln!(
            out,
            "  {:<20} {:>4} {:>2} {:>3} {:>2}  Econ {}",
            line.name,
            format_overs(balls_to_overs(line.balls)),
            line.maidens,
            line.runs,
            line.wickets,
            format_rate(line.economy_rate)
        );
    }
}

/// Full text scorecard for both innings
pub fn render_scorecard(m: &Match) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} vs {} | {} | {} overs",
        m.teams.team_a.name,
        m.teams.team_b.name,
        format_date(&m.created_at),
        m.config.total_overs
    );

    for innings in [&m.innings.first, &m.innings.second].into_iter().flatten() {
        out.push('\n');
        render_innings(&mut out, m, innings);
    }

    out.push('\n');
    let _ = writeln!(out, "{}", render_status(m));
    if let Some(award) = player_of_match(m) {
        let _ = writeln!(out, "Player of the match: {} {}", award.player.name, award.summary);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{run_script, Script};

    fn scripted(source: &str) -> Match {
        run_script(None, &Script::parse(source).unwrap()).unwrap().unwrap()
    }

    const FIRST_INNINGS: &str = "
        new 1 3
        teams Rovers | Wanderers
        toss a bat
        open Ann, Bea, Dee
        4
        W
        batter Cat
        2
        1
        0
        0
    ";

    #[test]
    fn test_status_lines() {
        let setup = scripted("new\nteams Rovers | Wanderers");
        assert_eq!(render_status(&setup), "Rovers vs Wanderers | setup");

        let live = scripted("new 2 3\nteams Rovers | Wanderers\ntoss a bat\nopen Ann, Bea, Dee\n4\n1");
        assert_eq!(render_status(&live), "Rovers 5/0 (0.2 overs) | RR 15.00");

        let brk = scripted(FIRST_INNINGS);
        assert_eq!(render_status(&brk), "Rovers 7/1 (1.0 overs) | innings break, target 8");

        let chase = scripted(&format!("{FIRST_INNINGS}\nsecond Dee, Eve, Ann\n4\n"));
        assert_eq!(
            render_status(&chase),
            "Wanderers 4/0 (0.1 overs) | need 4 off 5 (RRR 4.80, easy)"
        );

        let done = scripted(&format!("{FIRST_INNINGS}\nsecond Dee, Eve, Ann\n4\n4\n"));
        assert_eq!(render_status(&done), "Wanderers 8/0 (0.2 overs) | Wanderers won by 2 wickets");
    }

    #[test]
    fn test_scorecard_lists_both_innings() {
        let m = scripted(&format!("{FIRST_INNINGS}\nsecond Dee, Eve, Ann\n4\n4\n"));
        let card = render_scorecard(&m);

        assert!(card.starts_with("Rovers vs Wanderers | "));
        assert!(card.contains("Rovers 7/1 (1.0 overs)"));
        assert!(card.contains("Wanderers 8/0 (0.2 overs)"));
        assert!(card.contains("b Dee"));
        assert!(card.contains("not out"));
        assert!(card.contains("FoW: 4-1 (Ann, 0.2)"));
        assert!(card.contains("Player of the match: Dee 8(2) & 1/7"));
    }
}
