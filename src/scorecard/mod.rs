//! Read-only views derived from a match: tables, summaries, awards, text scorecards
//! and share links.

mod award;
mod format;
mod render;
mod share;
mod stats;

pub use award::{impact_points, player_of_match, PlayerOfMatch};
pub use format::{
    dismissal_text, format_bowling_figures, format_date, format_match_score, format_overs,
    format_player_name, format_rate,
};
pub use render::{render_scorecard, render_status};
pub use share::{
    decode_shared, encode_match, scorecard, share_link, BatterRow, BowlerRow, ShareError,
    SharedAward, SharedInnings, SharedResult, SharedScorecard, WicketRow, SHARE_VERSION,
};
pub use stats::{
    analyze_target, balls_remaining, batting_table, bowling_table, chase_analysis,
    fall_of_wickets, match_summary, partnerships, projected_score, required_run_rate,
    top_scorers, top_wicket_takers, BattingLine, BowlingLine, Difficulty, InningsSummary,
    MatchSummary, PartnershipLine, TargetAnalysis, WicketLine,
};
