mod ball;
mod innings;
mod match_state;
mod over;
mod partnership;
mod player;
pub mod record;
mod team;

pub use ball::{Ball, DismissalKind, ExtraKind, Wicket};
pub use innings::{Extras, FallOfWicket, Innings, Score};
pub use match_state::{
    ConfigPatch, CurrentState, InningsPair, Match, MatchConfig, MatchResult, MatchStatus,
    MatchType, Teams, Toss, TossDecision, Winner, DEFAULT_PLAYERS_PER_TEAM, DEFAULT_TOTAL_OVERS,
};
pub use over::{Over, BALLS_PER_OVER};
pub use partnership::Partnership;
pub use player::{BattingStats, BowlingStats, Player};
pub use record::Record;
pub use team::{Team, TeamSlot};

pub type PlayerId = uuid::Uuid;
