use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PlayerId, Record};

/// How a batter was dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DismissalKind {
    Bowled,
    Caught,
    Lbw,
    RunOut,
    Stumped,
    HitWicket,
    RetiredHurt,
    RetiredOut,
}

impl DismissalKind {
    pub const ALL: [DismissalKind; 8] = [
        DismissalKind::Bowled,
        DismissalKind::Caught,
        DismissalKind::Lbw,
        DismissalKind::RunOut,
        DismissalKind::Stumped,
        DismissalKind::HitWicket,
        DismissalKind::RetiredHurt,
        DismissalKind::RetiredOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DismissalKind::Bowled => "bowled",
            DismissalKind::Caught => "caught",
            DismissalKind::Lbw => "lbw",
            DismissalKind::RunOut => "run-out",
            DismissalKind::Stumped => "stumped",
            DismissalKind::HitWicket => "hit-wicket",
            DismissalKind::RetiredHurt => "retired-hurt",
            DismissalKind::RetiredOut => "retired-out",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl std::fmt::Display for DismissalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs not credited to the batter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtraKind {
    Wide,
    NoBall,
    Bye,
    LegBye,
}

/// Wicket details attached to a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wicket {
    pub kind: DismissalKind,
    pub fielder_id: Option<PlayerId>,
}

/// One delivery. At most one extra kind applies, so wide/no-ball/bye/leg-bye
/// can never be combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BallRecord", into = "BallRecord")]
pub struct Ball {
    pub timestamp: DateTime<Utc>,
    pub batter_id: PlayerId,
    pub bowler_id: PlayerId,
    pub runs: u32,
    pub wicket: Option<Wicket>,
    pub extra: Option<ExtraKind>,
}

impl Ball {
    pub fn new(batter_id: PlayerId, bowler_id: PlayerId) -> Self {
        Self {
            timestamp: Utc::now(),
            batter_id,
            bowler_id,
            runs: 0,
            wicket: None,
            extra: None,
        }
    }

    pub fn set_runs(&mut self, runs: u32) {
        self.runs = runs;
    }

    pub fn set_wicket(&mut self, kind: DismissalKind, fielder_id: Option<PlayerId>) {
        self.wicket = Some(Wicket { kind, fielder_id });
    }

    /// Runs include the one-run wide penalty.
    pub fn set_wide(&mut self, runs: u32) {
        self.extra = Some(ExtraKind::Wide);
        self.runs = runs;
    }

    /// Runs are those off the bat; the one-run penalty is added by the scorer.
    pub fn set_no_ball(&mut self, runs: u32) {
        self.extra = Some(ExtraKind::NoBall);
        self.runs = runs;
    }

    pub fn set_bye(&mut self, runs: u32) {
        self.extra = Some(ExtraKind::Bye);
        self.runs = runs;
    }

    pub fn set_leg_bye(&mut self, runs: u32) {
        self.extra = Some(ExtraKind::LegBye);
        self.runs = runs;
    }

    pub fn with_runs(mut self, runs: u32) -> Self {
        self.set_runs(runs);
        self
    }

    pub fn with_wicket(mut self, kind: DismissalKind, fielder_id: Option<PlayerId>) -> Self {
        self.set_wicket(kind, fielder_id);
        self
    }

    pub fn with_extra(mut self, extra: ExtraKind, runs: u32) -> Self {
        self.extra = Some(extra);
        self.runs = runs;
        self
    }

    pub fn is_wicket(&self) -> bool {
        self.wicket.is_some()
    }

    pub fn is_wide(&self) -> bool {
        self.extra == Some(ExtraKind::Wide)
    }

    pub fn is_no_ball(&self) -> bool {
        self.extra == Some(ExtraKind::NoBall)
    }

    pub fn is_bye(&self) -> bool {
        self.extra == Some(ExtraKind::Bye)
    }

    pub fn is_leg_bye(&self) -> bool {
        self.extra == Some(ExtraKind::LegBye)
    }

    /// Counts toward the six-ball over and the batter's balls faced.
    pub fn is_legal_delivery(&self) -> bool {
        !self.is_wide() && !self.is_no_ball()
    }

    pub fn is_boundary(&self) -> bool {
        self.runs == 4 || self.runs == 6
    }

    /// Runs added to the team total, including the no-ball penalty.
    pub fn total_runs(&self) -> u32 {
        if self.is_no_ball() {
            self.runs.saturating_add(1)
        } else {
            self.runs
        }
    }

    pub fn display_token(&self) -> String {
        if self.is_wicket() {
            return "W".to_string();
        }
        match self.extra {
            Some(ExtraKind::Wide) => format!("{}wd", self.runs),
            Some(ExtraKind::NoBall) if self.runs > 0 => format!("{}+nb", self.runs),
            Some(ExtraKind::NoBall) => "nb".to_string(),
            Some(ExtraKind::Bye) => format!("{}b", self.runs),
            Some(ExtraKind::LegBye) => format!("{}lb", self.runs),
            None => self.runs.to_string(),
        }
    }
}

impl Record for Ball {
    fn refresh_derived(&mut self) {}
}

/// Flat storage shape with one flag per extra kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BallRecord {
    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
    #[serde(alias = "batsmanId")]
    batter_id: PlayerId,
    bowler_id: PlayerId,
    #[serde(default)]
    runs: u32,
    #[serde(default)]
    is_wicket: bool,
    #[serde(default, alias = "wicketType")]
    dismissal_kind: Option<DismissalKind>,
    #[serde(default)]
    fielder_id: Option<PlayerId>,
    #[serde(default)]
    is_wide: bool,
    #[serde(default)]
    is_no_ball: bool,
    #[serde(default)]
    is_bye: bool,
    #[serde(default)]
    is_leg_bye: bool,
}

impl TryFrom<BallRecord> for Ball {
    type Error = String;

    fn try_from(record: BallRecord) -> Result<Self, Self::Error> {
        let flags = [
            (record.is_wide, ExtraKind::Wide),
            (record.is_no_ball, ExtraKind::NoBall),
            (record.is_bye, ExtraKind::Bye),
            (record.is_leg_bye, ExtraKind::LegBye),
        ];
        let mut set = flags.iter().filter(|(on, _)| *on).map(|(_, kind)| *kind);
        let extra = set.next();
        if set.next().is_some() {
            return Err("a delivery carries at most one extra kind".to_string());
        }

        let wicket = match (record.is_wicket, record.dismissal_kind) {
            (false, _) => None,
            (true, Some(kind)) => Some(Wicket {
                kind,
                fielder_id: record.fielder_id,
            }),
            (true, None) => return Err("wicket without a dismissal kind".to_string()),
        };

        Ok(Ball {
            timestamp: record.timestamp,
            batter_id: record.batter_id,
            bowler_id: record.bowler_id,
            runs: record.runs,
            wicket,
            extra,
        })
    }
}

impl From<Ball> for BallRecord {
    fn from(ball: Ball) -> Self {
        BallRecord {
            timestamp: ball.timestamp,
            batter_id: ball.batter_id,
            bowler_id: ball.bowler_id,
            runs: ball.runs,
            is_wicket: ball.wicket.is_some(),
            dismissal_kind: ball.wicket.map(|w| w.kind),
            fielder_id: ball.wicket.and_then(|w| w.fielder_id),
            is_wide: ball.extra == Some(ExtraKind::Wide),
            is_no_ball: ball.extra == Some(ExtraKind::NoBall),
            is_bye: ball.extra == Some(ExtraKind::Bye),
            is_leg_bye: ball.extra == Some(ExtraKind::LegBye),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ball() -> Ball {
        Ball::new(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_display_tokens() {
        assert_eq!(ball().with_runs(0).display_token(), "0");
        assert_eq!(ball().with_runs(4).display_token(), "4");
        assert_eq!(ball().with_wicket(DismissalKind::Bowled, None).display_token(), "W");
        assert_eq!(ball().with_extra(ExtraKind::Wide, 2).display_token(), "2wd");
        assert_eq!(ball().with_extra(ExtraKind::NoBall, 0).display_token(), "nb");
        assert_eq!(ball().with_extra(ExtraKind::NoBall, 1).display_token(), "1+nb");
        assert_eq!(ball().with_extra(ExtraKind::Bye, 1).display_token(), "1b");
        assert_eq!(ball().with_extra(ExtraKind::LegBye, 1).display_token(), "1lb");
    }

    #[test]
    fn test_legality() {
        assert!(ball().with_runs(2).is_legal_delivery());
        assert!(ball().with_extra(ExtraKind::Bye, 2).is_legal_delivery());
        assert!(ball().with_extra(ExtraKind::LegBye, 1).is_legal_delivery());
        assert!(!ball().with_extra(ExtraKind::Wide, 1).is_legal_delivery());
        assert!(!ball().with_extra(ExtraKind::NoBall, 4).is_legal_delivery());
    }

    #[test]
    fn test_total_runs_adds_no_ball_penalty() {
        assert_eq!(ball().with_extra(ExtraKind::NoBall, 4).total_runs(), 5);
        assert_eq!(ball().with_extra(ExtraKind::Wide, 1).total_runs(), 1);
        assert!(ball().with_extra(ExtraKind::NoBall, 4).is_boundary());
        assert_eq!(ball().with_extra(ExtraKind::NoBall, u32::MAX).total_runs(), u32::MAX);
    }

    #[test]
    fn test_encoding_uses_flat_flags() {
        let b = ball()
            .with_extra(ExtraKind::Wide, 1)
            .with_wicket(DismissalKind::Stumped, None);
        let value = b.encode().unwrap();
        assert_eq!(value["isWide"], true);
        assert_eq!(value["isNoBall"], false);
        assert_eq!(value["isWicket"], true);
        assert_eq!(value["dismissalKind"], "stumped");
        assert_eq!(Ball::decode(value).unwrap(), b);
    }

    #[test]
    fn test_decode_rejects_combined_extras() {
        let mut value = ball().with_extra(ExtraKind::NoBall, 1).encode().unwrap();
        value["isBye"] = serde_json::Value::Bool(true);
        assert!(Ball::decode(value).is_err());
    }

    #[test]
    fn test_decode_accepts_legacy_field_names() {
        let batter = Uuid::new_v4();
        let value = serde_json::json!({
            "batsmanId": batter,
            "bowlerId": Uuid::new_v4(),
            "runs": 0,
            "isWicket": true,
            "wicketType": "caught",
            "fielderId": null,
        });
        let b = Ball::decode(value).unwrap();
        assert_eq!(b.batter_id, batter);
        assert_eq!(b.wicket.map(|w| w.kind), Some(DismissalKind::Caught));
        assert_eq!(b.extra, None);
    }

    #[test]
    fn test_parse_dismissal_kind() {
        assert_eq!(DismissalKind::parse("Run-Out"), Some(DismissalKind::RunOut));
        assert_eq!(DismissalKind::parse("lbw"), Some(DismissalKind::Lbw));
        assert_eq!(DismissalKind::parse("timed-out"), None);
    }
}
