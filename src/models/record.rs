use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Plain-structure encoding shared by every persisted entity.
///
/// Decoding always recomputes derived fields from their inputs, so an encoding
/// written by an older schema (or with stale rates) comes back consistent with
/// the live scoring rules.
pub trait Record: Serialize + DeserializeOwned + Sized {
    /// Recompute every field that is a pure function of other stored fields.
    fn refresh_derived(&mut self);

    fn encode(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn decode(value: Value) -> serde_json::Result<Self> {
        let mut record: Self = serde_json::from_value(value)?;
        record.refresh_derived();
        Ok(record)
    }

    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut record: Self = serde_json::from_str(json)?;
        record.refresh_derived();
        Ok(record)
    }
}

/// Round to two decimal places, the precision every rate is reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Runs per six legal balls, rounded; zero before the first legal ball.
pub fn runs_per_over(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    round2(runs as f64 / (balls as f64 / 6.0))
}

/// Cricket overs notation: completed overs plus legal balls as the first decimal
/// (27 balls -> 4.3). Not a true decimal.
pub fn balls_to_overs(balls: u32) -> f64 {
    (balls / 6) as f64 + (balls % 6) as f64 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balls_to_overs() {
        assert_eq!(balls_to_overs(0), 0.0);
        assert_eq!(balls_to_overs(5), 0.5);
        assert_eq!(balls_to_overs(6), 1.0);
        assert_eq!(balls_to_overs(58), 9.4);
    }

    #[test]
    fn test_runs_per_over() {
        assert_eq!(runs_per_over(0, 0), 0.0);
        assert_eq!(runs_per_over(10, 6), 10.0);
        assert_eq!(runs_per_over(7, 4), 10.5);
        assert_eq!(runs_per_over(120, 58), 12.41);
    }
}
