//! Scoring results shared by the statistical model and the rule-based fallback

/// Which scorer produced a result
///
/// The two scorers follow different conventions, so callers that log or
/// threshold scores must know where one came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScoreSource {
    /// Isolation forest decision score: 0 is the boundary, negative is anomalous
    Model,
    /// Fraction of violated bounds in [0, 1]: higher is worse
    RuleBased,
}

/// Outcome of scoring one reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreResult {
    /// Verdict
    pub is_anomaly: bool,
    /// Continuous score, interpreted according to `source`
    pub score: f64,
    /// Scorer that produced the result
    pub source: ScoreSource,
}

impl ScoreResult {
    /// Result from the statistical model
    pub fn from_model(is_anomaly: bool, score: f64) -> Self {
        Self {
            is_anomaly,
            score,
            source: ScoreSource::Model,
        }
    }

    /// Result from the rule-based fallback
    pub fn from_rules(is_anomaly: bool, score: f64) -> Self {
        Self {
            is_anomaly,
            score,
            source: ScoreSource::RuleBased,
        }
    }

    /// Status label used by the API and reports
    pub fn status(&self) -> &'static str {
        if self.is_anomaly {
            "ANOMALY"
        } else {
            "NORMAL"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels() {
        assert_eq!(ScoreResult::from_model(true, -0.2).status(), "ANOMALY");
        assert_eq!(ScoreResult::from_rules(false, 0.0).status(), "NORMAL");
    }

    #[test]
    fn source_is_recorded() {
        assert_eq!(ScoreResult::from_model(false, 0.1).source, ScoreSource::Model);
        assert_eq!(ScoreResult::from_rules(true, 1.0).source, ScoreSource::RuleBased);
    }
}
