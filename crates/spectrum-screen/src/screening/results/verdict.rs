use serde::{Deserialize, Serialize};

/// Highest attainable behavioural score.
pub const MAX_TOTAL_SCORE: u8 = 10;

/// Classification returned by the scoring collaborator. Consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringVerdict {
    /// `1` when indicators are present, `0` otherwise. Kept wide so out-of-domain values
    /// reach the interpreter instead of failing deserialization.
    pub prediction: i64,
    pub total_score: u8,
    pub probability: f64,
    pub risk_level: String,
    pub recommendations: Vec<String>,
}

/// The collaborator answered, but not with a verdict this client understands.
#[derive(Debug, thiserror::Error)]
pub enum ContractViolation {
    #[error("response body is not a scoring verdict: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("total_score {0} exceeds the maximum of 10")]
    ScoreOutOfRange(u8),
    #[error("probability {0} is outside [0, 1]")]
    ProbabilityOutOfRange(f64),
}

impl ScoringVerdict {
    /// Parse and range-check a response body.
    pub fn from_json(body: &[u8]) -> Result<Self, ContractViolation> {
        let verdict: Self = serde_json::from_slice(body)?;
        verdict.check_ranges()?;
        Ok(verdict)
    }

    fn check_ranges(&self) -> Result<(), ContractViolation> {
        if self.total_score > MAX_TOTAL_SCORE {
            return Err(ContractViolation::ScoreOutOfRange(self.total_score));
        }
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ContractViolation::ProbabilityOutOfRange(self.probability));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collaborator_response() {
        let body = br#"{
            "prediction": 1,
            "total_score": 8,
            "probability": 0.82,
            "risk_level": "High",
            "recommendations": ["Consult a specialist"]
        }"#;

        let verdict = ScoringVerdict::from_json(body).expect("valid verdict");
        assert_eq!(verdict.prediction, 1);
        assert_eq!(verdict.total_score, 8);
        assert_eq!(verdict.risk_level, "High");
        assert_eq!(verdict.recommendations, vec!["Consult a specialist"]);
    }

    #[test]
    fn missing_recommendations_reject_the_whole_verdict() {
        let body = br#"{"prediction":0,"total_score":2,"probability":0.1,"risk_level":"Low"}"#;
        assert!(matches!(
            ScoringVerdict::from_json(body),
            Err(ContractViolation::Malformed(_))
        ));

        let body = br#"{"prediction":0,"total_score":2,"probability":0.1,"risk_level":"Low","recommendations":[]}"#;
        let verdict = ScoringVerdict::from_json(body).expect("empty list is still a verdict");
        assert!(verdict.recommendations.is_empty());
    }

    #[test]
    fn out_of_domain_prediction_still_parses() {
        let body = br#"{"prediction":2,"total_score":5,"probability":0.5,"risk_level":"Medium","recommendations":[]}"#;
        let verdict = ScoringVerdict::from_json(body).expect("shape is valid");
        assert_eq!(verdict.prediction, 2);
    }

    #[test]
    fn shape_and_range_breaches_are_contract_violations() {
        assert!(matches!(
            ScoringVerdict::from_json(br#"{"detail":"Prediction failed"}"#),
            Err(ContractViolation::Malformed(_))
        ));
        assert!(matches!(
            ScoringVerdict::from_json(b"<html>bad gateway</html>"),
            Err(ContractViolation::Malformed(_))
        ));
        assert!(matches!(
            ScoringVerdict::from_json(
                br#"{"prediction":1,"total_score":11,"probability":0.9,"risk_level":"High","recommendations":[]}"#
            ),
            Err(ContractViolation::ScoreOutOfRange(11))
        ));
        assert!(matches!(
            ScoringVerdict::from_json(
                br#"{"prediction":1,"total_score":9,"probability":1.5,"risk_level":"High","recommendations":[]}"#
            ),
            Err(ContractViolation::ProbabilityOutOfRange(_))
        ));
    }
}
