use serde::{Serialize, Serializer};

use super::verdict::{ScoringVerdict, MAX_TOTAL_SCORE};

pub const DISCLAIMER: &str = "This is a screening tool only and not a diagnostic instrument. \
A formal diagnosis requires comprehensive evaluation by qualified healthcare professionals \
including licensed psychologists, psychiatrists, or developmental pediatricians.";

/// Score bands printed under the score bar.
pub const SCORE_LEGEND: [(&str, &str); 3] = [
    ("0-3", "Low likelihood"),
    ("4-6", "Moderate likelihood"),
    ("7-10", "High likelihood"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InterpretError {
    #[error("prediction value {0} is outside the binary domain")]
    UnknownPredictionValue(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionColor {
    ElevatedIndicator,
    LowLikelihood,
}

impl PredictionColor {
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::ElevatedIndicator => "text-orange-600 bg-orange-100",
            Self::LowLikelihood => "text-green-600 bg-green-100",
        }
    }

    pub const fn phrase(self) -> &'static str {
        match self {
            Self::ElevatedIndicator => "Indicators suggest possible ASD traits",
            Self::LowLikelihood => "Low likelihood of ASD traits",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskColor {
    Low,
    Medium,
    High,
    Neutral,
}

impl RiskColor {
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Low => "text-green-600 bg-green-100",
            Self::Medium => "text-yellow-600 bg-yellow-100",
            Self::High => "text-red-600 bg-red-100",
            Self::Neutral => "text-gray-600 bg-gray-100",
        }
    }
}

pub fn classify_prediction_color(prediction: i64) -> Result<PredictionColor, InterpretError> {
    match prediction {
        1 => Ok(PredictionColor::ElevatedIndicator),
        0 => Ok(PredictionColor::LowLikelihood),
        other => Err(InterpretError::UnknownPredictionValue(other)),
    }
}

/// Unrecognised tiers fall back to [`RiskColor::Neutral`].
pub fn classify_risk_color(risk_level: &str) -> RiskColor {
    match risk_level {
        "Low" => RiskColor::Low,
        "Medium" => RiskColor::Medium,
        "High" => RiskColor::High,
        _ => RiskColor::Neutral,
    }
}

pub fn format_probability(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

pub fn score_ratio(total_score: u8) -> f64 {
    f64::from(total_score) / f64::from(MAX_TOTAL_SCORE)
}

/// Verdict phrase plus its color category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredictionBadge {
    pub color: PredictionColor,
    pub phrase: &'static str,
    pub css_class: &'static str,
}

impl From<PredictionColor> for PredictionBadge {
    fn from(color: PredictionColor) -> Self {
        Self {
            color,
            phrase: color.phrase(),
            css_class: color.css_class(),
        }
    }
}

/// Presentation model derived from one verdict. Holds no state of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    #[serde(serialize_with = "serialize_badge")]
    pub prediction: Result<PredictionBadge, InterpretError>,
    pub risk_label: String,
    pub risk_color: RiskColor,
    pub risk_css_class: &'static str,
    pub probability_text: String,
    pub score_ratio: f64,
    pub score_text: String,
    pub recommendations: Vec<String>,
    pub disclaimer: &'static str,
}

impl DisplayModel {
    pub fn from_verdict(verdict: &ScoringVerdict) -> Self {
        let risk_color = classify_risk_color(&verdict.risk_level);
        Self {
            prediction: classify_prediction_color(verdict.prediction).map(PredictionBadge::from),
            risk_label: format!("{} Risk", verdict.risk_level),
            risk_color,
            risk_css_class: risk_color.css_class(),
            probability_text: format_probability(verdict.probability),
            score_ratio: score_ratio(verdict.total_score),
            score_text: format!("{}/{}", verdict.total_score, MAX_TOTAL_SCORE),
            recommendations: verdict.recommendations.clone(),
            disclaimer: DISCLAIMER,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum BadgeView<'a> {
    Badge(&'a PredictionBadge),
    Error(String),
}

fn serialize_badge<S: Serializer>(
    prediction: &Result<PredictionBadge, InterpretError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match prediction {
        Ok(badge) => BadgeView::Badge(badge).serialize(serializer),
        Err(err) => BadgeView::Error(err.to_string()).serialize(serializer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(prediction: i64, total_score: u8, probability: f64, risk: &str) -> ScoringVerdict {
        ScoringVerdict {
            prediction,
            total_score,
            probability,
            risk_level: risk.to_string(),
            recommendations: vec!["Consult a specialist".to_string()],
        }
    }

    #[test]
    fn high_risk_verdict_renders_elevated_badge() {
        let display = DisplayModel::from_verdict(&verdict(1, 8, 0.82, "High"));

        let badge = display.prediction.expect("binary prediction");
        assert_eq!(badge.color, PredictionColor::ElevatedIndicator);
        assert_eq!(badge.phrase, "Indicators suggest possible ASD traits");
        assert_eq!(display.risk_color, RiskColor::High);
        assert_eq!(display.risk_label, "High Risk");
        assert_eq!(display.probability_text, "82.0%");
        assert!((display.score_ratio - 0.8).abs() < f64::EPSILON);
        assert_eq!(display.score_text, "8/10");
        assert_eq!(display.recommendations, vec!["Consult a specialist"]);
    }

    #[test]
    fn prediction_color_is_total_over_binary_domain() {
        assert_eq!(
            classify_prediction_color(0),
            Ok(PredictionColor::LowLikelihood)
        );
        assert_eq!(
            classify_prediction_color(1),
            Ok(PredictionColor::ElevatedIndicator)
        );
        assert_eq!(
            classify_prediction_color(2),
            Err(InterpretError::UnknownPredictionValue(2))
        );
        assert_eq!(
            classify_prediction_color(-1),
            Err(InterpretError::UnknownPredictionValue(-1))
        );
    }

    #[test]
    fn unrecognised_risk_levels_degrade_to_neutral() {
        assert_eq!(classify_risk_color("Low"), RiskColor::Low);
        assert_eq!(classify_risk_color("Medium"), RiskColor::Medium);
        assert_eq!(classify_risk_color("Severe"), RiskColor::Neutral);
        assert_eq!(classify_risk_color("high"), RiskColor::Neutral);
        assert_eq!(classify_risk_color(""), RiskColor::Neutral);
    }

    #[test]
    fn probability_uses_one_fractional_digit() {
        assert_eq!(format_probability(0.0), "0.0%");
        assert_eq!(format_probability(1.0), "100.0%");
        assert_eq!(format_probability(0.1234), "12.3%");
    }

    #[test]
    fn unknown_prediction_only_affects_the_badge() {
        let display = DisplayModel::from_verdict(&verdict(7, 3, 0.2, "Low"));

        assert_eq!(
            display.prediction,
            Err(InterpretError::UnknownPredictionValue(7))
        );
        assert_eq!(display.risk_color, RiskColor::Low);
        assert_eq!(display.probability_text, "20.0%");

        let json = serde_json::to_value(&display).expect("serializes");
        assert!(json["prediction"]["error"]
            .as_str()
            .unwrap_or_default()
            .contains("7"));
    }
}
