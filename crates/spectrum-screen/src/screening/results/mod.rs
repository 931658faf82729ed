//! Interpretation of scoring verdicts into presentation-ready categories.

mod display;
mod verdict;

pub use display::{
    classify_prediction_color, classify_risk_color, format_probability, score_ratio,
    DisplayModel, InterpretError, PredictionBadge, PredictionColor, RiskColor, DISCLAIMER,
    SCORE_LEGEND,
};
pub use verdict::{ContractViolation, ScoringVerdict, MAX_TOTAL_SCORE};
