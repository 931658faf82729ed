use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::screening::intake::{
    AnswerSheet, AnswerSheetError, IntakeWizard, Questionnaire, SubmissionPayload, WizardError,
};
use crate::screening::results::{DisplayModel, ScoringVerdict};
use crate::screening::scoring::{ScoringClient, SubmissionError, SUBMISSION_FAILED_NOTICE};

/// A verdict and its presentation, captured when the response arrived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningResult {
    pub verdict: ScoringVerdict,
    pub display: DisplayModel,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Intake,
    Result(Box<ScreeningResult>),
}

impl ViewState {
    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Intake => "intake",
            ViewState::Result(_) => "result",
        }
    }
}

/// Identifies one in-flight exchange so late completions can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationToken(u64);

impl CorrelationToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A payload handed out by [`SubmissionController::begin_submit`], awaiting its outcome.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub token: CorrelationToken,
    pub payload: SubmissionPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Displayed,
    Failed { notice: &'static str },
    /// The token no longer matched, so the response was dropped.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error("a result is already displayed; reset to start a new screening")]
    ResultDisplayed,
}

/// Owns the wizard and the view state, and runs at most one scoring exchange at a time.
#[derive(Debug)]
pub struct SubmissionController {
    questionnaire: Arc<Questionnaire>,
    wizard: IntakeWizard,
    view: ViewState,
    in_flight: Option<CorrelationToken>,
    next_token: u64,
    notice: Option<&'static str>,
}

impl SubmissionController {
    pub fn new(questionnaire: Arc<Questionnaire>) -> Self {
        Self {
            wizard: IntakeWizard::new(questionnaire.clone()),
            questionnaire,
            view: ViewState::Intake,
            in_flight: None,
            next_token: 1,
            notice: None,
        }
    }

    pub fn standard() -> Self {
        Self::new(Questionnaire::standard())
    }

    pub fn wizard(&self) -> &IntakeWizard {
        &self.wizard
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn result(&self) -> Option<&ScreeningResult> {
        match &self.view {
            ViewState::Result(result) => Some(result),
            ViewState::Intake => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Notice left by the last failed exchange, cleared by the next attempt.
    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn set_field_value(&mut self, key: &str, raw: impl Into<String>) -> Result<(), WizardError> {
        self.wizard.set_field_value(key, raw)
    }

    pub fn clear_field_value(&mut self, key: &str) -> Result<(), WizardError> {
        self.wizard.clear_field_value(key)
    }

    pub fn validate_section(&mut self, index: usize) -> Result<(), WizardError> {
        self.wizard.validate_section(index)
    }

    pub fn advance(&mut self) -> Result<usize, WizardError> {
        self.wizard.advance()
    }

    pub fn retreat(&mut self) -> Result<usize, WizardError> {
        self.wizard.retreat()
    }

    /// Pre-fill answers from a sheet, row by row.
    pub fn apply_answers(&mut self, sheet: &AnswerSheet) -> Result<(), AnswerSheetError> {
        sheet.apply_to(&mut self.wizard)
    }

    /// Assemble the payload and mark the exchange as in flight.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, ControllerError> {
        if matches!(self.view, ViewState::Result(_)) {
            return Err(ControllerError::ResultDisplayed);
        }

        let payload = self.wizard.submit()?;
        let token = CorrelationToken(self.next_token);
        self.next_token += 1;
        self.in_flight = Some(token);
        self.notice = None;
        debug!(token = token.value(), "submission started");

        Ok(PendingSubmission { token, payload })
    }

    /// Apply the outcome of the exchange identified by `token`.
    pub fn complete_submit(
        &mut self,
        token: CorrelationToken,
        outcome: Result<ScoringVerdict, SubmissionError>,
    ) -> SubmissionOutcome {
        if self.in_flight != Some(token) {
            debug!(token = token.value(), "discarding stale scoring response");
            return SubmissionOutcome::Discarded;
        }
        self.in_flight = None;

        match outcome {
            Ok(verdict) => {
                let display = DisplayModel::from_verdict(&verdict);
                if let Err(err) = &display.prediction {
                    warn!(error = %err, "verdict carries an out-of-domain prediction");
                }
                info!(
                    total_score = verdict.total_score,
                    risk_level = %verdict.risk_level,
                    "screening verdict received"
                );
                self.wizard.submission_acknowledged();
                self.view = ViewState::Result(Box::new(ScreeningResult {
                    verdict,
                    display,
                    received_at: Utc::now(),
                }));
                SubmissionOutcome::Displayed
            }
            Err(err) => {
                warn!(failure = err.kind(), error = %err, "scoring exchange failed");
                self.wizard.submission_failed();
                let notice = err.user_notice();
                self.notice = Some(notice);
                SubmissionOutcome::Failed { notice }
            }
        }
    }

    /// Give up on the exchange identified by `token` without a response, as if it had failed.
    pub fn abandon_submit(&mut self, token: CorrelationToken) -> SubmissionOutcome {
        if self.in_flight != Some(token) {
            return SubmissionOutcome::Discarded;
        }
        self.in_flight = None;

        warn!(token = token.value(), failure = "abandoned", "scoring exchange abandoned");
        self.wizard.submission_failed();
        self.notice = Some(SUBMISSION_FAILED_NOTICE);
        SubmissionOutcome::Failed {
            notice: SUBMISSION_FAILED_NOTICE,
        }
    }

    /// Run one full exchange against `client`.
    pub async fn on_submit<C>(&mut self, client: &C) -> Result<SubmissionOutcome, ControllerError>
    where
        C: ScoringClient + ?Sized,
    {
        let pending = self.begin_submit()?;
        let outcome = client.score(&pending.payload).await;
        Ok(self.complete_submit(pending.token, outcome))
    }

    /// Drop any result and start over with a blank wizard.
    pub fn on_reset(&mut self) {
        if let Some(token) = self.in_flight.take() {
            debug!(token = token.value(), "reset abandons in-flight submission");
        }
        self.wizard = IntakeWizard::new(self.questionnaire.clone());
        self.view = ViewState::Intake;
        self.notice = None;
    }
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::intake::questionnaire::keys;
    use crate::screening::intake::WizardPhase;
    use crate::screening::results::{ContractViolation, PredictionColor};
    use crate::screening::scoring::TransportError;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    struct FixedVerdict {
        verdict: ScoringVerdict,
        seen: Mutex<Vec<SubmissionPayload>>,
    }

    #[async_trait]
    impl ScoringClient for FixedVerdict {
        async fn score(
            &self,
            payload: &SubmissionPayload,
        ) -> Result<ScoringVerdict, SubmissionError> {
            self.seen
                .lock()
                .expect("payload log mutex poisoned")
                .push(payload.clone());
            Ok(self.verdict.clone())
        }
    }

    struct Unavailable;

    #[async_trait]
    impl ScoringClient for Unavailable {
        async fn score(&self, _: &SubmissionPayload) -> Result<ScoringVerdict, SubmissionError> {
            Err(TransportError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "maintenance".to_string(),
            }
            .into())
        }
    }

    fn high_verdict() -> ScoringVerdict {
        ScoringVerdict {
            prediction: 1,
            total_score: 8,
            probability: 0.82,
            risk_level: "High".to_string(),
            recommendations: vec!["Consult a specialist".to_string()],
        }
    }

    fn filled_controller() -> SubmissionController {
        let mut controller = SubmissionController::standard();
        for key in keys::BEHAVIORAL {
            controller.set_field_value(key, "1").expect("known key");
        }
        controller.advance().expect("behavioural section valid");
        for (key, value) in [
            (keys::AGE, "30"),
            (keys::GENDER, "m"),
            (keys::ETHNICITY, "Asian"),
            (keys::COUNTRY, "India"),
        ] {
            controller.set_field_value(key, value).expect("known key");
        }
        controller.advance().expect("personal section valid");
        for (key, value) in [
            (keys::JAUNDICE, "no"),
            (keys::FAMILY_HISTORY, "no"),
            (keys::USED_APP_BEFORE, "no"),
            (keys::RELATION, "Parent"),
        ] {
            controller.set_field_value(key, value).expect("known key");
        }
        controller
    }

    #[tokio::test]
    async fn successful_exchange_switches_to_result_view() {
        let client = FixedVerdict {
            verdict: high_verdict(),
            seen: Mutex::new(Vec::new()),
        };
        let mut controller = filled_controller();

        let outcome = controller.on_submit(&client).await.expect("submits");

        assert_eq!(outcome, SubmissionOutcome::Displayed);
        assert!(!controller.is_loading());
        let result = controller.result().expect("result view");
        assert_eq!(
            result.display.prediction.map(|badge| badge.color),
            Ok(PredictionColor::ElevatedIndicator)
        );
        assert_eq!(result.display.probability_text, "82.0%");

        let seen = client.seen.lock().expect("payload log mutex poisoned");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].scores(), [1; 10]);
        assert_eq!(seen[0].age(), 30);
    }

    #[tokio::test]
    async fn transport_failure_returns_to_last_section_with_values() {
        let mut controller = filled_controller();

        let outcome = controller.on_submit(&Unavailable).await.expect("submits");

        assert_eq!(
            outcome,
            SubmissionOutcome::Failed {
                notice: SUBMISSION_FAILED_NOTICE
            }
        );
        assert_eq!(controller.view(), &ViewState::Intake);
        assert_eq!(controller.wizard().phase(), WizardPhase::Editing(2));
        assert_eq!(controller.wizard().value(keys::AGE), Some("30"));
        assert_eq!(controller.wizard().value("A10_Score"), Some("1"));
        assert_eq!(controller.notice(), Some(SUBMISSION_FAILED_NOTICE));
        assert!(!controller.is_loading());
    }

    #[test]
    fn contract_violation_is_handled_like_transport_failure() {
        let mut controller = filled_controller();
        let pending = controller.begin_submit().expect("valid intake");
        let malformed = ScoringVerdict::from_json(b"{}").expect_err("missing fields");
        assert!(matches!(malformed, ContractViolation::Malformed(_)));

        let outcome = controller.complete_submit(pending.token, Err(malformed.into()));

        assert!(matches!(outcome, SubmissionOutcome::Failed { .. }));
        assert_eq!(controller.wizard().phase(), WizardPhase::Editing(2));
    }

    #[test]
    fn duplicate_submission_is_rejected_while_in_flight() {
        let mut controller = filled_controller();
        controller.begin_submit().expect("valid intake");

        assert!(controller.is_loading());
        assert_eq!(
            controller.begin_submit().map(|pending| pending.token),
            Err(ControllerError::Wizard(WizardError::SubmissionInFlight))
        );
    }

    #[test]
    fn abandoned_exchange_unlocks_the_wizard_with_values() {
        let mut controller = filled_controller();
        let pending = controller.begin_submit().expect("valid intake");
        assert_eq!(
            controller.set_field_value(keys::AGE, "31"),
            Err(WizardError::SubmissionInFlight)
        );

        let outcome = controller.abandon_submit(pending.token);

        assert_eq!(
            outcome,
            SubmissionOutcome::Failed {
                notice: SUBMISSION_FAILED_NOTICE
            }
        );
        assert!(!controller.is_loading());
        assert_eq!(controller.wizard().phase(), WizardPhase::Editing(2));
        assert_eq!(controller.wizard().value(keys::RELATION), Some("Parent"));
        assert_eq!(
            controller.complete_submit(pending.token, Ok(high_verdict())),
            SubmissionOutcome::Discarded
        );
        assert_eq!(controller.view(), &ViewState::Intake);
        assert!(controller.begin_submit().is_ok());
    }

    #[test]
    fn editing_is_rejected_once_a_result_is_displayed() {
        let mut controller = filled_controller();
        let pending = controller.begin_submit().expect("valid intake");
        controller.complete_submit(pending.token, Ok(high_verdict()));

        assert_eq!(
            controller.set_field_value(keys::AGE, "31"),
            Err(WizardError::AlreadySubmitted)
        );
        assert_eq!(controller.retreat(), Err(WizardError::AlreadySubmitted));
        assert_eq!(controller.abandon_submit(pending.token), SubmissionOutcome::Discarded);
    }

    #[test]
    fn reset_returns_blank_wizard_and_discards_late_response() {
        let mut controller = filled_controller();
        let pending = controller.begin_submit().expect("valid intake");

        controller.on_reset();
        assert_eq!(controller.wizard().phase(), WizardPhase::Editing(0));
        assert!(controller.wizard().state().values.values().all(Option::is_none));
        assert!(!controller.is_loading());

        let outcome = controller.complete_submit(pending.token, Ok(high_verdict()));
        assert_eq!(outcome, SubmissionOutcome::Discarded);
        assert_eq!(controller.view(), &ViewState::Intake);
    }

    #[tokio::test]
    async fn reset_after_result_starts_over() {
        let client = FixedVerdict {
            verdict: high_verdict(),
            seen: Mutex::new(Vec::new()),
        };
        let mut controller = filled_controller();
        controller.on_submit(&client).await.expect("submits");
        assert_eq!(
            controller.begin_submit().map(|pending| pending.token),
            Err(ControllerError::ResultDisplayed)
        );

        controller.on_reset();

        assert_eq!(controller.view().label(), "intake");
        assert_eq!(controller.wizard().phase(), WizardPhase::Editing(0));
        assert_eq!(controller.notice(), None);
    }
}
