use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::payload::{CoercionError, SubmissionPayload};
use super::questionnaire::{Questionnaire, Section};

/// Mutable intake state. Only the wizard mutates it; everyone else gets a shared borrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeState {
    pub current_section_index: usize,
    pub values: BTreeMap<String, Option<String>>,
    pub errors: BTreeMap<String, String>,
    pub submitting: bool,
}

/// Where the wizard sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "section", rename_all = "snake_case")]
pub enum WizardPhase {
    Editing(usize),
    Submitting,
    Submitted,
}

/// Every field error raised while validating one section.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("section {section} has {} invalid field(s)", .errors.len())]
pub struct ValidationFailure {
    pub section: usize,
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("section {index} is out of range (questionnaire has {count} sections)")]
    SectionOutOfRange { index: usize, count: usize },
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error("submission is only available from the final section (currently on section {current})")]
    NotOnFinalSection { current: usize },
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("intake already submitted; reset to start a new screening")]
    AlreadySubmitted,
    #[error("validated answers could not be coerced: {0}")]
    Coercion(#[from] CoercionError),
}

/// "Step N of M" progress shown above each section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub step: usize,
    pub total: usize,
    pub percent: u8,
}

/// Multi-section intake state machine.
#[derive(Debug, Clone)]
pub struct IntakeWizard {
    questionnaire: Arc<Questionnaire>,
    state: IntakeState,
    submitted: bool,
}

impl IntakeWizard {
    pub fn new(questionnaire: Arc<Questionnaire>) -> Self {
        let values = questionnaire
            .fields()
            .map(|field| (field.key.to_string(), None))
            .collect();

        Self {
            questionnaire,
            state: IntakeState {
                current_section_index: 0,
                values,
                errors: BTreeMap::new(),
                submitting: false,
            },
            submitted: false,
        }
    }

    pub fn standard() -> Self {
        Self::new(Questionnaire::standard())
    }

    pub fn questionnaire(&self) -> &Arc<Questionnaire> {
        &self.questionnaire
    }

    pub fn state(&self) -> &IntakeState {
        &self.state
    }

    pub fn phase(&self) -> WizardPhase {
        if self.submitted {
            WizardPhase::Submitted
        } else if self.state.submitting {
            WizardPhase::Submitting
        } else {
            WizardPhase::Editing(self.state.current_section_index)
        }
    }

    pub fn current_index(&self) -> usize {
        self.state.current_section_index
    }

    pub fn current_section(&self) -> &Section {
        &self.questionnaire.sections()[self.state.current_section_index]
    }

    pub fn is_last_section(&self) -> bool {
        self.state.current_section_index == self.questionnaire.last_index()
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.state.values.get(key).and_then(|value| value.as_deref())
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.state.errors.get(key).map(String::as_str)
    }

    pub fn progress(&self) -> Progress {
        let step = self.state.current_section_index + 1;
        let total = self.questionnaire.section_count();
        let percent = ((step as f64 / total as f64) * 100.0).round() as u8;
        Progress {
            step,
            total,
            percent,
        }
    }

    /// Store a raw answer. Blank input counts as unanswered.
    pub fn set_field_value(&mut self, key: &str, raw: impl Into<String>) -> Result<(), WizardError> {
        self.ensure_editable()?;

        let slot = self
            .state
            .values
            .get_mut(key)
            .ok_or_else(|| WizardError::UnknownField(key.to_string()))?;

        let raw = raw.into();
        let trimmed = raw.trim();
        *slot = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.state.errors.remove(key);
        Ok(())
    }

    /// Clear a previously entered answer.
    pub fn clear_field_value(&mut self, key: &str) -> Result<(), WizardError> {
        self.set_field_value(key, String::new())
    }

    /// Validate every field of one section; all failures are reported together.
    pub fn validate_section(&mut self, index: usize) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let section = self
            .questionnaire
            .section(index)
            .ok_or(WizardError::SectionOutOfRange {
                index,
                count: self.questionnaire.section_count(),
            })?;

        let mut errors = BTreeMap::new();
        for field in &section.fields {
            self.state.errors.remove(field.key);
            let raw = self
                .state
                .values
                .get(field.key)
                .and_then(|value| value.as_deref());
            if let Err(message) = field.validate(raw) {
                errors.insert(field.key.to_string(), message);
            }
        }

        if errors.is_empty() {
            return Ok(());
        }

        debug!(section = index, invalid = errors.len(), "section failed validation");
        self.state
            .errors
            .extend(errors.iter().map(|(key, message)| (key.clone(), message.clone())));
        Err(ValidationFailure {
            section: index,
            errors,
        }
        .into())
    }

    /// Move forward one section once the current section validates. No-op on the last section.
    pub fn advance(&mut self) -> Result<usize, WizardError> {
        self.ensure_editable()?;
        let current = self.state.current_section_index;
        self.validate_section(current)?;
        self.state.current_section_index = (current + 1).min(self.questionnaire.last_index());
        Ok(self.state.current_section_index)
    }

    /// Move back one section. Never validates.
    pub fn retreat(&mut self) -> Result<usize, WizardError> {
        self.ensure_editable()?;
        self.state.current_section_index = self.state.current_section_index.saturating_sub(1);
        Ok(self.state.current_section_index)
    }

    /// Validate and coerce the answers into a payload, entering the submitting phase.
    ///
    /// The final section is validated first. Earlier sections are re-checked as well since
    /// `set_field_value` accepts any key; the first failing section is reported.
    pub fn submit(&mut self) -> Result<SubmissionPayload, WizardError> {
        self.ensure_editable()?;
        let last = self.questionnaire.last_index();
        if self.state.current_section_index != last {
            return Err(WizardError::NotOnFinalSection {
                current: self.state.current_section_index,
            });
        }

        self.validate_section(last)?;
        for index in 0..last {
            self.validate_section(index)?;
        }

        let payload = SubmissionPayload::from_values(&self.state.values)?;
        self.state.submitting = true;
        debug!("intake payload assembled");
        Ok(payload)
    }

    /// The pending submission failed: return to editing the final section with answers intact.
    pub(crate) fn submission_failed(&mut self) {
        self.state.submitting = false;
        self.state.current_section_index = self.questionnaire.last_index();
    }

    /// The pending submission produced a result.
    pub(crate) fn submission_acknowledged(&mut self) {
        self.state.submitting = false;
        self.submitted = true;
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.submitted {
            Err(WizardError::AlreadySubmitted)
        } else if self.state.submitting {
            Err(WizardError::SubmissionInFlight)
        } else {
            Ok(())
        }
    }
}

impl Default for IntakeWizard {
    fn default() -> Self {
        Self::standard()
    }
}
