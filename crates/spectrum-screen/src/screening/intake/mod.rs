//! Multi-section intake: questionnaire definition, the wizard state machine, and the
//! coercion of validated answers into the payload the scoring service accepts.

mod answers;
pub mod catalog;
mod payload;
pub mod questionnaire;
mod wizard;

#[cfg(test)]
mod tests;

pub use answers::{AnswerSheet, AnswerSheetError};
pub use catalog::{ChoiceOption, Country, Ethnicity, Gender, Relation, UnknownOption, YesNo};
pub use payload::{CoercionError, SubmissionPayload};
pub use questionnaire::{FieldKind, FieldSpec, Questionnaire, QuestionnaireError, Section};
pub use wizard::{IntakeState, IntakeWizard, Progress, ValidationFailure, WizardError, WizardPhase};
