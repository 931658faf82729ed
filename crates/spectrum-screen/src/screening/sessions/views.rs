use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::service::SessionId;
use crate::screening::controller::{ScreeningResult, SubmissionController};
use crate::screening::intake::{Progress, WizardPhase};

/// Snapshot of one session returned by every session endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub view: &'static str,
    pub phase: WizardPhase,
    pub progress: Progress,
    pub section_title: &'static str,
    pub is_last_section: bool,
    pub values: BTreeMap<String, Option<String>>,
    pub errors: BTreeMap<String, String>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScreeningResult>,
}

impl SessionView {
    pub(crate) fn capture(
        id: &SessionId,
        created_at: DateTime<Utc>,
        controller: &SubmissionController,
    ) -> Self {
        let wizard = controller.wizard();
        let state = wizard.state();
        Self {
            session_id: id.0.clone(),
            created_at,
            view: controller.view().label(),
            phase: wizard.phase(),
            progress: wizard.progress(),
            section_title: wizard.current_section().title,
            is_last_section: wizard.is_last_section(),
            values: state.values.clone(),
            errors: state.errors.clone(),
            loading: controller.is_loading(),
            notice: controller.notice(),
            result: controller.result().cloned(),
        }
    }
}

/// Body of `PUT .../fields/:key`. `null` clears the answer.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdate {
    #[serde(default)]
    pub value: Option<String>,
}
