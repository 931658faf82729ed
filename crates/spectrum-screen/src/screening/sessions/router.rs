use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use super::service::{IntakeSessionService, SessionId, SessionServiceError};
use super::views::{FieldUpdate, SessionView};
use crate::screening::controller::{ControllerError, SubmissionOutcome};
use crate::screening::intake::{Questionnaire, WizardError};
use crate::screening::scoring::ScoringClient;

/// Router exposing the questionnaire and the intake session lifecycle.
pub fn intake_router<C>(service: Arc<IntakeSessionService<C>>) -> Router
where
    C: ScoringClient + 'static,
{
    Router::new()
        .route("/api/v1/questionnaire", get(questionnaire_handler::<C>))
        .route("/api/v1/intake/sessions", post(create_handler::<C>))
        .route(
            "/api/v1/intake/sessions/:session_id",
            get(view_handler::<C>).delete(close_handler::<C>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/fields/:field_key",
            put(set_field_handler::<C>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/advance",
            post(advance_handler::<C>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/retreat",
            post(retreat_handler::<C>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/submit",
            post(submit_handler::<C>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/reset",
            post(reset_handler::<C>),
        )
        .with_state(service)
}

pub(crate) async fn questionnaire_handler<C>(
    State(service): State<Arc<IntakeSessionService<C>>>,
) -> Response
where
    C: ScoringClient + 'static,
{
    let questionnaire: &Questionnaire = service.questionnaire();
    (StatusCode::OK, Json(questionnaire)).into_response()
}

pub(crate) async fn create_handler<C>(
    State(service): State<Arc<IntakeSessionService<C>>>,
) -> Response
where
    C: ScoringClient + 'static,
{
    (StatusCode::CREATED, Json(service.create())).into_response()
}

pub(crate) async fn view_handler<C>(
    State(service): State<Arc<IntakeSessionService<C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ScoringClient + 'static,
{
    session_response(service.view(&SessionId(session_id)))
}

pub(crate) async fn close_handler<C>(
    State(service): State<Arc<IntakeSessionService<C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ScoringClient + 'static,
{
    match service.close(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn set_field_handler<C>(
    State(service): State<Arc<IntakeSessionService<C>>>,
    Path((session_id, field_key)): Path<(String, String)>,
    Json(update): Json<FieldUpdate>,
) -> Response
where
    C: ScoringClient + 'static,
{
    session_response(service.set_field(&SessionId(session_id), &field_key, update.value))
}

pub(crate) async fn advance_handler<C>(
    State(service): State<Arc<IntakeSessionService<C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ScoringClient + 'static,
{
    let id = SessionId(session_id);
    match service.advance(&id) {
        Err(SessionServiceError::Controller(ControllerError::Wizard(WizardError::Validation(
            failure,
        )))) => validation_response(&*service, &id, failure.section, failure.errors),
        other => session_response(other),
    }
}

pub(crate) async fn retreat_handler<C>(
    State(service): State<Arc<IntakeSessionService<C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ScoringClient + 'static,
{
    session_response(service.retreat(&SessionId(session_id)))
}

pub(crate) async fn submit_handler<C>(
    State(service): State<Arc<IntakeSessionService<C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ScoringClient + 'static,
{
    let id = SessionId(session_id);
    match service.submit(&id).await {
        Ok(report) => match report.outcome {
            SubmissionOutcome::Displayed => {
                (StatusCode::OK, Json(report.session)).into_response()
            }
            SubmissionOutcome::Failed { notice } => {
                let payload = json!({
                    "error": notice,
                    "session": report.session,
                });
                (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
            }
            SubmissionOutcome::Discarded => {
                let payload = json!({
                    "error": "session was reset while the submission was in flight",
                    "session": report.session,
                });
                (StatusCode::CONFLICT, Json(payload)).into_response()
            }
        },
        Err(SessionServiceError::Controller(ControllerError::Wizard(WizardError::Validation(
            failure,
        )))) => validation_response(&*service, &id, failure.section, failure.errors),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn reset_handler<C>(
    State(service): State<Arc<IntakeSessionService<C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    C: ScoringClient + 'static,
{
    session_response(service.reset(&SessionId(session_id)))
}

fn session_response(result: Result<SessionView, SessionServiceError>) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

fn validation_response<C>(
    service: &IntakeSessionService<C>,
    id: &SessionId,
    section: usize,
    errors: BTreeMap<String, String>,
) -> Response
where
    C: ScoringClient + 'static,
{
    let payload = json!({
        "error": "validation failed",
        "section": section,
        "errors": errors,
        "session": service.view(id).ok(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

fn error_response(err: SessionServiceError) -> Response {
    let status = match &err {
        SessionServiceError::UnknownSession(_) => StatusCode::NOT_FOUND,
        SessionServiceError::Controller(ControllerError::Wizard(wizard)) => match wizard {
            WizardError::UnknownField(_) => StatusCode::NOT_FOUND,
            WizardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WizardError::Coercion(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WizardError::SectionOutOfRange { .. }
            | WizardError::NotOnFinalSection { .. }
            | WizardError::SubmissionInFlight
            | WizardError::AlreadySubmitted => StatusCode::CONFLICT,
        },
        SessionServiceError::Controller(ControllerError::ResultDisplayed) => StatusCode::CONFLICT,
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
