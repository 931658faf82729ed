use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::screening::intake::questionnaire::keys;
use crate::screening::intake::{Questionnaire, SubmissionPayload};
use crate::screening::results::{ContractViolation, ScoringVerdict};
use crate::screening::scoring::{ScoringClient, SubmissionError, TransportError};
use crate::screening::sessions::{intake_router, IntakeSessionService, SessionId};

pub(super) enum StubBehavior {
    Verdict(ScoringVerdict),
    Unavailable,
    Malformed,
    /// Never answers.
    Stalled,
}

pub(super) struct StubScoring {
    behavior: StubBehavior,
    calls: AtomicUsize,
}

impl StubScoring {
    pub(super) fn new(behavior: StubBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringClient for StubScoring {
    async fn score(&self, _: &SubmissionPayload) -> Result<ScoringVerdict, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            StubBehavior::Verdict(verdict) => Ok(verdict.clone()),
            StubBehavior::Unavailable => Err(TransportError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "{\"detail\":\"Prediction failed\"}".to_string(),
            }
            .into()),
            StubBehavior::Malformed => {
                Err(ContractViolation::ScoreOutOfRange(42).into())
            }
            StubBehavior::Stalled => std::future::pending().await,
        }
    }
}

pub(super) fn low_verdict() -> ScoringVerdict {
    ScoringVerdict {
        prediction: 0,
        total_score: 2,
        probability: 0.12,
        risk_level: "Low".to_string(),
        recommendations: vec!["No immediate action needed".to_string()],
    }
}

pub(super) fn build_service(
    behavior: StubBehavior,
) -> (Arc<IntakeSessionService<StubScoring>>, Arc<StubScoring>) {
    let client = Arc::new(StubScoring::new(behavior));
    let service = Arc::new(IntakeSessionService::new(
        Questionnaire::standard(),
        client.clone(),
    ));
    (service, client)
}

pub(super) fn router_with_service(service: Arc<IntakeSessionService<StubScoring>>) -> axum::Router {
    intake_router(service)
}

pub(super) const FULL_ANSWERS: [(&str, &str); 8] = [
    (keys::AGE, "45"),
    (keys::GENDER, "m"),
    (keys::ETHNICITY, "Latino"),
    (keys::COUNTRY, "Mexico"),
    (keys::JAUNDICE, "yes"),
    (keys::FAMILY_HISTORY, "no"),
    (keys::USED_APP_BEFORE, "yes"),
    (keys::RELATION, "Relative"),
];

/// Answer every field and walk the session to the final section.
pub(super) fn complete_session(service: &IntakeSessionService<StubScoring>, id: &SessionId) {
    for key in keys::BEHAVIORAL {
        service
            .set_field(id, key, Some("0".to_string()))
            .expect("known key");
    }
    for (key, value) in FULL_ANSWERS {
        service
            .set_field(id, key, Some(value.to_string()))
            .expect("known key");
    }
    service.advance(id).expect("behavioural section valid");
    service.advance(id).expect("personal section valid");
}

pub(super) fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("json body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
