use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use spectrum_screen::screening::sessions::{intake_router, IntakeSessionService};
use spectrum_screen::screening::ScoringClient;
use std::sync::Arc;

pub(crate) fn with_intake_routes<C>(service: Arc<IntakeSessionService<C>>) -> axum::Router
where
    C: ScoringClient + 'static,
{
    intake_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use spectrum_screen::screening::intake::{Questionnaire, SubmissionPayload};
    use spectrum_screen::screening::results::ScoringVerdict;
    use spectrum_screen::screening::SubmissionError;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    struct NeverCalled;

    #[async_trait]
    impl ScoringClient for NeverCalled {
        async fn score(&self, _: &SubmissionPayload) -> Result<ScoringVerdict, SubmissionError> {
            panic!("health routes must not reach the scoring service")
        }
    }

    fn app(ready: bool) -> axum::Router {
        let service = Arc::new(IntakeSessionService::new(
            Questionnaire::standard(),
            Arc::new(NeverCalled),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_intake_routes(service).layer(Extension(state))
    }

    async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("route executes")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        assert_eq!(get(app(false), "/ready").await.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(get(app(true), "/ready").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn intake_routes_are_mounted_alongside_health_checks() {
        let response = get(app(true), "/api/v1/questionnaire").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get(app(true), "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("text/plain; version=0.0.4")
        );
    }
}
