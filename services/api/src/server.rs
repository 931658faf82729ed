use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use spectrum_screen::config::AppConfig;
use spectrum_screen::error::AppError;
use spectrum_screen::screening::intake::Questionnaire;
use spectrum_screen::screening::sessions::IntakeSessionService;
use spectrum_screen::screening::HttpScoringClient;
use spectrum_screen::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let client = Arc::new(HttpScoringClient::new(&config.scoring)?);
    let scoring_url = client.predict_url().to_string();
    let session_service = Arc::new(IntakeSessionService::new(Questionnaire::standard(), client));

    let app = with_intake_routes(session_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, %scoring_url, "screening intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
