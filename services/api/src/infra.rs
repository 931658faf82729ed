use metrics_exporter_prometheus::PrometheusHandle;
use spectrum_screen::config::{ConfigError, ScoringConfig};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Apply a command-line base URL override while keeping the configured timeout.
pub(crate) fn scoring_config_with_override(
    configured: ScoringConfig,
    base_url: Option<String>,
) -> Result<ScoringConfig, ConfigError> {
    match base_url {
        Some(url) => ScoringConfig::new(url, configured.timeout().as_secs()),
        None => Ok(configured),
    }
}
