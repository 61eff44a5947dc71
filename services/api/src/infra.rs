use eyecare_risk::config::ModelConfig;
use eyecare_risk::risk::{ModelHandle, RiskAssessmentService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) service: Arc<RiskAssessmentService>,
}

/// Apply a `--model` override on top of the loaded configuration.
pub(crate) fn with_model_override(mut config: ModelConfig, model: Option<PathBuf>) -> ModelConfig {
    if let Some(path) = model {
        config.artifact_path = path;
    }
    config
}

pub(crate) fn build_service(config: &ModelConfig) -> Arc<RiskAssessmentService> {
    let handle = Arc::new(ModelHandle::from_path(config.artifact_path.clone()));
    Arc::new(RiskAssessmentService::new(
        handle,
        config.high_risk_threshold,
    ))
}

/// Eager load for startup. A failure is logged and left for the first
/// request to retry.
pub(crate) fn preload_model(service: &RiskAssessmentService) {
    if let Err(err) = service.model().preload() {
        warn!(
            source = service.model().source(),
            error = %err,
            "risk model preload failed; predictions unavailable until it loads"
        );
    }
}
