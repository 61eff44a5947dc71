use crate::cli::ServeArgs;
use crate::infra::{build_service, preload_model, with_model_override, AppState};
use crate::routes::with_platform_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use eyecare_risk::config::AppConfig;
use eyecare_risk::error::AppError;
use eyecare_risk::telemetry;
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
    config.model = with_model_override(config.model, args.model.take());

    telemetry::init(&config.telemetry)?;

    let service = build_service(&config.model);
    if config.model.preload {
        preload_model(&service);
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        service: service.clone(),
    };

    let app = with_platform_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model = %config.model.artifact_path.display(),
        threshold = config.model.high_risk_threshold,
        "eyecare risk engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
