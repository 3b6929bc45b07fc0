use crate::cli::ServeArgs;
use crate::infra::{AppState, Context};
use crate::routes::with_job_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use jobtrack::config::AppConfig;
use jobtrack::error::AppError;
use jobtrack::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let addr = config.server.socket_addr()?;
    let environment = config.environment;
    let context = Context::new(config, false);
    let store = Arc::new(context.store()?);

    match store.refresh().await {
        Ok(jobs) => info!(count = jobs.len(), "loaded job applications"),
        Err(err) => warn!(%err, origin = ?store.origin(), "initial job load failed"),
    }

    let app = with_job_routes(store)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?environment, %addr, "job tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
