use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::desk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use school_desk::config::AppConfig;
use school_desk::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut config: AppConfig, mut args: ServeArgs) -> Result<(), AppError> {
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        marking_policy: config.scoring.marking_policy,
        max_upload_bytes: config.ingest.max_upload_bytes,
    };

    let app = desk_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, policy = ?config.scoring.marking_policy, "school desk service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
