use crate::cli::ServeArgs;
use crate::infra::{bootstrap, open_store, AppState, TracingNotificationSink};
use crate::routes::with_compliance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use training_compliance::error::AppError;
use training_compliance::router::ComplianceApi;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = bootstrap()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = open_store(&config.database)?;
    let api = Arc::new(ComplianceApi::new(
        store,
        Arc::new(TracingNotificationSink),
        config.certificates.batch_size,
        config.notifications.lookahead_days,
    ));

    let app = with_compliance_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "training compliance service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
