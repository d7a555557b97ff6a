use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use training_compliance::notifications::NotificationSink;
use training_compliance::router::{compliance_router, ComplianceApi};
use training_compliance::store::ComplianceStore;

pub(crate) fn with_compliance_routes<S, N>(api: Arc<ComplianceApi<S, N>>) -> axum::Router
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    compliance_router(api)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Acquire);
    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "initializing")
    };

    (status, Json(json!({ "status": label })))
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
    use crate::infra::TracingNotificationSink;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;
    use training_compliance::store::SqliteStore;

    fn app_state() -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    fn app(state: AppState) -> axum::Router {
        let store = Arc::new(SqliteStore::open_in_memory().expect("in-memory store"));
        let api = Arc::new(ComplianceApi::new(
            store,
            Arc::new(TracingNotificationSink),
            50,
            30,
        ));
        with_compliance_routes(api).layer(Extension(state))
    }

    async fn get_status(router: axum::Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes")
            .status()
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let state = app_state();
        assert_eq!(
            get_status(app(state.clone()), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        state.readiness.store(true, Ordering::Release);
        assert_eq!(get_status(app(state), "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn library_routes_are_mounted() {
        let state = app_state();
        assert_eq!(
            get_status(app(state.clone()), "/api/v1/compliance/overview").await,
            StatusCode::OK
        );
        assert_eq!(
            get_status(app(state.clone()), "/api/v1/employees/42/compliance").await,
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(app(state), "/metrics").await, StatusCode::OK);
    }
}
