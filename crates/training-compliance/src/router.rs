use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::certificates::{
    verify_certificate, BulkCertificateGenerator, BulkCertificateReport, CertificateSelection,
    CertificateVerification,
};
use crate::compliance::{ComplianceOverview, ComplianceReporter, EmployeeCompliance};
use crate::domain::EmployeeId;
use crate::error::{AppError, ServiceError};
use crate::notifications::{
    NotificationCategory, NotificationRequest, NotificationRunReport, NotificationRunner,
    NotificationSink,
};
use crate::store::ComplianceStore;

/// Source of the current local time; swapped out in tests.
pub type Clock = fn() -> NaiveDateTime;

pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Services shared by the HTTP handlers.
pub struct ComplianceApi<S, N> {
    store: Arc<S>,
    reporter: ComplianceReporter<S>,
    certificates: BulkCertificateGenerator<S>,
    notifications: NotificationRunner<S, N>,
    lookahead_days: u32,
    clock: Clock,
}

impl<S, N> ComplianceApi<S, N>
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, sink: Arc<N>, batch_size: usize, lookahead_days: u32) -> Self {
        Self {
            reporter: ComplianceReporter::new(store.clone()),
            certificates: BulkCertificateGenerator::new(store.clone(), batch_size),
            notifications: NotificationRunner::new(store.clone(), sink),
            store,
            lookahead_days,
            clock: local_now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }
}

/// Router exposing verification, compliance views, bulk issuing and notification runs.
pub fn compliance_router<S, N>(api: Arc<ComplianceApi<S, N>>) -> Router
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/certificates/verify",
            get(verify_handler::<S, N>),
        )
        .route(
            "/api/v1/certificates/bulk",
            post(bulk_certificates_handler::<S, N>),
        )
        .route(
            "/api/v1/employees/:employee_id/compliance",
            get(employee_compliance_handler::<S, N>),
        )
        .route(
            "/api/v1/compliance/overview",
            get(overview_handler::<S, N>),
        )
        .route(
            "/api/v1/notifications/run",
            post(notification_run_handler::<S, N>),
        )
        .with_state(api)
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyQuery {
    #[serde(default)]
    pub(crate) number: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NotificationRunBody {
    #[serde(default)]
    pub(crate) category: Option<NotificationCategory>,
    #[serde(default)]
    pub(crate) days: Option<u32>,
    #[serde(default)]
    pub(crate) force: bool,
}

pub(crate) async fn verify_handler<S, N>(
    State(api): State<Arc<ComplianceApi<S, N>>>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<CertificateVerification>, AppError>
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    let today = api.now().date();
    let verification = verify_certificate(api.store.as_ref(), &query.number, today)?;
    Ok(Json(verification))
}

pub(crate) async fn employee_compliance_handler<S, N>(
    State(api): State<Arc<ComplianceApi<S, N>>>,
    Path(employee_id): Path<i64>,
) -> Result<Json<EmployeeCompliance>, AppError>
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    let today = api.now().date();
    let compliance = api
        .reporter
        .employee_compliance(EmployeeId(employee_id), today)?;
    Ok(Json(compliance))
}

pub(crate) async fn overview_handler<S, N>(
    State(api): State<Arc<ComplianceApi<S, N>>>,
) -> Result<Json<ComplianceOverview>, AppError>
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    let today = api.now().date();
    Ok(Json(api.reporter.overview(today)?))
}

/// Partial failures answer 207 with the full report.
pub(crate) async fn bulk_certificates_handler<S, N>(
    State(api): State<Arc<ComplianceApi<S, N>>>,
    Json(selection): Json<CertificateSelection>,
) -> Result<(StatusCode, Json<BulkCertificateReport>), AppError>
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    let report = api.certificates.run(&selection)?;
    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(report)))
}

pub(crate) async fn notification_run_handler<S, N>(
    State(api): State<Arc<ComplianceApi<S, N>>>,
    Json(body): Json<NotificationRunBody>,
) -> Result<(StatusCode, Json<NotificationRunReport>), AppError>
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    let days = body.days.unwrap_or(api.lookahead_days);
    if days == 0 {
        return Err(ServiceError::validation("days", "must be at least 1").into());
    }

    let request = NotificationRequest {
        category: body.category.unwrap_or(NotificationCategory::All),
        days,
        force: body.force,
        now: api.now(),
    };
    let report = api.notifications.run(&request)?;
    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(report)))
}
