use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use training_compliance::compliance::ExpiryStatus;
use training_compliance::config::{AppConfig, DatabaseConfig};
use training_compliance::error::AppError;
use training_compliance::notifications::{DeliveryError, Notification, NotificationSink};
use training_compliance::store::SqliteStore;
use training_compliance::telemetry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Sink that records each notification as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let recipient = notification.recipient().unwrap_or("-");
        match notification {
            Notification::CertificateExpiring {
                employee_name,
                certificate_number,
                days_until_expiry,
                ..
            } => info!(
                recipient,
                employee = %employee_name,
                certificate = %certificate_number,
                days_until_expiry,
                "certificate expiry notice"
            ),
            Notification::ComplianceReminder {
                employee_name,
                missing,
                ..
            } => info!(
                recipient,
                employee = %employee_name,
                missing = missing.len(),
                "compliance reminder"
            ),
            Notification::ComplianceDigest {
                user_name, overview, ..
            } => info!(
                recipient,
                user = %user_name,
                non_compliant = overview.non_compliant_employees,
                "compliance digest"
            ),
        }
        Ok(())
    }
}

/// Loads configuration and installs the subscriber shared by every command.
pub(crate) fn bootstrap() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn open_store(config: &DatabaseConfig) -> Result<Arc<SqliteStore>, AppError> {
    let store = SqliteStore::open(&config.path)?;
    info!(path = %config.path.display(), "training database opened");
    Ok(Arc::new(store))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_expiry_status(raw: &str) -> Result<ExpiryStatus, String> {
    match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
        "expired" => Ok(ExpiryStatus::Expired),
        "expiring_soon" => Ok(ExpiryStatus::ExpiringSoon),
        "valid" => Ok(ExpiryStatus::Valid),
        _ => Err(format!(
            "unknown status '{raw}' (expected expired, expiring_soon or valid)"
        )),
    }
}
