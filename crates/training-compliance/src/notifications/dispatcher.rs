use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::compliance::{days_until_expiry, ComplianceOverview, ComplianceReporter, MissingTraining};
use crate::domain::{EmployeeId, UserId};
use crate::error::ServiceError;
use crate::store::{ComplianceStore, RecordFilter};

/// Event handed to a [`NotificationSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    CertificateExpiring {
        employee_id: EmployeeId,
        employee_name: String,
        email: Option<String>,
        training_type: String,
        certificate_number: String,
        expiry_date: NaiveDate,
        days_until_expiry: i64,
    },
    ComplianceReminder {
        employee_id: EmployeeId,
        employee_name: String,
        email: Option<String>,
        missing: Vec<MissingTraining>,
    },
    ComplianceDigest {
        user_id: UserId,
        user_name: String,
        email: String,
        overview: ComplianceOverview,
    },
}

impl Notification {
    pub fn recipient(&self) -> Option<&str> {
        match self {
            Notification::CertificateExpiring { email, .. }
            | Notification::ComplianceReminder { email, .. } => email.as_deref(),
            Notification::ComplianceDigest { email, .. } => Some(email),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Outbound seam for notifications (mail, chat, log).
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpirySummary {
    pub records_found: usize,
    pub notifications_sent: usize,
    /// Distinct employees with at least one delivered notice.
    pub employees_notified: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceSummary {
    pub non_compliant_employees: usize,
    pub reminders_sent: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DigestSummary {
    pub recipients: usize,
    pub digests_sent: usize,
    pub errors: usize,
}

/// Selects notification targets from the store and pushes events through the sink.
///
/// A failed delivery is logged and counted; it never aborts the run and is not retried.
pub struct NotificationDispatcher<S, N> {
    store: Arc<S>,
    sink: Arc<N>,
    reporter: ComplianceReporter<S>,
}

impl<S, N> NotificationDispatcher<S, N>
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, sink: Arc<N>) -> Self {
        let reporter = ComplianceReporter::new(store.clone());
        Self {
            store,
            sink,
            reporter,
        }
    }

    /// Certificates expiring after `today` and no later than `today + days`.
    pub fn send_expiry_notifications(
        &self,
        days: u32,
        today: NaiveDate,
    ) -> Result<ExpirySummary, ServiceError> {
        let horizon = today + Duration::days(i64::from(days));
        let records = self.store.list_training_records(&RecordFilter {
            with_certificate: true,
            expiring_between: Some((today, horizon)),
            ..RecordFilter::default()
        })?;

        let mut summary = ExpirySummary {
            records_found: records.len(),
            ..ExpirySummary::default()
        };
        let mut notified: HashSet<EmployeeId> = HashSet::new();

        for detail in records {
            let Some(certificate_number) = detail.record.certificate_number.clone() else {
                continue;
            };
            let notification = Notification::CertificateExpiring {
                employee_id: detail.employee.id,
                employee_name: detail.employee.name.clone(),
                email: detail.employee.email.clone(),
                training_type: detail.training_type.name.clone(),
                certificate_number,
                expiry_date: detail.record.expiry_date,
                days_until_expiry: days_until_expiry(&detail.record, today),
            };

            if self.deliver(&notification) {
                summary.notifications_sent += 1;
                notified.insert(detail.employee.id);
            } else {
                summary.errors += 1;
            }
        }

        summary.employees_notified = notified.len();
        info!(
            days,
            found = summary.records_found,
            sent = summary.notifications_sent,
            errors = summary.errors,
            "expiry notifications dispatched"
        );
        Ok(summary)
    }

    /// One reminder per active employee missing a required training.
    pub fn send_compliance_reminders(
        &self,
        today: NaiveDate,
    ) -> Result<ComplianceSummary, ServiceError> {
        let non_compliant = self.reporter.non_compliant_employees(today)?;
        let mut summary = ComplianceSummary {
            non_compliant_employees: non_compliant.len(),
            ..ComplianceSummary::default()
        };

        for compliance in non_compliant {
            let email = self
                .store
                .fetch_employee(compliance.employee_id)?
                .and_then(|employee| employee.email);
            let notification = Notification::ComplianceReminder {
                employee_id: compliance.employee_id,
                employee_name: compliance.name,
                email,
                missing: compliance.missing_mandatory,
            };

            if self.deliver(&notification) {
                summary.reminders_sent += 1;
            } else {
                summary.errors += 1;
            }
        }

        info!(
            non_compliant = summary.non_compliant_employees,
            sent = summary.reminders_sent,
            errors = summary.errors,
            "compliance reminders dispatched"
        );
        Ok(summary)
    }

    pub fn send_digest(&self, today: NaiveDate) -> Result<DigestSummary, ServiceError> {
        let users = self.store.list_users()?;
        let mut summary = DigestSummary {
            recipients: users.len(),
            ..DigestSummary::default()
        };
        if users.is_empty() {
            return Ok(summary);
        }

        let overview = self.reporter.overview(today)?;
        for user in users {
            let notification = Notification::ComplianceDigest {
                user_id: user.id,
                user_name: user.name,
                email: user.email,
                overview: overview.clone(),
            };

            if self.deliver(&notification) {
                summary.digests_sent += 1;
            } else {
                summary.errors += 1;
            }
        }

        info!(
            recipients = summary.recipients,
            sent = summary.digests_sent,
            "compliance digest dispatched"
        );
        Ok(summary)
    }

    fn deliver(&self, notification: &Notification) -> bool {
        match self.sink.deliver(notification) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    recipient = notification.recipient().unwrap_or("-"),
                    error = %err,
                    "notification not delivered"
                );
                false
            }
        }
    }
}
