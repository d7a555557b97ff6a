use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use super::dispatcher::{
    ComplianceSummary, DigestSummary, ExpirySummary, NotificationDispatcher, NotificationSink,
};
use super::schedule::is_due;
use super::NotificationCategory;
use crate::error::ServiceError;
use crate::store::ComplianceStore;

#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub category: NotificationCategory,
    /// Lookahead window for expiry notices, in days.
    pub days: u32,
    /// Run every requested category regardless of the schedule.
    pub force: bool,
    pub now: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRunReport {
    pub category: NotificationCategory,
    pub forced: bool,
    pub expiry: Option<ExpirySummary>,
    pub compliance: Option<ComplianceSummary>,
    pub digest: Option<DigestSummary>,
    /// Categories that were not due and did not run.
    pub skipped: Vec<NotificationCategory>,
    pub delivered: usize,
    pub errors: usize,
}

impl NotificationRunReport {
    fn empty(request: &NotificationRequest) -> Self {
        Self {
            category: request.category,
            forced: request.force,
            expiry: None,
            compliance: None,
            digest: None,
            skipped: Vec::new(),
            delivered: 0,
            errors: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    pub fn ran(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::Expiry => self.expiry.is_some(),
            NotificationCategory::Compliance => self.compliance.is_some(),
            NotificationCategory::Digest => self.digest.is_some(),
            NotificationCategory::All => {
                self.expiry.is_some() || self.compliance.is_some() || self.digest.is_some()
            }
        }
    }
}

/// Runs the due notification categories and records their run time.
pub struct NotificationRunner<S, N> {
    store: Arc<S>,
    dispatcher: NotificationDispatcher<S, N>,
}

impl<S, N> NotificationRunner<S, N>
where
    S: ComplianceStore + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, sink: Arc<N>) -> Self {
        let dispatcher = NotificationDispatcher::new(store.clone(), sink);
        Self { store, dispatcher }
    }

    pub fn run(&self, request: &NotificationRequest) -> Result<NotificationRunReport, ServiceError> {
        let mut report = NotificationRunReport::empty(request);
        let today = request.now.date();

        for category in request.category.expand().iter().copied() {
            let last_run = self.store.last_notification_run(category)?;
            if !request.force && !is_due(category, request.now, last_run) {
                info!(category = %category, "notification category not due");
                report.skipped.push(category);
                continue;
            }

            match category {
                NotificationCategory::Expiry => {
                    let summary = self
                        .dispatcher
                        .send_expiry_notifications(request.days, today)?;
                    report.delivered += summary.notifications_sent;
                    report.errors += summary.errors;
                    report.expiry = Some(summary);
                }
                NotificationCategory::Compliance => {
                    let summary = self.dispatcher.send_compliance_reminders(today)?;
                    report.delivered += summary.reminders_sent;
                    report.errors += summary.errors;
                    report.compliance = Some(summary);
                }
                NotificationCategory::Digest => {
                    let summary = self.dispatcher.send_digest(today)?;
                    report.delivered += summary.digests_sent;
                    report.errors += summary.errors;
                    report.digest = Some(summary);
                }
                NotificationCategory::All => continue,
            }

            self.store.record_notification_run(category, request.now)?;
        }

        info!(
            category = %request.category,
            forced = request.force,
            delivered = report.delivered,
            errors = report.errors,
            skipped = report.skipped.len(),
            "notification run finished"
        );
        Ok(report)
    }
}
