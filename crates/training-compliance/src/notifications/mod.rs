//! Expiry notices, compliance reminders and admin digests, gated by a weekly schedule.
//!
//! Delivery itself is behind [`NotificationSink`]; the binaries plug in a sink that
//! logs or forwards events. Last-run timestamps live in the store so a late trigger
//! still fires once per scheduled slot.

mod dispatcher;
mod runner;
mod schedule;

pub use dispatcher::{
    ComplianceSummary, DeliveryError, DigestSummary, ExpirySummary, Notification,
    NotificationDispatcher, NotificationSink,
};
pub use runner::{NotificationRequest, NotificationRunReport, NotificationRunner};
pub use schedule::{is_due, latest_slot, should_run_notifications};

use crate::domain::string_enum;

string_enum!(
    NotificationCategory, "notification category" {
        All => "all",
        Expiry => "expiry",
        Compliance => "compliance",
        Digest => "digest",
    }
);

impl NotificationCategory {
    /// Categories that own a schedule slot; `All` is their union.
    pub const SCHEDULED: [Self; 3] = [Self::Expiry, Self::Compliance, Self::Digest];

    pub fn expand(self) -> &'static [Self] {
        match self {
            Self::All => &Self::SCHEDULED,
            Self::Expiry => &[Self::Expiry],
            Self::Compliance => &[Self::Compliance],
            Self::Digest => &[Self::Digest],
        }
    }
}

#[cfg(test)]
mod tests;
