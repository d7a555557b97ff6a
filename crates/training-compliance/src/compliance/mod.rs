//! Certificate validity and compliance calculations.
//!
//! Everything here is a pure function of entity state and the evaluation date, so the
//! same rules back the reports, notifications, exports and certificate verification.

mod report;

pub use report::{
    ComplianceOverview, ComplianceReporter, EmployeeCompliance, MissingTraining,
};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::{TrainingRecord, TrainingType, TrainingTypeId, DEFAULT_NOTIFICATION_DAYS};

/// Expiry classification of a record, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Valid,
}

impl ExpiryStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Expired, Self::ExpiringSoon, Self::Valid]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Expired => "Expired",
            Self::ExpiringSoon => "Expiring Soon",
            Self::Valid => "Valid",
        }
    }
}

pub fn is_valid(record: &TrainingRecord, today: NaiveDate) -> bool {
    record.expiry_date > today
}

pub fn is_expired(record: &TrainingRecord, today: NaiveDate) -> bool {
    record.expiry_date <= today
}

/// Lead time for a record's type, falling back to the default when the type is unknown.
pub fn notification_days(training_type: Option<&TrainingType>) -> u32 {
    training_type
        .map(|training_type| training_type.notification_days)
        .filter(|days| *days > 0)
        .unwrap_or(DEFAULT_NOTIFICATION_DAYS)
}

pub fn is_expiring_soon(
    record: &TrainingRecord,
    training_type: Option<&TrainingType>,
    today: NaiveDate,
) -> bool {
    let horizon = today + Duration::days(i64::from(notification_days(training_type)));
    record.expiry_date > today && record.expiry_date <= horizon
}

/// Signed whole days until expiry; negative once the record has lapsed.
pub fn days_until_expiry(record: &TrainingRecord, today: NaiveDate) -> i64 {
    (record.expiry_date - today).num_days()
}

pub fn expiry_status(
    record: &TrainingRecord,
    training_type: Option<&TrainingType>,
    today: NaiveDate,
) -> ExpiryStatus {
    if is_expired(record, today) {
        ExpiryStatus::Expired
    } else if is_expiring_soon(record, training_type, today) {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Valid
    }
}

pub fn status_label(
    record: &TrainingRecord,
    training_type: Option<&TrainingType>,
    today: NaiveDate,
) -> &'static str {
    expiry_status(record, training_type, today).label()
}

/// Percentage with two decimals; a zero denominator yields 0.
pub fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let raw = numerator as f64 / denominator as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Share of an employee's records that are currently valid.
pub fn compliance_rate<'a, I>(records: I, today: NaiveDate) -> f64
where
    I: IntoIterator<Item = &'a TrainingRecord>,
{
    let (valid, total) = records
        .into_iter()
        .fold((0usize, 0usize), |(valid, total), record| {
            (valid + usize::from(is_valid(record, today)), total + 1)
        });
    percentage(valid, total)
}

/// Organization-wide rate: covered (employee, mandatory type) pairs over all required pairs.
pub fn monthly_compliance_rate(
    valid_mandatory_records: usize,
    mandatory_type_count: usize,
    active_employee_count: usize,
) -> f64 {
    percentage(
        valid_mandatory_records,
        mandatory_type_count * active_employee_count,
    )
}

/// Required training types the employee holds no currently-valid record for.
pub fn missing_mandatory_trainings<'t, 'r, T, R>(
    training_types: T,
    records: R,
    today: NaiveDate,
) -> Vec<&'t TrainingType>
where
    T: IntoIterator<Item = &'t TrainingType>,
    R: IntoIterator<Item = &'r TrainingRecord>,
{
    let covered: HashSet<TrainingTypeId> = records
        .into_iter()
        .filter(|record| is_valid(record, today))
        .map(|record| record.training_type_id)
        .collect();

    training_types
        .into_iter()
        .filter(|training_type| training_type.is_required())
        .filter(|training_type| !covered.contains(&training_type.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ComplianceLevel, CompletionStatus, EmployeeId, TrainingCategory, TrainingRecordId,
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 15).expect("valid date")
    }

    fn training_type(id: i64, mandatory: bool, notification_days: u32) -> TrainingType {
        TrainingType {
            id: TrainingTypeId(id),
            name: format!("Type {id}"),
            code: None,
            category: TrainingCategory::Safety,
            is_mandatory: mandatory,
            validity_months: 12,
            notification_days,
            compliance_level: ComplianceLevel::High,
            is_active: true,
            description: None,
        }
    }

    fn record(type_id: i64, expiry_offset_days: i64) -> TrainingRecord {
        let expiry_date = today() + Duration::days(expiry_offset_days);
        TrainingRecord {
            id: TrainingRecordId(type_id * 100 + expiry_offset_days),
            employee_id: EmployeeId(1),
            training_type_id: TrainingTypeId(type_id),
            certificate_number: None,
            issue_date: expiry_date - Duration::days(365),
            expiry_date,
            completion_status: CompletionStatus::Completed,
            training_provider: None,
            notes: None,
            previous_training_id: None,
        }
    }

    #[test]
    fn validity_and_expiry_are_exclusive_with_equality_expired() {
        for offset in [-30, -1, 0, 1, 30] {
            let record = record(1, offset);
            assert_ne!(is_valid(&record, today()), is_expired(&record, today()));
        }

        let boundary = record(1, 0);
        assert!(is_expired(&boundary, today()));
        assert!(!is_valid(&boundary, today()));
    }

    #[test]
    fn expiring_soon_uses_type_window_or_default() {
        let short_window = training_type(1, true, 7);
        assert!(is_expiring_soon(&record(1, 7), Some(&short_window), today()));
        assert!(!is_expiring_soon(&record(1, 8), Some(&short_window), today()));

        assert!(is_expiring_soon(&record(1, 30), None, today()));
        assert!(!is_expiring_soon(&record(1, 31), None, today()));
        assert!(!is_expiring_soon(&record(1, 0), None, today()));
    }

    #[test]
    fn status_label_follows_precedence() {
        let training_type = training_type(1, true, 30);
        assert_eq!(status_label(&record(1, 0), Some(&training_type), today()), "Expired");
        assert_eq!(
            status_label(&record(1, 10), Some(&training_type), today()),
            "Expiring Soon"
        );
        assert_eq!(status_label(&record(1, 90), Some(&training_type), today()), "Valid");
    }

    #[test]
    fn days_until_expiry_is_signed() {
        assert_eq!(days_until_expiry(&record(1, 12), today()), 12);
        assert_eq!(days_until_expiry(&record(1, -3), today()), -3);
    }

    #[test]
    fn compliance_rate_is_bounded_and_rounded() {
        let none: Vec<TrainingRecord> = Vec::new();
        assert_eq!(compliance_rate(&none, today()), 0.0);

        let records = vec![record(1, 10), record(2, -5), record(3, 40)];
        let rate = compliance_rate(&records, today());
        assert_eq!(rate, 66.67);
        assert!((0.0..=100.0).contains(&rate));

        let all_valid = vec![record(1, 10), record(2, 5)];
        assert_eq!(compliance_rate(&all_valid, today()), 100.0);
    }

    #[test]
    fn monthly_rate_guards_zero_denominator() {
        assert_eq!(monthly_compliance_rate(5, 0, 10), 0.0);
        assert_eq!(monthly_compliance_rate(0, 3, 0), 0.0);
        assert_eq!(monthly_compliance_rate(3, 2, 4), 37.5);
    }

    #[test]
    fn missing_mandatory_is_a_set_difference() {
        let types = vec![
            training_type(1, true, 30),
            training_type(2, true, 30),
            training_type(3, false, 30),
        ];

        let covered = vec![record(1, 60), record(2, 5)];
        assert!(missing_mandatory_trainings(&types, &covered, today()).is_empty());

        let partly = vec![record(1, 60), record(2, -1)];
        let missing = missing_mandatory_trainings(&types, &partly, today());
        let ids: Vec<_> = missing.iter().map(|training_type| training_type.id).collect();
        assert_eq!(ids, vec![TrainingTypeId(2)]);
    }

    #[test]
    fn inactive_mandatory_types_are_not_required() {
        let mut retired = training_type(1, true, 30);
        retired.is_active = false;
        let types = vec![retired];
        let records: Vec<TrainingRecord> = Vec::new();
        assert!(missing_mandatory_trainings(&types, &records, today()).is_empty());
    }
}
