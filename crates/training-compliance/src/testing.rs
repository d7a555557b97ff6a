//! Shared fixtures for the unit test modules.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{
    ComplianceLevel, Department, Employee, EmploymentStatus, NewEmployee, NewTrainingRecord,
    NewTrainingType, TrainingCategory, TrainingRecord, TrainingType,
};
use crate::store::{
    EmployeeRepository, SqliteStore, TrainingRecordRepository, TrainingTypeRepository,
};

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().expect("in-memory store"))
}

pub(crate) fn employee(store: &SqliteStore, nip: &str, name: &str) -> Employee {
    let mut new_employee =
        NewEmployee::new(nip, name, Department::Ramp, EmploymentStatus::Permanent);
    new_employee.nik = Some(format!("AUTO-{nip}"));
    store
        .insert_employee(&new_employee)
        .expect("employee inserted")
}

pub(crate) fn mandatory_type(store: &SqliteStore, name: &str) -> TrainingType {
    store
        .insert_training_type(
            &NewTrainingType::new(name, TrainingCategory::Safety, 24, ComplianceLevel::Critical)
                .mandatory(),
        )
        .expect("training type inserted")
}

pub(crate) fn optional_type(store: &SqliteStore, name: &str) -> TrainingType {
    store
        .insert_training_type(&NewTrainingType::new(
            name,
            TrainingCategory::Service,
            12,
            ComplianceLevel::Low,
        ))
        .expect("training type inserted")
}

pub(crate) fn record(
    store: &SqliteStore,
    employee: &Employee,
    training_type: &TrainingType,
    issue_date: NaiveDate,
    expiry_date: NaiveDate,
) -> TrainingRecord {
    store
        .insert_training_record(
            &NewTrainingRecord::new(employee.id, training_type.id, issue_date)
                .expiring_on(expiry_date),
        )
        .expect("training record inserted")
}

pub(crate) fn certified_record(
    store: &SqliteStore,
    employee: &Employee,
    training_type: &TrainingType,
    issue_date: NaiveDate,
    expiry_date: NaiveDate,
    certificate_number: &str,
) -> TrainingRecord {
    let mut new_record = NewTrainingRecord::new(employee.id, training_type.id, issue_date)
        .expiring_on(expiry_date);
    new_record.certificate_number = Some(certificate_number.to_string());
    store
        .insert_training_record(&new_record)
        .expect("training record inserted")
}
