use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Months, NaiveDate};
use tracing::info;

use super::clean_optional;
use crate::domain::{
    EmployeeId, NewTrainingRecord, TrainingRecord, TrainingRecordDetail, TrainingRecordId,
    TrainingType, TrainingTypeId,
};
use crate::error::ServiceError;
use crate::store::{ComplianceStore, RecordFilter};

/// Training records with their date, renewal-chain and certificate rules.
pub struct TrainingRecordService<S> {
    store: Arc<S>,
}

impl<S> TrainingRecordService<S>
where
    S: ComplianceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn record(&self, submission: NewTrainingRecord) -> Result<TrainingRecord, ServiceError> {
        let mut record = submission;
        let employee = self
            .store
            .fetch_employee(record.employee_id)?
            .ok_or_else(|| ServiceError::not_found("employee", record.employee_id))?;
        if employee.is_deleted() {
            return Err(ServiceError::validation(
                "employee_id",
                format!("employee {} has been removed", employee.id),
            ));
        }
        let training_type = self
            .store
            .fetch_training_type(record.training_type_id)?
            .ok_or_else(|| ServiceError::not_found("training type", record.training_type_id))?;

        let expiry_date = match record.expiry_date {
            Some(date) => date,
            None => default_expiry(record.issue_date, &training_type)?,
        };
        validate_dates(record.issue_date, expiry_date)?;
        record.expiry_date = Some(expiry_date);

        record.certificate_number = clean_optional(record.certificate_number);
        record.training_provider = clean_optional(record.training_provider);
        record.notes = clean_optional(record.notes);

        if let Some(previous_id) = record.previous_training_id {
            let previous = self.get(previous_id)?;
            same_lineage(&previous, record.employee_id, record.training_type_id)?;
        }

        let stored = self.store.insert_training_record(&record)?;
        info!(
            training_record_id = %stored.id,
            employee_id = %stored.employee_id,
            expiry = %stored.expiry_date,
            "training record created"
        );
        Ok(stored)
    }

    /// Starts a new record that renews `previous`, dated `issue_date`.
    pub fn renew(
        &self,
        previous_id: TrainingRecordId,
        issue_date: NaiveDate,
    ) -> Result<TrainingRecord, ServiceError> {
        let previous = self.get(previous_id)?;
        let mut renewal =
            NewTrainingRecord::new(previous.employee_id, previous.training_type_id, issue_date);
        renewal.training_provider = previous.training_provider.clone();
        renewal.previous_training_id = Some(previous.id);
        self.record(renewal)
    }

    /// Persists changes; a certificate number may be set once but never changed.
    pub fn update(&self, record: &TrainingRecord) -> Result<TrainingRecord, ServiceError> {
        let current = self.get(record.id)?;
        if record.employee_id != current.employee_id
            || record.training_type_id != current.training_type_id
        {
            return Err(ServiceError::validation(
                "training_record",
                "employee and training type cannot change",
            ));
        }
        validate_dates(record.issue_date, record.expiry_date)?;

        let mut updated = record.clone();
        updated.certificate_number = clean_optional(updated.certificate_number);
        match (&current.certificate_number, &updated.certificate_number) {
            (Some(existing), Some(requested)) if existing != requested => {
                return Err(ServiceError::validation(
                    "certificate_number",
                    "is immutable once assigned",
                ));
            }
            (Some(_), None) => {
                return Err(ServiceError::validation(
                    "certificate_number",
                    "cannot be cleared once assigned",
                ));
            }
            _ => {}
        }

        if let Some(previous_id) = updated.previous_training_id {
            let previous = self.get(previous_id)?;
            same_lineage(&previous, updated.employee_id, updated.training_type_id)?;
            self.ensure_acyclic(updated.id, previous_id)?;
        }

        self.store.update_training_record(&updated)?;
        self.get(updated.id)
    }

    pub fn get(&self, id: TrainingRecordId) -> Result<TrainingRecord, ServiceError> {
        self.store
            .fetch_training_record(id)?
            .ok_or_else(|| ServiceError::not_found("training record", id))
    }

    pub fn list(&self, filter: &RecordFilter) -> Result<Vec<TrainingRecordDetail>, ServiceError> {
        Ok(self.store.list_training_records(filter)?)
    }

    /// Renewal chain ending at `id`, newest first.
    pub fn history(&self, id: TrainingRecordId) -> Result<Vec<TrainingRecord>, ServiceError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = Some(id);
        while let Some(current_id) = cursor {
            if !seen.insert(current_id) {
                break;
            }
            let record = self.get(current_id)?;
            cursor = record.previous_training_id;
            chain.push(record);
        }
        Ok(chain)
    }

    /// Walks back from `previous_id`; reaching `id` would close a loop.
    fn ensure_acyclic(
        &self,
        id: TrainingRecordId,
        previous_id: TrainingRecordId,
    ) -> Result<(), ServiceError> {
        let mut seen = HashSet::new();
        let mut cursor = Some(previous_id);
        while let Some(current_id) = cursor {
            if current_id == id || !seen.insert(current_id) {
                return Err(ServiceError::validation(
                    "previous_training_id",
                    format!("training record {previous_id} would make the renewal chain cyclic"),
                ));
            }
            cursor = self
                .store
                .fetch_training_record(current_id)?
                .and_then(|record| record.previous_training_id);
        }
        Ok(())
    }
}

fn default_expiry(
    issue_date: NaiveDate,
    training_type: &TrainingType,
) -> Result<NaiveDate, ServiceError> {
    issue_date
        .checked_add_months(Months::new(training_type.validity_months))
        .ok_or_else(|| {
            ServiceError::validation("expiry_date", "issue date plus validity is out of range")
        })
}

fn validate_dates(issue_date: NaiveDate, expiry_date: NaiveDate) -> Result<(), ServiceError> {
    if expiry_date <= issue_date {
        return Err(ServiceError::validation(
            "expiry_date",
            "must be after the issue date",
        ));
    }
    Ok(())
}

fn same_lineage(
    previous: &TrainingRecord,
    employee_id: EmployeeId,
    training_type_id: TrainingTypeId,
) -> Result<(), ServiceError> {
    if previous.employee_id != employee_id || previous.training_type_id != training_type_id {
        return Err(ServiceError::validation(
            "previous_training_id",
            format!(
                "training record {} belongs to another employee or training type",
                previous.id
            ),
        ));
    }
    Ok(())
}
