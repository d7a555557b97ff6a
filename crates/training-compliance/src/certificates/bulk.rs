use std::sync::Arc;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::number::format_certificate_number;
use crate::domain::{EmployeeId, TrainingRecord, TrainingRecordId, TrainingType, TrainingTypeId};
use crate::error::ServiceError;
use crate::store::{
    CertificateWrite, ComplianceStore, RecordFilter, RepositoryError, SequenceKey,
    TrainingRecordRepository,
};

/// Numbers imported out of band can collide with the counter; give up after this many.
const MAX_ASSIGN_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateOutcome {
    Assigned(String),
    /// The record already had a number and was left untouched.
    Existing(String),
}

impl CertificateOutcome {
    pub fn number(&self) -> &str {
        match self {
            CertificateOutcome::Assigned(number) | CertificateOutcome::Existing(number) => number,
        }
    }
}

/// Assigns sequenced certificate numbers to individual records.
pub struct CertificateIssuer<S> {
    store: Arc<S>,
}

impl<S> CertificateIssuer<S>
where
    S: TrainingRecordRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Idempotent: a record that already carries a number keeps it.
    pub fn issue(
        &self,
        record: &TrainingRecord,
        training_type: &TrainingType,
    ) -> Result<CertificateOutcome, RepositoryError> {
        if let Some(existing) = &record.certificate_number {
            return Ok(CertificateOutcome::Existing(existing.clone()));
        }

        let key = SequenceKey {
            training_type_id: training_type.id,
            year: record.issue_date.year(),
            month: record.issue_date.month(),
        };

        for attempt in 1..=MAX_ASSIGN_ATTEMPTS {
            let sequence = self.store.next_certificate_sequence(key)?;
            let number = format_certificate_number(&training_type.name, sequence, record.issue_date);
            match self.store.assign_certificate_number(record.id, &number) {
                Ok(CertificateWrite::Assigned) => return Ok(CertificateOutcome::Assigned(number)),
                Ok(CertificateWrite::AlreadyAssigned(existing)) => {
                    return Ok(CertificateOutcome::Existing(existing))
                }
                Err(RepositoryError::Conflict(_)) => {
                    debug!(attempt, %number, "certificate number taken, advancing sequence");
                }
                Err(err) => return Err(err),
            }
        }

        Err(RepositoryError::Conflict(format!(
            "no free certificate number for training record {} after {MAX_ASSIGN_ATTEMPTS} attempts",
            record.id
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCertificate {
    pub training_record_id: TrainingRecordId,
    pub certificate_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkCertificateReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Distinct failure messages in the order first seen.
    pub errors: Vec<String>,
    /// Numbers assigned by this run; records that already had one are not listed.
    pub issued: Vec<IssuedCertificate>,
}

impl BulkCertificateReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record_failure(&mut self, message: String) {
        self.failed += 1;
        if !self.errors.contains(&message) {
            self.errors.push(message);
        }
    }
}

/// Which records a bulk run covers. Explicit ids win over the filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificateSelection {
    #[serde(default)]
    pub ids: Vec<TrainingRecordId>,
    #[serde(default)]
    pub missing_only: bool,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub training_type_id: Option<TrainingTypeId>,
}

pub struct BulkCertificateGenerator<S> {
    store: Arc<S>,
    issuer: CertificateIssuer<S>,
    batch_size: usize,
}

impl<S> BulkCertificateGenerator<S>
where
    S: ComplianceStore + 'static,
{
    pub fn new(store: Arc<S>, batch_size: usize) -> Self {
        Self {
            issuer: CertificateIssuer::new(store.clone()),
            store,
            batch_size: batch_size.max(1),
        }
    }

    pub fn resolve(
        &self,
        selection: &CertificateSelection,
    ) -> Result<Vec<TrainingRecordId>, ServiceError> {
        if !selection.ids.is_empty() {
            return Ok(selection.ids.clone());
        }

        let records = self.store.list_training_records(&RecordFilter {
            employee_id: selection.employee_id,
            training_type_id: selection.training_type_id,
            missing_certificate: selection.missing_only,
            ..RecordFilter::default()
        })?;
        Ok(records.into_iter().map(|detail| detail.record.id).collect())
    }

    pub fn run(&self, selection: &CertificateSelection) -> Result<BulkCertificateReport, ServiceError> {
        let ids = self.resolve(selection)?;
        self.generate(&ids)
    }

    /// Issues numbers for `ids`. A missing record or an exhausted sequence is recorded
    /// against that item; an unavailable store aborts the run.
    pub fn generate(&self, ids: &[TrainingRecordId]) -> Result<BulkCertificateReport, ServiceError> {
        let mut report = BulkCertificateReport {
            total: ids.len(),
            ..BulkCertificateReport::default()
        };
        let batches = ids.len().div_ceil(self.batch_size);

        for (index, batch) in ids.chunks(self.batch_size).enumerate() {
            for id in batch {
                match self.generate_one(*id) {
                    Ok(CertificateOutcome::Assigned(number)) => {
                        report.successful += 1;
                        report.issued.push(IssuedCertificate {
                            training_record_id: *id,
                            certificate_number: number,
                        });
                    }
                    Ok(CertificateOutcome::Existing(_)) => report.successful += 1,
                    Err(ServiceError::Repository(RepositoryError::Unavailable(reason))) => {
                        return Err(RepositoryError::Unavailable(reason).into());
                    }
                    Err(err) => {
                        warn!(training_record_id = %id, error = %err, "certificate not issued");
                        report.record_failure(failure_message(*id, &err));
                    }
                }
            }

            info!(
                batch = index + 1,
                batches,
                processed = report.successful + report.failed,
                total = report.total,
                "certificate batch processed"
            );
        }

        Ok(report)
    }

    fn generate_one(&self, id: TrainingRecordId) -> Result<CertificateOutcome, ServiceError> {
        let record = self
            .store
            .fetch_training_record(id)?
            .ok_or_else(|| ServiceError::not_found("training record", id))?;
        let training_type = self
            .store
            .fetch_training_type(record.training_type_id)?
            .ok_or_else(|| ServiceError::not_found("training type", record.training_type_id))?;

        Ok(self.issuer.issue(&record, &training_type)?)
    }
}

fn failure_message(id: TrainingRecordId, err: &ServiceError) -> String {
    match err {
        ServiceError::NotFound {
            entity: "training record",
            ..
        }
        | ServiceError::Repository(RepositoryError::NotFound) => {
            format!("Training record {id} not found")
        }
        other => format!("Training record {id}: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::testing::{certified_record, date, employee, mandatory_type, record, store};

    fn five_records() -> (Arc<SqliteStore>, Vec<TrainingRecordId>) {
        let store = store();
        let sari = employee(&store, "1001", "Sari Wulandari");
        let safety = mandatory_type(&store, "Aviation Safety");
        let ids = (0..5)
            .map(|offset| {
                record(&store, &sari, &safety, date(2025, 8, 1 + offset), date(2027, 8, 1)).id
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn missing_record_fails_one_item_and_the_batch() {
        let (store, ids) = five_records();
        store
            .with_connection(|conn| conn.execute("DELETE FROM training_records WHERE id = ?1", [ids[2].0]))
            .expect("record removed");
        let generator = BulkCertificateGenerator::new(store.clone(), 2);

        let report = generator.generate(&ids).expect("run completes");

        assert_eq!(report.total, 5);
        assert_eq!(report.successful, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors, vec![format!("Training record {} not found", ids[2])]);
        assert!(!report.is_success());
        let numbers: Vec<_> = report
            .issued
            .iter()
            .map(|issued| issued.certificate_number.as_str())
            .collect();
        assert_eq!(
            numbers,
            vec![
                "GLC/AVI-000001/08/2025",
                "GLC/AVI-000002/08/2025",
                "GLC/AVI-000003/08/2025",
                "GLC/AVI-000004/08/2025",
            ]
        );
    }

    #[test]
    fn repeated_generation_is_idempotent() {
        let (store, ids) = five_records();
        let generator = BulkCertificateGenerator::new(store.clone(), 50);

        let first = generator.generate(&ids[..1]).expect("first run");
        let second = generator.generate(&ids[..1]).expect("second run");

        assert_eq!(first.issued.len(), 1);
        assert!(second.issued.is_empty());
        assert_eq!(second.successful, 1);
        let stored = store
            .fetch_training_record(ids[0])
            .unwrap()
            .and_then(|record| record.certificate_number);
        assert_eq!(stored.as_deref(), Some("GLC/AVI-000001/08/2025"));
    }

    #[test]
    fn duplicate_missing_ids_collapse_to_one_message() {
        let (store, _) = five_records();
        let generator = BulkCertificateGenerator::new(store, 50);
        let ghost = TrainingRecordId(404);

        let report = generator.generate(&[ghost, ghost]).expect("run completes");
        assert_eq!(report.failed, 2);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn imported_numbers_are_skipped_on_conflict() {
        let store = store();
        let sari = employee(&store, "1001", "Sari Wulandari");
        let safety = mandatory_type(&store, "Aviation Safety");
        let pending = record(&store, &sari, &safety, date(2025, 8, 4), date(2027, 8, 4));
        // Pre-seed the counter so the first candidate collides with an imported number.
        store
            .next_certificate_sequence(SequenceKey {
                training_type_id: safety.id,
                year: 2025,
                month: 8,
            })
            .expect("sequence seeded");
        certified_record(
            &store,
            &sari,
            &safety,
            date(2025, 8, 1),
            date(2027, 8, 1),
            "GLC/AVI-000002/08/2025",
        );

        let generator = BulkCertificateGenerator::new(store.clone(), 50);
        let report = generator.generate(&[pending.id]).expect("run completes");

        assert!(report.is_success());
        assert_eq!(report.issued[0].certificate_number, "GLC/AVI-000003/08/2025");
    }

    #[test]
    fn selection_filters_resolve_ids() {
        let (store, ids) = five_records();
        let generator = BulkCertificateGenerator::new(store, 50);
        generator.generate(&ids[..2]).expect("partial run");

        let missing = generator
            .resolve(&CertificateSelection {
                missing_only: true,
                ..CertificateSelection::default()
            })
            .expect("ids resolved");
        assert_eq!(missing, ids[2..].to_vec());

        let explicit = generator
            .resolve(&CertificateSelection {
                ids: vec![ids[0]],
                missing_only: true,
                ..CertificateSelection::default()
            })
            .expect("ids resolved");
        assert_eq!(explicit, vec![ids[0]]);
    }

    #[test]
    fn unavailable_store_aborts_the_batch() {
        let (store, ids) = five_records();
        store
            .with_connection(|conn| conn.execute_batch("DROP TABLE certificate_sequences;"))
            .expect("table dropped");
        let generator = BulkCertificateGenerator::new(store, 50);

        assert!(matches!(
            generator.generate(&ids),
            Err(ServiceError::Repository(RepositoryError::Unavailable(_)))
        ));
    }
}
