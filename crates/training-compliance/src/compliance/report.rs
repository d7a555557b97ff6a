use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::{
    compliance_rate, expiry_status, is_valid, missing_mandatory_trainings,
    monthly_compliance_rate, ExpiryStatus,
};
use crate::domain::{
    ComplianceLevel, Department, Employee, EmployeeId, TrainingRecord, TrainingType,
    TrainingTypeId,
};
use crate::error::ServiceError;
use crate::store::{ComplianceStore, EmployeeFilter, RecordFilter, TrainingTypeFilter};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingTraining {
    pub training_type_id: TrainingTypeId,
    pub name: String,
    pub compliance_level: ComplianceLevel,
}

impl From<&TrainingType> for MissingTraining {
    fn from(training_type: &TrainingType) -> Self {
        Self {
            training_type_id: training_type.id,
            name: training_type.name.clone(),
            compliance_level: training_type.compliance_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeCompliance {
    pub employee_id: EmployeeId,
    pub nip: String,
    pub name: String,
    pub department: Department,
    pub total_trainings: usize,
    pub valid_trainings: usize,
    pub compliance_rate: f64,
    pub missing_mandatory: Vec<MissingTraining>,
}

impl EmployeeCompliance {
    pub fn is_compliant(&self) -> bool {
        self.missing_mandatory.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceOverview {
    pub evaluated_on: NaiveDate,
    pub total_records: usize,
    pub valid: usize,
    pub expiring_soon: usize,
    pub expired: usize,
    pub active_employees: usize,
    pub mandatory_types: usize,
    pub monthly_compliance_rate: f64,
    pub non_compliant_employees: usize,
}

/// Store-backed compliance views built on the pure rules.
pub struct ComplianceReporter<S> {
    store: Arc<S>,
}

impl<S> ComplianceReporter<S>
where
    S: ComplianceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn employee_compliance(
        &self,
        employee_id: EmployeeId,
        today: NaiveDate,
    ) -> Result<EmployeeCompliance, ServiceError> {
        let employee = self
            .store
            .fetch_employee(employee_id)?
            .ok_or_else(|| ServiceError::not_found("employee", employee_id))?;
        let required = self
            .store
            .list_training_types(&TrainingTypeFilter::required())?;
        let records: Vec<TrainingRecord> = self
            .store
            .list_training_records(&RecordFilter {
                employee_id: Some(employee_id),
                ..RecordFilter::default()
            })?
            .into_iter()
            .map(|detail| detail.record)
            .collect();

        Ok(summarize(&employee, &required, &records, today))
    }

    /// Active employees missing at least one required training, with the gaps.
    pub fn non_compliant_employees(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<EmployeeCompliance>, ServiceError> {
        let required = self
            .store
            .list_training_types(&TrainingTypeFilter::required())?;
        if required.is_empty() {
            return Ok(Vec::new());
        }

        let employees = self.store.list_employees(&EmployeeFilter::active())?;
        let mut by_employee = self.records_by_employee()?;

        Ok(employees
            .iter()
            .map(|employee| {
                let records = by_employee.remove(&employee.id).unwrap_or_default();
                summarize(employee, &required, &records, today)
            })
            .filter(|compliance| !compliance.is_compliant())
            .collect())
    }

    pub fn monthly_compliance_rate(&self, today: NaiveDate) -> Result<f64, ServiceError> {
        let required = self
            .store
            .list_training_types(&TrainingTypeFilter::required())?;
        let employees = self.store.list_employees(&EmployeeFilter::active())?;
        let records = self.store.list_training_records(&RecordFilter::default())?;

        let required_ids: HashSet<TrainingTypeId> = required.iter().map(|t| t.id).collect();
        let active_ids: HashSet<EmployeeId> = employees
            .iter()
            .filter(|employee| employee.counts_toward_compliance())
            .map(|employee| employee.id)
            .collect();

        let covered: HashSet<(EmployeeId, TrainingTypeId)> = records
            .iter()
            .map(|detail| &detail.record)
            .filter(|record| is_valid(record, today))
            .filter(|record| required_ids.contains(&record.training_type_id))
            .filter(|record| active_ids.contains(&record.employee_id))
            .map(|record| (record.employee_id, record.training_type_id))
            .collect();

        Ok(monthly_compliance_rate(
            covered.len(),
            required_ids.len(),
            active_ids.len(),
        ))
    }

    pub fn overview(&self, today: NaiveDate) -> Result<ComplianceOverview, ServiceError> {
        let records = self.store.list_training_records(&RecordFilter::default())?;
        let mut counts: HashMap<ExpiryStatus, usize> = HashMap::new();
        for detail in &records {
            let status = expiry_status(&detail.record, Some(&detail.training_type), today);
            *counts.entry(status).or_default() += 1;
        }

        let active_employees = self.store.list_employees(&EmployeeFilter::active())?.len();
        let mandatory_types = self
            .store
            .list_training_types(&TrainingTypeFilter::required())?
            .len();

        Ok(ComplianceOverview {
            evaluated_on: today,
            total_records: records.len(),
            valid: counts.get(&ExpiryStatus::Valid).copied().unwrap_or(0),
            expiring_soon: counts.get(&ExpiryStatus::ExpiringSoon).copied().unwrap_or(0),
            expired: counts.get(&ExpiryStatus::Expired).copied().unwrap_or(0),
            active_employees,
            mandatory_types,
            monthly_compliance_rate: self.monthly_compliance_rate(today)?,
            non_compliant_employees: self.non_compliant_employees(today)?.len(),
        })
    }

    fn records_by_employee(
        &self,
    ) -> Result<HashMap<EmployeeId, Vec<TrainingRecord>>, ServiceError> {
        let mut grouped: HashMap<EmployeeId, Vec<TrainingRecord>> = HashMap::new();
        for detail in self.store.list_training_records(&RecordFilter::default())? {
            grouped
                .entry(detail.record.employee_id)
                .or_default()
                .push(detail.record);
        }
        Ok(grouped)
    }
}

fn summarize(
    employee: &Employee,
    required: &[TrainingType],
    records: &[TrainingRecord],
    today: NaiveDate,
) -> EmployeeCompliance {
    let valid_trainings = records
        .iter()
        .filter(|record| is_valid(record, today))
        .count();
    let missing_mandatory = missing_mandatory_trainings(required, records, today)
        .into_iter()
        .map(MissingTraining::from)
        .collect();

    EmployeeCompliance {
        employee_id: employee.id,
        nip: employee.nip.clone(),
        name: employee.name.clone(),
        department: employee.department,
        total_trainings: records.len(),
        valid_trainings,
        compliance_rate: compliance_rate(records, today),
        missing_mandatory,
    }
}
