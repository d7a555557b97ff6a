use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use super::{clean_optional, require_email, require_text};
use crate::domain::{Employee, EmployeeId, NewEmployee};
use crate::error::ServiceError;
use crate::store::{ComplianceStore, EmployeeFilter, RecordFilter};

/// Employee master data. Removal is a soft delete; purging is only allowed for
/// employees without training history.
pub struct EmployeeRegistry<S> {
    store: Arc<S>,
}

impl<S> EmployeeRegistry<S>
where
    S: ComplianceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn register(&self, submission: NewEmployee) -> Result<Employee, ServiceError> {
        let mut employee = submission;
        employee.nip = employee.nip.trim().to_string();
        employee.name = employee.name.trim().to_string();
        validate_nip(&employee.nip)?;
        require_text("name", &employee.name)?;

        employee.email = clean_optional(employee.email);
        if let Some(email) = &employee.email {
            require_email("email", email)?;
        }
        employee.unit = clean_optional(employee.unit);
        employee.position = clean_optional(employee.position);
        employee.nik =
            Some(clean_optional(employee.nik).unwrap_or_else(|| format!("AUTO-{}", employee.nip)));

        if self.store.fetch_employee_by_nip(&employee.nip)?.is_some() {
            return Err(ServiceError::validation(
                "nip",
                format!("{} is already registered", employee.nip),
            ));
        }

        let stored = self.store.insert_employee(&employee)?;
        info!(employee_id = %stored.id, nip = %stored.nip, "employee registered");
        Ok(stored)
    }

    pub fn update(&self, employee: &Employee) -> Result<Employee, ServiceError> {
        let current = self.get(employee.id)?;
        let mut updated = employee.clone();
        updated.nip = updated.nip.trim().to_string();
        updated.name = updated.name.trim().to_string();
        validate_nip(&updated.nip)?;
        require_text("name", &updated.name)?;
        require_text("nik", &updated.nik)?;
        updated.email = clean_optional(updated.email);
        if let Some(email) = &updated.email {
            require_email("email", email)?;
        }

        if updated.nip != current.nip {
            if let Some(other) = self.store.fetch_employee_by_nip(&updated.nip)? {
                if other.id != updated.id {
                    return Err(ServiceError::validation(
                        "nip",
                        format!("{} is already registered", updated.nip),
                    ));
                }
            }
        }
        // Soft-delete state only changes through remove/restore.
        updated.deleted_at = current.deleted_at;
        if current.is_deleted() {
            updated.is_active = false;
        }

        self.store.update_employee(&updated)?;
        Ok(updated)
    }

    pub fn get(&self, id: EmployeeId) -> Result<Employee, ServiceError> {
        self.store
            .fetch_employee(id)?
            .ok_or_else(|| ServiceError::not_found("employee", id))
    }

    pub fn find_by_nip(&self, nip: &str) -> Result<Employee, ServiceError> {
        self.store
            .fetch_employee_by_nip(nip.trim())?
            .ok_or_else(|| ServiceError::not_found("employee", nip.trim()))
    }

    pub fn list(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, ServiceError> {
        Ok(self.store.list_employees(filter)?)
    }

    /// Soft delete: the employee turns inactive and disappears from default listings.
    pub fn remove(&self, id: EmployeeId, at: NaiveDateTime) -> Result<Employee, ServiceError> {
        let mut employee = self.get(id)?;
        if employee.is_deleted() {
            return Ok(employee);
        }
        employee.is_active = false;
        employee.deleted_at = Some(at);
        self.store.update_employee(&employee)?;
        info!(employee_id = %id, "employee soft-deleted");
        Ok(employee)
    }

    pub fn restore(&self, id: EmployeeId) -> Result<Employee, ServiceError> {
        let mut employee = self.get(id)?;
        employee.deleted_at = None;
        employee.is_active = true;
        self.store.update_employee(&employee)?;
        Ok(employee)
    }

    /// Hard delete, refused while training records reference the employee.
    pub fn purge(&self, id: EmployeeId) -> Result<(), ServiceError> {
        self.get(id)?;
        let records = self.store.list_training_records(&RecordFilter {
            employee_id: Some(id),
            ..RecordFilter::default()
        })?;
        if !records.is_empty() {
            return Err(ServiceError::validation(
                "employee",
                format!(
                    "has {} training record(s); remove the employee instead of purging",
                    records.len()
                ),
            ));
        }

        self.store.delete_employee(id)?;
        info!(employee_id = %id, "employee purged");
        Ok(())
    }
}

fn validate_nip(nip: &str) -> Result<(), ServiceError> {
    if nip.is_empty() || !nip.chars().all(|c| c.is_ascii_digit()) {
        return Err(ServiceError::validation("nip", "must contain digits only"));
    }
    Ok(())
}
