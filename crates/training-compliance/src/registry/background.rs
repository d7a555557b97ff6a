use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use super::clean_optional;
use crate::domain::{BackgroundCheck, BackgroundCheckId, EmployeeId, NewBackgroundCheck};
use crate::error::ServiceError;
use crate::store::ComplianceStore;

pub struct BackgroundCheckRegistry<S> {
    store: Arc<S>,
}

impl<S> BackgroundCheckRegistry<S>
where
    S: ComplianceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn record(&self, submission: NewBackgroundCheck) -> Result<BackgroundCheck, ServiceError> {
        let mut check = submission;
        self.store
            .fetch_employee(check.employee_id)?
            .ok_or_else(|| ServiceError::not_found("employee", check.employee_id))?;
        validate_window(check.check_date, check.valid_until)?;
        check.notes = clean_optional(check.notes);

        Ok(self.store.insert_background_check(&check)?)
    }

    pub fn update(&self, check: &BackgroundCheck) -> Result<BackgroundCheck, ServiceError> {
        let current = self.get(check.id)?;
        if current.employee_id != check.employee_id {
            return Err(ServiceError::validation(
                "employee_id",
                "a background check cannot move to another employee",
            ));
        }
        validate_window(check.check_date, check.valid_until)?;

        self.store.update_background_check(check)?;
        Ok(check.clone())
    }

    pub fn get(&self, id: BackgroundCheckId) -> Result<BackgroundCheck, ServiceError> {
        self.store
            .fetch_background_check(id)?
            .ok_or_else(|| ServiceError::not_found("background check", id))
    }

    pub fn for_employee(&self, employee_id: EmployeeId) -> Result<Vec<BackgroundCheck>, ServiceError> {
        Ok(self.store.list_background_checks(Some(employee_id))?)
    }

    /// Marks passed checks whose validity ended as expired; returns how many changed.
    pub fn expire_lapsed(&self, today: NaiveDate) -> Result<usize, ServiceError> {
        let mut changed = 0;
        for mut check in self.store.list_background_checks(None)? {
            let effective = check.effective_status(today);
            if effective != check.status {
                check.status = effective;
                self.store.update_background_check(&check)?;
                changed += 1;
            }
        }
        if changed > 0 {
            info!(changed, "lapsed background checks expired");
        }
        Ok(changed)
    }
}

fn validate_window(check_date: NaiveDate, valid_until: Option<NaiveDate>) -> Result<(), ServiceError> {
    match valid_until {
        Some(until) if until <= check_date => Err(ServiceError::validation(
            "valid_until",
            "must be after the check date",
        )),
        _ => Ok(()),
    }
}
