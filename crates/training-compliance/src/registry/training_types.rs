use std::sync::Arc;

use super::{clean_optional, require_text};
use crate::domain::{NewTrainingType, TrainingType, TrainingTypeId, ValidationError};
use crate::error::ServiceError;
use crate::store::{ComplianceStore, TrainingTypeFilter};

pub struct TrainingCatalog<S> {
    store: Arc<S>,
}

impl<S> TrainingCatalog<S>
where
    S: ComplianceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create(&self, submission: NewTrainingType) -> Result<TrainingType, ServiceError> {
        let mut training_type = submission;
        training_type.name = training_type.name.trim().to_string();
        require_text("name", &training_type.name)?;
        validate_periods(training_type.validity_months, training_type.notification_days)?;
        training_type.code = clean_optional(training_type.code);
        training_type.description = clean_optional(training_type.description);

        Ok(self.store.insert_training_type(&training_type)?)
    }

    pub fn update(&self, training_type: &TrainingType) -> Result<TrainingType, ServiceError> {
        self.get(training_type.id)?;
        require_text("name", &training_type.name)?;
        validate_periods(
            training_type.validity_months,
            Some(training_type.notification_days),
        )?;

        self.store.update_training_type(training_type)?;
        Ok(training_type.clone())
    }

    /// Retired types stop counting toward compliance but keep their records.
    pub fn deactivate(&self, id: TrainingTypeId) -> Result<TrainingType, ServiceError> {
        let mut training_type = self.get(id)?;
        training_type.is_active = false;
        self.store.update_training_type(&training_type)?;
        Ok(training_type)
    }

    pub fn get(&self, id: TrainingTypeId) -> Result<TrainingType, ServiceError> {
        self.store
            .fetch_training_type(id)?
            .ok_or_else(|| ServiceError::not_found("training type", id))
    }

    pub fn list(&self, filter: &TrainingTypeFilter) -> Result<Vec<TrainingType>, ServiceError> {
        Ok(self.store.list_training_types(filter)?)
    }
}

fn validate_periods(
    validity_months: u32,
    notification_days: Option<u32>,
) -> Result<(), ValidationError> {
    if validity_months == 0 {
        return Err(ValidationError::new(
            "validity_months",
            "must be at least one month",
        ));
    }
    if notification_days == Some(0) {
        return Err(ValidationError::new(
            "notification_days",
            "must be at least one day",
        ));
    }
    Ok(())
}
