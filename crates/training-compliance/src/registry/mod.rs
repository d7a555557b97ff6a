//! Validated create/update/delete flows over the entity store.
//!
//! The store enforces uniqueness and foreign keys; the registries add the rules that
//! need context: generated NIKs, soft deletion, default expiry dates, renewal chains
//! and certificate immutability.

mod background;
mod employees;
mod records;
mod training_types;
mod users;

pub use background::BackgroundCheckRegistry;
pub use employees::EmployeeRegistry;
pub use records::TrainingRecordService;
pub use training_types::TrainingCatalog;
pub use users::UserDirectory;

use crate::domain::ValidationError;

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, "must not be empty"))
    } else {
        Ok(())
    }
}

fn require_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::new(
            field,
            format!("'{value}' is not an email address"),
        )),
    }
}

/// Trims and drops blank optional text.
fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests;
