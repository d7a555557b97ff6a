use std::sync::Arc;

use super::{require_email, require_text};
use crate::domain::{NewUser, User, UserRole, ValidationError};
use crate::error::ServiceError;
use crate::store::ComplianceStore;

/// Administrative accounts that receive the compliance digest.
pub struct UserDirectory<S> {
    store: Arc<S>,
}

impl<S> UserDirectory<S>
where
    S: ComplianceStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Legacy manager/staff/viewer roles are stored as `admin`.
    pub fn create(&self, submission: &NewUser) -> Result<User, ServiceError> {
        let name = submission.name.trim();
        let email = submission.email.trim().to_ascii_lowercase();
        require_text("name", name)?;
        require_email("email", &email)?;
        let role = UserRole::parse_lenient(&submission.role)
            .map_err(|err| ValidationError::new("role", err.to_string()))?;

        Ok(self.store.insert_user(name, &email, role)?)
    }

    pub fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.list_users()?)
    }
}
