//! Entity store seams. Services are generic over these traits; [`SqliteStore`] is the
//! relational implementation used by the binaries and the test suites.

mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{
    BackgroundCheck, BackgroundCheckId, CompletionStatus, Department, Employee, EmployeeId,
    NewBackgroundCheck, NewEmployee, NewTrainingRecord, NewTrainingType, TrainingRecord,
    TrainingRecordDetail, TrainingRecordId, TrainingType, TrainingTypeId, User, UserRole,
};
use crate::notifications::NotificationCategory;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub department: Option<Department>,
    pub include_inactive: bool,
    pub include_deleted: bool,
    /// Case-insensitive match against name, NIP or NIK.
    pub search: Option<String>,
}

impl EmployeeFilter {
    pub fn active() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrainingTypeFilter {
    pub mandatory_only: bool,
    pub include_inactive: bool,
}

impl TrainingTypeFilter {
    pub fn required() -> Self {
        Self {
            mandatory_only: true,
            include_inactive: false,
        }
    }
}

/// Query over training records; every populated field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub employee_id: Option<EmployeeId>,
    pub training_type_id: Option<TrainingTypeId>,
    pub department: Option<Department>,
    pub completion_status: Option<CompletionStatus>,
    pub missing_certificate: bool,
    pub with_certificate: bool,
    /// Expiry after the first date, up to and including the second.
    pub expiring_between: Option<(NaiveDate, NaiveDate)>,
}

/// Counter key for certificate sequences: one sequence per training type and issue month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceKey {
    pub training_type_id: TrainingTypeId,
    pub year: i32,
    pub month: u32,
}

/// Outcome of a guarded certificate-number write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateWrite {
    Assigned,
    /// The record already carried a number; it was left untouched.
    AlreadyAssigned(String),
}

pub trait EmployeeRepository: Send + Sync {
    fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee, RepositoryError>;
    fn update_employee(&self, employee: &Employee) -> Result<(), RepositoryError>;
    fn fetch_employee(&self, id: EmployeeId) -> Result<Option<Employee>, RepositoryError>;
    fn fetch_employee_by_nip(&self, nip: &str) -> Result<Option<Employee>, RepositoryError>;
    fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, RepositoryError>;
    /// Hard delete; background checks and training records cascade.
    fn delete_employee(&self, id: EmployeeId) -> Result<(), RepositoryError>;
}

pub trait TrainingTypeRepository: Send + Sync {
    fn insert_training_type(
        &self,
        training_type: &NewTrainingType,
    ) -> Result<TrainingType, RepositoryError>;
    fn update_training_type(&self, training_type: &TrainingType) -> Result<(), RepositoryError>;
    fn fetch_training_type(
        &self,
        id: TrainingTypeId,
    ) -> Result<Option<TrainingType>, RepositoryError>;
    fn list_training_types(
        &self,
        filter: &TrainingTypeFilter,
    ) -> Result<Vec<TrainingType>, RepositoryError>;
}

pub trait TrainingRecordRepository: Send + Sync {
    fn insert_training_record(
        &self,
        record: &NewTrainingRecord,
    ) -> Result<TrainingRecord, RepositoryError>;
    /// Persists every mutable column in one statement. A certificate number is only
    /// written when the stored one is empty, so a conflicting number leaves the row untouched.
    fn update_training_record(&self, record: &TrainingRecord) -> Result<(), RepositoryError>;
    fn fetch_training_record(
        &self,
        id: TrainingRecordId,
    ) -> Result<Option<TrainingRecord>, RepositoryError>;
    fn fetch_by_certificate_number(
        &self,
        certificate_number: &str,
    ) -> Result<Option<TrainingRecordDetail>, RepositoryError>;
    fn list_training_records(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<TrainingRecordDetail>, RepositoryError>;
    /// Atomically advances and returns the sequence for `key`.
    fn next_certificate_sequence(&self, key: SequenceKey) -> Result<u32, RepositoryError>;
    /// Writes `number` only if the record has none yet; a duplicate number is a `Conflict`.
    fn assign_certificate_number(
        &self,
        id: TrainingRecordId,
        number: &str,
    ) -> Result<CertificateWrite, RepositoryError>;
}

pub trait BackgroundCheckRepository: Send + Sync {
    fn insert_background_check(
        &self,
        check: &NewBackgroundCheck,
    ) -> Result<BackgroundCheck, RepositoryError>;
    fn update_background_check(&self, check: &BackgroundCheck) -> Result<(), RepositoryError>;
    fn fetch_background_check(
        &self,
        id: BackgroundCheckId,
    ) -> Result<Option<BackgroundCheck>, RepositoryError>;
    fn list_background_checks(
        &self,
        employee_id: Option<EmployeeId>,
    ) -> Result<Vec<BackgroundCheck>, RepositoryError>;
}

pub trait UserRepository: Send + Sync {
    fn insert_user(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError>;
    fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
}

/// Last-run bookkeeping for scheduled notification categories.
pub trait NotificationLedger: Send + Sync {
    fn last_notification_run(
        &self,
        category: NotificationCategory,
    ) -> Result<Option<NaiveDateTime>, RepositoryError>;
    fn record_notification_run(
        &self,
        category: NotificationCategory,
        at: NaiveDateTime,
    ) -> Result<(), RepositoryError>;
}

/// Everything the services need from persistence.
pub trait ComplianceStore:
    EmployeeRepository
    + TrainingTypeRepository
    + TrainingRecordRepository
    + BackgroundCheckRepository
    + UserRepository
    + NotificationLedger
{
}

impl<T> ComplianceStore for T where
    T: EmployeeRepository
        + TrainingTypeRepository
        + TrainingRecordRepository
        + BackgroundCheckRepository
        + UserRepository
        + NotificationLedger
{
}
