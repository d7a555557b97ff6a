use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Employee, EmployeeId, TrainingRecordId, TrainingTypeId};

/// Lead time applied when a training type carries no notification window.
pub const DEFAULT_NOTIFICATION_DAYS: u32 = 30;

string_enum!(
    TrainingCategory, "training category" {
        Safety => "SAFETY",
        Security => "SECURITY",
        Operational => "OPERATIONAL",
        Technical => "TECHNICAL",
        Regulatory => "REGULATORY",
        Service => "SERVICE",
    }
);

string_enum!(
    ComplianceLevel, "compliance level" {
        Critical => "CRITICAL",
        High => "HIGH",
        Medium => "MEDIUM",
        Low => "LOW",
        Optional => "OPTIONAL",
    }
);

string_enum!(
    CompletionStatus, "completion status" {
        Completed => "COMPLETED",
        InProgress => "IN_PROGRESS",
        Failed => "FAILED",
        Cancelled => "CANCELLED",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingType {
    pub id: TrainingTypeId,
    pub name: String,
    pub code: Option<String>,
    pub category: TrainingCategory,
    pub is_mandatory: bool,
    pub validity_months: u32,
    pub notification_days: u32,
    pub compliance_level: ComplianceLevel,
    pub is_active: bool,
    pub description: Option<String>,
}

impl TrainingType {
    pub fn is_required(&self) -> bool {
        self.is_active && self.is_mandatory
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTrainingType {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    pub category: TrainingCategory,
    #[serde(default)]
    pub is_mandatory: bool,
    pub validity_months: u32,
    #[serde(default)]
    pub notification_days: Option<u32>,
    pub compliance_level: ComplianceLevel,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewTrainingType {
    pub fn new(
        name: impl Into<String>,
        category: TrainingCategory,
        validity_months: u32,
        compliance_level: ComplianceLevel,
    ) -> Self {
        Self {
            name: name.into(),
            code: None,
            category,
            is_mandatory: false,
            validity_months,
            notification_days: None,
            compliance_level,
            description: None,
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.is_mandatory = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub id: TrainingRecordId,
    pub employee_id: EmployeeId,
    pub training_type_id: TrainingTypeId,
    pub certificate_number: Option<String>,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub completion_status: CompletionStatus,
    pub training_provider: Option<String>,
    pub notes: Option<String>,
    pub previous_training_id: Option<TrainingRecordId>,
}

/// Submission for a training record; `expiry_date` defaults to the type's validity period.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrainingRecord {
    pub employee_id: EmployeeId,
    pub training_type_id: TrainingTypeId,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub certificate_number: Option<String>,
    #[serde(default = "default_completion_status")]
    pub completion_status: CompletionStatus,
    #[serde(default)]
    pub training_provider: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub previous_training_id: Option<TrainingRecordId>,
}

fn default_completion_status() -> CompletionStatus {
    CompletionStatus::Completed
}

impl NewTrainingRecord {
    pub fn new(
        employee_id: EmployeeId,
        training_type_id: TrainingTypeId,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            employee_id,
            training_type_id,
            issue_date,
            expiry_date: None,
            certificate_number: None,
            completion_status: CompletionStatus::Completed,
            training_provider: None,
            notes: None,
            previous_training_id: None,
        }
    }

    pub fn expiring_on(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }
}

/// A training record joined with the employee and training type it refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingRecordDetail {
    pub record: TrainingRecord,
    pub employee: Employee,
    pub training_type: TrainingType,
}
