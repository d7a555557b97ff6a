use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BackgroundCheckId, EmployeeId};

string_enum!(
    BackgroundCheckType, "background check type" {
        Criminal => "CRIMINAL",
        Employment => "EMPLOYMENT",
        Education => "EDUCATION",
        Reference => "REFERENCE",
        SecurityClearance => "SECURITY_CLEARANCE",
        DrugTest => "DRUG_TEST",
    }
);

string_enum!(
    BackgroundCheckStatus, "background check status" {
        Pending => "pending",
        InProgress => "in_progress",
        Passed => "passed",
        Failed => "failed",
        Expired => "expired",
        RequiresRenewal => "requires_renewal",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundCheck {
    pub id: BackgroundCheckId,
    pub employee_id: EmployeeId,
    pub check_date: NaiveDate,
    pub check_type: BackgroundCheckType,
    pub status: BackgroundCheckStatus,
    pub valid_until: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl BackgroundCheck {
    /// A passed check stays in force until its `valid_until` date, if any.
    pub fn is_in_force(&self, today: NaiveDate) -> bool {
        self.status == BackgroundCheckStatus::Passed
            && self.valid_until.map_or(true, |until| until > today)
    }

    /// Status the check should carry on `today`; a lapsed pass becomes expired.
    pub fn effective_status(&self, today: NaiveDate) -> BackgroundCheckStatus {
        match (self.status, self.valid_until) {
            (BackgroundCheckStatus::Passed, Some(until)) if until <= today => {
                BackgroundCheckStatus::Expired
            }
            (status, _) => status,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBackgroundCheck {
    pub employee_id: EmployeeId,
    pub check_date: NaiveDate,
    pub check_type: BackgroundCheckType,
    #[serde(default = "default_status")]
    pub status: BackgroundCheckStatus,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_status() -> BackgroundCheckStatus {
    BackgroundCheckStatus::Pending
}
