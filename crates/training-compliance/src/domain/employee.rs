use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{EmployeeId};

string_enum!(
    /// MPGA sheet taxonomy used to group ground-services staff.
    Department, "department" {
        Dedicated => "DEDICATED",
        Loading => "LOADING",
        Ramp => "RAMP",
        Locco => "LOCCO",
        Uld => "ULD",
        LostAndFound => "LOST_AND_FOUND",
        Cargo => "CARGO",
        Arrival => "ARRIVAL",
        GseOperator => "GSE_OPERATOR",
        Flop => "FLOP",
        Avsec => "AVSEC",
        Porter => "PORTER",
    }
);

string_enum!(
    EmploymentStatus, "employment status" {
        Permanent => "PERMANENT",
        Contract => "CONTRACT",
        Probation => "PROBATION",
        Outsource => "OUTSOURCE",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub nip: String,
    pub nik: String,
    pub name: String,
    pub email: Option<String>,
    pub department: Department,
    pub unit: Option<String>,
    pub position: Option<String>,
    pub employment_status: EmploymentStatus,
    pub is_active: bool,
    pub deleted_at: Option<NaiveDateTime>,
}

impl Employee {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Active, not soft-deleted employees are the population compliance is measured over.
    pub fn counts_toward_compliance(&self) -> bool {
        self.is_active && !self.is_deleted()
    }
}

/// Submission for a new employee; `nik` is generated from the NIP when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEmployee {
    pub nip: String,
    #[serde(default)]
    pub nik: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub department: Department,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    pub employment_status: EmploymentStatus,
}

impl NewEmployee {
    pub fn new(
        nip: impl Into<String>,
        name: impl Into<String>,
        department: Department,
        employment_status: EmploymentStatus,
    ) -> Self {
        Self {
            nip: nip.into(),
            nik: None,
            name: name.into(),
            email: None,
            department,
            unit: None,
            position: None,
            employment_status,
        }
    }
}
