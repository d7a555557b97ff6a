//! Entity types shared by the store, the rules engine and the services.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Storage key of an employee (distinct from the NIP business key).
    EmployeeId
);
entity_id!(TrainingTypeId);
entity_id!(TrainingRecordId);
entity_id!(BackgroundCheckId);
entity_id!(UserId);

/// Declares a closed enumeration persisted and exchanged as a fixed string.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::domain::UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let trimmed = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| crate::domain::UnknownVariant {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;

mod background;
mod employee;
mod training;
mod user;

pub use background::{
    BackgroundCheck, BackgroundCheckStatus, BackgroundCheckType, NewBackgroundCheck,
};
pub use employee::{Department, Employee, EmploymentStatus, NewEmployee};
pub use training::{
    ComplianceLevel, CompletionStatus, NewTrainingRecord, NewTrainingType, TrainingCategory,
    TrainingRecord, TrainingRecordDetail, TrainingType, DEFAULT_NOTIFICATION_DAYS,
};
pub use user::{NewUser, User, UserRole};

/// Raised when a persisted or submitted value is outside a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Field-level rejection of submitted entity data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl From<UnknownVariant> for ValidationError {
    fn from(err: UnknownVariant) -> Self {
        Self::new(err.kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("ramp".parse::<Department>(), Ok(Department::Ramp));
        assert_eq!(
            " completed ".parse::<CompletionStatus>(),
            Ok(CompletionStatus::Completed)
        );
    }

    #[test]
    fn unknown_values_name_the_enumeration() {
        let err = "HANGAR".parse::<Department>().unwrap_err();
        assert_eq!(err.kind, "department");
        assert_eq!(err.to_string(), "unknown department 'HANGAR'");
    }

    #[test]
    fn enums_serialize_as_their_persisted_strings() {
        let json = serde_json::to_string(&BackgroundCheckStatus::RequiresRenewal).unwrap();
        assert_eq!(json, "\"requires_renewal\"");
        let level: ComplianceLevel = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(level, ComplianceLevel::Critical);
    }
}
