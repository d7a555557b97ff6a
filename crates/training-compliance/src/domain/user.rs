use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{UnknownVariant, UserId};

string_enum!(
    /// Administrative roles; the schema only distinguishes admins from super admins.
    UserRole, "user role" {
        Admin => "admin",
        SuperAdmin => "super_admin",
    }
);

impl UserRole {
    /// Accepts the retired manager/staff/viewer roles, which now collapse to `Admin`.
    pub fn parse_lenient(value: &str) -> Result<Self, UnknownVariant> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manager" | "staff" | "viewer" => Ok(Self::Admin),
            _ => Self::from_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: String,
}
