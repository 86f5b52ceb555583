//! Staff data models and DTOs.

use crate::utils::serde::deserialize_optional_bool;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Accepted values for `staff_type`.
pub const STAFF_TYPES: &[&str] = &[
    "teacher",
    "admin",
    "librarian",
    "accountant",
    "support",
    "other",
];

/// An employment record linked 1:1 to a user account.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Staff {
    pub id: Uuid,
    pub user_id: Uuid,
    pub employee_id: String,
    pub staff_type: String,
    pub qualification: Option<String>,
    pub date_of_joining: chrono::NaiveDate,
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStaffDto {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "employee_id must not be empty"))]
    pub employee_id: String,
    #[validate(length(min = 1, message = "staff_type must not be empty"))]
    pub staff_type: String,
    pub qualification: Option<String>,
    /// Defaults to the current date when omitted.
    pub date_of_joining: Option<chrono::NaiveDate>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStaffDto {
    #[validate(length(min = 1, message = "staff_type must not be empty"))]
    pub staff_type: Option<String>,
    pub qualification: Option<String>,
    pub date_of_joining: Option<chrono::NaiveDate>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StaffFilterParams {
    pub staff_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    /// Matches staff name or employee ID.
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedStaffResponse {
    pub data: Vec<Staff>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dto_accepts_valid_input() {
        let dto = CreateStaffDto {
            user_id: Uuid::new_v4(),
            employee_id: "EMP-001".to_string(),
            staff_type: "teacher".to_string(),
            qualification: Some("B.Ed".to_string()),
            date_of_joining: None,
            department: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn create_dto_rejects_empty_employee_id() {
        let dto = CreateStaffDto {
            user_id: Uuid::new_v4(),
            employee_id: "".to_string(),
            staff_type: "teacher".to_string(),
            qualification: None,
            date_of_joining: None,
            department: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn staff_types_cover_expected_roles() {
        assert!(STAFF_TYPES.contains(&"teacher"));
        assert!(STAFF_TYPES.contains(&"librarian"));
        assert!(!STAFF_TYPES.contains(&"student"));
    }
}
