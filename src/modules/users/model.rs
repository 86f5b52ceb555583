//! User data models and DTOs.
//!
//! # Core Types
//!
//! - [`User`] - Base user entity, selected without the password column
//! - [`UserWithRoles`] - User plus aggregated role names, the standard
//!   response shape for user-facing endpoints
//! - [`Role`] - A role row from the `roles` table
//!
//! # System Roles
//!
//! The [`system_roles`] module holds the six seeded role slugs and their
//! fixed UUIDs. These rows are created by migration and are never deleted
//! through the API.

use crate::utils::serde::deserialize_optional_bool;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A user account.
///
/// The password column is intentionally absent; services that need it
/// select into a private row type instead.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// User plus the names of every role assigned to them.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct UserWithRoles {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A role row.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Partial user update. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters for filtering users.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserFilterParams {
    /// Matches first name, last name or email (case-insensitive substring).
    pub search: Option<String>,
    /// Restrict to users holding this role slug.
    pub role: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

/// Paginated response containing users with roles.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<UserWithRoles>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

/// Well-known role slugs and their migration-seeded IDs.
pub mod system_roles {
    use uuid::Uuid;

    pub mod slugs {
        pub const ADMIN: &str = "admin";
        pub const TEACHER: &str = "teacher";
        pub const STUDENT: &str = "student";
        pub const LIBRARIAN: &str = "librarian";
        pub const ACCOUNTANT: &str = "accountant";
        pub const PARENT: &str = "parent";
    }

    pub const ADMIN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000001);
    pub const TEACHER: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000002);
    pub const STUDENT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000003);
    pub const LIBRARIAN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000004);
    pub const ACCOUNTANT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000005);
    pub const PARENT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000006);

    /// All seeded role slugs.
    pub fn all_slugs() -> Vec<&'static str> {
        vec![
            slugs::ADMIN,
            slugs::TEACHER,
            slugs::STUDENT,
            slugs::LIBRARIAN,
            slugs::ACCOUNTANT,
            slugs::PARENT,
        ]
    }

    /// Look up the seeded ID for a role slug.
    pub fn id_by_slug(slug: &str) -> Option<Uuid> {
        match slug {
            slugs::ADMIN => Some(ADMIN),
            slugs::TEACHER => Some(TEACHER),
            slugs::STUDENT => Some(STUDENT),
            slugs::LIBRARIAN => Some(LIBRARIAN),
            slugs::ACCOUNTANT => Some(ACCOUNTANT),
            slugs::PARENT => Some(PARENT),
            _ => None,
        }
    }
}
