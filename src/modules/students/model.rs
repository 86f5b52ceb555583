//! Student data models and DTOs.

use crate::utils::serde::{deserialize_optional_bool, deserialize_optional_uuid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A student record linked 1:1 to a user account.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub admission_number: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub admission_date: chrono::NaiveDate,
    pub class_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "admission_number must not be empty"))]
    pub admission_number: String,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    /// Defaults to the current date when omitted.
    pub admission_date: Option<chrono::NaiveDate>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub class_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StudentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub class_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    /// Matches student name or admission number.
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

/// A parent or guardian contact. Linked to students through
/// `student_parents`.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ParentGuardian {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub relationship: String,
    pub email: Option<String>,
    pub phone: String,
    pub occupation: Option<String>,
    pub address: Option<String>,
    pub is_emergency_contact: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateParentDto {
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "relationship must not be empty"))]
    pub relationship: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: String,
    pub occupation: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub is_emergency_contact: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateParentDto {
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: Option<String>,
    pub relationship: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub occupation: Option<String>,
    pub address: Option<String>,
    pub is_emergency_contact: Option<bool>,
}

/// A term report card for one student.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct PerformanceReport {
    pub id: Uuid,
    pub student_id: Uuid,
    pub class_id: Uuid,
    pub term: String,
    pub academic_year: String,
    pub overall_grade: Option<f64>,
    pub overall_percentage: Option<f64>,
    pub attendance_percentage: Option<f64>,
    pub remarks: Option<String>,
    pub teacher_comments: Option<String>,
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
    pub is_published: bool,
    pub published_date: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    pub student_id: Uuid,
    pub class_id: Uuid,
    #[validate(length(min = 1, message = "term must not be empty"))]
    pub term: String,
    #[validate(length(min = 1, message = "academic_year must not be empty"))]
    pub academic_year: String,
    pub overall_grade: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "overall_percentage must be between 0 and 100"))]
    pub overall_percentage: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "attendance_percentage must be between 0 and 100"))]
    pub attendance_percentage: Option<f64>,
    pub remarks: Option<String>,
    pub teacher_comments: Option<String>,
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateReportDto {
    pub overall_grade: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "overall_percentage must be between 0 and 100"))]
    pub overall_percentage: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "attendance_percentage must be between 0 and 100"))]
    pub attendance_percentage: Option<f64>,
    pub remarks: Option<String>,
    pub teacher_comments: Option<String>,
    pub strengths: Option<String>,
    pub areas_for_improvement: Option<String>,
}
