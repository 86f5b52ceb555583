//! Library catalogue, lending and settings data models and DTOs.

use crate::utils::serde::{deserialize_optional_bool, deserialize_optional_uuid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Accepted values for a book's `status`.
pub const BOOK_STATUSES: &[&str] = &["available", "issued", "lost", "damaged", "under_repair"];

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct BookCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub edition: Option<String>,
    pub description: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub shelf_location: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub edition: Option<String>,
    pub description: Option<String>,
    /// Available copies start equal to the total.
    #[validate(range(min = 1, message = "total_copies must be at least 1"))]
    pub total_copies: i32,
    pub shelf_location: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateBookDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub edition: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "total_copies must be at least 1"))]
    pub total_copies: Option<i32>,
    pub shelf_location: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BookFilterParams {
    /// Matches book title or author.
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub category_id: Option<Uuid>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedBooksResponse {
    pub data: Vec<Book>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

/// One loan of one book copy to one user.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct BookIssue {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub issue_date: chrono::NaiveDate,
    pub due_date: chrono::NaiveDate,
    pub return_date: Option<chrono::NaiveDate>,
    pub is_returned: bool,
    pub fine_amount: f64,
    pub remarks: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The due date is derived from library settings by the borrower's role.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateIssueDto {
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateIssueDto {
    pub due_date: Option<chrono::NaiveDate>,
    pub remarks: Option<String>,
    #[validate(range(min = 0.0, message = "fine_amount must not be negative"))]
    pub fine_amount: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IssueFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub user_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub book_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_returned: Option<bool>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedIssuesResponse {
    pub data: Vec<BookIssue>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

/// The lending policy singleton.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct LibrarySettings {
    pub id: Uuid,
    pub max_books_per_student: i32,
    pub max_books_per_staff: i32,
    pub loan_period_days_student: i32,
    pub loan_period_days_staff: i32,
    pub fine_per_day: f64,
    pub max_renewals: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSettingsDto {
    #[validate(range(min = 1, message = "max_books_per_student must be at least 1"))]
    pub max_books_per_student: Option<i32>,
    #[validate(range(min = 1, message = "max_books_per_staff must be at least 1"))]
    pub max_books_per_staff: Option<i32>,
    #[validate(range(min = 1, message = "loan_period_days_student must be at least 1"))]
    pub loan_period_days_student: Option<i32>,
    #[validate(range(min = 1, message = "loan_period_days_staff must be at least 1"))]
    pub loan_period_days_staff: Option<i32>,
    #[validate(range(min = 0.0, message = "fine_per_day must not be negative"))]
    pub fine_per_day: Option<f64>,
    #[validate(range(min = 0, message = "max_renewals must not be negative"))]
    pub max_renewals: Option<i32>,
}
