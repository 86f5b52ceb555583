//! Fee category, structure, due date and transaction data models and DTOs.

use crate::utils::serde::{
    deserialize_optional_bool, deserialize_optional_datetime, deserialize_optional_uuid,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Accepted values for a transaction's `payment_method`.
pub const PAYMENT_METHODS: &[&str] = &[
    "cash",
    "bank_transfer",
    "credit_card",
    "debit_card",
    "cheque",
    "online",
    "other",
];

/// Accepted values for a transaction's `payment_status`.
pub const PAYMENT_STATUSES: &[&str] = &[
    "pending",
    "completed",
    "failed",
    "refunded",
    "partially_paid",
];

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct FeeCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFeeCategoryDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateFeeCategoryDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FeeCategoryFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
}

/// A billable item, optionally scoped to one class.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct FeeStructure {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    pub academic_year: String,
    pub term: Option<String>,
    pub is_recurring: bool,
    pub recurrence_period: Option<String>,
    pub is_optional: bool,
    pub is_active: bool,
    pub category_id: Uuid,
    pub class_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFeeStructureDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    pub amount: f64,
    #[validate(length(min = 1, message = "academic_year must not be empty"))]
    pub academic_year: String,
    pub term: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence_period: Option<String>,
    #[serde(default)]
    pub is_optional: bool,
    pub category_id: Uuid,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateFeeStructureDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "amount must be positive"))]
    pub amount: Option<f64>,
    #[validate(length(min = 1, message = "academic_year must not be empty"))]
    pub academic_year: Option<String>,
    pub term: Option<String>,
    pub is_recurring: Option<bool>,
    pub recurrence_period: Option<String>,
    pub is_optional: Option<bool>,
    pub is_active: Option<bool>,
    pub category_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FeeStructureFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub class_id: Option<Uuid>,
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedFeeStructuresResponse {
    pub data: Vec<FeeStructure>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct FeeDueDate {
    pub id: Uuid,
    pub fee_structure_id: Uuid,
    pub due_date: chrono::NaiveDate,
    pub grace_period_days: i32,
    pub penalty_percentage: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFeeDueDateDto {
    pub due_date: chrono::NaiveDate,
    #[serde(default)]
    #[validate(range(min = 0, message = "grace_period_days must not be negative"))]
    pub grace_period_days: i32,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "penalty_percentage must not be negative"))]
    pub penalty_percentage: f64,
}

/// A payment recorded against a fee structure for one student.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct FeeTransaction {
    pub id: Uuid,
    pub fee_structure_id: Uuid,
    pub student_id: Uuid,
    pub amount_paid: f64,
    pub transaction_date: chrono::DateTime<chrono::Utc>,
    pub payment_method: String,
    pub payment_status: String,
    pub transaction_reference: Option<String>,
    pub notes: Option<String>,
    pub collected_by_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// `collected_by_id` is always the authenticated caller, never client input.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFeeTransactionDto {
    pub fee_structure_id: Uuid,
    pub student_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "amount_paid must be positive"))]
    pub amount_paid: f64,
    /// Defaults to the current instant when omitted.
    pub transaction_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default = "default_payment_status")]
    pub payment_status: String,
    pub transaction_reference: Option<String>,
    pub notes: Option<String>,
}

fn default_payment_method() -> String {
    "cash".to_string()
}

fn default_payment_status() -> String {
    "completed".to_string()
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FeeTransactionFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub fee_structure_id: Option<Uuid>,
    pub payment_status: Option<String>,
    /// Only transactions at or after this instant.
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    /// Only transactions at or before this instant.
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedFeeTransactionsResponse {
    pub data: Vec<FeeTransaction>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_dto_rejects_non_positive_amount() {
        let mut dto = CreateFeeStructureDto {
            title: "Tuition".to_string(),
            description: None,
            amount: 0.0,
            academic_year: "2026/2027".to_string(),
            term: None,
            is_recurring: false,
            recurrence_period: None,
            is_optional: false,
            category_id: Uuid::new_v4(),
            class_id: None,
        };
        assert!(dto.validate().is_err());

        dto.amount = 1500.0;
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn transaction_dto_defaults_method_and_status() {
        let json = format!(
            r#"{{"fee_structure_id":"{}","student_id":"{}","amount_paid":200.0}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let dto: CreateFeeTransactionDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto.payment_method, "cash");
        assert_eq!(dto.payment_status, "completed");
        assert!(dto.transaction_date.is_none());
    }

    #[test]
    fn transaction_dto_rejects_negative_amount() {
        let dto = CreateFeeTransactionDto {
            fee_structure_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            amount_paid: -50.0,
            transaction_date: None,
            payment_method: "cash".to_string(),
            payment_status: "completed".to_string(),
            transaction_reference: None,
            notes: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn payment_vocabularies_cover_expected_values() {
        assert!(PAYMENT_METHODS.contains(&"bank_transfer"));
        assert!(PAYMENT_STATUSES.contains(&"partially_paid"));
        assert!(!PAYMENT_METHODS.contains(&"crypto"));
    }
}
