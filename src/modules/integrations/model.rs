//! External application and API key data models and DTOs.

use crate::utils::serde::deserialize_optional_bool;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Accepted values for an application's `app_type`.
pub const APP_TYPES: &[&str] = &["lms", "sis", "payment", "notification", "other"];

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ExternalApplication {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub app_type: String,
    pub base_url: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateApplicationDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_app_type")]
    pub app_type: String,
    #[validate(url(message = "base_url must be a valid URL"))]
    pub base_url: Option<String>,
}

fn default_app_type() -> String {
    "other".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateApplicationDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub app_type: Option<String>,
    #[validate(url(message = "base_url must be a valid URL"))]
    pub base_url: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplicationFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    pub app_type: Option<String>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedApplicationsResponse {
    pub data: Vec<ExternalApplication>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

/// An API key row as exposed over the API. The stored hash never leaves the
/// database; `prefix` is what operators use to tell keys apart.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ApiKey {
    pub id: Uuid,
    pub application_id: Uuid,
    pub name: String,
    pub prefix: String,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_by_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateApiKeyDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Returned exactly once, on key creation. `api_key` is the full plaintext;
/// it cannot be recovered afterwards.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedApiKeyResponse {
    #[serde(flatten)]
    pub key: ApiKey,
    pub api_key: String,
}
