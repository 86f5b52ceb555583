//! Email template and outbound notification data models and DTOs.

use crate::utils::serde::{
    deserialize_optional_bool, deserialize_optional_datetime, deserialize_optional_uuid,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Accepted values for a template's `email_type`.
pub const EMAIL_TYPES: &[&str] = &[
    "general",
    "welcome",
    "password_reset",
    "announcement",
    "report",
    "fee_reminder",
];

/// Accepted values for a notification's `status`.
pub const NOTIFICATION_STATUSES: &[&str] = &["pending", "sent", "failed"];

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct EmailTemplate {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub body_html: String,
    pub body_text: Option<String>,
    pub email_type: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTemplateDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: String,
    #[validate(length(min = 1, message = "body_html must not be empty"))]
    pub body_html: String,
    pub body_text: Option<String>,
    #[serde(default = "default_email_type")]
    pub email_type: String,
}

fn default_email_type() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateTemplateDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "body_html must not be empty"))]
    pub body_html: Option<String>,
    pub body_text: Option<String>,
    pub email_type: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TemplateFilterParams {
    pub email_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
}

/// One row per recipient of an outbound email.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct EmailNotification {
    pub id: Uuid,
    pub subject: String,
    pub body: String,
    pub recipient_email: String,
    pub template_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub status: String,
    pub error_message: Option<String>,
    pub sent_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendEmailDto {
    #[validate(length(min = 1, message = "to_emails must not be empty"))]
    pub to_emails: Vec<String>,
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: String,
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: String,
    pub template_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NotificationFilterParams {
    pub status: Option<String>,
    /// Only notifications created at or after this instant.
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    /// Only notifications created at or before this instant.
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub sender_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedNotificationsResponse {
    pub data: Vec<EmailNotification>,
    pub meta: crate::utils::pagination::PaginationMeta,
}
