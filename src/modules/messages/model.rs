//! Direct message, recipient and announcement data models and DTOs.

use crate::utils::serde::deserialize_optional_bool;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Accepted values for a message's `message_type`.
pub const MESSAGE_TYPES: &[&str] = &[
    "general",
    "announcement",
    "homework",
    "exam",
    "attendance",
    "behavior",
    "performance",
    "fee",
];

/// Accepted values for a recipient row's `status`.
pub const RECIPIENT_STATUSES: &[&str] = &["unread", "read", "archived"];

/// Accepted values for an announcement's `target_audience`.
pub const TARGET_AUDIENCES: &[&str] = &["all", "teachers", "parents", "students"];

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub subject: String,
    pub content: String,
    pub message_type: String,
    pub is_system_generated: bool,
    pub sender_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// One delivery of one message to one user.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct MessageRecipient {
    pub id: Uuid,
    pub message_id: Uuid,
    pub recipient_id: Uuid,
    pub status: String,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A message as seen from the recipient's side, carrying their read state.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct InboxMessage {
    pub id: Uuid,
    pub subject: String,
    pub content: String,
    pub message_type: String,
    pub is_system_generated: bool,
    pub sender_id: Uuid,
    pub status: String,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendMessageDto {
    #[validate(length(min = 1, message = "recipient_ids must not be empty"))]
    pub recipient_ids: Vec<Uuid>,
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: String,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    #[serde(default = "default_message_type")]
    pub message_type: String,
}

fn default_message_type() -> String {
    "general".to_string()
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InboxFilterParams {
    pub status: Option<String>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedInboxResponse {
    pub data: Vec<InboxMessage>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedMessagesResponse {
    pub data: Vec<Message>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub target_audience: String,
    pub is_active: bool,
    pub is_pinned: bool,
    pub publish_date: chrono::DateTime<chrono::Utc>,
    pub expiry_date: Option<chrono::DateTime<chrono::Utc>>,
    pub creator_id: Uuid,
    pub class_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAnnouncementDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: String,
    #[serde(default = "default_target_audience")]
    pub target_audience: String,
    #[serde(default)]
    pub is_pinned: bool,
    /// Defaults to the current instant when omitted.
    pub publish_date: Option<chrono::DateTime<chrono::Utc>>,
    pub expiry_date: Option<chrono::DateTime<chrono::Utc>>,
    pub class_id: Option<Uuid>,
}

fn default_target_audience() -> String {
    "all".to_string()
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncementDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: Option<String>,
    pub target_audience: Option<String>,
    pub is_active: Option<bool>,
    pub is_pinned: Option<bool>,
    pub publish_date: Option<chrono::DateTime<chrono::Utc>>,
    pub expiry_date: Option<chrono::DateTime<chrono::Utc>>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnnouncementFilterParams {
    /// Admin-only escape hatch that includes inactive and expired rows.
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
}
