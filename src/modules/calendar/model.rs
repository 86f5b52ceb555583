//! Calendar event and attendee data models and DTOs.

use crate::utils::serde::{deserialize_optional_datetime, deserialize_optional_uuid};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Accepted values for `event_type`.
pub const EVENT_TYPES: &[&str] = &["general", "exam", "holiday", "meeting", "activity"];

/// Accepted values for an attendee's RSVP `status`.
pub const ATTENDEE_STATUSES: &[&str] = &["pending", "accepted", "declined"];

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub all_day: bool,
    pub location: Option<String>,
    pub is_public: bool,
    pub creator_id: Uuid,
    pub class_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEventDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "event_type must not be empty"))]
    pub event_type: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub all_day: bool,
    pub location: Option<String>,
    /// Private events are visible to admins and the creator only.
    #[serde(default = "default_is_public")]
    pub is_public: bool,
    pub class_id: Option<Uuid>,
}

fn default_is_public() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateEventDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub all_day: Option<bool>,
    pub location: Option<String>,
    pub is_public: Option<bool>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EventFilterParams {
    pub event_type: Option<String>,
    /// Only events ending at or after this instant.
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    /// Only events starting at or before this instant.
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub end: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub class_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedEventsResponse {
    pub data: Vec<CalendarEvent>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct EventAttendee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddAttendeeDto {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RsvpDto {
    #[validate(length(min = 1, message = "status must not be empty"))]
    pub status: String,
}
