use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::messages::model::{
    Announcement, AnnouncementFilterParams, CreateAnnouncementDto, InboxFilterParams, Message,
    MessageRecipient, PaginatedInboxResponse, PaginatedMessagesResponse, SendMessageDto,
    UpdateAnnouncementDto,
};
use crate::modules::messages::service::MessageService;
use crate::modules::users::model::system_roles::slugs;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationParams;
use crate::validator::ValidatedJson;

fn ensure_admin_or_creator(
    auth_user: &AuthUser,
    announcement: &Announcement,
) -> Result<(), AppError> {
    if auth_user.has_role(slugs::ADMIN) || announcement.creator_id == auth_user.user_id()? {
        Ok(())
    } else {
        Err(AppError::forbidden("Insufficient permissions".to_string()))
    }
}

/// Send a message
///
/// Every recipient gets their own copy with independent read state.
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageDto,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 404, description = "One or more recipients not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn send_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<SendMessageDto>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = MessageService::send_message(&state.db, dto, auth_user.user_id()?).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Get the current user's inbox
#[utoipa::path(
    get,
    path = "/api/messages/inbox",
    params(
        ("status" = Option<String>, Query, description = "Filter by read state (unread, read, archived)"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated inbox", body = PaginatedInboxResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_inbox(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<InboxFilterParams>,
) -> Result<Json<PaginatedInboxResponse>, AppError> {
    let inbox = MessageService::get_inbox(&state.db, auth_user.user_id()?, filters).await?;
    Ok(Json(inbox))
}

/// Get the current user's sent messages
#[utoipa::path(
    get,
    path = "/api/messages/sent",
    params(
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated sent messages", body = PaginatedMessagesResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_sent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedMessagesResponse>, AppError> {
    let sent = MessageService::get_sent(&state.db, auth_user.user_id()?, pagination).await?;
    Ok(Json(sent))
}

/// Get a message by ID
///
/// Only the sender and recipients can read a message. Fetching does not
/// change the recipient's read state.
#[utoipa::path(
    get,
    path = "/api/messages/{id}",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message found", body = Message),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, AppError> {
    let message = MessageService::get_message(&state.db, id).await?;
    let user_id = auth_user.user_id()?;
    if message.sender_id != user_id
        && MessageService::recipient_row(&state.db, id, user_id)
            .await?
            .is_none()
    {
        return Err(AppError::forbidden("Insufficient permissions".to_string()));
    }
    Ok(Json(message))
}

/// Mark a message read
#[utoipa::path(
    post,
    path = "/api/messages/{id}/read",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Marked read", body = MessageRecipient),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageRecipient>, AppError> {
    let recipient = MessageService::mark_read(&state.db, id, auth_user.user_id()?).await?;
    Ok(Json(recipient))
}

/// Archive a message
#[utoipa::path(
    post,
    path = "/api/messages/{id}/archive",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Archived", body = MessageRecipient),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user))]
pub async fn archive_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageRecipient>, AppError> {
    let recipient = MessageService::archive(&state.db, id, auth_user.user_id()?).await?;
    Ok(Json(recipient))
}

/// List announcements
///
/// Pinned announcements come first, then newest by publish date. Only
/// admins can request inactive or expired rows.
#[utoipa::path(
    get,
    path = "/api/messages/announcements",
    params(
        ("include_inactive" = Option<bool>, Query, description = "Include inactive and expired announcements (admin only)")
    ),
    responses(
        (status = 200, description = "Announcements", body = Vec<Announcement>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_announcements(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<AnnouncementFilterParams>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    let include_all =
        filters.include_inactive.unwrap_or(false) && auth_user.has_role(slugs::ADMIN);
    let announcements = MessageService::get_announcements(&state.db, include_all).await?;
    Ok(Json(announcements))
}

/// Create an announcement
#[utoipa::path(
    post,
    path = "/api/messages/announcements",
    request_body = CreateAnnouncementDto,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAnnouncementDto>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    check_any_role(&auth_user, &[slugs::ADMIN, slugs::TEACHER])?;
    let announcement =
        MessageService::create_announcement(&state.db, dto, auth_user.user_id()?).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// Update an announcement
///
/// Teachers can only update their own announcements; admins any.
#[utoipa::path(
    put,
    path = "/api/messages/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementDto,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAnnouncementDto>,
) -> Result<Json<Announcement>, AppError> {
    let announcement = MessageService::get_announcement(&state.db, id).await?;
    ensure_admin_or_creator(&auth_user, &announcement)?;
    let updated = MessageService::update_announcement(&state.db, id, dto).await?;
    Ok(Json(updated))
}

/// Delete an announcement
#[utoipa::path(
    delete,
    path = "/api/messages/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let announcement = MessageService::get_announcement(&state.db, id).await?;
    ensure_admin_or_creator(&auth_user, &announcement)?;
    MessageService::delete_announcement(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
