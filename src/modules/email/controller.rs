use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_admin;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::email::model::{
    CreateTemplateDto, EmailNotification, EmailTemplate, NotificationFilterParams,
    PaginatedNotificationsResponse, SendEmailDto, TemplateFilterParams, UpdateTemplateDto,
};
use crate::modules::email::service::EmailModuleService;
use crate::modules::users::model::system_roles::slugs;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// List email templates
#[utoipa::path(
    get,
    path = "/api/email/templates",
    params(
        ("email_type" = Option<String>, Query, description = "Filter by email type"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag")
    ),
    responses(
        (status = 200, description = "Templates", body = Vec<EmailTemplate>),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_templates(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<TemplateFilterParams>,
) -> Result<Json<Vec<EmailTemplate>>, AppError> {
    check_admin(&auth_user)?;
    let templates = EmailModuleService::get_templates(&state.db, filters).await?;
    Ok(Json(templates))
}

/// Create an email template
#[utoipa::path(
    post,
    path = "/api/email/templates",
    request_body = CreateTemplateDto,
    responses(
        (status = 201, description = "Template created", body = EmailTemplate),
        (status = 400, description = "Template with this name already exists", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_template(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateTemplateDto>,
) -> Result<(StatusCode, Json<EmailTemplate>), AppError> {
    check_admin(&auth_user)?;
    let template = EmailModuleService::create_template(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// Get an email template by ID
#[utoipa::path(
    get,
    path = "/api/email/templates/{id}",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 200, description = "Template found", body = EmailTemplate),
        (status = 404, description = "Template not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_template(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EmailTemplate>, AppError> {
    check_admin(&auth_user)?;
    let template = EmailModuleService::get_template(&state.db, id).await?;
    Ok(Json(template))
}

/// Update an email template
#[utoipa::path(
    put,
    path = "/api/email/templates/{id}",
    params(("id" = Uuid, Path, description = "Template ID")),
    request_body = UpdateTemplateDto,
    responses(
        (status = 200, description = "Template updated", body = EmailTemplate),
        (status = 400, description = "Template with this name already exists", body = ErrorResponse),
        (status = 404, description = "Template not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_template(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTemplateDto>,
) -> Result<Json<EmailTemplate>, AppError> {
    check_admin(&auth_user)?;
    let template = EmailModuleService::update_template(&state.db, id, dto).await?;
    Ok(Json(template))
}

/// Delete an email template
#[utoipa::path(
    delete,
    path = "/api/email/templates/{id}",
    params(("id" = Uuid, Path, description = "Template ID")),
    responses(
        (status = 204, description = "Template deleted"),
        (status = 404, description = "Template not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_template(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    EmailModuleService::delete_template(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Send an email to one or more recipients
///
/// Queues one notification per recipient and returns the first one
/// immediately; delivery happens in the background.
#[utoipa::path(
    post,
    path = "/api/email/send",
    request_body = SendEmailDto,
    responses(
        (status = 201, description = "Notifications queued", body = EmailNotification),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn send_email(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<SendEmailDto>,
) -> Result<(StatusCode, Json<EmailNotification>), AppError> {
    let notification = EmailModuleService::send_email(
        &state.db,
        &state.email_service,
        dto,
        auth_user.user_id()?,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

/// List email notifications
#[utoipa::path(
    get,
    path = "/api/email/notifications",
    params(
        ("status" = Option<String>, Query, description = "Filter by delivery status"),
        ("start" = Option<String>, Query, description = "Only notifications created at or after this instant (RFC 3339)"),
        ("end" = Option<String>, Query, description = "Only notifications created at or before this instant (RFC 3339)"),
        ("sender_id" = Option<Uuid>, Query, description = "Filter by sender"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated notifications", body = PaginatedNotificationsResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<NotificationFilterParams>,
) -> Result<Json<PaginatedNotificationsResponse>, AppError> {
    check_admin(&auth_user)?;
    let notifications = EmailModuleService::get_notifications(&state.db, filters).await?;
    Ok(Json(notifications))
}

/// Get an email notification by ID
///
/// Admins can read any notification; other users only their own.
#[utoipa::path(
    get,
    path = "/api/email/notifications/{id}",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification found", body = EmailNotification),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EmailNotification>, AppError> {
    let notification = EmailModuleService::get_notification(&state.db, id).await?;
    if !auth_user.has_role(slugs::ADMIN) && notification.sender_id != auth_user.user_id()? {
        return Err(AppError::forbidden("Insufficient permissions".to_string()));
    }
    Ok(Json(notification))
}

/// Delete an email notification
#[utoipa::path(
    delete,
    path = "/api/email/notifications/{id}",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Email"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    EmailModuleService::delete_notification(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
