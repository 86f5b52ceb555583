use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::api_key::ApiKeyApplication;
use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_admin;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::integrations::model::{
    ApiKey, ApplicationFilterParams, CreateApiKeyDto, CreateApplicationDto,
    CreatedApiKeyResponse, ExternalApplication, PaginatedApplicationsResponse,
    UpdateApplicationDto,
};
use crate::modules::integrations::service::IntegrationService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// List external applications
#[utoipa::path(
    get,
    path = "/api/integrations/applications",
    params(
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("app_type" = Option<String>, Query, description = "Filter by application type"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated applications", body = PaginatedApplicationsResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_applications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<ApplicationFilterParams>,
) -> Result<Json<PaginatedApplicationsResponse>, AppError> {
    check_admin(&auth_user)?;
    let applications = IntegrationService::get_applications(&state.db, filters).await?;
    Ok(Json(applications))
}

/// Register an external application
#[utoipa::path(
    post,
    path = "/api/integrations/applications",
    request_body = CreateApplicationDto,
    responses(
        (status = 201, description = "Application registered", body = ExternalApplication),
        (status = 400, description = "Application with this name already exists", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_application(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateApplicationDto>,
) -> Result<(StatusCode, Json<ExternalApplication>), AppError> {
    check_admin(&auth_user)?;
    let application = IntegrationService::create_application(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// Get an external application by ID
#[utoipa::path(
    get,
    path = "/api/integrations/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application found", body = ExternalApplication),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_application(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExternalApplication>, AppError> {
    check_admin(&auth_user)?;
    let application = IntegrationService::get_application(&state.db, id).await?;
    Ok(Json(application))
}

/// Update an external application
#[utoipa::path(
    put,
    path = "/api/integrations/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateApplicationDto,
    responses(
        (status = 200, description = "Application updated", body = ExternalApplication),
        (status = 400, description = "Application with this name already exists", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_application(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateApplicationDto>,
) -> Result<Json<ExternalApplication>, AppError> {
    check_admin(&auth_user)?;
    let application = IntegrationService::update_application(&state.db, id, dto).await?;
    Ok(Json(application))
}

/// Delete an external application
///
/// Cascades to the application's API keys.
#[utoipa::path(
    delete,
    path = "/api/integrations/applications/{id}",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 204, description = "Application deleted"),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_application(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    IntegrationService::delete_application(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mint an API key for an application
///
/// The plaintext key appears only in this response.
#[utoipa::path(
    post,
    path = "/api/integrations/applications/{id}/keys",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = CreateApiKeyDto,
    responses(
        (status = 201, description = "API key created", body = CreatedApiKeyResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_key(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateApiKeyDto>,
) -> Result<(StatusCode, Json<CreatedApiKeyResponse>), AppError> {
    check_admin(&auth_user)?;
    let created =
        IntegrationService::create_key(&state.db, id, dto, auth_user.user_id()?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List an application's API keys
///
/// Neither plaintext keys nor hashes are ever returned.
#[utoipa::path(
    get,
    path = "/api/integrations/applications/{id}/keys",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "API keys", body = Vec<ApiKey>),
        (status = 404, description = "Application not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_keys(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ApiKey>>, AppError> {
    check_admin(&auth_user)?;
    let keys = IntegrationService::get_keys(&state.db, id).await?;
    Ok(Json(keys))
}

/// Revoke an API key
#[utoipa::path(
    delete,
    path = "/api/integrations/keys/{id}",
    params(("id" = Uuid, Path, description = "API key ID")),
    responses(
        (status = 204, description = "API key revoked"),
        (status = 404, description = "API key not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Integrations"
)]
#[instrument(skip(state, auth_user))]
pub async fn revoke_key(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    IntegrationService::revoke_key(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Identify the calling application
///
/// Authenticated with the `X-API-Key` header instead of a bearer token.
#[utoipa::path(
    get,
    path = "/api/integrations/whoami",
    responses(
        (status = 200, description = "The calling application", body = ExternalApplication),
        (status = 401, description = "Invalid or expired API key", body = ErrorResponse)
    ),
    security(("api_key" = [])),
    tag = "Integrations"
)]
#[instrument(skip(application))]
pub async fn whoami(
    ApiKeyApplication(application): ApiKeyApplication,
) -> Result<Json<ExternalApplication>, AppError> {
    Ok(Json(application))
}
