use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::model::{
    PaginatedUsersResponse, Role, UpdateUserDto, UserFilterParams, UserWithRoles,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// List users with optional filters
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("search" = Option<String>, Query, description = "Match against name or email"),
        ("role" = Option<String>, Query, description = "Filter by role slug"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip"),
        ("page" = Option<i64>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Paginated users", body = PaginatedUsersResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let users = UserService::get_users(&state.db, filters).await?;
    Ok(Json(users))
}

/// List all roles
#[utoipa::path(
    get,
    path = "/api/users/roles",
    responses(
        (status = 200, description = "All roles", body = Vec<Role>),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, AppError> {
    let roles = UserService::get_roles(&state.db).await?;
    Ok(Json(roles))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserWithRoles),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserWithRoles>, AppError> {
    let user = UserService::get_user(&state.db, id).await?;
    Ok(Json(user))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = UserWithRoles),
        (status = 400, description = "Email already exists", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<UserWithRoles>, AppError> {
    let user = UserService::update_user(&state.db, id, dto).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::http::StatusCode, AppError> {
    UserService::delete_user(&state.db, id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Assign a role to a user
#[utoipa::path(
    post,
    path = "/api/users/{id}/roles/{role_name}",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("role_name" = String, Path, description = "Role slug")
    ),
    responses(
        (status = 200, description = "Role assigned", body = UserWithRoles),
        (status = 400, description = "User already has this role", body = ErrorResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn assign_role(
    State(state): State<AppState>,
    Path((id, role_name)): Path<(Uuid, String)>,
) -> Result<Json<UserWithRoles>, AppError> {
    let user = UserService::assign_role(&state.db, id, &role_name).await?;
    Ok(Json(user))
}

/// Remove a role from a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}/roles/{role_name}",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("role_name" = String, Path, description = "Role slug")
    ),
    responses(
        (status = 200, description = "Role removed", body = UserWithRoles),
        (status = 400, description = "User does not have this role", body = ErrorResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn remove_role(
    State(state): State<AppState>,
    Path((id, role_name)): Path<(Uuid, String)>,
) -> Result<Json<UserWithRoles>, AppError> {
    let user = UserService::remove_role(&state.db, id, &role_name).await?;
    Ok(Json(user))
}
