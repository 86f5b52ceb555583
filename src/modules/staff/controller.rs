use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::staff::model::{
    CreateStaffDto, PaginatedStaffResponse, Staff, StaffFilterParams, UpdateStaffDto,
};
use crate::modules::staff::service::StaffService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// List staff members
#[utoipa::path(
    get,
    path = "/api/staff",
    params(
        ("staff_type" = Option<String>, Query, description = "Filter by staff type"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Match name or employee ID"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated staff", body = PaginatedStaffResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
#[instrument(skip(state))]
pub async fn get_staff_members(
    State(state): State<AppState>,
    Query(filters): Query<StaffFilterParams>,
) -> Result<Json<PaginatedStaffResponse>, AppError> {
    let staff = StaffService::get_staff_members(&state.db, filters).await?;
    Ok(Json(staff))
}

/// Create a staff record for an existing user
#[utoipa::path(
    post,
    path = "/api/staff",
    request_body = CreateStaffDto,
    responses(
        (status = 201, description = "Staff created", body = Staff),
        (status = 400, description = "Duplicate staff record or employee ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
#[instrument(skip(state, dto))]
pub async fn create_staff(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateStaffDto>,
) -> Result<(StatusCode, Json<Staff>), AppError> {
    let staff = StaffService::create_staff(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(staff)))
}

/// Get the staff record belonging to the current user
#[utoipa::path(
    get,
    path = "/api/staff/me",
    responses(
        (status = 200, description = "Own staff record", body = Staff),
        (status = 404, description = "No staff record for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_staff(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Staff>, AppError> {
    let staff = StaffService::get_staff_by_user(&state.db, auth_user.user_id()?).await?;
    Ok(Json(staff))
}

/// Get a staff member by ID
#[utoipa::path(
    get,
    path = "/api/staff/{id}",
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 200, description = "Staff found", body = Staff),
        (status = 404, description = "Staff member not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
#[instrument(skip(state))]
pub async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Staff>, AppError> {
    let staff = StaffService::get_staff(&state.db, id).await?;
    Ok(Json(staff))
}

/// Update a staff member
#[utoipa::path(
    put,
    path = "/api/staff/{id}",
    params(("id" = Uuid, Path, description = "Staff ID")),
    request_body = UpdateStaffDto,
    responses(
        (status = 200, description = "Staff updated", body = Staff),
        (status = 404, description = "Staff member not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
#[instrument(skip(state, dto))]
pub async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStaffDto>,
) -> Result<Json<Staff>, AppError> {
    let staff = StaffService::update_staff(&state.db, id, dto).await?;
    Ok(Json(staff))
}

/// Delete a staff member
#[utoipa::path(
    delete,
    path = "/api/staff/{id}",
    params(("id" = Uuid, Path, description = "Staff ID")),
    responses(
        (status = 204, description = "Staff deleted"),
        (status = 404, description = "Staff member not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
#[instrument(skip(state))]
pub async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    StaffService::delete_staff(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
