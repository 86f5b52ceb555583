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
use crate::modules::timetable::model::{
    CreateEntryDto, CreatePeriodDto, CreateTimetableDto, EntryFilterParams,
    PaginatedTimetablesResponse, Period, PeriodFilterParams, Timetable, TimetableEntry,
    TimetableFilterParams, UpdatePeriodDto, UpdateTimetableDto,
};
use crate::modules::timetable::service::TimetableService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// List periods
#[utoipa::path(
    get,
    path = "/api/timetable/periods",
    params(
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("academic_year" = Option<String>, Query, description = "Filter by academic year")
    ),
    responses(
        (status = 200, description = "Periods", body = Vec<Period>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_periods(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filters): Query<PeriodFilterParams>,
) -> Result<Json<Vec<Period>>, AppError> {
    let periods = TimetableService::get_periods(&state.db, filters).await?;
    Ok(Json(periods))
}

/// Create a period
#[utoipa::path(
    post,
    path = "/api/timetable/periods",
    request_body = CreatePeriodDto,
    responses(
        (status = 201, description = "Period created", body = Period),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 422, description = "end_time must be after start_time", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_period(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreatePeriodDto>,
) -> Result<(StatusCode, Json<Period>), AppError> {
    check_admin(&auth_user)?;
    let period = TimetableService::create_period(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// Update a period
#[utoipa::path(
    put,
    path = "/api/timetable/periods/{id}",
    params(("id" = Uuid, Path, description = "Period ID")),
    request_body = UpdatePeriodDto,
    responses(
        (status = 200, description = "Period updated", body = Period),
        (status = 404, description = "Period not found", body = ErrorResponse),
        (status = 422, description = "end_time must be after start_time", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_period(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdatePeriodDto>,
) -> Result<Json<Period>, AppError> {
    check_admin(&auth_user)?;
    let period = TimetableService::update_period(&state.db, id, dto).await?;
    Ok(Json(period))
}

/// List timetables
#[utoipa::path(
    get,
    path = "/api/timetable/timetables",
    params(
        ("class_id" = Option<Uuid>, Query, description = "Filter by class"),
        ("academic_year" = Option<String>, Query, description = "Filter by academic year"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated timetables", body = PaginatedTimetablesResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_timetables(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filters): Query<TimetableFilterParams>,
) -> Result<Json<PaginatedTimetablesResponse>, AppError> {
    let timetables = TimetableService::get_timetables(&state.db, filters).await?;
    Ok(Json(timetables))
}

/// Create a timetable
#[utoipa::path(
    post,
    path = "/api/timetable/timetables",
    request_body = CreateTimetableDto,
    responses(
        (status = 201, description = "Timetable created", body = Timetable),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_timetable(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateTimetableDto>,
) -> Result<(StatusCode, Json<Timetable>), AppError> {
    check_admin(&auth_user)?;
    let timetable = TimetableService::create_timetable(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(timetable)))
}

/// Get a timetable by ID
#[utoipa::path(
    get,
    path = "/api/timetable/timetables/{id}",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    responses(
        (status = 200, description = "Timetable found", body = Timetable),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_timetable(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Timetable>, AppError> {
    let timetable = TimetableService::get_timetable(&state.db, id).await?;
    Ok(Json(timetable))
}

/// Update a timetable
#[utoipa::path(
    put,
    path = "/api/timetable/timetables/{id}",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    request_body = UpdateTimetableDto,
    responses(
        (status = 200, description = "Timetable updated", body = Timetable),
        (status = 404, description = "Timetable or class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_timetable(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTimetableDto>,
) -> Result<Json<Timetable>, AppError> {
    check_admin(&auth_user)?;
    let timetable = TimetableService::update_timetable(&state.db, id, dto).await?;
    Ok(Json(timetable))
}

/// Delete a timetable
#[utoipa::path(
    delete,
    path = "/api/timetable/timetables/{id}",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    responses(
        (status = 204, description = "Timetable deleted"),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_timetable(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    TimetableService::delete_timetable(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a timetable's entries
///
/// Ordered by weekday, then period start time.
#[utoipa::path(
    get,
    path = "/api/timetable/timetables/{id}/entries",
    params(
        ("id" = Uuid, Path, description = "Timetable ID"),
        ("day_of_week" = Option<String>, Query, description = "Filter by weekday")
    ),
    responses(
        (status = 200, description = "Entries", body = Vec<TimetableEntry>),
        (status = 404, description = "Timetable not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_entries(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Query(filters): Query<EntryFilterParams>,
) -> Result<Json<Vec<TimetableEntry>>, AppError> {
    let entries = TimetableService::get_entries(&state.db, id, filters).await?;
    Ok(Json(entries))
}

/// Add an entry to a timetable
#[utoipa::path(
    post,
    path = "/api/timetable/timetables/{id}/entries",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    request_body = CreateEntryDto,
    responses(
        (status = 201, description = "Entry created", body = TimetableEntry),
        (status = 400, description = "Timetable slot is already occupied", body = ErrorResponse),
        (status = 404, description = "Timetable, period, subject or staff member not found", body = ErrorResponse),
        (status = 422, description = "Invalid day_of_week", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateEntryDto>,
) -> Result<(StatusCode, Json<TimetableEntry>), AppError> {
    check_admin(&auth_user)?;
    let entry = TimetableService::create_entry(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Delete a timetable entry
#[utoipa::path(
    delete,
    path = "/api/timetable/entries/{id}",
    params(("id" = Uuid, Path, description = "Entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Timetable entry not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetable"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    TimetableService::delete_entry(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
