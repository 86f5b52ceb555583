use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{check_admin, check_any_role};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::fees::model::{
    CreateFeeCategoryDto, CreateFeeDueDateDto, CreateFeeStructureDto, CreateFeeTransactionDto,
    FeeCategory, FeeCategoryFilterParams, FeeDueDate, FeeStructure, FeeStructureFilterParams,
    FeeTransaction, FeeTransactionFilterParams, PaginatedFeeStructuresResponse,
    PaginatedFeeTransactionsResponse, UpdateFeeCategoryDto, UpdateFeeStructureDto,
};
use crate::modules::fees::service::FeeService;
use crate::modules::users::model::system_roles::slugs;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationParams;
use crate::validator::ValidatedJson;

const FEE_DESK_ROLES: &[&str] = &[slugs::ADMIN, slugs::ACCOUNTANT];

/// List fee categories
#[utoipa::path(
    get,
    path = "/api/fees/categories",
    params(("is_active" = Option<bool>, Query, description = "Filter by active flag")),
    responses(
        (status = 200, description = "Fee categories", body = Vec<FeeCategory>),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_categories(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<FeeCategoryFilterParams>,
) -> Result<Json<Vec<FeeCategory>>, AppError> {
    check_any_role(&auth_user, FEE_DESK_ROLES)?;
    let categories = FeeService::get_categories(&state.db, filters).await?;
    Ok(Json(categories))
}

/// Create a fee category
#[utoipa::path(
    post,
    path = "/api/fees/categories",
    request_body = CreateFeeCategoryDto,
    responses(
        (status = 201, description = "Fee category created", body = FeeCategory),
        (status = 400, description = "Fee category with this name already exists", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateFeeCategoryDto>,
) -> Result<(StatusCode, Json<FeeCategory>), AppError> {
    check_admin(&auth_user)?;
    let category = FeeService::create_category(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a fee category
#[utoipa::path(
    put,
    path = "/api/fees/categories/{id}",
    params(("id" = Uuid, Path, description = "Fee category ID")),
    request_body = UpdateFeeCategoryDto,
    responses(
        (status = 200, description = "Fee category updated", body = FeeCategory),
        (status = 400, description = "Fee category with this name already exists", body = ErrorResponse),
        (status = 404, description = "Fee category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateFeeCategoryDto>,
) -> Result<Json<FeeCategory>, AppError> {
    check_admin(&auth_user)?;
    let category = FeeService::update_category(&state.db, id, dto).await?;
    Ok(Json(category))
}

/// List fee structures
#[utoipa::path(
    get,
    path = "/api/fees/structures",
    params(
        ("category_id" = Option<Uuid>, Query, description = "Filter by fee category"),
        ("class_id" = Option<Uuid>, Query, description = "Filter by class"),
        ("academic_year" = Option<String>, Query, description = "Filter by academic year"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated fee structures", body = PaginatedFeeStructuresResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_structures(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<FeeStructureFilterParams>,
) -> Result<Json<PaginatedFeeStructuresResponse>, AppError> {
    check_any_role(&auth_user, FEE_DESK_ROLES)?;
    let structures = FeeService::get_structures(&state.db, filters).await?;
    Ok(Json(structures))
}

/// Create a fee structure
#[utoipa::path(
    post,
    path = "/api/fees/structures",
    request_body = CreateFeeStructureDto,
    responses(
        (status = 201, description = "Fee structure created", body = FeeStructure),
        (status = 404, description = "Fee category or class not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_structure(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateFeeStructureDto>,
) -> Result<(StatusCode, Json<FeeStructure>), AppError> {
    check_admin(&auth_user)?;
    let structure = FeeService::create_structure(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(structure)))
}

/// Get a fee structure by ID
#[utoipa::path(
    get,
    path = "/api/fees/structures/{id}",
    params(("id" = Uuid, Path, description = "Fee structure ID")),
    responses(
        (status = 200, description = "Fee structure found", body = FeeStructure),
        (status = 404, description = "Fee structure not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_structure(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FeeStructure>, AppError> {
    check_any_role(&auth_user, FEE_DESK_ROLES)?;
    let structure = FeeService::get_structure(&state.db, id).await?;
    Ok(Json(structure))
}

/// Update a fee structure
#[utoipa::path(
    put,
    path = "/api/fees/structures/{id}",
    params(("id" = Uuid, Path, description = "Fee structure ID")),
    request_body = UpdateFeeStructureDto,
    responses(
        (status = 200, description = "Fee structure updated", body = FeeStructure),
        (status = 404, description = "Fee structure, category or class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_structure(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateFeeStructureDto>,
) -> Result<Json<FeeStructure>, AppError> {
    check_admin(&auth_user)?;
    let structure = FeeService::update_structure(&state.db, id, dto).await?;
    Ok(Json(structure))
}

/// Delete a fee structure
#[utoipa::path(
    delete,
    path = "/api/fees/structures/{id}",
    params(("id" = Uuid, Path, description = "Fee structure ID")),
    responses(
        (status = 204, description = "Fee structure deleted"),
        (status = 404, description = "Fee structure not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_structure(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    FeeService::delete_structure(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a due date to a fee structure
#[utoipa::path(
    post,
    path = "/api/fees/structures/{id}/due-dates",
    params(("id" = Uuid, Path, description = "Fee structure ID")),
    request_body = CreateFeeDueDateDto,
    responses(
        (status = 201, description = "Due date created", body = FeeDueDate),
        (status = 404, description = "Fee structure not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_due_date(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateFeeDueDateDto>,
) -> Result<(StatusCode, Json<FeeDueDate>), AppError> {
    check_admin(&auth_user)?;
    let due_date = FeeService::create_due_date(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(due_date)))
}

/// List a fee structure's due dates
#[utoipa::path(
    get,
    path = "/api/fees/structures/{id}/due-dates",
    params(("id" = Uuid, Path, description = "Fee structure ID")),
    responses(
        (status = 200, description = "Due dates", body = Vec<FeeDueDate>),
        (status = 404, description = "Fee structure not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_due_dates(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FeeDueDate>>, AppError> {
    check_any_role(&auth_user, FEE_DESK_ROLES)?;
    let due_dates = FeeService::get_due_dates(&state.db, id).await?;
    Ok(Json(due_dates))
}

/// List fee transactions
#[utoipa::path(
    get,
    path = "/api/fees/transactions",
    params(
        ("student_id" = Option<Uuid>, Query, description = "Filter by student"),
        ("fee_structure_id" = Option<Uuid>, Query, description = "Filter by fee structure"),
        ("payment_status" = Option<String>, Query, description = "Filter by payment status"),
        ("start_date" = Option<String>, Query, description = "Only transactions at or after this instant (RFC 3339)"),
        ("end_date" = Option<String>, Query, description = "Only transactions at or before this instant (RFC 3339)"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated transactions", body = PaginatedFeeTransactionsResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_transactions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<FeeTransactionFilterParams>,
) -> Result<Json<PaginatedFeeTransactionsResponse>, AppError> {
    check_any_role(&auth_user, FEE_DESK_ROLES)?;
    let transactions = FeeService::get_transactions(&state.db, filters).await?;
    Ok(Json(transactions))
}

/// Record a fee payment
#[utoipa::path(
    post,
    path = "/api/fees/transactions",
    request_body = CreateFeeTransactionDto,
    responses(
        (status = 201, description = "Transaction recorded", body = FeeTransaction),
        (status = 404, description = "Fee structure or student not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_transaction(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateFeeTransactionDto>,
) -> Result<(StatusCode, Json<FeeTransaction>), AppError> {
    check_any_role(&auth_user, FEE_DESK_ROLES)?;
    let transaction =
        FeeService::create_transaction(&state.db, dto, auth_user.user_id()?).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Get the current student's fee transactions
#[utoipa::path(
    get,
    path = "/api/fees/transactions/me",
    params(
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated transactions", body = PaginatedFeeTransactionsResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_transactions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedFeeTransactionsResponse>, AppError> {
    check_any_role(&auth_user, &[slugs::STUDENT])?;
    let transactions =
        FeeService::get_transactions_for_user(&state.db, auth_user.user_id()?, pagination).await?;
    Ok(Json(transactions))
}

/// Get a fee transaction by ID
#[utoipa::path(
    get,
    path = "/api/fees/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction found", body = FeeTransaction),
        (status = 404, description = "Fee transaction not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Fees"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_transaction(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FeeTransaction>, AppError> {
    check_any_role(&auth_user, FEE_DESK_ROLES)?;
    let transaction = FeeService::get_transaction(&state.db, id).await?;
    Ok(Json(transaction))
}
