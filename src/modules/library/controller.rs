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
use crate::modules::library::model::{
    Book, BookCategory, BookFilterParams, BookIssue, CreateBookDto, CreateCategoryDto,
    CreateIssueDto, IssueFilterParams, LibrarySettings, PaginatedBooksResponse,
    PaginatedIssuesResponse, UpdateBookDto, UpdateCategoryDto, UpdateIssueDto, UpdateSettingsDto,
};
use crate::modules::library::service::LibraryService;
use crate::modules::users::model::system_roles::slugs;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const LIBRARY_MANAGER_ROLES: &[&str] = &[slugs::ADMIN, slugs::LIBRARIAN];

/// List book categories
#[utoipa::path(
    get,
    path = "/api/library/categories",
    responses(
        (status = 200, description = "Categories", body = Vec<BookCategory>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_categories(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<BookCategory>>, AppError> {
    let categories = LibraryService::get_categories(&state.db).await?;
    Ok(Json(categories))
}

/// Create a book category
#[utoipa::path(
    post,
    path = "/api/library/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = BookCategory),
        (status = 400, description = "Category with this name already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<BookCategory>), AppError> {
    check_any_role(&auth_user, LIBRARY_MANAGER_ROLES)?;
    let category = LibraryService::create_category(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a book category
#[utoipa::path(
    put,
    path = "/api/library/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = BookCategory),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCategoryDto>,
) -> Result<Json<BookCategory>, AppError> {
    check_any_role(&auth_user, LIBRARY_MANAGER_ROLES)?;
    let category = LibraryService::update_category(&state.db, id, dto).await?;
    Ok(Json(category))
}

/// Delete a book category
#[utoipa::path(
    delete,
    path = "/api/library/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Cannot delete category with books assigned to it", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    LibraryService::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List books
#[utoipa::path(
    get,
    path = "/api/library/books",
    params(
        ("search" = Option<String>, Query, description = "Match title or author"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated books", body = PaginatedBooksResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_books(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filters): Query<BookFilterParams>,
) -> Result<Json<PaginatedBooksResponse>, AppError> {
    let books = LibraryService::get_books(&state.db, filters).await?;
    Ok(Json(books))
}

/// Add a book to the catalogue
#[utoipa::path(
    post,
    path = "/api/library/books",
    request_body = CreateBookDto,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Book with this ISBN already exists", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_book(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateBookDto>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    check_any_role(&auth_user, LIBRARY_MANAGER_ROLES)?;
    let book = LibraryService::create_book(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/api/library/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_book(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, AppError> {
    let book = LibraryService::get_book(&state.db, id).await?;
    Ok(Json(book))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/api/library/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateBookDto,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Book with this ISBN already exists", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_book(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateBookDto>,
) -> Result<Json<Book>, AppError> {
    check_any_role(&auth_user, LIBRARY_MANAGER_ROLES)?;
    let book = LibraryService::update_book(&state.db, id, dto).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/library/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Cannot delete book with active loans", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_book(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    LibraryService::delete_book(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List book issues
///
/// Library managers see all loans; everyone else sees only their own.
#[utoipa::path(
    get,
    path = "/api/library/issues",
    params(
        ("user_id" = Option<Uuid>, Query, description = "Filter by borrower (managers only)"),
        ("book_id" = Option<Uuid>, Query, description = "Filter by book"),
        ("is_returned" = Option<bool>, Query, description = "Filter by returned flag"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated issues", body = PaginatedIssuesResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_issues(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(mut filters): Query<IssueFilterParams>,
) -> Result<Json<PaginatedIssuesResponse>, AppError> {
    if !auth_user.has_any_role(LIBRARY_MANAGER_ROLES) {
        filters.user_id = Some(auth_user.user_id()?);
    }
    let issues = LibraryService::get_issues(&state.db, filters).await?;
    Ok(Json(issues))
}

/// Issue a book
///
/// Library managers may issue to anyone; other users only to themselves.
#[utoipa::path(
    post,
    path = "/api/library/issues",
    request_body = CreateIssueDto,
    responses(
        (status = 201, description = "Book issued", body = BookIssue),
        (status = 400, description = "Book unavailable or borrower over limit", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Book or user not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_issue(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateIssueDto>,
) -> Result<(StatusCode, Json<BookIssue>), AppError> {
    if !auth_user.has_any_role(LIBRARY_MANAGER_ROLES) && dto.user_id != auth_user.user_id()? {
        return Err(AppError::forbidden("Insufficient permissions".to_string()));
    }
    let issue = LibraryService::create_issue(&state.db, state.cache.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

/// Get a book issue by ID
#[utoipa::path(
    get,
    path = "/api/library/issues/{id}",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue found", body = BookIssue),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Book issue not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_issue(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookIssue>, AppError> {
    let issue = LibraryService::get_issue(&state.db, id).await?;
    if !auth_user.has_any_role(LIBRARY_MANAGER_ROLES) && issue.user_id != auth_user.user_id()? {
        return Err(AppError::forbidden("Insufficient permissions".to_string()));
    }
    Ok(Json(issue))
}

/// Return an issued book
#[utoipa::path(
    post,
    path = "/api/library/issues/{id}/return",
    params(("id" = Uuid, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Book returned", body = BookIssue),
        (status = 400, description = "Book has already been returned", body = ErrorResponse),
        (status = 404, description = "Book issue not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user))]
pub async fn return_issue(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookIssue>, AppError> {
    check_any_role(&auth_user, LIBRARY_MANAGER_ROLES)?;
    let issue = LibraryService::return_issue(&state.db, state.cache.as_ref(), id).await?;
    Ok(Json(issue))
}

/// Adjust a book issue
#[utoipa::path(
    put,
    path = "/api/library/issues/{id}",
    params(("id" = Uuid, Path, description = "Issue ID")),
    request_body = UpdateIssueDto,
    responses(
        (status = 200, description = "Issue updated", body = BookIssue),
        (status = 404, description = "Book issue not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_issue(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateIssueDto>,
) -> Result<Json<BookIssue>, AppError> {
    check_any_role(&auth_user, LIBRARY_MANAGER_ROLES)?;
    let issue = LibraryService::update_issue(&state.db, id, dto).await?;
    Ok(Json(issue))
}

/// Get library settings
#[utoipa::path(
    get,
    path = "/api/library/settings",
    responses(
        (status = 200, description = "Library settings", body = LibrarySettings),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<LibrarySettings>, AppError> {
    check_any_role(&auth_user, LIBRARY_MANAGER_ROLES)?;
    let settings = LibraryService::get_settings(&state.db, state.cache.as_ref()).await?;
    Ok(Json(settings))
}

/// Update library settings
#[utoipa::path(
    put,
    path = "/api/library/settings",
    request_body = UpdateSettingsDto,
    responses(
        (status = 200, description = "Settings updated", body = LibrarySettings),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Library"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateSettingsDto>,
) -> Result<Json<LibrarySettings>, AppError> {
    check_admin(&auth_user)?;
    let settings = LibraryService::update_settings(&state.db, state.cache.as_ref(), dto).await?;
    Ok(Json(settings))
}
