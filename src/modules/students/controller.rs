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
use crate::modules::students::model::{
    CreateParentDto, CreateReportDto, CreateStudentDto, PaginatedStudentsResponse, ParentGuardian,
    PerformanceReport, Student, StudentFilterParams, UpdateParentDto, UpdateReportDto,
    UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::modules::users::model::system_roles::slugs;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// List students
#[utoipa::path(
    get,
    path = "/api/students",
    params(
        ("class_id" = Option<Uuid>, Query, description = "Filter by class"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("search" = Option<String>, Query, description = "Match name or admission number"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated students", body = PaginatedStudentsResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<StudentFilterParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    check_any_role(&auth_user, &[slugs::ADMIN, slugs::TEACHER])?;
    let students = StudentService::get_students(&state.db, filters).await?;
    Ok(Json(students))
}

/// Create a student record for an existing user
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Duplicate student or admission number", body = ErrorResponse),
        (status = 404, description = "User or class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateStudentDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    check_admin(&auth_user)?;
    let student = StudentService::create_student(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Get the student record belonging to the current user
#[utoipa::path(
    get,
    path = "/api/students/me",
    responses(
        (status = 200, description = "Own student record", body = Student),
        (status = 404, description = "No student record for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Student>, AppError> {
    check_any_role(&auth_user, &[slugs::STUDENT])?;
    let student = StudentService::get_student_by_user(&state.db, auth_user.user_id()?).await?;
    Ok(Json(student))
}

/// Get a student by ID
#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student found", body = Student),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, AppError> {
    check_any_role(&auth_user, &[slugs::ADMIN, slugs::TEACHER])?;
    let student = StudentService::get_student(&state.db, id).await?;
    Ok(Json(student))
}

/// Update a student
#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 404, description = "Student or class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    check_admin(&auth_user)?;
    let student = StudentService::update_student(&state.db, id, dto).await?;
    Ok(Json(student))
}

/// Delete a student
#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    StudentService::delete_student(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a parent/guardian contact
#[utoipa::path(
    post,
    path = "/api/students/parents",
    request_body = CreateParentDto,
    responses(
        (status = 201, description = "Parent created", body = ParentGuardian),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateParentDto>,
) -> Result<(StatusCode, Json<ParentGuardian>), AppError> {
    check_admin(&auth_user)?;
    let parent = StudentService::create_parent(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(parent)))
}

/// Get a parent/guardian by ID
#[utoipa::path(
    get,
    path = "/api/students/parents/{id}",
    params(("id" = Uuid, Path, description = "Parent ID")),
    responses(
        (status = 200, description = "Parent found", body = ParentGuardian),
        (status = 404, description = "Parent not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ParentGuardian>, AppError> {
    check_any_role(&auth_user, &[slugs::ADMIN, slugs::TEACHER])?;
    let parent = StudentService::get_parent(&state.db, id).await?;
    Ok(Json(parent))
}

/// Update a parent/guardian
#[utoipa::path(
    put,
    path = "/api/students/parents/{id}",
    params(("id" = Uuid, Path, description = "Parent ID")),
    request_body = UpdateParentDto,
    responses(
        (status = 200, description = "Parent updated", body = ParentGuardian),
        (status = 404, description = "Parent not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateParentDto>,
) -> Result<Json<ParentGuardian>, AppError> {
    check_admin(&auth_user)?;
    let parent = StudentService::update_parent(&state.db, id, dto).await?;
    Ok(Json(parent))
}

/// List parents linked to a student
#[utoipa::path(
    get,
    path = "/api/students/{id}/parents",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Linked parents", body = Vec<ParentGuardian>),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_student_parents(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ParentGuardian>>, AppError> {
    check_any_role(&auth_user, &[slugs::ADMIN, slugs::TEACHER])?;
    let parents = StudentService::get_student_parents(&state.db, id).await?;
    Ok(Json(parents))
}

/// Link a parent to a student
#[utoipa::path(
    post,
    path = "/api/students/{id}/parents/{parent_id}",
    params(
        ("id" = Uuid, Path, description = "Student ID"),
        ("parent_id" = Uuid, Path, description = "Parent ID")
    ),
    responses(
        (status = 204, description = "Link created"),
        (status = 400, description = "Parent is already linked to this student", body = ErrorResponse),
        (status = 404, description = "Student or parent not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn link_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, parent_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    StudentService::link_parent(&state.db, id, parent_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unlink a parent from a student
#[utoipa::path(
    delete,
    path = "/api/students/{id}/parents/{parent_id}",
    params(
        ("id" = Uuid, Path, description = "Student ID"),
        ("parent_id" = Uuid, Path, description = "Parent ID")
    ),
    responses(
        (status = 204, description = "Link removed"),
        (status = 404, description = "Link not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn unlink_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, parent_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    StudentService::unlink_parent(&state.db, id, parent_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List performance reports for a student
#[utoipa::path(
    get,
    path = "/api/students/{id}/performance-reports",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Reports for student", body = Vec<PerformanceReport>),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_student_reports(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PerformanceReport>>, AppError> {
    check_any_role(&auth_user, &[slugs::ADMIN, slugs::TEACHER])?;
    let reports = StudentService::get_reports_for_student(&state.db, id).await?;
    Ok(Json(reports))
}

/// Create a performance report
#[utoipa::path(
    post,
    path = "/api/students/performance-reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report created", body = PerformanceReport),
        (status = 400, description = "Performance report already exists for this term", body = ErrorResponse),
        (status = 404, description = "Student or class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateReportDto>,
) -> Result<(StatusCode, Json<PerformanceReport>), AppError> {
    check_admin(&auth_user)?;
    let report = StudentService::create_report(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Update a performance report
#[utoipa::path(
    put,
    path = "/api/students/performance-reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = UpdateReportDto,
    responses(
        (status = 200, description = "Report updated", body = PerformanceReport),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateReportDto>,
) -> Result<Json<PerformanceReport>, AppError> {
    check_admin(&auth_user)?;
    let report = StudentService::update_report(&state.db, id, dto).await?;
    Ok(Json(report))
}

/// Publish a performance report to the student
#[utoipa::path(
    post,
    path = "/api/students/performance-reports/{id}/publish",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report published", body = PerformanceReport),
        (status = 404, description = "Report not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn publish_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PerformanceReport>, AppError> {
    check_admin(&auth_user)?;
    let report = StudentService::publish_report(&state.db, id).await?;
    Ok(Json(report))
}

/// List the current student's published reports
#[utoipa::path(
    get,
    path = "/api/students/performance-reports/me",
    responses(
        (status = 200, description = "Own published reports", body = Vec<PerformanceReport>),
        (status = 404, description = "No student record for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_reports(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<PerformanceReport>>, AppError> {
    check_any_role(&auth_user, &[slugs::STUDENT])?;
    let reports = StudentService::get_my_reports(&state.db, auth_user.user_id()?).await?;
    Ok(Json(reports))
}
