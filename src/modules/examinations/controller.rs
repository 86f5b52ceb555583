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
use crate::modules::examinations::model::{
    CreateExamSubjectDto, CreateExaminationDto, CreateGradeDto, CreateGradingScaleDto,
    Examination, ExaminationFilterParams, ExaminationSubject, Grade, GradingScale,
    PaginatedExaminationsResponse, UpdateExaminationDto, UpdateGradeDto, UpdateGradingScaleDto,
};
use crate::modules::examinations::service::ExaminationService;
use crate::modules::users::model::system_roles::slugs;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// List examinations
#[utoipa::path(
    get,
    path = "/api/examinations",
    params(
        ("class_id" = Option<Uuid>, Query, description = "Filter by class"),
        ("is_published" = Option<bool>, Query, description = "Filter by published flag"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated examinations", body = PaginatedExaminationsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_examinations(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(filters): Query<ExaminationFilterParams>,
) -> Result<Json<PaginatedExaminationsResponse>, AppError> {
    let examinations = ExaminationService::get_examinations(&state.db, filters).await?;
    Ok(Json(examinations))
}

/// Create an examination
#[utoipa::path(
    post,
    path = "/api/examinations",
    request_body = CreateExaminationDto,
    responses(
        (status = 201, description = "Examination created", body = Examination),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 422, description = "Invalid dates or exam type", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_examination(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateExaminationDto>,
) -> Result<(StatusCode, Json<Examination>), AppError> {
    check_admin(&auth_user)?;
    let examination = ExaminationService::create_examination(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(examination)))
}

/// Get an examination by ID
#[utoipa::path(
    get,
    path = "/api/examinations/{id}",
    params(("id" = Uuid, Path, description = "Examination ID")),
    responses(
        (status = 200, description = "Examination found", body = Examination),
        (status = 404, description = "Examination not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_examination(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Examination>, AppError> {
    let examination = ExaminationService::get_examination(&state.db, id).await?;
    Ok(Json(examination))
}

/// Update an examination
#[utoipa::path(
    put,
    path = "/api/examinations/{id}",
    params(("id" = Uuid, Path, description = "Examination ID")),
    request_body = UpdateExaminationDto,
    responses(
        (status = 200, description = "Examination updated", body = Examination),
        (status = 404, description = "Examination not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_examination(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateExaminationDto>,
) -> Result<Json<Examination>, AppError> {
    check_admin(&auth_user)?;
    let examination = ExaminationService::update_examination(&state.db, id, dto).await?;
    Ok(Json(examination))
}

/// Delete an examination
#[utoipa::path(
    delete,
    path = "/api/examinations/{id}",
    params(("id" = Uuid, Path, description = "Examination ID")),
    responses(
        (status = 204, description = "Examination deleted"),
        (status = 404, description = "Examination not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_examination(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    ExaminationService::delete_examination(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Schedule a subject within an examination
#[utoipa::path(
    post,
    path = "/api/examinations/{id}/subjects",
    params(("id" = Uuid, Path, description = "Examination ID")),
    request_body = CreateExamSubjectDto,
    responses(
        (status = 201, description = "Subject scheduled", body = ExaminationSubject),
        (status = 400, description = "Subject is already part of this examination", body = ErrorResponse),
        (status = 404, description = "Examination or subject not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn add_exam_subject(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateExamSubjectDto>,
) -> Result<(StatusCode, Json<ExaminationSubject>), AppError> {
    check_admin(&auth_user)?;
    let exam_subject = ExaminationService::add_exam_subject(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(exam_subject)))
}

/// List the subjects scheduled in an examination
#[utoipa::path(
    get,
    path = "/api/examinations/{id}/subjects",
    params(("id" = Uuid, Path, description = "Examination ID")),
    responses(
        (status = 200, description = "Scheduled subjects", body = Vec<ExaminationSubject>),
        (status = 404, description = "Examination not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_exam_subjects(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ExaminationSubject>>, AppError> {
    let exam_subjects = ExaminationService::get_exam_subjects(&state.db, id).await?;
    Ok(Json(exam_subjects))
}

/// Record a grade for an examination subject
#[utoipa::path(
    post,
    path = "/api/examinations/subjects/{id}/grades",
    params(("id" = Uuid, Path, description = "Examination subject ID")),
    request_body = CreateGradeDto,
    responses(
        (status = 201, description = "Grade recorded", body = Grade),
        (status = 400, description = "Grade already exists for this student and examination subject", body = ErrorResponse),
        (status = 404, description = "Examination subject or student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateGradeDto>,
) -> Result<(StatusCode, Json<Grade>), AppError> {
    check_any_role(&auth_user, &[slugs::ADMIN, slugs::TEACHER])?;
    let grade = ExaminationService::create_grade(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

/// List grades recorded for an examination subject
#[utoipa::path(
    get,
    path = "/api/examinations/subjects/{id}/grades",
    params(("id" = Uuid, Path, description = "Examination subject ID")),
    responses(
        (status = 200, description = "Grades", body = Vec<Grade>),
        (status = 404, description = "Examination subject not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_exam_subject_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Grade>>, AppError> {
    check_any_role(&auth_user, &[slugs::ADMIN, slugs::TEACHER])?;
    let grades = ExaminationService::get_grades_for_exam_subject(&state.db, id).await?;
    Ok(Json(grades))
}

/// List the current student's grades
#[utoipa::path(
    get,
    path = "/api/examinations/grades/me",
    responses(
        (status = 200, description = "Own grades, newest first", body = Vec<Grade>),
        (status = 404, description = "No student record for this user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Grade>>, AppError> {
    check_any_role(&auth_user, &[slugs::STUDENT])?;
    let grades = ExaminationService::get_my_grades(&state.db, auth_user.user_id()?).await?;
    Ok(Json(grades))
}

/// Get a grade by ID
#[utoipa::path(
    get,
    path = "/api/examinations/grades/{id}",
    params(("id" = Uuid, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade found", body = Grade),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_grade(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Grade>, AppError> {
    let grade = ExaminationService::get_grade(&state.db, id).await?;
    Ok(Json(grade))
}

/// Update a grade
#[utoipa::path(
    put,
    path = "/api/examinations/grades/{id}",
    params(("id" = Uuid, Path, description = "Grade ID")),
    request_body = UpdateGradeDto,
    responses(
        (status = 200, description = "Grade updated", body = Grade),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateGradeDto>,
) -> Result<Json<Grade>, AppError> {
    check_any_role(&auth_user, &[slugs::ADMIN, slugs::TEACHER])?;
    let grade = ExaminationService::update_grade(&state.db, id, dto).await?;
    Ok(Json(grade))
}

/// List grading scales
#[utoipa::path(
    get,
    path = "/api/examinations/grading-scales",
    responses(
        (status = 200, description = "Grading scales", body = Vec<GradingScale>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_grading_scales(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<GradingScale>>, AppError> {
    let scales = ExaminationService::get_grading_scales(&state.db).await?;
    Ok(Json(scales))
}

/// Create a grading scale
#[utoipa::path(
    post,
    path = "/api/examinations/grading-scales",
    request_body = CreateGradingScaleDto,
    responses(
        (status = 201, description = "Grading scale created", body = GradingScale),
        (status = 400, description = "Grading scale with this letter already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_grading_scale(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateGradingScaleDto>,
) -> Result<(StatusCode, Json<GradingScale>), AppError> {
    check_admin(&auth_user)?;
    let scale = ExaminationService::create_grading_scale(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(scale)))
}

/// Update a grading scale
#[utoipa::path(
    put,
    path = "/api/examinations/grading-scales/{id}",
    params(("id" = Uuid, Path, description = "Grading scale ID")),
    request_body = UpdateGradingScaleDto,
    responses(
        (status = 200, description = "Grading scale updated", body = GradingScale),
        (status = 404, description = "Grading scale not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_grading_scale(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateGradingScaleDto>,
) -> Result<Json<GradingScale>, AppError> {
    check_admin(&auth_user)?;
    let scale = ExaminationService::update_grading_scale(&state.db, id, dto).await?;
    Ok(Json(scale))
}

/// Delete a grading scale
#[utoipa::path(
    delete,
    path = "/api/examinations/grading-scales/{id}",
    params(("id" = Uuid, Path, description = "Grading scale ID")),
    responses(
        (status = 204, description = "Grading scale deleted"),
        (status = 404, description = "Grading scale not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Examinations"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_grading_scale(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_admin(&auth_user)?;
    ExaminationService::delete_grading_scale(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
