use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::examinations::model::{
    CreateExamSubjectDto, CreateExaminationDto, CreateGradeDto, CreateGradingScaleDto, EXAM_TYPES,
    Examination, ExaminationFilterParams, ExaminationSubject, GRADE_STATUSES, Grade, GradingScale,
    PaginatedExaminationsResponse, UpdateExaminationDto, UpdateGradeDto, UpdateGradingScaleDto,
};
use crate::utils::errors::AppError;

const EXAMINATION_COLUMNS: &str = "id, name, exam_type, start_date, end_date, description, \
     class_id, is_published, created_at, updated_at";

const EXAM_SUBJECT_COLUMNS: &str = "id, examination_id, subject_id, exam_date, total_marks, \
     passing_marks, created_at, updated_at";

const GRADE_COLUMNS: &str = "id, student_id, examination_subject_id, marks_obtained, \
     grade_letter, remarks, status, created_at, updated_at";

const GRADING_SCALE_COLUMNS: &str = "id, letter, min_marks, max_marks, gpa, description, \
     created_at, updated_at";

pub struct ExaminationService;

impl ExaminationService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "examinations"))]
    pub async fn get_examinations(
        db: &PgPool,
        filters: ExaminationFilterParams,
    ) -> Result<PaginatedExaminationsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(class_id) = filters.class_id {
            params.push(class_id.to_string());
            where_clause.push_str(&format!(" AND class_id = ${}::uuid", params.len()));
        }

        if let Some(is_published) = filters.is_published {
            where_clause.push_str(&format!(" AND is_published = {}", is_published));
        }

        let count_query = format!("SELECT COUNT(*) FROM examinations WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM examinations WHERE 1=1{} ORDER BY start_date DESC LIMIT {} OFFSET {}",
            EXAMINATION_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Examination>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let examinations = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %examinations.len(), "Examinations fetched");

        Ok(PaginatedExaminationsResponse {
            meta: filters.pagination.meta(total),
            data: examinations,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "examinations"))]
    pub async fn create_examination(
        db: &PgPool,
        dto: CreateExaminationDto,
    ) -> Result<Examination, AppError> {
        Self::ensure_valid_exam_type(&dto.exam_type)?;
        Self::ensure_date_order(dto.start_date, dto.end_date)?;
        if let Some(class_id) = dto.class_id {
            Self::ensure_class_exists(db, class_id).await?;
        }

        let insert_query = format!(
            "INSERT INTO examinations (name, exam_type, start_date, end_date, description, class_id, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            EXAMINATION_COLUMNS
        );
        let examination = sqlx::query_as::<_, Examination>(&insert_query)
            .bind(&dto.name)
            .bind(&dto.exam_type)
            .bind(dto.start_date)
            .bind(dto.end_date)
            .bind(&dto.description)
            .bind(dto.class_id)
            .bind(dto.is_published)
            .fetch_one(db)
            .await?;

        info!(examination.id = %examination.id, "Examination created");

        Ok(examination)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "examinations"))]
    pub async fn get_examination(db: &PgPool, id: Uuid) -> Result<Examination, AppError> {
        let query = format!("SELECT {} FROM examinations WHERE id = $1", EXAMINATION_COLUMNS);
        sqlx::query_as::<_, Examination>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Examination not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "examinations"))]
    pub async fn update_examination(
        db: &PgPool,
        id: Uuid,
        dto: UpdateExaminationDto,
    ) -> Result<Examination, AppError> {
        if let Some(exam_type) = &dto.exam_type {
            Self::ensure_valid_exam_type(exam_type)?;
        }
        if let Some(class_id) = dto.class_id {
            Self::ensure_class_exists(db, class_id).await?;
        }

        let existing = Self::get_examination(db, id).await?;

        let start_date = dto.start_date.unwrap_or(existing.start_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);
        Self::ensure_date_order(start_date, end_date)?;

        let update_query = format!(
            "UPDATE examinations
                SET name = $2, exam_type = $3, start_date = $4, end_date = $5,
                    description = $6, class_id = $7, is_published = $8, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            EXAMINATION_COLUMNS
        );
        let examination = sqlx::query_as::<_, Examination>(&update_query)
            .bind(id)
            .bind(dto.name.unwrap_or(existing.name))
            .bind(dto.exam_type.unwrap_or(existing.exam_type))
            .bind(start_date)
            .bind(end_date)
            .bind(dto.description.or(existing.description))
            .bind(dto.class_id.or(existing.class_id))
            .bind(dto.is_published.unwrap_or(existing.is_published))
            .fetch_one(db)
            .await?;

        info!(examination.id = %examination.id, "Examination updated");

        Ok(examination)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "examinations"))]
    pub async fn delete_examination(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM examinations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Examination not found")));
        }

        info!(examination.id = %id, "Examination deleted");

        Ok(())
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "examination_subjects"))]
    pub async fn add_exam_subject(
        db: &PgPool,
        examination_id: Uuid,
        dto: CreateExamSubjectDto,
    ) -> Result<ExaminationSubject, AppError> {
        Self::get_examination(db, examination_id).await?;

        let subject_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM subjects WHERE id = $1")
            .bind(dto.subject_id)
            .fetch_optional(db)
            .await?;
        if subject_exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("Subject not found")));
        }

        if dto.passing_marks > dto.total_marks {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "passing_marks must not exceed total_marks"
            )));
        }

        let insert_query = format!(
            "INSERT INTO examination_subjects (examination_id, subject_id, exam_date, total_marks, passing_marks)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            EXAM_SUBJECT_COLUMNS
        );
        let exam_subject = sqlx::query_as::<_, ExaminationSubject>(&insert_query)
            .bind(examination_id)
            .bind(dto.subject_id)
            .bind(dto.exam_date)
            .bind(dto.total_marks)
            .bind(dto.passing_marks)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Subject is already part of this examination"
                    ));
                }
                AppError::from(e)
            })?;

        info!(
            examination.id = %examination_id,
            subject.id = %dto.subject_id,
            "Subject added to examination"
        );

        Ok(exam_subject)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "examination_subjects"))]
    pub async fn get_exam_subjects(
        db: &PgPool,
        examination_id: Uuid,
    ) -> Result<Vec<ExaminationSubject>, AppError> {
        Self::get_examination(db, examination_id).await?;

        let query = format!(
            "SELECT {} FROM examination_subjects WHERE examination_id = $1 ORDER BY exam_date",
            EXAM_SUBJECT_COLUMNS
        );
        let exam_subjects = sqlx::query_as::<_, ExaminationSubject>(&query)
            .bind(examination_id)
            .fetch_all(db)
            .await?;

        Ok(exam_subjects)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "grades"))]
    pub async fn create_grade(
        db: &PgPool,
        examination_subject_id: Uuid,
        dto: CreateGradeDto,
    ) -> Result<Grade, AppError> {
        Self::ensure_exam_subject_exists(db, examination_subject_id).await?;

        let student_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM students WHERE id = $1")
            .bind(dto.student_id)
            .fetch_optional(db)
            .await?;
        if student_exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        let status = dto.status.unwrap_or_else(|| "pending".to_string());
        Self::ensure_valid_grade_status(&status)?;

        let insert_query = format!(
            "INSERT INTO grades (student_id, examination_subject_id, marks_obtained, grade_letter, remarks, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            GRADE_COLUMNS
        );
        let grade = sqlx::query_as::<_, Grade>(&insert_query)
            .bind(dto.student_id)
            .bind(examination_subject_id)
            .bind(dto.marks_obtained)
            .bind(&dto.grade_letter)
            .bind(&dto.remarks)
            .bind(&status)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Grade already exists for this student and examination subject"
                    ));
                }
                AppError::from(e)
            })?;

        info!(grade.id = %grade.id, student.id = %dto.student_id, "Grade created");

        Ok(grade)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "grades"))]
    pub async fn get_grades_for_exam_subject(
        db: &PgPool,
        examination_subject_id: Uuid,
    ) -> Result<Vec<Grade>, AppError> {
        Self::ensure_exam_subject_exists(db, examination_subject_id).await?;

        let query = format!(
            "SELECT {} FROM grades WHERE examination_subject_id = $1 ORDER BY created_at",
            GRADE_COLUMNS
        );
        let grades = sqlx::query_as::<_, Grade>(&query)
            .bind(examination_subject_id)
            .fetch_all(db)
            .await?;

        Ok(grades)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "grades"))]
    pub async fn get_grade(db: &PgPool, id: Uuid) -> Result<Grade, AppError> {
        let query = format!("SELECT {} FROM grades WHERE id = $1", GRADE_COLUMNS);
        sqlx::query_as::<_, Grade>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Grade not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "grades"))]
    pub async fn update_grade(db: &PgPool, id: Uuid, dto: UpdateGradeDto) -> Result<Grade, AppError> {
        if let Some(status) = &dto.status {
            Self::ensure_valid_grade_status(status)?;
        }

        let existing = Self::get_grade(db, id).await?;

        let update_query = format!(
            "UPDATE grades
                SET marks_obtained = $2, grade_letter = $3, remarks = $4, status = $5,
                    updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            GRADE_COLUMNS
        );
        let grade = sqlx::query_as::<_, Grade>(&update_query)
            .bind(id)
            .bind(dto.marks_obtained.unwrap_or(existing.marks_obtained))
            .bind(dto.grade_letter.or(existing.grade_letter))
            .bind(dto.remarks.or(existing.remarks))
            .bind(dto.status.unwrap_or(existing.status))
            .fetch_one(db)
            .await?;

        info!(grade.id = %grade.id, "Grade updated");

        Ok(grade)
    }

    /// Grades for the student owning the given user account, newest first.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "grades"))]
    pub async fn get_my_grades(db: &PgPool, user_id: Uuid) -> Result<Vec<Grade>, AppError> {
        let student_id =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM students WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))?;

        let query = format!(
            "SELECT {} FROM grades WHERE student_id = $1 ORDER BY created_at DESC",
            GRADE_COLUMNS
        );
        let grades = sqlx::query_as::<_, Grade>(&query)
            .bind(student_id)
            .fetch_all(db)
            .await?;

        Ok(grades)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "grading_scales"))]
    pub async fn get_grading_scales(db: &PgPool) -> Result<Vec<GradingScale>, AppError> {
        let query = format!(
            "SELECT {} FROM grading_scales ORDER BY min_marks DESC",
            GRADING_SCALE_COLUMNS
        );
        let scales = sqlx::query_as::<_, GradingScale>(&query).fetch_all(db).await?;

        Ok(scales)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "grading_scales"))]
    pub async fn create_grading_scale(
        db: &PgPool,
        dto: CreateGradingScaleDto,
    ) -> Result<GradingScale, AppError> {
        if dto.min_marks > dto.max_marks {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "min_marks must not exceed max_marks"
            )));
        }

        let insert_query = format!(
            "INSERT INTO grading_scales (letter, min_marks, max_marks, gpa, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            GRADING_SCALE_COLUMNS
        );
        let scale = sqlx::query_as::<_, GradingScale>(&insert_query)
            .bind(&dto.letter)
            .bind(dto.min_marks)
            .bind(dto.max_marks)
            .bind(dto.gpa)
            .bind(&dto.description)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Grading scale with this letter already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(grading_scale.letter = %scale.letter, "Grading scale created");

        Ok(scale)
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "grading_scales"))]
    pub async fn update_grading_scale(
        db: &PgPool,
        id: Uuid,
        dto: UpdateGradingScaleDto,
    ) -> Result<GradingScale, AppError> {
        let existing = Self::get_grading_scale(db, id).await?;

        let min_marks = dto.min_marks.unwrap_or(existing.min_marks);
        let max_marks = dto.max_marks.unwrap_or(existing.max_marks);
        if min_marks > max_marks {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "min_marks must not exceed max_marks"
            )));
        }

        let update_query = format!(
            "UPDATE grading_scales
                SET letter = $2, min_marks = $3, max_marks = $4, gpa = $5,
                    description = $6, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            GRADING_SCALE_COLUMNS
        );
        let scale = sqlx::query_as::<_, GradingScale>(&update_query)
            .bind(id)
            .bind(dto.letter.unwrap_or(existing.letter))
            .bind(min_marks)
            .bind(max_marks)
            .bind(dto.gpa.or(existing.gpa))
            .bind(dto.description.or(existing.description))
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Grading scale with this letter already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(grading_scale.id = %scale.id, "Grading scale updated");

        Ok(scale)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "grading_scales"))]
    pub async fn delete_grading_scale(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM grading_scales WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Grading scale not found"
            )));
        }

        info!(grading_scale.id = %id, "Grading scale deleted");

        Ok(())
    }

    async fn get_grading_scale(db: &PgPool, id: Uuid) -> Result<GradingScale, AppError> {
        let query = format!(
            "SELECT {} FROM grading_scales WHERE id = $1",
            GRADING_SCALE_COLUMNS
        );
        sqlx::query_as::<_, GradingScale>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Grading scale not found")))
    }

    async fn ensure_exam_subject_exists(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM examination_subjects WHERE id = $1")
                .bind(id)
                .fetch_optional(db)
                .await?;
        if exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Examination subject not found"
            )));
        }
        Ok(())
    }

    async fn ensure_class_exists(db: &PgPool, class_id: Uuid) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM classes WHERE id = $1")
            .bind(class_id)
            .fetch_optional(db)
            .await?;
        if exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("Class not found")));
        }
        Ok(())
    }

    fn ensure_valid_exam_type(exam_type: &str) -> Result<(), AppError> {
        if EXAM_TYPES.contains(&exam_type) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "exam_type must be one of: {}",
                EXAM_TYPES.join(", ")
            )))
        }
    }

    fn ensure_valid_grade_status(status: &str) -> Result<(), AppError> {
        if GRADE_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "status must be one of: {}",
                GRADE_STATUSES.join(", ")
            )))
        }
    }

    fn ensure_date_order(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), AppError> {
        if end_date < start_date {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "end_date must not be before start_date"
            )));
        }
        Ok(())
    }
}
