use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::classes::model::{
    Class, ClassFilterParams, CreateClassDto, CreateSubjectDto, PaginatedClassesResponse, Subject,
    SubjectFilterParams, UpdateClassDto, UpdateSubjectDto,
};
use crate::utils::errors::AppError;

const CLASS_COLUMNS: &str = "id, name, section, academic_year, description, teacher_id, \
     is_active, created_at, updated_at";

const SUBJECT_COLUMNS: &str = "id, name, code, description, credits, is_active, created_at, \
     updated_at";

pub struct ClassService;

impl ClassService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "classes"))]
    pub async fn get_classes(
        db: &PgPool,
        filters: ClassFilterParams,
    ) -> Result<PaginatedClassesResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(academic_year) = &filters.academic_year {
            params.push(academic_year.clone());
            where_clause.push_str(&format!(" AND academic_year = ${}", params.len()));
        }

        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND is_active = {}", is_active));
        }

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            let idx = params.len();
            where_clause.push_str(&format!(
                " AND (name ILIKE ${idx} OR section ILIKE ${idx})"
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM classes WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM classes WHERE 1=1{} ORDER BY academic_year DESC, name LIMIT {} OFFSET {}",
            CLASS_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Class>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let classes = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %classes.len(), "Classes fetched");

        Ok(PaginatedClassesResponse {
            meta: filters.pagination.meta(total),
            data: classes,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "classes"))]
    pub async fn create_class(db: &PgPool, dto: CreateClassDto) -> Result<Class, AppError> {
        if let Some(teacher_id) = dto.teacher_id {
            Self::ensure_teacher_exists(db, teacher_id).await?;
        }

        let insert_query = format!(
            "INSERT INTO classes (name, section, academic_year, description, teacher_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            CLASS_COLUMNS
        );
        let class = sqlx::query_as::<_, Class>(&insert_query)
            .bind(&dto.name)
            .bind(&dto.section)
            .bind(&dto.academic_year)
            .bind(&dto.description)
            .bind(dto.teacher_id)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!("Class already exists"));
                }
                AppError::from(e)
            })?;

        info!(class.id = %class.id, class.name = %class.name, "Class created");

        Ok(class)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "classes"))]
    pub async fn get_class(db: &PgPool, id: Uuid) -> Result<Class, AppError> {
        let query = format!("SELECT {} FROM classes WHERE id = $1", CLASS_COLUMNS);
        sqlx::query_as::<_, Class>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "classes"))]
    pub async fn update_class(
        db: &PgPool,
        id: Uuid,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        if let Some(teacher_id) = dto.teacher_id {
            Self::ensure_teacher_exists(db, teacher_id).await?;
        }

        let existing = Self::get_class(db, id).await?;

        let update_query = format!(
            "UPDATE classes
                SET name = $2, section = $3, academic_year = $4, description = $5,
                    teacher_id = $6, is_active = $7, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            CLASS_COLUMNS
        );
        let class = sqlx::query_as::<_, Class>(&update_query)
            .bind(id)
            .bind(dto.name.unwrap_or(existing.name))
            .bind(dto.section.or(existing.section))
            .bind(dto.academic_year.unwrap_or(existing.academic_year))
            .bind(dto.description.or(existing.description))
            .bind(dto.teacher_id.or(existing.teacher_id))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!("Class already exists"));
                }
                AppError::from(e)
            })?;

        info!(class.id = %class.id, "Class updated");

        Ok(class)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "classes"))]
    pub async fn delete_class(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Class not found")));
        }

        info!(class.id = %id, "Class deleted");

        Ok(())
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "subjects"))]
    pub async fn get_subjects(
        db: &PgPool,
        filters: SubjectFilterParams,
    ) -> Result<Vec<Subject>, AppError> {
        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND is_active = {}", is_active));
        }

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            let idx = params.len();
            where_clause.push_str(&format!(" AND (name ILIKE ${idx} OR code ILIKE ${idx})"));
        }

        let query = format!(
            "SELECT {} FROM subjects WHERE 1=1{} ORDER BY name",
            SUBJECT_COLUMNS, where_clause
        );
        let mut sql = sqlx::query_as::<_, Subject>(&query);
        for param in params {
            sql = sql.bind(param);
        }
        let subjects = sql.fetch_all(db).await?;

        Ok(subjects)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "subjects"))]
    pub async fn create_subject(db: &PgPool, dto: CreateSubjectDto) -> Result<Subject, AppError> {
        let insert_query = format!(
            "INSERT INTO subjects (name, code, description, credits)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            SUBJECT_COLUMNS
        );
        let subject = sqlx::query_as::<_, Subject>(&insert_query)
            .bind(&dto.name)
            .bind(&dto.code)
            .bind(&dto.description)
            .bind(dto.credits)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!("Subject code already exists"));
                }
                AppError::from(e)
            })?;

        info!(subject.id = %subject.id, subject.code = %subject.code, "Subject created");

        Ok(subject)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "subjects"))]
    pub async fn get_subject(db: &PgPool, id: Uuid) -> Result<Subject, AppError> {
        let query = format!("SELECT {} FROM subjects WHERE id = $1", SUBJECT_COLUMNS);
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Subject not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "subjects"))]
    pub async fn update_subject(
        db: &PgPool,
        id: Uuid,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let existing = Self::get_subject(db, id).await?;

        let update_query = format!(
            "UPDATE subjects
                SET name = $2, code = $3, description = $4, credits = $5,
                    is_active = $6, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            SUBJECT_COLUMNS
        );
        let subject = sqlx::query_as::<_, Subject>(&update_query)
            .bind(id)
            .bind(dto.name.unwrap_or(existing.name))
            .bind(dto.code.unwrap_or(existing.code))
            .bind(dto.description.or(existing.description))
            .bind(dto.credits.or(existing.credits))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!("Subject code already exists"));
                }
                AppError::from(e)
            })?;

        info!(subject.id = %subject.id, "Subject updated");

        Ok(subject)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "subjects"))]
    pub async fn delete_subject(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Subject not found")));
        }

        info!(subject.id = %id, "Subject deleted");

        Ok(())
    }

    async fn ensure_teacher_exists(db: &PgPool, teacher_id: Uuid) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM staff WHERE id = $1")
            .bind(teacher_id)
            .fetch_optional(db)
            .await?;
        if exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Staff member not found"
            )));
        }
        Ok(())
    }
}
