use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::students::model::{
    CreateParentDto, CreateReportDto, CreateStudentDto, PaginatedStudentsResponse, ParentGuardian,
    PerformanceReport, Student, StudentFilterParams, UpdateParentDto, UpdateReportDto,
    UpdateStudentDto,
};
use crate::utils::errors::AppError;

const STUDENT_COLUMNS: &str = "id, user_id, admission_number, date_of_birth, gender, address, \
     admission_date, class_id, is_active, created_at, updated_at";

const PARENT_COLUMNS: &str = "id, first_name, last_name, relationship, email, phone, occupation, \
     address, is_emergency_contact, created_at, updated_at";

const REPORT_COLUMNS: &str = "id, student_id, class_id, term, academic_year, overall_grade, \
     overall_percentage, attendance_percentage, remarks, teacher_comments, strengths, \
     areas_for_improvement, is_published, published_date, created_at, updated_at";

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "students"))]
    pub async fn get_students(
        db: &PgPool,
        filters: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(class_id) = filters.class_id {
            params.push(class_id.to_string());
            where_clause.push_str(&format!(" AND s.class_id = ${}::uuid", params.len()));
        }

        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND s.is_active = {}", is_active));
        }

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            let idx = params.len();
            where_clause.push_str(&format!(
                " AND (u.first_name ILIKE ${idx} OR u.last_name ILIKE ${idx} OR s.admission_number ILIKE ${idx})"
            ));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM students s JOIN users u ON u.id = s.user_id WHERE 1=1{}",
            where_clause
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT s.id, s.user_id, s.admission_number, s.date_of_birth, s.gender, s.address,
                    s.admission_date, s.class_id, s.is_active, s.created_at, s.updated_at
               FROM students s
               JOIN users u ON u.id = s.user_id
              WHERE 1=1{}
              ORDER BY s.created_at DESC
              LIMIT {} OFFSET {}",
            where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Student>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let students = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %students.len(), "Students fetched");

        Ok(PaginatedStudentsResponse {
            meta: filters.pagination.meta(total),
            data: students,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "students"))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let user_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
            .bind(dto.user_id)
            .fetch_optional(db)
            .await?;
        if user_exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        let already_student =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM students WHERE user_id = $1")
                .bind(dto.user_id)
                .fetch_optional(db)
                .await?;
        if already_student.is_some() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Student record already exists for this user"
            )));
        }

        if let Some(class_id) = dto.class_id {
            Self::ensure_class_exists(db, class_id).await?;
        }

        let query = format!(
            "INSERT INTO students (user_id, admission_number, date_of_birth, gender, address,
                                   admission_date, class_id)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, CURRENT_DATE), $7)
             RETURNING {STUDENT_COLUMNS}"
        );
        let student = sqlx::query_as::<_, Student>(&query)
            .bind(dto.user_id)
            .bind(&dto.admission_number)
            .bind(dto.date_of_birth)
            .bind(&dto.gender)
            .bind(&dto.address)
            .bind(dto.admission_date)
            .bind(dto.class_id)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Admission number already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(student.id = %student.id, "Student created");

        Ok(student)
    }

    #[instrument(skip(db), fields(student.id = %id, db.operation = "SELECT", db.table = "students"))]
    pub async fn get_student(db: &PgPool, id: Uuid) -> Result<Student, AppError> {
        let query = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");

        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))
    }

    /// The student row belonging to a user account, for `/me` endpoints.
    pub async fn get_student_by_user(db: &PgPool, user_id: Uuid) -> Result<Student, AppError> {
        let query = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE user_id = $1");

        sqlx::query_as::<_, Student>(&query)
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))
    }

    #[instrument(skip(db, dto), fields(student.id = %id, db.operation = "UPDATE", db.table = "students"))]
    pub async fn update_student(
        db: &PgPool,
        id: Uuid,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let existing = Self::get_student(db, id).await?;

        if let Some(class_id) = dto.class_id {
            Self::ensure_class_exists(db, class_id).await?;
        }

        let date_of_birth = dto.date_of_birth.or(existing.date_of_birth);
        let gender = dto.gender.or(existing.gender);
        let address = dto.address.or(existing.address);
        let class_id = dto.class_id.or(existing.class_id);
        let is_active = dto.is_active.unwrap_or(existing.is_active);

        let query = format!(
            "UPDATE students
                SET date_of_birth = $1, gender = $2, address = $3, class_id = $4,
                    is_active = $5, updated_at = NOW()
              WHERE id = $6
              RETURNING {STUDENT_COLUMNS}"
        );
        let student = sqlx::query_as::<_, Student>(&query)
            .bind(date_of_birth)
            .bind(&gender)
            .bind(&address)
            .bind(class_id)
            .bind(is_active)
            .bind(id)
            .fetch_one(db)
            .await?;

        Ok(student)
    }

    #[instrument(skip(db), fields(student.id = %id, db.operation = "DELETE", db.table = "students"))]
    pub async fn delete_student(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        Ok(())
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "parent_guardians"))]
    pub async fn create_parent(
        db: &PgPool,
        dto: CreateParentDto,
    ) -> Result<ParentGuardian, AppError> {
        let query = format!(
            "INSERT INTO parent_guardians (first_name, last_name, relationship, email, phone,
                                           occupation, address, is_emergency_contact)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {PARENT_COLUMNS}"
        );
        let parent = sqlx::query_as::<_, ParentGuardian>(&query)
            .bind(&dto.first_name)
            .bind(&dto.last_name)
            .bind(&dto.relationship)
            .bind(&dto.email)
            .bind(&dto.phone)
            .bind(&dto.occupation)
            .bind(&dto.address)
            .bind(dto.is_emergency_contact)
            .fetch_one(db)
            .await?;

        Ok(parent)
    }

    pub async fn get_parent(db: &PgPool, id: Uuid) -> Result<ParentGuardian, AppError> {
        let query = format!("SELECT {PARENT_COLUMNS} FROM parent_guardians WHERE id = $1");

        sqlx::query_as::<_, ParentGuardian>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Parent not found")))
    }

    #[instrument(skip(db, dto), fields(parent.id = %id, db.operation = "UPDATE", db.table = "parent_guardians"))]
    pub async fn update_parent(
        db: &PgPool,
        id: Uuid,
        dto: UpdateParentDto,
    ) -> Result<ParentGuardian, AppError> {
        let existing = Self::get_parent(db, id).await?;

        let first_name = dto.first_name.unwrap_or(existing.first_name);
        let last_name = dto.last_name.unwrap_or(existing.last_name);
        let relationship = dto.relationship.unwrap_or(existing.relationship);
        let email = dto.email.or(existing.email);
        let phone = dto.phone.unwrap_or(existing.phone);
        let occupation = dto.occupation.or(existing.occupation);
        let address = dto.address.or(existing.address);
        let is_emergency_contact = dto
            .is_emergency_contact
            .unwrap_or(existing.is_emergency_contact);

        let query = format!(
            "UPDATE parent_guardians
                SET first_name = $1, last_name = $2, relationship = $3, email = $4, phone = $5,
                    occupation = $6, address = $7, is_emergency_contact = $8, updated_at = NOW()
              WHERE id = $9
              RETURNING {PARENT_COLUMNS}"
        );
        let parent = sqlx::query_as::<_, ParentGuardian>(&query)
            .bind(&first_name)
            .bind(&last_name)
            .bind(&relationship)
            .bind(&email)
            .bind(&phone)
            .bind(&occupation)
            .bind(&address)
            .bind(is_emergency_contact)
            .bind(id)
            .fetch_one(db)
            .await?;

        Ok(parent)
    }

    /// Parents linked to a student, emergency contacts first.
    pub async fn get_student_parents(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<ParentGuardian>, AppError> {
        Self::get_student(db, student_id).await?;

        let parents = sqlx::query_as::<_, ParentGuardian>(
            "SELECT p.id, p.first_name, p.last_name, p.relationship, p.email, p.phone,
                    p.occupation, p.address, p.is_emergency_contact, p.created_at, p.updated_at
               FROM parent_guardians p
               JOIN student_parents sp ON sp.parent_id = p.id
              WHERE sp.student_id = $1
              ORDER BY p.is_emergency_contact DESC, p.last_name",
        )
        .bind(student_id)
        .fetch_all(db)
        .await?;

        Ok(parents)
    }

    #[instrument(skip(db), fields(student.id = %student_id, parent.id = %parent_id, db.operation = "INSERT", db.table = "student_parents"))]
    pub async fn link_parent(
        db: &PgPool,
        student_id: Uuid,
        parent_id: Uuid,
    ) -> Result<(), AppError> {
        Self::get_student(db, student_id).await?;
        Self::get_parent(db, parent_id).await?;

        sqlx::query("INSERT INTO student_parents (student_id, parent_id) VALUES ($1, $2)")
            .bind(student_id)
            .bind(parent_id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Parent is already linked to this student"
                    ));
                }
                AppError::from(e)
            })?;

        Ok(())
    }

    #[instrument(skip(db), fields(student.id = %student_id, parent.id = %parent_id, db.operation = "DELETE", db.table = "student_parents"))]
    pub async fn unlink_parent(
        db: &PgPool,
        student_id: Uuid,
        parent_id: Uuid,
    ) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM student_parents WHERE student_id = $1 AND parent_id = $2")
                .bind(student_id)
                .bind(parent_id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Parent is not linked to this student"
            )));
        }

        Ok(())
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "performance_reports"))]
    pub async fn create_report(
        db: &PgPool,
        dto: CreateReportDto,
    ) -> Result<PerformanceReport, AppError> {
        Self::get_student(db, dto.student_id).await?;
        Self::ensure_class_exists(db, dto.class_id).await?;

        let query = format!(
            "INSERT INTO performance_reports
                    (student_id, class_id, term, academic_year, overall_grade,
                     overall_percentage, attendance_percentage, remarks, teacher_comments,
                     strengths, areas_for_improvement)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {REPORT_COLUMNS}"
        );
        let report = sqlx::query_as::<_, PerformanceReport>(&query)
            .bind(dto.student_id)
            .bind(dto.class_id)
            .bind(&dto.term)
            .bind(&dto.academic_year)
            .bind(dto.overall_grade)
            .bind(dto.overall_percentage)
            .bind(dto.attendance_percentage)
            .bind(&dto.remarks)
            .bind(&dto.teacher_comments)
            .bind(&dto.strengths)
            .bind(&dto.areas_for_improvement)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Performance report already exists for this term"
                    ));
                }
                AppError::from(e)
            })?;

        Ok(report)
    }

    #[instrument(skip(db, dto), fields(report.id = %id, db.operation = "UPDATE", db.table = "performance_reports"))]
    pub async fn update_report(
        db: &PgPool,
        id: Uuid,
        dto: UpdateReportDto,
    ) -> Result<PerformanceReport, AppError> {
        let existing = Self::get_report(db, id).await?;

        let overall_grade = dto.overall_grade.or(existing.overall_grade);
        let overall_percentage = dto.overall_percentage.or(existing.overall_percentage);
        let attendance_percentage = dto.attendance_percentage.or(existing.attendance_percentage);
        let remarks = dto.remarks.or(existing.remarks);
        let teacher_comments = dto.teacher_comments.or(existing.teacher_comments);
        let strengths = dto.strengths.or(existing.strengths);
        let areas_for_improvement = dto.areas_for_improvement.or(existing.areas_for_improvement);

        let query = format!(
            "UPDATE performance_reports
                SET overall_grade = $1, overall_percentage = $2, attendance_percentage = $3,
                    remarks = $4, teacher_comments = $5, strengths = $6,
                    areas_for_improvement = $7, updated_at = NOW()
              WHERE id = $8
              RETURNING {REPORT_COLUMNS}"
        );
        let report = sqlx::query_as::<_, PerformanceReport>(&query)
            .bind(overall_grade)
            .bind(overall_percentage)
            .bind(attendance_percentage)
            .bind(&remarks)
            .bind(&teacher_comments)
            .bind(&strengths)
            .bind(&areas_for_improvement)
            .bind(id)
            .fetch_one(db)
            .await?;

        Ok(report)
    }

    pub async fn get_report(db: &PgPool, id: Uuid) -> Result<PerformanceReport, AppError> {
        let query = format!("SELECT {REPORT_COLUMNS} FROM performance_reports WHERE id = $1");

        sqlx::query_as::<_, PerformanceReport>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Performance report not found")))
    }

    #[instrument(skip(db), fields(report.id = %id, db.operation = "UPDATE", db.table = "performance_reports"))]
    pub async fn publish_report(db: &PgPool, id: Uuid) -> Result<PerformanceReport, AppError> {
        let query = format!(
            "UPDATE performance_reports
                SET is_published = TRUE, published_date = NOW(), updated_at = NOW()
              WHERE id = $1
              RETURNING {REPORT_COLUMNS}"
        );
        let report = sqlx::query_as::<_, PerformanceReport>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Performance report not found")))?;

        info!(report.id = %report.id, "Performance report published");

        Ok(report)
    }

    pub async fn get_reports_for_student(
        db: &PgPool,
        student_id: Uuid,
    ) -> Result<Vec<PerformanceReport>, AppError> {
        Self::get_student(db, student_id).await?;

        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM performance_reports
              WHERE student_id = $1
              ORDER BY created_at DESC"
        );
        let reports = sqlx::query_as::<_, PerformanceReport>(&query)
            .bind(student_id)
            .fetch_all(db)
            .await?;

        Ok(reports)
    }

    /// Published reports for the student owned by this user account.
    pub async fn get_my_reports(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<PerformanceReport>, AppError> {
        let student = Self::get_student_by_user(db, user_id).await?;

        let query = format!(
            "SELECT {REPORT_COLUMNS} FROM performance_reports
              WHERE student_id = $1 AND is_published = TRUE
              ORDER BY published_date DESC NULLS LAST, created_at DESC"
        );
        let reports = sqlx::query_as::<_, PerformanceReport>(&query)
            .bind(student.id)
            .fetch_all(db)
            .await?;

        Ok(reports)
    }

    async fn ensure_class_exists(db: &PgPool, class_id: Uuid) -> Result<(), AppError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM classes WHERE id = $1")
            .bind(class_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class not found")))?;

        Ok(())
    }
}
