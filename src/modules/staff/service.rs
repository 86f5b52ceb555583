use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::staff::model::{
    CreateStaffDto, PaginatedStaffResponse, STAFF_TYPES, Staff, StaffFilterParams, UpdateStaffDto,
};
use crate::modules::users::model::system_roles;
use crate::utils::errors::AppError;

const STAFF_COLUMNS: &str = "id, user_id, employee_id, staff_type, qualification, \
     date_of_joining, department, is_active, created_at, updated_at";

pub struct StaffService;

impl StaffService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "staff"))]
    pub async fn get_staff_members(
        db: &PgPool,
        filters: StaffFilterParams,
    ) -> Result<PaginatedStaffResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(staff_type) = &filters.staff_type {
            params.push(staff_type.clone());
            where_clause.push_str(&format!(" AND s.staff_type = ${}", params.len()));
        }

        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND s.is_active = {}", is_active));
        }

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            let idx = params.len();
            where_clause.push_str(&format!(
                " AND (u.first_name ILIKE ${idx} OR u.last_name ILIKE ${idx} OR s.employee_id ILIKE ${idx})"
            ));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM staff s JOIN users u ON u.id = s.user_id WHERE 1=1{}",
            where_clause
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT s.id, s.user_id, s.employee_id, s.staff_type, s.qualification,
                    s.date_of_joining, s.department, s.is_active, s.created_at, s.updated_at
               FROM staff s
               JOIN users u ON u.id = s.user_id
              WHERE 1=1{}
              ORDER BY s.created_at DESC
              LIMIT {} OFFSET {}",
            where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Staff>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let staff = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %staff.len(), "Staff fetched");

        Ok(PaginatedStaffResponse {
            meta: filters.pagination.meta(total),
            data: staff,
        })
    }

    /// Creates a staff record. `teacher` staff also get the teacher role.
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "staff"))]
    pub async fn create_staff(db: &PgPool, dto: CreateStaffDto) -> Result<Staff, AppError> {
        Self::ensure_valid_staff_type(&dto.staff_type)?;

        let user_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
            .bind(dto.user_id)
            .fetch_optional(db)
            .await?;
        if user_exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        let already_staff = sqlx::query_scalar::<_, Uuid>("SELECT id FROM staff WHERE user_id = $1")
            .bind(dto.user_id)
            .fetch_optional(db)
            .await?;
        if already_staff.is_some() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Staff record already exists for this user"
            )));
        }

        let mut tx = db.begin().await?;

        let insert_query = format!(
            "INSERT INTO staff (user_id, employee_id, staff_type, qualification, date_of_joining, department)
             VALUES ($1, $2, $3, $4, COALESCE($5, CURRENT_DATE), $6)
             RETURNING {}",
            STAFF_COLUMNS
        );
        let staff = sqlx::query_as::<_, Staff>(&insert_query)
            .bind(dto.user_id)
            .bind(&dto.employee_id)
            .bind(&dto.staff_type)
            .bind(&dto.qualification)
            .bind(dto.date_of_joining)
            .bind(&dto.department)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!("Employee ID already exists"));
                }
                AppError::from(e)
            })?;

        if dto.staff_type == system_roles::slugs::TEACHER {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
                 ON CONFLICT (user_id, role_id) DO NOTHING",
            )
            .bind(dto.user_id)
            .bind(system_roles::TEACHER)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(staff.id = %staff.id, staff.employee_id = %staff.employee_id, "Staff created");

        Ok(staff)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "staff"))]
    pub async fn get_staff(db: &PgPool, id: Uuid) -> Result<Staff, AppError> {
        let query = format!("SELECT {} FROM staff WHERE id = $1", STAFF_COLUMNS);
        sqlx::query_as::<_, Staff>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Staff member not found")))
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "staff"))]
    pub async fn get_staff_by_user(db: &PgPool, user_id: Uuid) -> Result<Staff, AppError> {
        let query = format!("SELECT {} FROM staff WHERE user_id = $1", STAFF_COLUMNS);
        sqlx::query_as::<_, Staff>(&query)
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Staff member not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "staff"))]
    pub async fn update_staff(
        db: &PgPool,
        id: Uuid,
        dto: UpdateStaffDto,
    ) -> Result<Staff, AppError> {
        if let Some(staff_type) = &dto.staff_type {
            Self::ensure_valid_staff_type(staff_type)?;
        }

        let existing = Self::get_staff(db, id).await?;

        let update_query = format!(
            "UPDATE staff
                SET staff_type = $2, qualification = $3, date_of_joining = $4,
                    department = $5, is_active = $6, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            STAFF_COLUMNS
        );
        let staff = sqlx::query_as::<_, Staff>(&update_query)
            .bind(id)
            .bind(dto.staff_type.unwrap_or(existing.staff_type))
            .bind(dto.qualification.or(existing.qualification))
            .bind(dto.date_of_joining.unwrap_or(existing.date_of_joining))
            .bind(dto.department.or(existing.department))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .fetch_one(db)
            .await?;

        info!(staff.id = %staff.id, "Staff updated");

        Ok(staff)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "staff"))]
    pub async fn delete_staff(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Staff member not found"
            )));
        }

        info!(staff.id = %id, "Staff deleted");

        Ok(())
    }

    fn ensure_valid_staff_type(staff_type: &str) -> Result<(), AppError> {
        if STAFF_TYPES.contains(&staff_type) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "staff_type must be one of: {}",
                STAFF_TYPES.join(", ")
            )))
        }
    }
}
