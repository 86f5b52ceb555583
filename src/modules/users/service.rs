use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::modules::users::model::{
    PaginatedUsersResponse, Role, UpdateUserDto, UserFilterParams, UserWithRoles,
};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

const USER_WITH_ROLES_SELECT: &str = r#"
    SELECT u.id, u.first_name, u.last_name, u.email, u.phone, u.is_active,
           COALESCE(ARRAY_AGG(r.name::text) FILTER (WHERE r.name IS NOT NULL), ARRAY[]::text[]) AS roles,
           u.created_at, u.updated_at
      FROM users u
      LEFT JOIN user_roles ur ON ur.user_id = u.id
      LEFT JOIN roles r ON r.id = ur.role_id
"#;

pub struct UserService;

impl UserService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_users(
        db: &PgPool,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            let idx = params.len();
            where_clause.push_str(&format!(
                " AND (u.first_name ILIKE ${idx} OR u.last_name ILIKE ${idx} OR u.email ILIKE ${idx})"
            ));
        }

        if let Some(role) = &filters.role {
            params.push(role.clone());
            where_clause.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM user_roles ur2
                       JOIN roles r2 ON r2.id = ur2.role_id
                      WHERE ur2.user_id = u.id AND r2.name = ${})",
                params.len()
            ));
        }

        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND u.is_active = {}", is_active));
        }

        let count_query = format!("SELECT COUNT(*) FROM users u WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "{} WHERE 1=1{} GROUP BY u.id ORDER BY u.created_at DESC LIMIT {} OFFSET {}",
            USER_WITH_ROLES_SELECT, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, UserWithRoles>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let users = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %users.len(), "Users fetched");

        Ok(PaginatedUsersResponse {
            meta: filters.pagination.meta(total),
            data: users,
        })
    }

    #[instrument(skip(db), fields(user.id = %id, db.operation = "SELECT", db.table = "users"))]
    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<UserWithRoles, AppError> {
        let query = format!("{} WHERE u.id = $1 GROUP BY u.id", USER_WITH_ROLES_SELECT);

        sqlx::query_as::<_, UserWithRoles>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    /// Role slugs held by a user, sorted for stable token claims.
    pub async fn role_names(db: &PgPool, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT r.name::text FROM roles r
              JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(names)
    }

    #[instrument(skip(db, dto), fields(user.id = %id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_user(
        db: &PgPool,
        id: Uuid,
        dto: UpdateUserDto,
    ) -> Result<UserWithRoles, AppError> {
        let existing = Self::get_user(db, id).await?;

        let first_name = dto.first_name.unwrap_or(existing.first_name);
        let last_name = dto.last_name.unwrap_or(existing.last_name);
        let email = dto.email.unwrap_or(existing.email);
        let phone = if dto.phone.is_some() {
            dto.phone
        } else {
            existing.phone
        };
        let is_active = dto.is_active.unwrap_or(existing.is_active);
        let password = match &dto.password {
            Some(plain) => Some(hash_password(plain)?),
            None => None,
        };

        sqlx::query(
            r#"UPDATE users
                  SET first_name = $1, last_name = $2, email = $3, phone = $4,
                      is_active = $5, password = COALESCE($6, password), updated_at = NOW()
                WHERE id = $7"#,
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&email)
        .bind(&phone)
        .bind(is_active)
        .bind(&password)
        .bind(id)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(user.id = %id, "Attempted to update user to an existing email");
                return AppError::bad_request(anyhow::anyhow!("Email already exists"));
            }
            AppError::from(e)
        })?;

        Self::get_user(db, id).await
    }

    #[instrument(skip(db), fields(user.id = %id, db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        Ok(())
    }

    pub async fn get_roles(db: &PgPool) -> Result<Vec<Role>, AppError> {
        let roles =
            sqlx::query_as::<_, Role>("SELECT id, name, description FROM roles ORDER BY name")
                .fetch_all(db)
                .await?;

        Ok(roles)
    }

    #[instrument(skip(db), fields(user.id = %user_id, role.name = %role_name, db.operation = "INSERT", db.table = "user_roles"))]
    pub async fn assign_role(
        db: &PgPool,
        user_id: Uuid,
        role_name: &str,
    ) -> Result<UserWithRoles, AppError> {
        let role_id = Self::role_id_by_name(db, role_name).await?;

        // Ensures a 404 for unknown users before the membership insert.
        Self::get_user(db, user_id).await?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role_id)
            .execute(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!("User already has this role"));
                }
                AppError::from(e)
            })?;

        Self::get_user(db, user_id).await
    }

    #[instrument(skip(db), fields(user.id = %user_id, role.name = %role_name, db.operation = "DELETE", db.table = "user_roles"))]
    pub async fn remove_role(
        db: &PgPool,
        user_id: Uuid,
        role_name: &str,
    ) -> Result<UserWithRoles, AppError> {
        let role_id = Self::role_id_by_name(db, role_name).await?;

        Self::get_user(db, user_id).await?;

        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "User does not have this role"
            )));
        }

        Self::get_user(db, user_id).await
    }

    async fn role_id_by_name(db: &PgPool, role_name: &str) -> Result<Uuid, AppError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE name = $1")
            .bind(role_name)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Role not found")))
    }
}
