use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::integrations::model::{
    APP_TYPES, ApiKey, ApplicationFilterParams, CreateApiKeyDto, CreateApplicationDto,
    CreatedApiKeyResponse, ExternalApplication, PaginatedApplicationsResponse,
    UpdateApplicationDto,
};
use crate::utils::api_key::{generate_api_key, hash_api_key};
use crate::utils::errors::AppError;

const APPLICATION_COLUMNS: &str = "id, name, description, app_type, base_url, is_active, \
     created_at, updated_at";

// key_hash is deliberately absent: it never leaves the database.
const KEY_COLUMNS: &str = "id, application_id, name, prefix, expires_at, is_active, \
     last_used_at, created_by_id, created_at, updated_at";

pub struct IntegrationService;

impl IntegrationService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "external_applications"))]
    pub async fn get_applications(
        db: &PgPool,
        filters: ApplicationFilterParams,
    ) -> Result<PaginatedApplicationsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND is_active = {}", is_active));
        }

        if let Some(app_type) = &filters.app_type {
            Self::ensure_valid_app_type(app_type)?;
            params.push(app_type.clone());
            where_clause.push_str(&format!(" AND app_type = ${}", params.len()));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM external_applications WHERE 1=1{}",
            where_clause
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM external_applications WHERE 1=1{} ORDER BY name LIMIT {} OFFSET {}",
            APPLICATION_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, ExternalApplication>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let applications = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %applications.len(), "External applications fetched");

        Ok(PaginatedApplicationsResponse {
            meta: filters.pagination.meta(total),
            data: applications,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "external_applications"))]
    pub async fn create_application(
        db: &PgPool,
        dto: CreateApplicationDto,
    ) -> Result<ExternalApplication, AppError> {
        Self::ensure_valid_app_type(&dto.app_type)?;

        let insert_query = format!(
            "INSERT INTO external_applications (name, description, app_type, base_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, ExternalApplication>(&insert_query)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(&dto.app_type)
            .bind(&dto.base_url)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Application with this name already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(
            application.id = %application.id,
            application.name = %application.name,
            "External application registered"
        );

        Ok(application)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "external_applications"))]
    pub async fn get_application(db: &PgPool, id: Uuid) -> Result<ExternalApplication, AppError> {
        let query = format!(
            "SELECT {} FROM external_applications WHERE id = $1",
            APPLICATION_COLUMNS
        );
        sqlx::query_as::<_, ExternalApplication>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Application not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "external_applications"))]
    pub async fn update_application(
        db: &PgPool,
        id: Uuid,
        dto: UpdateApplicationDto,
    ) -> Result<ExternalApplication, AppError> {
        if let Some(app_type) = &dto.app_type {
            Self::ensure_valid_app_type(app_type)?;
        }

        let existing = Self::get_application(db, id).await?;

        let update_query = format!(
            "UPDATE external_applications
                SET name = $2, description = $3, app_type = $4, base_url = $5, is_active = $6,
                    updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, ExternalApplication>(&update_query)
            .bind(id)
            .bind(dto.name.unwrap_or(existing.name))
            .bind(dto.description.or(existing.description))
            .bind(dto.app_type.unwrap_or(existing.app_type))
            .bind(dto.base_url.or(existing.base_url))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Application with this name already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(application.id = %application.id, "External application updated");

        Ok(application)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "external_applications"))]
    pub async fn delete_application(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM external_applications WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Application not found")));
        }

        info!(application.id = %id, "External application deleted");

        Ok(())
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "api_keys"))]
    pub async fn create_key(
        db: &PgPool,
        application_id: Uuid,
        dto: CreateApiKeyDto,
        created_by_id: Uuid,
    ) -> Result<CreatedApiKeyResponse, AppError> {
        Self::get_application(db, application_id).await?;

        let generated = generate_api_key();

        let insert_query = format!(
            "INSERT INTO api_keys (application_id, name, key_hash, prefix, expires_at, created_by_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            KEY_COLUMNS
        );
        let key = sqlx::query_as::<_, ApiKey>(&insert_query)
            .bind(application_id)
            .bind(&dto.name)
            .bind(&generated.hash)
            .bind(&generated.prefix)
            .bind(dto.expires_at)
            .bind(created_by_id)
            .fetch_one(db)
            .await?;

        info!(
            key.id = %key.id,
            application.id = %application_id,
            key.prefix = %key.prefix,
            "API key created"
        );

        Ok(CreatedApiKeyResponse {
            key,
            api_key: generated.plaintext,
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "api_keys"))]
    pub async fn get_keys(db: &PgPool, application_id: Uuid) -> Result<Vec<ApiKey>, AppError> {
        Self::get_application(db, application_id).await?;

        let query = format!(
            "SELECT {} FROM api_keys WHERE application_id = $1 ORDER BY created_at DESC",
            KEY_COLUMNS
        );
        let keys = sqlx::query_as::<_, ApiKey>(&query)
            .bind(application_id)
            .fetch_all(db)
            .await?;

        Ok(keys)
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "api_keys"))]
    pub async fn revoke_key(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE api_keys SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("API key not found")));
        }

        info!(key.id = %id, "API key revoked");

        Ok(())
    }

    /// Resolves a presented key to its application. Only active, unexpired
    /// keys of active applications authenticate; a hit stamps `last_used_at`.
    #[instrument(skip(db, presented_key), fields(db.operation = "SELECT", db.table = "api_keys"))]
    pub async fn authenticate_key(
        db: &PgPool,
        presented_key: &str,
    ) -> Result<ExternalApplication, AppError> {
        let hash = hash_api_key(presented_key);

        let matched = sqlx::query_as::<_, ExternalApplication>(
            "SELECT a.id, a.name, a.description, a.app_type, a.base_url, a.is_active,
                    a.created_at, a.updated_at
               FROM api_keys k
               JOIN external_applications a ON a.id = k.application_id
              WHERE k.key_hash = $1
                AND k.is_active = TRUE
                AND (k.expires_at IS NULL OR k.expires_at > NOW())
                AND a.is_active = TRUE",
        )
        .bind(&hash)
        .fetch_optional(db)
        .await?;

        let application = matched
            .ok_or_else(|| AppError::unauthorized("Invalid or expired API key".to_string()))?;

        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE key_hash = $1")
            .bind(&hash)
            .execute(db)
            .await?;

        Ok(application)
    }

    fn ensure_valid_app_type(app_type: &str) -> Result<(), AppError> {
        if APP_TYPES.contains(&app_type) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "app_type must be one of: {}",
                APP_TYPES.join(", ")
            )))
        }
    }
}
