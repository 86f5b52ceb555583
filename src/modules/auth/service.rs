use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::users::model::{UserWithRoles, system_roles};
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;
use crate::utils::jwt::{create_access_token, create_refresh_token, verify_token};
use crate::utils::password::{hash_password, verify_password};

use super::model::{LoginRequest, LoginResponse, RegisterRequestDto, TokenPairResponse};

pub struct AuthService;

impl AuthService {
    /// Creates a user with the `student` role.
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "users"))]
    pub async fn register_user(
        db: &PgPool,
        dto: RegisterRequestDto,
    ) -> Result<UserWithRoles, AppError> {
        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&dto.email)
            .fetch_optional(db)
            .await?;

        if existing.is_some() {
            warn!(user.email = %dto.email, "Registration attempt with existing email");
            return Err(AppError::bad_request(anyhow::anyhow!("Email already exists")));
        }

        let hashed_password = hash_password(&dto.password)?;

        let mut tx = db.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO users (first_name, last_name, email, phone, password)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id"#,
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(&hashed_password)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(system_roles::STUDENT)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user.id = %user_id, "User registered");

        UserService::get_user(db, user_id).await
    }

    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        #[derive(sqlx::FromRow)]
        struct CredentialRow {
            id: Uuid,
            password: String,
            is_active: bool,
        }

        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, password, is_active FROM users WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password".to_string()))?;

        let is_valid = verify_password(&dto.password, &row.password)?;
        if !is_valid {
            warn!(user.email = %dto.email, "Failed login attempt");
            return Err(AppError::unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        if !row.is_active {
            return Err(AppError::unauthorized("Inactive user".to_string()));
        }

        let user = UserService::get_user(db, row.id).await?;

        let access_token =
            create_access_token(user.id, &user.email, &user.roles, jwt_config)?;
        let refresh_token = create_refresh_token(user.id, &user.email, jwt_config)?;
        let expires_at = Utc::now() + Duration::seconds(jwt_config.access_token_expiry);

        info!(user.id = %user.id, "User logged in");

        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_at,
            user,
        })
    }

    /// Exchanges a valid refresh token for a fresh token pair.
    #[instrument(skip(db, refresh_token, jwt_config))]
    pub async fn refresh_tokens(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<TokenPairResponse, AppError> {
        let claims = verify_token(refresh_token, jwt_config)?;

        if !claims.refresh {
            return Err(AppError::unauthorized(
                "Invalid or expired token".to_string(),
            ));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))?;

        // A token for a since-deleted user is treated as invalid, not as a 404.
        let user = match UserService::get_user(db, user_id).await {
            Ok(user) => user,
            Err(e) if e.status == axum::http::StatusCode::NOT_FOUND => {
                return Err(AppError::unauthorized(
                    "Invalid or expired token".to_string(),
                ));
            }
            Err(e) => return Err(e),
        };
        if !user.is_active {
            return Err(AppError::unauthorized("Inactive user".to_string()));
        }

        let access_token =
            create_access_token(user.id, &user.email, &user.roles, jwt_config)?;
        let refresh_token = create_refresh_token(user.id, &user.email, jwt_config)?;
        let expires_at = Utc::now() + Duration::seconds(jwt_config.access_token_expiry);

        Ok(TokenPairResponse {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_at,
        })
    }
}
