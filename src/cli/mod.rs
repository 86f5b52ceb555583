//! Administrative CLI commands.
//!
//! The public API cannot create admins; `create-admin` is the bootstrap
//! path. `seed`/`clear-seed` live in [`seeder`].

pub mod seeder;

use sqlx::PgPool;
use uuid::Uuid;

use crate::modules::users::model::system_roles;
use crate::utils::password::hash_password;

/// Creates an admin user and assigns the `admin` role.
///
/// Fails when the email is already taken.
pub async fn create_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let hashed_password = hash_password(password)
        .map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id: Option<Uuid> = sqlx::query_scalar(
        "INSERT INTO users (first_name, last_name, email, password)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(hashed_password)
    .fetch_optional(db)
    .await?;

    let Some(user_id) = user_id else {
        return Err("User with this email already exists".into());
    };

    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
         ON CONFLICT (user_id, role_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(system_roles::ADMIN)
    .execute(db)
    .await?;

    Ok(())
}
