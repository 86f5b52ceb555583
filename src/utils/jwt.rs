use anyhow::anyhow;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::Claims;
use crate::utils::errors::AppError;

pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    roles: &[String],
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        roles: roles.to_vec(),
        exp,
        iat: now,
        refresh: false,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
}

pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.refresh_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        roles: Vec::new(),
        exp,
        iat: now,
        refresh: true,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".to_string(),
            access_token_expiry: 1800,
            refresh_token_expiry: 604800,
        }
    }

    #[test]
    fn access_token_round_trips_claims() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let roles = vec!["admin".to_string(), "teacher".to_string()];

        let token = create_access_token(user_id, "jane@example.com", &roles, &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.roles, roles);
        assert!(!claims.refresh);
    }

    #[test]
    fn refresh_token_is_marked_and_carries_no_roles() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = create_refresh_token(user_id, "jane@example.com", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert!(claims.refresh);
        assert!(claims.roles.is_empty());
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[test]
    fn verification_fails_with_wrong_secret() {
        let config = test_config();
        let other = JwtConfig {
            secret: "a-different-secret".to_string(),
            ..test_config()
        };

        let token = create_access_token(Uuid::new_v4(), "jane@example.com", &[], &config).unwrap();

        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn verification_rejects_garbage() {
        let config = test_config();
        assert!(verify_token("not-a-jwt", &config).is_err());
    }

    #[test]
    fn refresh_expiry_outlives_access_expiry() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let access = create_access_token(user_id, "jane@example.com", &[], &config).unwrap();
        let refresh = create_refresh_token(user_id, "jane@example.com", &config).unwrap();

        let access_claims = verify_token(&access, &config).unwrap();
        let refresh_claims = verify_token(&refresh, &config).unwrap();

        assert!(refresh_claims.exp > access_claims.exp);
    }
}
