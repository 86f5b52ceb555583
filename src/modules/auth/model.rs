use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::users::model::UserWithRoles;

/// JWT claims carried by both access and refresh tokens.
///
/// `refresh` is only true on refresh tokens; the auth extractor rejects
/// those so they cannot be replayed against normal endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub roles: Vec<String>,
    pub exp: usize,
    pub iat: usize,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(length(min = 1, message = "first_name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last_name must not be empty"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: UserWithRoles,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token must not be empty"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_refresh_flag_defaults_to_false() {
        let json = r#"{
            "sub": "8b3a36a4-5ae0-4a1e-a9f5-0d4e0c7a9b21",
            "email": "jane@example.com",
            "roles": ["student"],
            "exp": 9999999999,
            "iat": 1234567890
        }"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert!(!claims.refresh);
        assert_eq!(claims.roles, vec!["student".to_string()]);
    }

    #[test]
    fn register_dto_rejects_short_password() {
        let dto = RegisterRequestDto {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "short".to_string(),
            phone: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn login_request_requires_valid_email() {
        let dto = LoginRequest {
            email: "not-an-email".to_string(),
            password: "whatever".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
