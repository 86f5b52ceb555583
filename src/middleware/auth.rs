use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::modules::auth::model::Claims;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the bearer token and provides the caller's claims.
///
/// Refresh tokens are only accepted by the refresh endpoint, never here.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Check if the user holds a role by name (e.g. "admin")
    pub fn has_role(&self, role: &str) -> bool {
        self.0.roles.iter().any(|r| r == role)
    }

    /// Check if the user holds any of the given roles
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }

    /// Get the user ID as UUID
    pub fn user_id(&self) -> Result<uuid::Uuid, AppError> {
        uuid::Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))
    }

    /// Get the user's email
    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        if claims.refresh {
            return Err(AppError::unauthorized(
                "Invalid or expired token".to_string(),
            ));
        }

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims_with_roles(roles: Vec<String>) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            roles,
            exp: 9999999999,
            iat: 1234567890,
            refresh: false,
        }
    }

    #[test]
    fn test_has_role() {
        let auth_user = AuthUser(claims_with_roles(vec![
            "teacher".to_string(),
            "librarian".to_string(),
        ]));

        assert!(auth_user.has_role("teacher"));
        assert!(auth_user.has_role("librarian"));
        assert!(!auth_user.has_role("admin"));
    }

    #[test]
    fn test_has_any_role() {
        let auth_user = AuthUser(claims_with_roles(vec!["student".to_string()]));

        assert!(auth_user.has_any_role(&["admin", "student"]));
        assert!(!auth_user.has_any_role(&["admin", "teacher"]));
    }

    #[test]
    fn test_user_id() {
        let user_id = Uuid::new_v4();
        let mut claims = claims_with_roles(vec![]);
        claims.sub = user_id.to_string();
        let auth_user = AuthUser(claims);

        assert_eq!(auth_user.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_user_id_rejects_garbage() {
        let mut claims = claims_with_roles(vec![]);
        claims.sub = "not-a-uuid".to_string();
        let auth_user = AuthUser(claims);

        assert!(auth_user.user_id().is_err());
    }
}
