//! Role-based authorization middleware.
//!
//! Two ways to gate a route:
//! 1. Router-level layers built from `require_roles` when a whole router
//!    shares one gate.
//! 2. `check_any_role` inside handlers when operations in one module need
//!    different gates.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Middleware that rejects the request unless the caller holds one of the
/// allowed roles.
///
/// # Usage with axum::middleware::from_fn_with_state
///
/// ```rust,ignore
/// let admin_routes = Router::new()
///     .route("/users", get(list_users))
///     .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
    allowed_roles: &[&str],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !auth_user.has_any_role(allowed_roles) {
        return Err(AppError::forbidden("Insufficient permissions".to_string()));
    }

    req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Admin-only routes.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, &["admin"]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Routes open to teachers and admins.
pub async fn require_teacher(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, &["admin", "teacher"]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Routes open to librarians and admins.
pub async fn require_librarian(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(State(state), req, next, &["admin", "librarian"]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Routes open to accountants and admins.
pub async fn require_accountant(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(State(state), req, next, &["admin", "accountant"]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Routes open to any staff role.
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        &["admin", "teacher", "librarian", "accountant"],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Handler-level check that the caller holds any of the given roles.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn handler(auth_user: AuthUser) -> Result<Json<Response>, AppError> {
///     check_any_role(&auth_user, &["admin", "librarian"])?;
///     // Handler logic
/// }
/// ```
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[&str]) -> Result<(), AppError> {
    if !auth_user.has_any_role(allowed_roles) {
        return Err(AppError::forbidden("Insufficient permissions".to_string()));
    }

    Ok(())
}

/// Handler-level check for admin access.
pub fn check_admin(auth_user: &AuthUser) -> Result<(), AppError> {
    check_any_role(auth_user, &["admin"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::model::Claims;
    use uuid::Uuid;

    fn auth_user(roles: &[&str]) -> AuthUser {
        AuthUser(Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 9999999999,
            iat: 1234567890,
            refresh: false,
        })
    }

    #[test]
    fn test_check_any_role_passes_on_membership() {
        let user = auth_user(&["librarian"]);
        assert!(check_any_role(&user, &["admin", "librarian"]).is_ok());
    }

    #[test]
    fn test_check_any_role_rejects_outsiders() {
        let user = auth_user(&["student"]);
        let err = check_any_role(&user, &["admin", "teacher"]).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_check_admin() {
        assert!(check_admin(&auth_user(&["admin"])).is_ok());
        assert!(check_admin(&auth_user(&["teacher", "student"])).is_err());
    }
}
