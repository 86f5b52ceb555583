//! Middleware modules for request processing.
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. `AuthUser` extractor validates the JWT and extracts claims
//! 3. Role gates (router layers or handler checks) run against claim roles
//! 4. Handler executes if all checks pass

pub mod api_key;
pub mod auth;
pub mod role;
