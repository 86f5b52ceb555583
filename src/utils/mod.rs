//! Shared utilities used throughout the application:
//!
//! - [`api_key`]: API key generation and hashing for external integrations
//! - [`email`]: Email sending utilities using SMTP
//! - [`errors`]: Application error types and handling
//! - [`jwt`]: JWT token creation and verification
//! - [`pagination`]: Request pagination utilities
//! - [`password`]: Password hashing and verification
//! - [`serde`]: Custom serde serialization/deserialization helpers

pub mod api_key;
pub mod email;
pub mod errors;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod serde;
