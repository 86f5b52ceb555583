//! Configuration modules for the Slateworks API.
//!
//! Each submodule handles one aspect of configuration, loaded from
//! environment variables by a `from_env()` constructor. Values are read once
//! at startup and carried in the application state.
//!
//! # Modules
//!
//! - [`cache`]: Redis cache settings (optional at runtime)
//! - [`cors`]: CORS allowed origins
//! - [`database`]: PostgreSQL database connection pool initialization
//! - [`email`]: SMTP settings for outbound email
//! - [`jwt`]: JWT signing secret and token lifetimes
//! - [`server`]: Bind address for the HTTP listener

pub mod cache;
pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
pub mod server;
