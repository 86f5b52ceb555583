use std::env;

const DEFAULT_ACCESS_EXPIRY_SECS: i64 = 1800;
const DEFAULT_REFRESH_EXPIRY_SECS: i64 = 604800;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds (default 30 minutes).
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds (default 7 days).
    pub refresh_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            access_token_expiry: expiry_from("JWT_ACCESS_EXPIRY", DEFAULT_ACCESS_EXPIRY_SECS),
            refresh_token_expiry: expiry_from("JWT_REFRESH_EXPIRY", DEFAULT_REFRESH_EXPIRY_SECS),
        }
    }
}

fn expiry_from(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
