use sqlx::PgPool;
use std::time::Duration;
use tracing::warn;

use crate::cache::RedisCache;
use crate::config::cache::CacheConfig;
use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::email::EmailConfig;
use crate::config::jwt::JwtConfig;
use crate::utils::email::EmailService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub email_service: EmailService,
    pub cache: Option<RedisCache>,
}

pub async fn init_app_state() -> AppState {
    let email_config = EmailConfig::from_env();
    let cache_config = CacheConfig::from_env();

    let cache = match &cache_config.redis_url {
        Some(url) => match RedisCache::new(
            url,
            Duration::from_secs(cache_config.default_ttl_seconds),
        )
        .await
        {
            Ok(cache) => Some(cache),
            Err(err) => {
                warn!(error = %err, "Redis unavailable, running without cache");
                None
            }
        },
        None => None,
    };

    AppState {
        db: init_db_pool().await,
        jwt_config: JwtConfig::from_env(),
        email_service: EmailService::new(email_config.clone()),
        email_config,
        cors_config: CorsConfig::from_env(),
        cache,
    }
}
