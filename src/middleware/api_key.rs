use axum::{extract::FromRequestParts, http::request::Parts};

use crate::modules::integrations::model::ExternalApplication;
use crate::modules::integrations::service::IntegrationService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Extractor for machine-to-machine endpoints authenticated with an
/// `X-API-Key` header rather than a JWT.
#[derive(Debug, Clone)]
pub struct ApiKeyApplication(pub ExternalApplication);

impl FromRequestParts<AppState> for ApiKeyApplication {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing X-API-Key header".to_string()))?;

        let application = IntegrationService::authenticate_key(&state.db, presented).await?;

        Ok(ApiKeyApplication(application))
    }
}
