use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::middleware::role::{require_admin, require_staff};
use crate::modules::auth::router::init_auth_router;
use crate::modules::calendar::router::init_calendar_router;
use crate::modules::classes::router::init_classes_router;
use crate::modules::email::router::init_email_router;
use crate::modules::examinations::router::init_examinations_router;
use crate::modules::fees::router::init_fees_router;
use crate::modules::integrations::router::init_integrations_router;
use crate::modules::library::router::init_library_router;
use crate::modules::messages::router::init_messages_router;
use crate::modules::staff::router::{init_staff_me_router, init_staff_router};
use crate::modules::students::router::init_students_router;
use crate::modules::timetable::router::init_timetable_router;
use crate::modules::users::router::init_users_router;
use crate::state::AppState;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

/// Liveness probe. No auth, no database round-trip.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router())
                .nest(
                    "/users",
                    init_users_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin)),
                )
                .nest("/students", init_students_router())
                .nest(
                    "/staff",
                    init_staff_router()
                        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
                        .merge(init_staff_me_router().route_layer(
                            middleware::from_fn_with_state(state.clone(), require_staff),
                        )),
                )
                .nest("/classes", init_classes_router())
                .nest("/examinations", init_examinations_router())
                .nest("/library", init_library_router())
                .nest("/calendar", init_calendar_router())
                .nest("/email", init_email_router())
                .nest("/fees", init_fees_router())
                .nest("/timetable", init_timetable_router())
                .nest("/messages", init_messages_router())
                .nest("/integrations", init_integrations_router()),
        )
        .with_state(state.clone())
        .layer({
            let allowed_origins: Vec<HeaderValue> = state
                .cors_config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                    axum::http::HeaderName::from_static("x-api-key"),
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
}
