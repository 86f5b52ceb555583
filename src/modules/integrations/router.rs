use crate::modules::integrations::controller::{
    create_application, create_key, delete_application, get_application, get_applications,
    get_keys, revoke_key, update_application, whoami,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get},
};

pub fn init_integrations_router() -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            get(get_applications).post(create_application),
        )
        .route(
            "/applications/{id}",
            get(get_application)
                .put(update_application)
                .delete(delete_application),
        )
        .route("/applications/{id}/keys", get(get_keys).post(create_key))
        .route("/keys/{id}", delete(revoke_key))
        .route("/whoami", get(whoami))
}
