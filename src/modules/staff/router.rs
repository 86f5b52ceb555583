use crate::modules::staff::controller::{
    create_staff, delete_staff, get_my_staff, get_staff, get_staff_members, update_staff,
};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Admin-only staff management routes. Gated at the nest site.
pub fn init_staff_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_staff_members).post(create_staff))
        .route(
            "/{id}",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
}

/// The self-service route, open to every staff role.
pub fn init_staff_me_router() -> Router<AppState> {
    Router::new().route("/me", get(get_my_staff))
}
