use crate::modules::users::controller::{
    assign_role, delete_user, get_roles, get_user, get_users, remove_role, update_user,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users))
        .route("/roles", get(get_roles))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/roles/{role_name}", post(assign_role).delete(remove_role))
}
