use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::email::controller::{
    create_template, delete_notification, delete_template, get_notification, get_notifications,
    get_template, get_templates, send_email, update_template,
};
use crate::state::AppState;

pub fn init_email_router() -> Router<AppState> {
    Router::new()
        .route("/templates", get(get_templates).post(create_template))
        .route(
            "/templates/{id}",
            get(get_template).put(update_template).delete(delete_template),
        )
        .route("/send", post(send_email))
        .route("/notifications", get(get_notifications))
        .route(
            "/notifications/{id}",
            get(get_notification).delete(delete_notification),
        )
}
