use crate::modules::messages::controller::{
    archive_message, create_announcement, delete_announcement, get_announcements, get_inbox,
    get_message, get_sent, mark_read, send_message, update_announcement,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_messages_router() -> Router<AppState> {
    Router::new()
        .route("/", post(send_message))
        .route("/inbox", get(get_inbox))
        .route("/sent", get(get_sent))
        .route(
            "/announcements",
            get(get_announcements).post(create_announcement),
        )
        .route(
            "/announcements/{id}",
            put(update_announcement).delete(delete_announcement),
        )
        .route("/{id}", get(get_message))
        .route("/{id}/read", post(mark_read))
        .route("/{id}/archive", post(archive_message))
}
