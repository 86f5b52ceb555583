use crate::modules::classes::controller::{
    create_class, create_subject, delete_class, delete_subject, get_class, get_classes,
    get_subject, get_subjects, update_class, update_subject,
};
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_classes_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_classes).post(create_class))
        .route("/subjects", get(get_subjects).post(create_subject))
        .route(
            "/subjects/{id}",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
        .route(
            "/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
}
