use crate::modules::students::controller::{
    create_parent, create_report, create_student, delete_student, get_my_reports, get_my_student,
    get_parent, get_student, get_student_parents, get_student_reports, get_students, link_parent,
    publish_report, unlink_parent, update_parent, update_report, update_student,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_students).post(create_student))
        .route("/me", get(get_my_student))
        .route("/parents", post(create_parent))
        .route("/parents/{id}", get(get_parent).put(update_parent))
        .route("/performance-reports", post(create_report))
        .route("/performance-reports/me", get(get_my_reports))
        .route("/performance-reports/{id}", put(update_report))
        .route("/performance-reports/{id}/publish", post(publish_report))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/{id}/parents", get(get_student_parents))
        .route(
            "/{id}/parents/{parent_id}",
            post(link_parent).delete(unlink_parent),
        )
        .route("/{id}/performance-reports", get(get_student_reports))
}
