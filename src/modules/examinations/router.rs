use crate::modules::examinations::controller::{
    add_exam_subject, create_examination, create_grade, create_grading_scale, delete_examination,
    delete_grading_scale, get_exam_subject_grades, get_exam_subjects, get_examination,
    get_examinations, get_grade, get_grading_scales, get_my_grades, update_examination,
    update_grade, update_grading_scale,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

pub fn init_examinations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_examinations).post(create_examination))
        .route(
            "/grading-scales",
            get(get_grading_scales).post(create_grading_scale),
        )
        .route(
            "/grading-scales/{id}",
            put(update_grading_scale).delete(delete_grading_scale),
        )
        .route("/grades/me", get(get_my_grades))
        .route("/grades/{id}", get(get_grade).put(update_grade))
        .route(
            "/subjects/{id}/grades",
            get(get_exam_subject_grades).post(create_grade),
        )
        .route(
            "/{id}",
            get(get_examination)
                .put(update_examination)
                .delete(delete_examination),
        )
        .route(
            "/{id}/subjects",
            get(get_exam_subjects).post(add_exam_subject),
        )
}
