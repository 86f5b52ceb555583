use crate::modules::timetable::controller::{
    create_entry, create_period, create_timetable, delete_entry, delete_timetable, get_entries,
    get_periods, get_timetable, get_timetables, update_period, update_timetable,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, put},
};

pub fn init_timetable_router() -> Router<AppState> {
    Router::new()
        .route("/periods", get(get_periods).post(create_period))
        .route("/periods/{id}", put(update_period))
        .route("/timetables", get(get_timetables).post(create_timetable))
        .route(
            "/timetables/{id}",
            get(get_timetable).put(update_timetable).delete(delete_timetable),
        )
        .route(
            "/timetables/{id}/entries",
            get(get_entries).post(create_entry),
        )
        .route("/entries/{id}", delete(delete_entry))
}
