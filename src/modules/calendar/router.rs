use crate::modules::calendar::controller::{
    add_attendee, create_event, delete_event, get_event, get_event_attendees, get_events,
    remove_attendee, set_my_rsvp, update_event,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, put},
};

pub fn init_calendar_router() -> Router<AppState> {
    Router::new()
        .route("/events", get(get_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route(
            "/events/{id}/attendees",
            get(get_event_attendees).post(add_attendee),
        )
        .route("/events/{id}/attendees/me", put(set_my_rsvp))
        .route("/events/{id}/attendees/{user_id}", delete(remove_attendee))
}
