use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::calendar::model::{
    AddAttendeeDto, CalendarEvent, CreateEventDto, EventAttendee, EventFilterParams,
    PaginatedEventsResponse, RsvpDto, UpdateEventDto,
};
use crate::modules::calendar::service::CalendarService;
use crate::modules::users::model::system_roles::slugs;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

fn ensure_admin_or_creator(auth_user: &AuthUser, event: &CalendarEvent) -> Result<(), AppError> {
    if auth_user.has_role(slugs::ADMIN) || event.creator_id == auth_user.user_id()? {
        Ok(())
    } else {
        Err(AppError::forbidden("Insufficient permissions".to_string()))
    }
}

fn ensure_event_visible(auth_user: &AuthUser, event: &CalendarEvent) -> Result<(), AppError> {
    if event.is_public {
        return Ok(());
    }
    ensure_admin_or_creator(auth_user, event)
}

/// List calendar events
///
/// Non-admins see public events plus those they created.
#[utoipa::path(
    get,
    path = "/api/calendar/events",
    params(
        ("event_type" = Option<String>, Query, description = "Filter by event type"),
        ("start" = Option<String>, Query, description = "Only events ending at or after this instant (RFC 3339)"),
        ("end" = Option<String>, Query, description = "Only events starting at or before this instant (RFC 3339)"),
        ("class_id" = Option<Uuid>, Query, description = "Filter by class"),
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Paginated events", body = PaginatedEventsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_events(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<EventFilterParams>,
) -> Result<Json<PaginatedEventsResponse>, AppError> {
    let viewer = if auth_user.has_role(slugs::ADMIN) {
        None
    } else {
        Some(auth_user.user_id()?)
    };
    let events = CalendarService::get_events(&state.db, filters, viewer).await?;
    Ok(Json(events))
}

/// Create a calendar event
#[utoipa::path(
    post,
    path = "/api/calendar/events",
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created", body = CalendarEvent),
        (status = 404, description = "Class not found", body = ErrorResponse),
        (status = 422, description = "Invalid times or event type", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateEventDto>,
) -> Result<(StatusCode, Json<CalendarEvent>), AppError> {
    let event = CalendarService::create_event(&state.db, dto, auth_user.user_id()?).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Get a calendar event by ID
#[utoipa::path(
    get,
    path = "/api/calendar/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = CalendarEvent),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CalendarEvent>, AppError> {
    let event = CalendarService::get_event(&state.db, id).await?;
    ensure_event_visible(&auth_user, &event)?;
    Ok(Json(event))
}

/// Update a calendar event
#[utoipa::path(
    put,
    path = "/api/calendar/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = CalendarEvent),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateEventDto>,
) -> Result<Json<CalendarEvent>, AppError> {
    let event = CalendarService::get_event(&state.db, id).await?;
    ensure_admin_or_creator(&auth_user, &event)?;
    let updated = CalendarService::update_event(&state.db, id, dto).await?;
    Ok(Json(updated))
}

/// Delete a calendar event
#[utoipa::path(
    delete,
    path = "/api/calendar/events/{id}",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let event = CalendarService::get_event(&state.db, id).await?;
    ensure_admin_or_creator(&auth_user, &event)?;
    CalendarService::delete_event(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List an event's attendees
#[utoipa::path(
    get,
    path = "/api/calendar/events/{id}/attendees",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Attendees", body = Vec<EventAttendee>),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_event_attendees(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<EventAttendee>>, AppError> {
    let event = CalendarService::get_event(&state.db, id).await?;
    ensure_event_visible(&auth_user, &event)?;
    let attendees = CalendarService::get_event_attendees(&state.db, id).await?;
    Ok(Json(attendees))
}

/// Add an attendee to an event
///
/// Admins and the creator may add anyone; other users may add themselves
/// to public events.
#[utoipa::path(
    post,
    path = "/api/calendar/events/{id}/attendees",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = AddAttendeeDto,
    responses(
        (status = 201, description = "Attendee added", body = EventAttendee),
        (status = 400, description = "User is already an attendee of this event", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Event or user not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn add_attendee(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AddAttendeeDto>,
) -> Result<(StatusCode, Json<EventAttendee>), AppError> {
    let event = CalendarService::get_event(&state.db, id).await?;
    if ensure_admin_or_creator(&auth_user, &event).is_err()
        && !(event.is_public && dto.user_id == auth_user.user_id()?)
    {
        return Err(AppError::forbidden("Insufficient permissions".to_string()));
    }
    let attendee = CalendarService::add_attendee(&state.db, id, dto.user_id).await?;
    Ok((StatusCode::CREATED, Json(attendee)))
}

/// Set the current user's RSVP for an event
#[utoipa::path(
    put,
    path = "/api/calendar/events/{id}/attendees/me",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = RsvpDto,
    responses(
        (status = 200, description = "RSVP updated", body = EventAttendee),
        (status = 404, description = "Not an attendee of this event", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn set_my_rsvp(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<RsvpDto>,
) -> Result<Json<EventAttendee>, AppError> {
    let attendee =
        CalendarService::set_rsvp(&state.db, id, auth_user.user_id()?, &dto.status).await?;
    Ok(Json(attendee))
}

/// Remove an attendee from an event
#[utoipa::path(
    delete,
    path = "/api/calendar/events/{id}/attendees/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Event ID"),
        ("user_id" = Uuid, Path, description = "Attendee's user ID")
    ),
    responses(
        (status = 204, description = "Attendee removed"),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse),
        (status = 404, description = "Event or attendee not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Calendar"
)]
#[instrument(skip(state, auth_user))]
pub async fn remove_attendee(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let event = CalendarService::get_event(&state.db, id).await?;
    if ensure_admin_or_creator(&auth_user, &event).is_err() && user_id != auth_user.user_id()? {
        return Err(AppError::forbidden("Insufficient permissions".to_string()));
    }
    CalendarService::remove_attendee(&state.db, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
