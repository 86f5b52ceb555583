use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::calendar::model::{
    ATTENDEE_STATUSES, CalendarEvent, CreateEventDto, EVENT_TYPES, EventAttendee,
    EventFilterParams, PaginatedEventsResponse, UpdateEventDto,
};
use crate::utils::errors::AppError;

const EVENT_COLUMNS: &str = "id, title, description, event_type, start_time, end_time, all_day, \
     location, is_public, creator_id, class_id, created_at, updated_at";

const ATTENDEE_COLUMNS: &str = "id, event_id, user_id, status, created_at, updated_at";

pub struct CalendarService;

impl CalendarService {
    /// Lists events. A `viewer` restricts the result to public events plus
    /// that user's own; admins pass `None` and see everything.
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "calendar_events"))]
    pub async fn get_events(
        db: &PgPool,
        filters: EventFilterParams,
        viewer: Option<Uuid>,
    ) -> Result<PaginatedEventsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(event_type) = &filters.event_type {
            params.push(event_type.clone());
            where_clause.push_str(&format!(" AND event_type = ${}", params.len()));
        }

        if let Some(start) = filters.start {
            params.push(start.to_rfc3339());
            where_clause.push_str(&format!(" AND end_time >= ${}::timestamptz", params.len()));
        }

        if let Some(end) = filters.end {
            params.push(end.to_rfc3339());
            where_clause.push_str(&format!(" AND start_time <= ${}::timestamptz", params.len()));
        }

        if let Some(class_id) = filters.class_id {
            params.push(class_id.to_string());
            where_clause.push_str(&format!(" AND class_id = ${}::uuid", params.len()));
        }

        if let Some(viewer) = viewer {
            params.push(viewer.to_string());
            where_clause.push_str(&format!(
                " AND (is_public = TRUE OR creator_id = ${}::uuid)",
                params.len()
            ));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM calendar_events WHERE 1=1{}",
            where_clause
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM calendar_events WHERE 1=1{} ORDER BY start_time LIMIT {} OFFSET {}",
            EVENT_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, CalendarEvent>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let events = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %events.len(), "Calendar events fetched");

        Ok(PaginatedEventsResponse {
            meta: filters.pagination.meta(total),
            data: events,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "calendar_events"))]
    pub async fn create_event(
        db: &PgPool,
        dto: CreateEventDto,
        creator_id: Uuid,
    ) -> Result<CalendarEvent, AppError> {
        Self::ensure_valid_event_type(&dto.event_type)?;
        if dto.end_time < dto.start_time {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "end_time must not be before start_time"
            )));
        }
        if let Some(class_id) = dto.class_id {
            Self::ensure_class_exists(db, class_id).await?;
        }

        let insert_query = format!(
            "INSERT INTO calendar_events (title, description, event_type, start_time, end_time,
                                          all_day, location, is_public, creator_id, class_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            EVENT_COLUMNS
        );
        let event = sqlx::query_as::<_, CalendarEvent>(&insert_query)
            .bind(&dto.title)
            .bind(&dto.description)
            .bind(&dto.event_type)
            .bind(dto.start_time)
            .bind(dto.end_time)
            .bind(dto.all_day)
            .bind(&dto.location)
            .bind(dto.is_public)
            .bind(creator_id)
            .bind(dto.class_id)
            .fetch_one(db)
            .await?;

        info!(event.id = %event.id, event.title = %event.title, "Calendar event created");

        Ok(event)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "calendar_events"))]
    pub async fn get_event(db: &PgPool, id: Uuid) -> Result<CalendarEvent, AppError> {
        let query = format!("SELECT {} FROM calendar_events WHERE id = $1", EVENT_COLUMNS);
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Event not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "calendar_events"))]
    pub async fn update_event(
        db: &PgPool,
        id: Uuid,
        dto: UpdateEventDto,
    ) -> Result<CalendarEvent, AppError> {
        if let Some(event_type) = &dto.event_type {
            Self::ensure_valid_event_type(event_type)?;
        }
        if let Some(class_id) = dto.class_id {
            Self::ensure_class_exists(db, class_id).await?;
        }

        let existing = Self::get_event(db, id).await?;

        let start_time = dto.start_time.unwrap_or(existing.start_time);
        let end_time = dto.end_time.unwrap_or(existing.end_time);
        if end_time < start_time {
            return Err(AppError::unprocessable(anyhow::anyhow!(
                "end_time must not be before start_time"
            )));
        }

        let update_query = format!(
            "UPDATE calendar_events
                SET title = $2, description = $3, event_type = $4, start_time = $5,
                    end_time = $6, all_day = $7, location = $8, is_public = $9,
                    class_id = $10, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            EVENT_COLUMNS
        );
        let event = sqlx::query_as::<_, CalendarEvent>(&update_query)
            .bind(id)
            .bind(dto.title.unwrap_or(existing.title))
            .bind(dto.description.or(existing.description))
            .bind(dto.event_type.unwrap_or(existing.event_type))
            .bind(start_time)
            .bind(end_time)
            .bind(dto.all_day.unwrap_or(existing.all_day))
            .bind(dto.location.or(existing.location))
            .bind(dto.is_public.unwrap_or(existing.is_public))
            .bind(dto.class_id.or(existing.class_id))
            .fetch_one(db)
            .await?;

        info!(event.id = %event.id, "Calendar event updated");

        Ok(event)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "calendar_events"))]
    pub async fn delete_event(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Event not found")));
        }

        info!(event.id = %id, "Calendar event deleted");

        Ok(())
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "calendar_event_attendees"))]
    pub async fn get_event_attendees(
        db: &PgPool,
        event_id: Uuid,
    ) -> Result<Vec<EventAttendee>, AppError> {
        let query = format!(
            "SELECT {} FROM calendar_event_attendees WHERE event_id = $1 ORDER BY created_at",
            ATTENDEE_COLUMNS
        );
        let attendees = sqlx::query_as::<_, EventAttendee>(&query)
            .bind(event_id)
            .fetch_all(db)
            .await?;

        Ok(attendees)
    }

    #[instrument(skip(db), fields(db.operation = "INSERT", db.table = "calendar_event_attendees"))]
    pub async fn add_attendee(
        db: &PgPool,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<EventAttendee, AppError> {
        let user_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?;
        if user_exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        let insert_query = format!(
            "INSERT INTO calendar_event_attendees (event_id, user_id) VALUES ($1, $2) RETURNING {}",
            ATTENDEE_COLUMNS
        );
        let attendee = sqlx::query_as::<_, EventAttendee>(&insert_query)
            .bind(event_id)
            .bind(user_id)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "User is already an attendee of this event"
                    ));
                }
                AppError::from(e)
            })?;

        info!(event.id = %event_id, user.id = %user_id, "Attendee added");

        Ok(attendee)
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "calendar_event_attendees"))]
    pub async fn set_rsvp(
        db: &PgPool,
        event_id: Uuid,
        user_id: Uuid,
        status: &str,
    ) -> Result<EventAttendee, AppError> {
        Self::ensure_valid_attendee_status(status)?;

        let update_query = format!(
            "UPDATE calendar_event_attendees
                SET status = $3, updated_at = NOW()
              WHERE event_id = $1 AND user_id = $2
              RETURNING {}",
            ATTENDEE_COLUMNS
        );
        let attendee = sqlx::query_as::<_, EventAttendee>(&update_query)
            .bind(event_id)
            .bind(user_id)
            .bind(status)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!("User is not an attendee of this event"))
            })?;

        info!(event.id = %event_id, user.id = %user_id, rsvp = %status, "RSVP updated");

        Ok(attendee)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "calendar_event_attendees"))]
    pub async fn remove_attendee(db: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM calendar_event_attendees WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "User is not an attendee of this event"
            )));
        }

        info!(event.id = %event_id, user.id = %user_id, "Attendee removed");

        Ok(())
    }

    async fn ensure_class_exists(db: &PgPool, class_id: Uuid) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM classes WHERE id = $1")
            .bind(class_id)
            .fetch_optional(db)
            .await?;
        if exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("Class not found")));
        }
        Ok(())
    }

    fn ensure_valid_event_type(event_type: &str) -> Result<(), AppError> {
        if EVENT_TYPES.contains(&event_type) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "event_type must be one of: {}",
                EVENT_TYPES.join(", ")
            )))
        }
    }

    fn ensure_valid_attendee_status(status: &str) -> Result<(), AppError> {
        if ATTENDEE_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "status must be one of: {}",
                ATTENDEE_STATUSES.join(", ")
            )))
        }
    }
}
