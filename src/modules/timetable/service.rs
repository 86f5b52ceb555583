use chrono::NaiveTime;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::classes::service::ClassService;
use crate::modules::staff::service::StaffService;
use crate::modules::timetable::model::{
    CreateEntryDto, CreatePeriodDto, CreateTimetableDto, DAYS_OF_WEEK, EntryFilterParams,
    PaginatedTimetablesResponse, Period, PeriodFilterParams, Timetable, TimetableEntry,
    TimetableFilterParams, UpdatePeriodDto, UpdateTimetableDto,
};
use crate::utils::errors::AppError;

const PERIOD_COLUMNS: &str = "id, name, start_time, end_time, is_break, academic_year, \
     is_active, created_at, updated_at";

const TIMETABLE_COLUMNS: &str = "id, name, academic_year, term, class_id, is_active, \
     effective_from, effective_to, created_at, updated_at";

const ENTRY_COLUMNS: &str = "id, timetable_id, period_id, subject_id, teacher_id, day_of_week, \
     room, notes, created_at, updated_at";

pub struct TimetableService;

impl TimetableService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "periods"))]
    pub async fn get_periods(
        db: &PgPool,
        filters: PeriodFilterParams,
    ) -> Result<Vec<Period>, AppError> {
        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND is_active = {}", is_active));
        }

        if let Some(academic_year) = &filters.academic_year {
            params.push(academic_year.clone());
            where_clause.push_str(&format!(" AND academic_year = ${}", params.len()));
        }

        let query = format!(
            "SELECT {} FROM periods WHERE 1=1{} ORDER BY start_time",
            PERIOD_COLUMNS, where_clause
        );
        let mut sql = sqlx::query_as::<_, Period>(&query);
        for param in params {
            sql = sql.bind(param);
        }
        let periods = sql.fetch_all(db).await?;

        Ok(periods)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "periods"))]
    pub async fn create_period(db: &PgPool, dto: CreatePeriodDto) -> Result<Period, AppError> {
        Self::ensure_ordered_times(dto.start_time, dto.end_time)?;

        let insert_query = format!(
            "INSERT INTO periods (name, start_time, end_time, is_break, academic_year)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            PERIOD_COLUMNS
        );
        let period = sqlx::query_as::<_, Period>(&insert_query)
            .bind(&dto.name)
            .bind(dto.start_time)
            .bind(dto.end_time)
            .bind(dto.is_break)
            .bind(&dto.academic_year)
            .fetch_one(db)
            .await?;

        info!(period.id = %period.id, period.name = %period.name, "Period created");

        Ok(period)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "periods"))]
    pub async fn get_period(db: &PgPool, id: Uuid) -> Result<Period, AppError> {
        let query = format!("SELECT {} FROM periods WHERE id = $1", PERIOD_COLUMNS);
        sqlx::query_as::<_, Period>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Period not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "periods"))]
    pub async fn update_period(
        db: &PgPool,
        id: Uuid,
        dto: UpdatePeriodDto,
    ) -> Result<Period, AppError> {
        let existing = Self::get_period(db, id).await?;

        let start_time = dto.start_time.unwrap_or(existing.start_time);
        let end_time = dto.end_time.unwrap_or(existing.end_time);
        Self::ensure_ordered_times(start_time, end_time)?;

        let update_query = format!(
            "UPDATE periods
                SET name = $2, start_time = $3, end_time = $4, is_break = $5,
                    academic_year = $6, is_active = $7, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            PERIOD_COLUMNS
        );
        let period = sqlx::query_as::<_, Period>(&update_query)
            .bind(id)
            .bind(dto.name.unwrap_or(existing.name))
            .bind(start_time)
            .bind(end_time)
            .bind(dto.is_break.unwrap_or(existing.is_break))
            .bind(dto.academic_year.unwrap_or(existing.academic_year))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .fetch_one(db)
            .await?;

        info!(period.id = %period.id, "Period updated");

        Ok(period)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "timetables"))]
    pub async fn get_timetables(
        db: &PgPool,
        filters: TimetableFilterParams,
    ) -> Result<PaginatedTimetablesResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(class_id) = filters.class_id {
            params.push(class_id.to_string());
            where_clause.push_str(&format!(" AND class_id = ${}::uuid", params.len()));
        }

        if let Some(academic_year) = &filters.academic_year {
            params.push(academic_year.clone());
            where_clause.push_str(&format!(" AND academic_year = ${}", params.len()));
        }

        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND is_active = {}", is_active));
        }

        let count_query = format!("SELECT COUNT(*) FROM timetables WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM timetables WHERE 1=1{} ORDER BY name LIMIT {} OFFSET {}",
            TIMETABLE_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Timetable>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let timetables = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %timetables.len(), "Timetables fetched");

        Ok(PaginatedTimetablesResponse {
            meta: filters.pagination.meta(total),
            data: timetables,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "timetables"))]
    pub async fn create_timetable(
        db: &PgPool,
        dto: CreateTimetableDto,
    ) -> Result<Timetable, AppError> {
        ClassService::get_class(db, dto.class_id).await?;

        let insert_query = format!(
            "INSERT INTO timetables (name, academic_year, term, class_id, effective_from, effective_to)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            TIMETABLE_COLUMNS
        );
        let timetable = sqlx::query_as::<_, Timetable>(&insert_query)
            .bind(&dto.name)
            .bind(&dto.academic_year)
            .bind(&dto.term)
            .bind(dto.class_id)
            .bind(dto.effective_from)
            .bind(dto.effective_to)
            .fetch_one(db)
            .await?;

        info!(timetable.id = %timetable.id, timetable.name = %timetable.name, "Timetable created");

        Ok(timetable)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "timetables"))]
    pub async fn get_timetable(db: &PgPool, id: Uuid) -> Result<Timetable, AppError> {
        let query = format!("SELECT {} FROM timetables WHERE id = $1", TIMETABLE_COLUMNS);
        sqlx::query_as::<_, Timetable>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Timetable not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "timetables"))]
    pub async fn update_timetable(
        db: &PgPool,
        id: Uuid,
        dto: UpdateTimetableDto,
    ) -> Result<Timetable, AppError> {
        if let Some(class_id) = dto.class_id {
            ClassService::get_class(db, class_id).await?;
        }

        let existing = Self::get_timetable(db, id).await?;

        let update_query = format!(
            "UPDATE timetables
                SET name = $2, academic_year = $3, term = $4, class_id = $5, is_active = $6,
                    effective_from = $7, effective_to = $8, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            TIMETABLE_COLUMNS
        );
        let timetable = sqlx::query_as::<_, Timetable>(&update_query)
            .bind(id)
            .bind(dto.name.unwrap_or(existing.name))
            .bind(dto.academic_year.unwrap_or(existing.academic_year))
            .bind(dto.term.or(existing.term))
            .bind(dto.class_id.unwrap_or(existing.class_id))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .bind(dto.effective_from.or(existing.effective_from))
            .bind(dto.effective_to.or(existing.effective_to))
            .fetch_one(db)
            .await?;

        info!(timetable.id = %timetable.id, "Timetable updated");

        Ok(timetable)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "timetables"))]
    pub async fn delete_timetable(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM timetables WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Timetable not found")));
        }

        info!(timetable.id = %id, "Timetable deleted");

        Ok(())
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "timetable_entries"))]
    pub async fn get_entries(
        db: &PgPool,
        timetable_id: Uuid,
        filters: EntryFilterParams,
    ) -> Result<Vec<TimetableEntry>, AppError> {
        Self::get_timetable(db, timetable_id).await?;

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(day_of_week) = &filters.day_of_week {
            Self::ensure_valid_day(day_of_week)?;
            params.push(day_of_week.clone());
            where_clause.push_str(&format!(" AND e.day_of_week = ${}", params.len() + 1));
        }

        // Entries come back in reading order: weekday, then period start.
        let query = format!(
            "SELECT e.id, e.timetable_id, e.period_id, e.subject_id, e.teacher_id,
                    e.day_of_week, e.room, e.notes, e.created_at, e.updated_at
               FROM timetable_entries e
               JOIN periods p ON p.id = e.period_id
              WHERE e.timetable_id = $1{}
              ORDER BY array_position(ARRAY['monday','tuesday','wednesday','thursday','friday','saturday','sunday'], e.day_of_week),
                       p.start_time",
            where_clause
        );
        let mut sql = sqlx::query_as::<_, TimetableEntry>(&query).bind(timetable_id);
        for param in params {
            sql = sql.bind(param);
        }
        let entries = sql.fetch_all(db).await?;

        Ok(entries)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "timetable_entries"))]
    pub async fn create_entry(
        db: &PgPool,
        timetable_id: Uuid,
        dto: CreateEntryDto,
    ) -> Result<TimetableEntry, AppError> {
        Self::ensure_valid_day(&dto.day_of_week)?;
        Self::get_timetable(db, timetable_id).await?;
        Self::get_period(db, dto.period_id).await?;
        if let Some(subject_id) = dto.subject_id {
            ClassService::get_subject(db, subject_id).await?;
        }
        if let Some(teacher_id) = dto.teacher_id {
            StaffService::get_staff(db, teacher_id).await?;
        }

        let insert_query = format!(
            "INSERT INTO timetable_entries (timetable_id, period_id, subject_id, teacher_id,
                                            day_of_week, room, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            ENTRY_COLUMNS
        );
        let entry = sqlx::query_as::<_, TimetableEntry>(&insert_query)
            .bind(timetable_id)
            .bind(dto.period_id)
            .bind(dto.subject_id)
            .bind(dto.teacher_id)
            .bind(&dto.day_of_week)
            .bind(&dto.room)
            .bind(&dto.notes)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Timetable slot is already occupied"
                    ));
                }
                AppError::from(e)
            })?;

        info!(
            entry.id = %entry.id,
            timetable.id = %timetable_id,
            day = %entry.day_of_week,
            "Timetable entry created"
        );

        Ok(entry)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "timetable_entries"))]
    pub async fn delete_entry(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM timetable_entries WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "Timetable entry not found"
            )));
        }

        info!(entry.id = %id, "Timetable entry deleted");

        Ok(())
    }

    fn ensure_ordered_times(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
        if end > start {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "end_time must be after start_time"
            )))
        }
    }

    fn ensure_valid_day(day: &str) -> Result<(), AppError> {
        if DAYS_OF_WEEK.contains(&day) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "day_of_week must be one of: {}",
                DAYS_OF_WEEK.join(", ")
            )))
        }
    }
}
