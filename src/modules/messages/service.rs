use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::classes::service::ClassService;
use crate::modules::messages::model::{
    Announcement, AnnouncementFilterParams, CreateAnnouncementDto, InboxFilterParams,
    InboxMessage, MESSAGE_TYPES, Message, MessageRecipient, PaginatedInboxResponse,
    PaginatedMessagesResponse, RECIPIENT_STATUSES, SendMessageDto, TARGET_AUDIENCES,
    UpdateAnnouncementDto,
};
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationParams;

const MESSAGE_COLUMNS: &str = "id, subject, content, message_type, is_system_generated, \
     sender_id, created_at, updated_at";

const RECIPIENT_COLUMNS: &str = "id, message_id, recipient_id, status, read_at, \
     created_at, updated_at";

const ANNOUNCEMENT_COLUMNS: &str = "id, title, content, target_audience, is_active, is_pinned, \
     publish_date, expiry_date, creator_id, class_id, created_at, updated_at";

pub struct MessageService;

impl MessageService {
    /// Creates the message and one recipient row per distinct target inside a
    /// single transaction.
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "messages"))]
    pub async fn send_message(
        db: &PgPool,
        dto: SendMessageDto,
        sender_id: Uuid,
    ) -> Result<Message, AppError> {
        Self::ensure_valid_message_type(&dto.message_type)?;

        let mut recipient_ids = dto.recipient_ids.clone();
        recipient_ids.sort_unstable();
        recipient_ids.dedup();

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ANY($1)")
            .bind(&recipient_ids)
            .fetch_one(db)
            .await?;
        if existing != recipient_ids.len() as i64 {
            return Err(AppError::not_found(anyhow::anyhow!(
                "One or more recipients not found"
            )));
        }

        let mut tx = db.begin().await?;

        let insert_query = format!(
            "INSERT INTO messages (subject, content, message_type, sender_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            MESSAGE_COLUMNS
        );
        let message = sqlx::query_as::<_, Message>(&insert_query)
            .bind(&dto.subject)
            .bind(&dto.content)
            .bind(&dto.message_type)
            .bind(sender_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO message_recipients (message_id, recipient_id)
             SELECT $1, unnest($2::uuid[])",
        )
        .bind(message.id)
        .bind(&recipient_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            message.id = %message.id,
            sender.id = %sender_id,
            recipients = %recipient_ids.len(),
            "Message sent"
        );

        Ok(message)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "message_recipients"))]
    pub async fn get_inbox(
        db: &PgPool,
        user_id: Uuid,
        filters: InboxFilterParams,
    ) -> Result<PaginatedInboxResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(status) = &filters.status {
            Self::ensure_valid_recipient_status(status)?;
            params.push(status.clone());
            where_clause.push_str(&format!(" AND r.status = ${}", params.len() + 1));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM message_recipients r WHERE r.recipient_id = $1{}",
            where_clause
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(user_id);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT m.id, m.subject, m.content, m.message_type, m.is_system_generated,
                    m.sender_id, r.status, r.read_at, m.created_at, m.updated_at
               FROM message_recipients r
               JOIN messages m ON m.id = r.message_id
              WHERE r.recipient_id = $1{}
              ORDER BY m.created_at DESC LIMIT {} OFFSET {}",
            where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, InboxMessage>(&data_query).bind(user_id);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let messages = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %messages.len(), "Inbox fetched");

        Ok(PaginatedInboxResponse {
            meta: filters.pagination.meta(total),
            data: messages,
        })
    }

    #[instrument(skip(db, pagination), fields(db.operation = "SELECT", db.table = "messages"))]
    pub async fn get_sent(
        db: &PgPool,
        user_id: Uuid,
        pagination: PaginationParams,
    ) -> Result<PaginatedMessagesResponse, AppError> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE sender_id = $1")
                .bind(user_id)
                .fetch_one(db)
                .await?;

        let data_query = format!(
            "SELECT {} FROM messages WHERE sender_id = $1
             ORDER BY created_at DESC LIMIT {} OFFSET {}",
            MESSAGE_COLUMNS,
            pagination.limit(),
            pagination.offset()
        );
        let messages = sqlx::query_as::<_, Message>(&data_query)
            .bind(user_id)
            .fetch_all(db)
            .await?;

        Ok(PaginatedMessagesResponse {
            meta: pagination.meta(total),
            data: messages,
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "messages"))]
    pub async fn get_message(db: &PgPool, id: Uuid) -> Result<Message, AppError> {
        let query = format!("SELECT {} FROM messages WHERE id = $1", MESSAGE_COLUMNS);
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Message not found")))
    }

    /// The caller's recipient row for a message, if they are a recipient.
    pub async fn recipient_row(
        db: &PgPool,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MessageRecipient>, AppError> {
        let query = format!(
            "SELECT {} FROM message_recipients WHERE message_id = $1 AND recipient_id = $2",
            RECIPIENT_COLUMNS
        );
        let row = sqlx::query_as::<_, MessageRecipient>(&query)
            .bind(message_id)
            .bind(user_id)
            .fetch_optional(db)
            .await?;

        Ok(row)
    }

    /// Marks the caller's copy read. The first read instant is preserved on
    /// repeat calls.
    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "message_recipients"))]
    pub async fn mark_read(
        db: &PgPool,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<MessageRecipient, AppError> {
        let update_query = format!(
            "UPDATE message_recipients
                SET status = 'read', read_at = COALESCE(read_at, $3), updated_at = NOW()
              WHERE message_id = $1 AND recipient_id = $2
              RETURNING {}",
            RECIPIENT_COLUMNS
        );
        sqlx::query_as::<_, MessageRecipient>(&update_query)
            .bind(message_id)
            .bind(user_id)
            .bind(Utc::now())
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Message not found")))
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "message_recipients"))]
    pub async fn archive(
        db: &PgPool,
        message_id: Uuid,
        user_id: Uuid,
    ) -> Result<MessageRecipient, AppError> {
        let update_query = format!(
            "UPDATE message_recipients
                SET status = 'archived', updated_at = NOW()
              WHERE message_id = $1 AND recipient_id = $2
              RETURNING {}",
            RECIPIENT_COLUMNS
        );
        sqlx::query_as::<_, MessageRecipient>(&update_query)
            .bind(message_id)
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Message not found")))
    }

    /// Active, unexpired announcements by default; `include_all` lifts the
    /// filter for admin callers.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "announcements"))]
    pub async fn get_announcements(
        db: &PgPool,
        include_all: bool,
    ) -> Result<Vec<Announcement>, AppError> {
        let where_clause = if include_all {
            ""
        } else {
            " AND is_active = TRUE AND (expiry_date IS NULL OR expiry_date > NOW())"
        };

        let query = format!(
            "SELECT {} FROM announcements WHERE 1=1{}
             ORDER BY is_pinned DESC, publish_date DESC",
            ANNOUNCEMENT_COLUMNS, where_clause
        );
        let announcements = sqlx::query_as::<_, Announcement>(&query).fetch_all(db).await?;

        Ok(announcements)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "announcements"))]
    pub async fn create_announcement(
        db: &PgPool,
        dto: CreateAnnouncementDto,
        creator_id: Uuid,
    ) -> Result<Announcement, AppError> {
        Self::ensure_valid_target_audience(&dto.target_audience)?;
        if let Some(class_id) = dto.class_id {
            ClassService::get_class(db, class_id).await?;
        }

        let insert_query = format!(
            "INSERT INTO announcements (title, content, target_audience, is_pinned,
                                        publish_date, expiry_date, creator_id, class_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            ANNOUNCEMENT_COLUMNS
        );
        let announcement = sqlx::query_as::<_, Announcement>(&insert_query)
            .bind(&dto.title)
            .bind(&dto.content)
            .bind(&dto.target_audience)
            .bind(dto.is_pinned)
            .bind(dto.publish_date.unwrap_or_else(Utc::now))
            .bind(dto.expiry_date)
            .bind(creator_id)
            .bind(dto.class_id)
            .fetch_one(db)
            .await?;

        info!(
            announcement.id = %announcement.id,
            announcement.title = %announcement.title,
            "Announcement created"
        );

        Ok(announcement)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "announcements"))]
    pub async fn get_announcement(db: &PgPool, id: Uuid) -> Result<Announcement, AppError> {
        let query = format!("SELECT {} FROM announcements WHERE id = $1", ANNOUNCEMENT_COLUMNS);
        sqlx::query_as::<_, Announcement>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Announcement not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "announcements"))]
    pub async fn update_announcement(
        db: &PgPool,
        id: Uuid,
        dto: UpdateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        if let Some(target_audience) = &dto.target_audience {
            Self::ensure_valid_target_audience(target_audience)?;
        }
        if let Some(class_id) = dto.class_id {
            ClassService::get_class(db, class_id).await?;
        }

        let existing = Self::get_announcement(db, id).await?;

        let update_query = format!(
            "UPDATE announcements
                SET title = $2, content = $3, target_audience = $4, is_active = $5,
                    is_pinned = $6, publish_date = $7, expiry_date = $8, class_id = $9,
                    updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            ANNOUNCEMENT_COLUMNS
        );
        let announcement = sqlx::query_as::<_, Announcement>(&update_query)
            .bind(id)
            .bind(dto.title.unwrap_or(existing.title))
            .bind(dto.content.unwrap_or(existing.content))
            .bind(dto.target_audience.unwrap_or(existing.target_audience))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .bind(dto.is_pinned.unwrap_or(existing.is_pinned))
            .bind(dto.publish_date.unwrap_or(existing.publish_date))
            .bind(dto.expiry_date.or(existing.expiry_date))
            .bind(dto.class_id.or(existing.class_id))
            .fetch_one(db)
            .await?;

        info!(announcement.id = %announcement.id, "Announcement updated");

        Ok(announcement)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "announcements"))]
    pub async fn delete_announcement(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Announcement not found")));
        }

        info!(announcement.id = %id, "Announcement deleted");

        Ok(())
    }

    fn ensure_valid_message_type(message_type: &str) -> Result<(), AppError> {
        if MESSAGE_TYPES.contains(&message_type) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "message_type must be one of: {}",
                MESSAGE_TYPES.join(", ")
            )))
        }
    }

    fn ensure_valid_recipient_status(status: &str) -> Result<(), AppError> {
        if RECIPIENT_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "status must be one of: {}",
                RECIPIENT_STATUSES.join(", ")
            )))
        }
    }

    fn ensure_valid_target_audience(audience: &str) -> Result<(), AppError> {
        if TARGET_AUDIENCES.contains(&audience) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "target_audience must be one of: {}",
                TARGET_AUDIENCES.join(", ")
            )))
        }
    }
}
