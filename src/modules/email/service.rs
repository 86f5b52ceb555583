use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::modules::email::model::{
    CreateTemplateDto, EMAIL_TYPES, EmailNotification, EmailTemplate, NOTIFICATION_STATUSES,
    NotificationFilterParams, PaginatedNotificationsResponse, SendEmailDto, TemplateFilterParams,
    UpdateTemplateDto,
};
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;

const TEMPLATE_COLUMNS: &str = "id, name, subject, body_html, body_text, email_type, is_active, \
     created_at, updated_at";

const NOTIFICATION_COLUMNS: &str = "id, subject, body, recipient_email, template_id, sender_id, \
     status, error_message, sent_at, created_at, updated_at";

pub struct EmailModuleService;

impl EmailModuleService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "email_templates"))]
    pub async fn get_templates(
        db: &PgPool,
        filters: TemplateFilterParams,
    ) -> Result<Vec<EmailTemplate>, AppError> {
        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(email_type) = &filters.email_type {
            params.push(email_type.clone());
            where_clause.push_str(&format!(" AND email_type = ${}", params.len()));
        }

        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND is_active = {}", is_active));
        }

        let query = format!(
            "SELECT {} FROM email_templates WHERE 1=1{} ORDER BY name",
            TEMPLATE_COLUMNS, where_clause
        );
        let mut sql = sqlx::query_as::<_, EmailTemplate>(&query);
        for param in params {
            sql = sql.bind(param);
        }
        let templates = sql.fetch_all(db).await?;

        Ok(templates)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "email_templates"))]
    pub async fn create_template(
        db: &PgPool,
        dto: CreateTemplateDto,
    ) -> Result<EmailTemplate, AppError> {
        Self::ensure_valid_email_type(&dto.email_type)?;

        let insert_query = format!(
            "INSERT INTO email_templates (name, subject, body_html, body_text, email_type)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            TEMPLATE_COLUMNS
        );
        let template = sqlx::query_as::<_, EmailTemplate>(&insert_query)
            .bind(&dto.name)
            .bind(&dto.subject)
            .bind(&dto.body_html)
            .bind(&dto.body_text)
            .bind(&dto.email_type)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Template with this name already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(template.id = %template.id, template.name = %template.name, "Email template created");

        Ok(template)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "email_templates"))]
    pub async fn get_template(db: &PgPool, id: Uuid) -> Result<EmailTemplate, AppError> {
        let query = format!("SELECT {} FROM email_templates WHERE id = $1", TEMPLATE_COLUMNS);
        sqlx::query_as::<_, EmailTemplate>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Template not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "email_templates"))]
    pub async fn update_template(
        db: &PgPool,
        id: Uuid,
        dto: UpdateTemplateDto,
    ) -> Result<EmailTemplate, AppError> {
        if let Some(email_type) = &dto.email_type {
            Self::ensure_valid_email_type(email_type)?;
        }

        let existing = Self::get_template(db, id).await?;

        let update_query = format!(
            "UPDATE email_templates
                SET name = $2, subject = $3, body_html = $4, body_text = $5,
                    email_type = $6, is_active = $7, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            TEMPLATE_COLUMNS
        );
        let template = sqlx::query_as::<_, EmailTemplate>(&update_query)
            .bind(id)
            .bind(dto.name.unwrap_or(existing.name))
            .bind(dto.subject.unwrap_or(existing.subject))
            .bind(dto.body_html.unwrap_or(existing.body_html))
            .bind(dto.body_text.or(existing.body_text))
            .bind(dto.email_type.unwrap_or(existing.email_type))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Template with this name already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(template.id = %template.id, "Email template updated");

        Ok(template)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "email_templates"))]
    pub async fn delete_template(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Template not found")));
        }

        info!(template.id = %id, "Email template deleted");

        Ok(())
    }

    /// Records one notification row per recipient and hands delivery to a
    /// background task. The first row is returned immediately with status
    /// `pending`; rows flip to `sent` or `failed` as deliveries complete.
    #[instrument(skip(db, mailer, dto), fields(db.operation = "INSERT", db.table = "email_notifications"))]
    pub async fn send_email(
        db: &PgPool,
        mailer: &EmailService,
        dto: SendEmailDto,
        sender_id: Uuid,
    ) -> Result<EmailNotification, AppError> {
        if let Some(template_id) = dto.template_id {
            Self::get_template(db, template_id).await?;
        }

        let insert_query = format!(
            "INSERT INTO email_notifications (subject, body, recipient_email, template_id, sender_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            NOTIFICATION_COLUMNS
        );

        let mut notifications = Vec::with_capacity(dto.to_emails.len());
        for recipient in &dto.to_emails {
            let notification = sqlx::query_as::<_, EmailNotification>(&insert_query)
                .bind(&dto.subject)
                .bind(&dto.body)
                .bind(recipient)
                .bind(dto.template_id)
                .bind(sender_id)
                .fetch_one(db)
                .await?;
            notifications.push(notification);
        }

        let first = notifications
            .first()
            .cloned()
            .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("to_emails must not be empty")))?;

        let pool = db.clone();
        let mailer = mailer.clone();
        let pending = notifications;
        tokio::spawn(async move {
            for notification in pending {
                Self::deliver(&pool, &mailer, notification).await;
            }
        });

        info!(
            count = %dto.to_emails.len(),
            sender.id = %sender_id,
            "Email notifications queued"
        );

        Ok(first)
    }

    /// Attempts one delivery and records the outcome on the row. Errors are
    /// logged, never propagated; this runs detached from any request.
    async fn deliver(db: &PgPool, mailer: &EmailService, notification: EmailNotification) {
        let html = mailer.wrap_html(&notification.subject, &notification.body);
        let outcome = mailer
            .send(
                &notification.recipient_email,
                &notification.subject,
                &notification.body,
                &html,
            )
            .await;

        let result = match outcome {
            Ok(()) => {
                sqlx::query(
                    "UPDATE email_notifications
                        SET status = 'sent', sent_at = $2, updated_at = NOW()
                      WHERE id = $1",
                )
                .bind(notification.id)
                .bind(Utc::now())
                .execute(db)
                .await
            }
            Err(err) => {
                debug!(notification.id = %notification.id, error = %err.error, "Email delivery failed");
                sqlx::query(
                    "UPDATE email_notifications
                        SET status = 'failed', error_message = $2, updated_at = NOW()
                      WHERE id = $1",
                )
                .bind(notification.id)
                .bind(err.error.to_string())
                .execute(db)
                .await
            }
        };

        if let Err(err) = result {
            error!(notification.id = %notification.id, error = %err, "Failed to record delivery outcome");
        }
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "email_notifications"))]
    pub async fn get_notifications(
        db: &PgPool,
        filters: NotificationFilterParams,
    ) -> Result<PaginatedNotificationsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(status) = &filters.status {
            Self::ensure_valid_status(status)?;
            params.push(status.clone());
            where_clause.push_str(&format!(" AND status = ${}", params.len()));
        }

        if let Some(start) = filters.start {
            params.push(start.to_rfc3339());
            where_clause.push_str(&format!(" AND created_at >= ${}::timestamptz", params.len()));
        }

        if let Some(end) = filters.end {
            params.push(end.to_rfc3339());
            where_clause.push_str(&format!(" AND created_at <= ${}::timestamptz", params.len()));
        }

        if let Some(sender_id) = filters.sender_id {
            params.push(sender_id.to_string());
            where_clause.push_str(&format!(" AND sender_id = ${}::uuid", params.len()));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM email_notifications WHERE 1=1{}",
            where_clause
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM email_notifications WHERE 1=1{} ORDER BY created_at DESC LIMIT {} OFFSET {}",
            NOTIFICATION_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, EmailNotification>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let notifications = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %notifications.len(), "Email notifications fetched");

        Ok(PaginatedNotificationsResponse {
            meta: filters.pagination.meta(total),
            data: notifications,
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "email_notifications"))]
    pub async fn get_notification(db: &PgPool, id: Uuid) -> Result<EmailNotification, AppError> {
        let query = format!(
            "SELECT {} FROM email_notifications WHERE id = $1",
            NOTIFICATION_COLUMNS
        );
        sqlx::query_as::<_, EmailNotification>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Notification not found")))
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "email_notifications"))]
    pub async fn delete_notification(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM email_notifications WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Notification not found")));
        }

        info!(notification.id = %id, "Email notification deleted");

        Ok(())
    }

    fn ensure_valid_email_type(email_type: &str) -> Result<(), AppError> {
        if EMAIL_TYPES.contains(&email_type) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "email_type must be one of: {}",
                EMAIL_TYPES.join(", ")
            )))
        }
    }

    fn ensure_valid_status(status: &str) -> Result<(), AppError> {
        if NOTIFICATION_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "status must be one of: {}",
                NOTIFICATION_STATUSES.join(", ")
            )))
        }
    }
}
