use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::modules::classes::service::ClassService;
use crate::modules::fees::model::{
    CreateFeeCategoryDto, CreateFeeDueDateDto, CreateFeeStructureDto, CreateFeeTransactionDto,
    FeeCategory, FeeCategoryFilterParams, FeeDueDate, FeeStructure, FeeStructureFilterParams,
    FeeTransaction, FeeTransactionFilterParams, PAYMENT_METHODS, PAYMENT_STATUSES,
    PaginatedFeeStructuresResponse, PaginatedFeeTransactionsResponse, UpdateFeeCategoryDto,
    UpdateFeeStructureDto,
};
use crate::modules::students::service::StudentService;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationParams;

const CATEGORY_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

const STRUCTURE_COLUMNS: &str = "id, title, description, amount, academic_year, term, \
     is_recurring, recurrence_period, is_optional, is_active, category_id, class_id, \
     created_at, updated_at";

const DUE_DATE_COLUMNS: &str = "id, fee_structure_id, due_date, grace_period_days, \
     penalty_percentage, created_at, updated_at";

const TRANSACTION_COLUMNS: &str = "id, fee_structure_id, student_id, amount_paid, \
     transaction_date, payment_method, payment_status, transaction_reference, notes, \
     collected_by_id, created_at, updated_at";

pub struct FeeService;

impl FeeService {
    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "fee_categories"))]
    pub async fn get_categories(
        db: &PgPool,
        filters: FeeCategoryFilterParams,
    ) -> Result<Vec<FeeCategory>, AppError> {
        let mut where_clause = String::new();
        if let Some(is_active) = filters.is_active {
            where_clause.push_str(&format!(" AND is_active = {}", is_active));
        }

        let query = format!(
            "SELECT {} FROM fee_categories WHERE 1=1{} ORDER BY name",
            CATEGORY_COLUMNS, where_clause
        );
        let categories = sqlx::query_as::<_, FeeCategory>(&query).fetch_all(db).await?;

        Ok(categories)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "fee_categories"))]
    pub async fn create_category(
        db: &PgPool,
        dto: CreateFeeCategoryDto,
    ) -> Result<FeeCategory, AppError> {
        let insert_query = format!(
            "INSERT INTO fee_categories (name, description) VALUES ($1, $2) RETURNING {}",
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, FeeCategory>(&insert_query)
            .bind(&dto.name)
            .bind(&dto.description)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Fee category with this name already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(category.id = %category.id, category.name = %category.name, "Fee category created");

        Ok(category)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "fee_categories"))]
    pub async fn get_category(db: &PgPool, id: Uuid) -> Result<FeeCategory, AppError> {
        let query = format!("SELECT {} FROM fee_categories WHERE id = $1", CATEGORY_COLUMNS);
        sqlx::query_as::<_, FeeCategory>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Fee category not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "fee_categories"))]
    pub async fn update_category(
        db: &PgPool,
        id: Uuid,
        dto: UpdateFeeCategoryDto,
    ) -> Result<FeeCategory, AppError> {
        let existing = Self::get_category(db, id).await?;

        let update_query = format!(
            "UPDATE fee_categories
                SET name = $2, description = $3, is_active = $4, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, FeeCategory>(&update_query)
            .bind(id)
            .bind(dto.name.unwrap_or(existing.name))
            .bind(dto.description.or(existing.description))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Fee category with this name already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(category.id = %category.id, "Fee category updated");

        Ok(category)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "fee_structures"))]
    pub async fn get_structures(
        db: &PgPool,
        filters: FeeStructureFilterParams,
    ) -> Result<PaginatedFeeStructuresResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(category_id) = filters.category_id {
            params.push(category_id.to_string());
            where_clause.push_str(&format!(" AND category_id = ${}::uuid", params.len()));
        }

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

        let count_query = format!("SELECT COUNT(*) FROM fee_structures WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM fee_structures WHERE 1=1{} ORDER BY title LIMIT {} OFFSET {}",
            STRUCTURE_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, FeeStructure>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let structures = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %structures.len(), "Fee structures fetched");

        Ok(PaginatedFeeStructuresResponse {
            meta: filters.pagination.meta(total),
            data: structures,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "fee_structures"))]
    pub async fn create_structure(
        db: &PgPool,
        dto: CreateFeeStructureDto,
    ) -> Result<FeeStructure, AppError> {
        Self::get_category(db, dto.category_id).await?;
        if let Some(class_id) = dto.class_id {
            ClassService::get_class(db, class_id).await?;
        }

        let insert_query = format!(
            "INSERT INTO fee_structures (title, description, amount, academic_year, term,
                                         is_recurring, recurrence_period, is_optional,
                                         category_id, class_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            STRUCTURE_COLUMNS
        );
        let structure = sqlx::query_as::<_, FeeStructure>(&insert_query)
            .bind(&dto.title)
            .bind(&dto.description)
            .bind(dto.amount)
            .bind(&dto.academic_year)
            .bind(&dto.term)
            .bind(dto.is_recurring)
            .bind(&dto.recurrence_period)
            .bind(dto.is_optional)
            .bind(dto.category_id)
            .bind(dto.class_id)
            .fetch_one(db)
            .await?;

        info!(structure.id = %structure.id, structure.title = %structure.title, "Fee structure created");

        Ok(structure)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "fee_structures"))]
    pub async fn get_structure(db: &PgPool, id: Uuid) -> Result<FeeStructure, AppError> {
        let query = format!("SELECT {} FROM fee_structures WHERE id = $1", STRUCTURE_COLUMNS);
        sqlx::query_as::<_, FeeStructure>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Fee structure not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "fee_structures"))]
    pub async fn update_structure(
        db: &PgPool,
        id: Uuid,
        dto: UpdateFeeStructureDto,
    ) -> Result<FeeStructure, AppError> {
        if let Some(category_id) = dto.category_id {
            Self::get_category(db, category_id).await?;
        }
        if let Some(class_id) = dto.class_id {
            ClassService::get_class(db, class_id).await?;
        }

        let existing = Self::get_structure(db, id).await?;

        let update_query = format!(
            "UPDATE fee_structures
                SET title = $2, description = $3, amount = $4, academic_year = $5, term = $6,
                    is_recurring = $7, recurrence_period = $8, is_optional = $9, is_active = $10,
                    category_id = $11, class_id = $12, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            STRUCTURE_COLUMNS
        );
        let structure = sqlx::query_as::<_, FeeStructure>(&update_query)
            .bind(id)
            .bind(dto.title.unwrap_or(existing.title))
            .bind(dto.description.or(existing.description))
            .bind(dto.amount.unwrap_or(existing.amount))
            .bind(dto.academic_year.unwrap_or(existing.academic_year))
            .bind(dto.term.or(existing.term))
            .bind(dto.is_recurring.unwrap_or(existing.is_recurring))
            .bind(dto.recurrence_period.or(existing.recurrence_period))
            .bind(dto.is_optional.unwrap_or(existing.is_optional))
            .bind(dto.is_active.unwrap_or(existing.is_active))
            .bind(dto.category_id.unwrap_or(existing.category_id))
            .bind(dto.class_id.or(existing.class_id))
            .fetch_one(db)
            .await?;

        info!(structure.id = %structure.id, "Fee structure updated");

        Ok(structure)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "fee_structures"))]
    pub async fn delete_structure(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM fee_structures WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Fee structure not found")));
        }

        info!(structure.id = %id, "Fee structure deleted");

        Ok(())
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "fee_due_dates"))]
    pub async fn create_due_date(
        db: &PgPool,
        structure_id: Uuid,
        dto: CreateFeeDueDateDto,
    ) -> Result<FeeDueDate, AppError> {
        Self::get_structure(db, structure_id).await?;

        let insert_query = format!(
            "INSERT INTO fee_due_dates (fee_structure_id, due_date, grace_period_days, penalty_percentage)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            DUE_DATE_COLUMNS
        );
        let due_date = sqlx::query_as::<_, FeeDueDate>(&insert_query)
            .bind(structure_id)
            .bind(dto.due_date)
            .bind(dto.grace_period_days)
            .bind(dto.penalty_percentage)
            .fetch_one(db)
            .await?;

        info!(due_date.id = %due_date.id, structure.id = %structure_id, "Fee due date created");

        Ok(due_date)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "fee_due_dates"))]
    pub async fn get_due_dates(db: &PgPool, structure_id: Uuid) -> Result<Vec<FeeDueDate>, AppError> {
        Self::get_structure(db, structure_id).await?;

        let query = format!(
            "SELECT {} FROM fee_due_dates WHERE fee_structure_id = $1 ORDER BY due_date",
            DUE_DATE_COLUMNS
        );
        let due_dates = sqlx::query_as::<_, FeeDueDate>(&query)
            .bind(structure_id)
            .fetch_all(db)
            .await?;

        Ok(due_dates)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "fee_transactions"))]
    pub async fn get_transactions(
        db: &PgPool,
        filters: FeeTransactionFilterParams,
    ) -> Result<PaginatedFeeTransactionsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(student_id) = filters.student_id {
            params.push(student_id.to_string());
            where_clause.push_str(&format!(" AND student_id = ${}::uuid", params.len()));
        }

        if let Some(fee_structure_id) = filters.fee_structure_id {
            params.push(fee_structure_id.to_string());
            where_clause.push_str(&format!(" AND fee_structure_id = ${}::uuid", params.len()));
        }

        if let Some(payment_status) = &filters.payment_status {
            Self::ensure_valid_payment_status(payment_status)?;
            params.push(payment_status.clone());
            where_clause.push_str(&format!(" AND payment_status = ${}", params.len()));
        }

        if let Some(start_date) = filters.start_date {
            params.push(start_date.to_rfc3339());
            where_clause.push_str(&format!(
                " AND transaction_date >= ${}::timestamptz",
                params.len()
            ));
        }

        if let Some(end_date) = filters.end_date {
            params.push(end_date.to_rfc3339());
            where_clause.push_str(&format!(
                " AND transaction_date <= ${}::timestamptz",
                params.len()
            ));
        }

        let count_query = format!(
            "SELECT COUNT(*) FROM fee_transactions WHERE 1=1{}",
            where_clause
        );
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM fee_transactions WHERE 1=1{} ORDER BY transaction_date DESC LIMIT {} OFFSET {}",
            TRANSACTION_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, FeeTransaction>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let transactions = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %transactions.len(), "Fee transactions fetched");

        Ok(PaginatedFeeTransactionsResponse {
            meta: filters.pagination.meta(total),
            data: transactions,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "fee_transactions"))]
    pub async fn create_transaction(
        db: &PgPool,
        dto: CreateFeeTransactionDto,
        collected_by_id: Uuid,
    ) -> Result<FeeTransaction, AppError> {
        Self::ensure_valid_payment_method(&dto.payment_method)?;
        Self::ensure_valid_payment_status(&dto.payment_status)?;
        Self::get_structure(db, dto.fee_structure_id).await?;
        StudentService::get_student(db, dto.student_id).await?;

        let insert_query = format!(
            "INSERT INTO fee_transactions (fee_structure_id, student_id, amount_paid,
                                           transaction_date, payment_method, payment_status,
                                           transaction_reference, notes, collected_by_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            TRANSACTION_COLUMNS
        );
        let transaction = sqlx::query_as::<_, FeeTransaction>(&insert_query)
            .bind(dto.fee_structure_id)
            .bind(dto.student_id)
            .bind(dto.amount_paid)
            .bind(dto.transaction_date.unwrap_or_else(Utc::now))
            .bind(&dto.payment_method)
            .bind(&dto.payment_status)
            .bind(&dto.transaction_reference)
            .bind(&dto.notes)
            .bind(collected_by_id)
            .fetch_one(db)
            .await?;

        info!(
            transaction.id = %transaction.id,
            student.id = %transaction.student_id,
            amount = %transaction.amount_paid,
            "Fee transaction recorded"
        );

        Ok(transaction)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "fee_transactions"))]
    pub async fn get_transaction(db: &PgPool, id: Uuid) -> Result<FeeTransaction, AppError> {
        let query = format!("SELECT {} FROM fee_transactions WHERE id = $1", TRANSACTION_COLUMNS);
        sqlx::query_as::<_, FeeTransaction>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Fee transaction not found")))
    }

    /// Transactions belonging to the student linked to `user_id`.
    #[instrument(skip(db, pagination), fields(db.operation = "SELECT", db.table = "fee_transactions"))]
    pub async fn get_transactions_for_user(
        db: &PgPool,
        user_id: Uuid,
        pagination: PaginationParams,
    ) -> Result<PaginatedFeeTransactionsResponse, AppError> {
        let student = StudentService::get_student_by_user(db, user_id).await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM fee_transactions WHERE student_id = $1",
        )
        .bind(student.id)
        .fetch_one(db)
        .await?;

        let data_query = format!(
            "SELECT {} FROM fee_transactions WHERE student_id = $1
             ORDER BY transaction_date DESC LIMIT {} OFFSET {}",
            TRANSACTION_COLUMNS,
            pagination.limit(),
            pagination.offset()
        );
        let transactions = sqlx::query_as::<_, FeeTransaction>(&data_query)
            .bind(student.id)
            .fetch_all(db)
            .await?;

        Ok(PaginatedFeeTransactionsResponse {
            meta: pagination.meta(total),
            data: transactions,
        })
    }

    fn ensure_valid_payment_method(method: &str) -> Result<(), AppError> {
        if PAYMENT_METHODS.contains(&method) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "payment_method must be one of: {}",
                PAYMENT_METHODS.join(", ")
            )))
        }
    }

    fn ensure_valid_payment_status(status: &str) -> Result<(), AppError> {
        if PAYMENT_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "payment_status must be one of: {}",
                PAYMENT_STATUSES.join(", ")
            )))
        }
    }
}
