use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::cache::{self, RedisCache};
use crate::modules::library::model::{
    BOOK_STATUSES, Book, BookCategory, BookFilterParams, BookIssue, CreateBookDto,
    CreateCategoryDto, CreateIssueDto, IssueFilterParams, LibrarySettings, PaginatedBooksResponse,
    PaginatedIssuesResponse, UpdateBookDto, UpdateCategoryDto, UpdateIssueDto, UpdateSettingsDto,
};
use crate::modules::users::model::system_roles::slugs;
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";

const BOOK_COLUMNS: &str = "id, title, author, isbn, publisher, publication_year, edition, \
     description, total_copies, available_copies, shelf_location, category_id, status, \
     created_at, updated_at";

const ISSUE_COLUMNS: &str = "id, book_id, user_id, issue_date, due_date, return_date, \
     is_returned, fine_amount, remarks, created_at, updated_at";

const SETTINGS_COLUMNS: &str = "id, max_books_per_student, max_books_per_staff, \
     loan_period_days_student, loan_period_days_staff, fine_per_day, max_renewals, \
     created_at, updated_at";

/// Roles that borrow under the staff lending policy.
const STAFF_BORROWER_ROLES: &[&str] = &[slugs::ADMIN, slugs::LIBRARIAN, slugs::TEACHER];

pub struct LibraryService;

impl LibraryService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "book_categories"))]
    pub async fn get_categories(db: &PgPool) -> Result<Vec<BookCategory>, AppError> {
        let query = format!(
            "SELECT {} FROM book_categories ORDER BY name",
            CATEGORY_COLUMNS
        );
        let categories = sqlx::query_as::<_, BookCategory>(&query)
            .fetch_all(db)
            .await?;

        Ok(categories)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "book_categories"))]
    pub async fn create_category(
        db: &PgPool,
        dto: CreateCategoryDto,
    ) -> Result<BookCategory, AppError> {
        let insert_query = format!(
            "INSERT INTO book_categories (name, description) VALUES ($1, $2) RETURNING {}",
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, BookCategory>(&insert_query)
            .bind(&dto.name)
            .bind(&dto.description)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Category with this name already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(category.id = %category.id, category.name = %category.name, "Book category created");

        Ok(category)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "book_categories"))]
    pub async fn get_category(db: &PgPool, id: Uuid) -> Result<BookCategory, AppError> {
        let query = format!(
            "SELECT {} FROM book_categories WHERE id = $1",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, BookCategory>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Category not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "book_categories"))]
    pub async fn update_category(
        db: &PgPool,
        id: Uuid,
        dto: UpdateCategoryDto,
    ) -> Result<BookCategory, AppError> {
        let existing = Self::get_category(db, id).await?;

        let update_query = format!(
            "UPDATE book_categories
                SET name = $2, description = $3, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, BookCategory>(&update_query)
            .bind(id)
            .bind(dto.name.unwrap_or(existing.name))
            .bind(dto.description.or(existing.description))
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Category with this name already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(category.id = %category.id, "Book category updated");

        Ok(category)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "book_categories"))]
    pub async fn delete_category(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        Self::get_category(db, id).await?;

        let books_in_category =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books WHERE category_id = $1")
                .bind(id)
                .fetch_one(db)
                .await?;
        if books_in_category > 0 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Cannot delete category with books assigned to it"
            )));
        }

        sqlx::query("DELETE FROM book_categories WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        info!(category.id = %id, "Book category deleted");

        Ok(())
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "books"))]
    pub async fn get_books(
        db: &PgPool,
        filters: BookFilterParams,
    ) -> Result<PaginatedBooksResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(search) = &filters.search {
            params.push(format!("%{}%", search));
            let idx = params.len();
            where_clause.push_str(&format!(" AND (title ILIKE ${idx} OR author ILIKE ${idx})"));
        }

        if let Some(category_id) = filters.category_id {
            params.push(category_id.to_string());
            where_clause.push_str(&format!(" AND category_id = ${}::uuid", params.len()));
        }

        if let Some(status) = &filters.status {
            params.push(status.clone());
            where_clause.push_str(&format!(" AND status = ${}", params.len()));
        }

        let count_query = format!("SELECT COUNT(*) FROM books WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM books WHERE 1=1{} ORDER BY title LIMIT {} OFFSET {}",
            BOOK_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Book>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let books = data_sql.fetch_all(db).await?;

        debug!(total = %total, returned = %books.len(), "Books fetched");

        Ok(PaginatedBooksResponse {
            meta: filters.pagination.meta(total),
            data: books,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "books"))]
    pub async fn create_book(db: &PgPool, dto: CreateBookDto) -> Result<Book, AppError> {
        if let Some(category_id) = dto.category_id {
            Self::get_category(db, category_id).await?;
        }

        let insert_query = format!(
            "INSERT INTO books (title, author, isbn, publisher, publication_year, edition,
                                description, total_copies, available_copies, shelf_location, category_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $10)
             RETURNING {}",
            BOOK_COLUMNS
        );
        let book = sqlx::query_as::<_, Book>(&insert_query)
            .bind(&dto.title)
            .bind(&dto.author)
            .bind(&dto.isbn)
            .bind(&dto.publisher)
            .bind(dto.publication_year)
            .bind(&dto.edition)
            .bind(&dto.description)
            .bind(dto.total_copies)
            .bind(&dto.shelf_location)
            .bind(dto.category_id)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Book with this ISBN already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(book.id = %book.id, book.title = %book.title, "Book created");

        Ok(book)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "books"))]
    pub async fn get_book(db: &PgPool, id: Uuid) -> Result<Book, AppError> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Book not found")))
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "books"))]
    pub async fn update_book(db: &PgPool, id: Uuid, dto: UpdateBookDto) -> Result<Book, AppError> {
        if let Some(status) = &dto.status {
            Self::ensure_valid_book_status(status)?;
        }
        if let Some(category_id) = dto.category_id {
            Self::get_category(db, category_id).await?;
        }

        let existing = Self::get_book(db, id).await?;

        let update_query = format!(
            "UPDATE books
                SET title = $2, author = $3, isbn = $4, publisher = $5, publication_year = $6,
                    edition = $7, description = $8, total_copies = $9, shelf_location = $10,
                    category_id = $11, status = $12, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            BOOK_COLUMNS
        );
        let book = sqlx::query_as::<_, Book>(&update_query)
            .bind(id)
            .bind(dto.title.unwrap_or(existing.title))
            .bind(dto.author.unwrap_or(existing.author))
            .bind(dto.isbn.or(existing.isbn))
            .bind(dto.publisher.or(existing.publisher))
            .bind(dto.publication_year.or(existing.publication_year))
            .bind(dto.edition.or(existing.edition))
            .bind(dto.description.or(existing.description))
            .bind(dto.total_copies.unwrap_or(existing.total_copies))
            .bind(dto.shelf_location.or(existing.shelf_location))
            .bind(dto.category_id.or(existing.category_id))
            .bind(dto.status.unwrap_or(existing.status))
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Book with this ISBN already exists"
                    ));
                }
                AppError::from(e)
            })?;

        info!(book.id = %book.id, "Book updated");

        Ok(book)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "books"))]
    pub async fn delete_book(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        Self::get_book(db, id).await?;

        let active_loans = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM book_issues WHERE book_id = $1 AND is_returned = FALSE",
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        if active_loans > 0 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Cannot delete book with active loans"
            )));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        info!(book.id = %id, "Book deleted");

        Ok(())
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "book_issues"))]
    pub async fn get_issues(
        db: &PgPool,
        filters: IssueFilterParams,
    ) -> Result<PaginatedIssuesResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(user_id) = filters.user_id {
            params.push(user_id.to_string());
            where_clause.push_str(&format!(" AND user_id = ${}::uuid", params.len()));
        }

        if let Some(book_id) = filters.book_id {
            params.push(book_id.to_string());
            where_clause.push_str(&format!(" AND book_id = ${}::uuid", params.len()));
        }

        if let Some(is_returned) = filters.is_returned {
            where_clause.push_str(&format!(" AND is_returned = {}", is_returned));
        }

        let count_query = format!("SELECT COUNT(*) FROM book_issues WHERE 1=1{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM book_issues WHERE 1=1{} ORDER BY issue_date DESC, created_at DESC LIMIT {} OFFSET {}",
            ISSUE_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, BookIssue>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let issues = data_sql.fetch_all(db).await?;

        Ok(PaginatedIssuesResponse {
            meta: filters.pagination.meta(total),
            data: issues,
        })
    }

    /// Issues a book to a user. Loan period and the per-borrower cap come
    /// from library settings, picked by the borrower's roles.
    #[instrument(skip(db, cache, dto), fields(db.operation = "INSERT", db.table = "book_issues"))]
    pub async fn create_issue(
        db: &PgPool,
        cache: Option<&RedisCache>,
        dto: CreateIssueDto,
    ) -> Result<BookIssue, AppError> {
        let book = Self::get_book(db, dto.book_id).await?;
        if book.available_copies <= 0 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Book is not available for loan"
            )));
        }

        let user_exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
            .bind(dto.user_id)
            .fetch_optional(db)
            .await?;
        if user_exists.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        let settings = Self::get_settings(db, cache).await?;
        let borrower_roles = UserService::role_names(db, dto.user_id).await?;
        let is_staff_borrower = borrower_roles
            .iter()
            .any(|role| STAFF_BORROWER_ROLES.contains(&role.as_str()));

        let (max_books, loan_period_days) = if is_staff_borrower {
            (settings.max_books_per_staff, settings.loan_period_days_staff)
        } else {
            (
                settings.max_books_per_student,
                settings.loan_period_days_student,
            )
        };

        let active_loans = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM book_issues WHERE user_id = $1 AND is_returned = FALSE",
        )
        .bind(dto.user_id)
        .fetch_one(db)
        .await?;
        if active_loans >= max_books as i64 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "User has reached the maximum limit of {} books",
                max_books
            )));
        }

        let due_date = Utc::now().date_naive() + Duration::days(loan_period_days as i64);

        let mut tx = db.begin().await?;

        let insert_query = format!(
            "INSERT INTO book_issues (book_id, user_id, due_date, remarks)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            ISSUE_COLUMNS
        );
        let issue = sqlx::query_as::<_, BookIssue>(&insert_query)
            .bind(dto.book_id)
            .bind(dto.user_id)
            .bind(due_date)
            .bind(&dto.remarks)
            .fetch_one(&mut *tx)
            .await?;

        let remaining = sqlx::query_scalar::<_, i32>(
            "UPDATE books SET available_copies = available_copies - 1, updated_at = NOW()
              WHERE id = $1 AND available_copies > 0
              RETURNING available_copies",
        )
        .bind(dto.book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Book is not available for loan")))?;

        if remaining == 0 {
            sqlx::query("UPDATE books SET status = 'issued', updated_at = NOW() WHERE id = $1")
                .bind(dto.book_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            issue.id = %issue.id,
            book.id = %dto.book_id,
            user.id = %dto.user_id,
            "Book issued"
        );

        Ok(issue)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "book_issues"))]
    pub async fn get_issue(db: &PgPool, id: Uuid) -> Result<BookIssue, AppError> {
        let query = format!("SELECT {} FROM book_issues WHERE id = $1", ISSUE_COLUMNS);
        sqlx::query_as::<_, BookIssue>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Book issue not found")))
    }

    /// Marks an issue returned, charging a fine for overdue days.
    #[instrument(skip(db, cache), fields(db.operation = "UPDATE", db.table = "book_issues"))]
    pub async fn return_issue(
        db: &PgPool,
        cache: Option<&RedisCache>,
        id: Uuid,
    ) -> Result<BookIssue, AppError> {
        let issue = Self::get_issue(db, id).await?;
        if issue.is_returned {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Book has already been returned"
            )));
        }

        let settings = Self::get_settings(db, cache).await?;
        let today = Utc::now().date_naive();
        let overdue_days = (today - issue.due_date).num_days().max(0);
        let fine_amount = overdue_days as f64 * settings.fine_per_day;

        let mut tx = db.begin().await?;

        let update_query = format!(
            "UPDATE book_issues
                SET is_returned = TRUE, return_date = $2, fine_amount = $3, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            ISSUE_COLUMNS
        );
        let returned = sqlx::query_as::<_, BookIssue>(&update_query)
            .bind(id)
            .bind(today)
            .bind(fine_amount)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE books SET available_copies = available_copies + 1, updated_at = NOW()
              WHERE id = $1",
        )
        .bind(issue.book_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE books SET status = 'available', updated_at = NOW()
              WHERE id = $1 AND status = 'issued'",
        )
        .bind(issue.book_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            issue.id = %id,
            fine_amount = %fine_amount,
            overdue_days = %overdue_days,
            "Book returned"
        );

        Ok(returned)
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "book_issues"))]
    pub async fn update_issue(
        db: &PgPool,
        id: Uuid,
        dto: UpdateIssueDto,
    ) -> Result<BookIssue, AppError> {
        let existing = Self::get_issue(db, id).await?;

        let update_query = format!(
            "UPDATE book_issues
                SET due_date = $2, remarks = $3, fine_amount = $4, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            ISSUE_COLUMNS
        );
        let issue = sqlx::query_as::<_, BookIssue>(&update_query)
            .bind(id)
            .bind(dto.due_date.unwrap_or(existing.due_date))
            .bind(dto.remarks.or(existing.remarks))
            .bind(dto.fine_amount.unwrap_or(existing.fine_amount))
            .fetch_one(db)
            .await?;

        info!(issue.id = %issue.id, "Book issue updated");

        Ok(issue)
    }

    /// Fetches the settings singleton, creating the defaults row on first
    /// use. Reads go through the cache when one is configured.
    #[instrument(skip(db, cache), fields(db.table = "library_settings"))]
    pub async fn get_settings(
        db: &PgPool,
        cache: Option<&RedisCache>,
    ) -> Result<LibrarySettings, AppError> {
        let key = cache::build_key(&["library", "settings"]);

        if let Some(cache) = cache
            && let Some(settings) = cache.get::<LibrarySettings>(&key).await
        {
            return Ok(settings);
        }

        let select_query = format!("SELECT {} FROM library_settings LIMIT 1", SETTINGS_COLUMNS);
        let existing = sqlx::query_as::<_, LibrarySettings>(&select_query)
            .fetch_optional(db)
            .await?;

        let settings = match existing {
            Some(settings) => settings,
            None => {
                let insert_query = format!(
                    "INSERT INTO library_settings DEFAULT VALUES RETURNING {}",
                    SETTINGS_COLUMNS
                );
                sqlx::query_as::<_, LibrarySettings>(&insert_query)
                    .fetch_one(db)
                    .await?
            }
        };

        if let Some(cache) = cache
            && let Err(err) = cache.set(&key, &settings).await
        {
            warn!(error = %err, "Failed to cache library settings");
        }

        Ok(settings)
    }

    #[instrument(skip(db, cache, dto), fields(db.operation = "UPDATE", db.table = "library_settings"))]
    pub async fn update_settings(
        db: &PgPool,
        cache: Option<&RedisCache>,
        dto: UpdateSettingsDto,
    ) -> Result<LibrarySettings, AppError> {
        let existing = Self::get_settings(db, None).await?;

        let update_query = format!(
            "UPDATE library_settings
                SET max_books_per_student = $2, max_books_per_staff = $3,
                    loan_period_days_student = $4, loan_period_days_staff = $5,
                    fine_per_day = $6, max_renewals = $7, updated_at = NOW()
              WHERE id = $1
              RETURNING {}",
            SETTINGS_COLUMNS
        );
        let settings = sqlx::query_as::<_, LibrarySettings>(&update_query)
            .bind(existing.id)
            .bind(
                dto.max_books_per_student
                    .unwrap_or(existing.max_books_per_student),
            )
            .bind(
                dto.max_books_per_staff
                    .unwrap_or(existing.max_books_per_staff),
            )
            .bind(
                dto.loan_period_days_student
                    .unwrap_or(existing.loan_period_days_student),
            )
            .bind(
                dto.loan_period_days_staff
                    .unwrap_or(existing.loan_period_days_staff),
            )
            .bind(dto.fine_per_day.unwrap_or(existing.fine_per_day))
            .bind(dto.max_renewals.unwrap_or(existing.max_renewals))
            .fetch_one(db)
            .await?;

        if let Some(cache) = cache {
            let key = cache::build_key(&["library", "settings"]);
            if let Err(err) = cache.invalidate(&key).await {
                warn!(error = %err, "Failed to invalidate cached library settings");
            }
        }

        info!("Library settings updated");

        Ok(settings)
    }

    fn ensure_valid_book_status(status: &str) -> Result<(), AppError> {
        if BOOK_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(AppError::unprocessable(anyhow::anyhow!(
                "status must be one of: {}",
                BOOK_STATUSES.join(", ")
            )))
        }
    }
}
