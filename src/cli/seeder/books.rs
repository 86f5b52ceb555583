use fake::Fake;
use fake::faker::company::en::{CatchPhrase, CompanyName};
use fake::faker::name::en::Name;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{BookSeed, SEED_MARKER};

const CATEGORIES: [&str; 5] = ["Fiction", "Science", "History", "Reference", "Biography"];
const SHELVES: [&str; 4] = ["A", "B", "C", "D"];

/// Seeds the book category list and `count` books spread across it.
pub async fn seed_books(db: &PgPool, count: usize) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📚 Seeding {} books...", count);

    let category_ids = seed_categories(db).await?;
    let books = generate_books(count, &category_ids);
    let book_ids = insert_books_batch(db, &books).await?;

    println!(
        "   ✓ Inserted {} books in {:?}",
        book_ids.len(),
        start_time.elapsed()
    );

    Ok(book_ids)
}

/// Inserts the fixed category list, skipping names that already exist, and
/// returns the ids of all of them.
async fn seed_categories(db: &PgPool) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let mut query = String::from("INSERT INTO book_categories (name, description) VALUES ");

    for (i, _) in CATEGORIES.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 2;
        query.push_str(&format!("(${}, ${})", param_idx + 1, param_idx + 2));
    }

    query.push_str(" ON CONFLICT (name) DO NOTHING");

    let mut q = sqlx::query(&query);
    for name in CATEGORIES {
        q = q.bind(name).bind(SEED_MARKER);
    }
    q.execute(db).await?;

    let names: Vec<String> = CATEGORIES.iter().map(|n| n.to_string()).collect();
    let ids: Vec<Uuid> =
        sqlx::query_scalar("SELECT id FROM book_categories WHERE name = ANY($1) ORDER BY name")
            .bind(&names)
            .fetch_all(db)
            .await?;

    Ok(ids)
}

fn generate_books(count: usize, category_ids: &[Uuid]) -> Vec<BookSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let title: String = CatchPhrase().fake();
            let author: String = Name().fake();
            let publisher: String = CompanyName().fake();

            BookSeed {
                title,
                author,
                isbn: format!("SEED-{:08}", idx),
                publisher,
                publication_year: 1990 + (idx % 35) as i32,
                total_copies: 1 + (idx % 5) as i32,
                shelf_location: format!("{}-{}", SHELVES[idx % SHELVES.len()], idx % 20 + 1),
                category_id: if category_ids.is_empty() {
                    None
                } else {
                    Some(category_ids[idx % category_ids.len()])
                },
            }
        })
        .collect()
}

async fn insert_books_batch(
    db: &PgPool,
    books: &[BookSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    // 10 params per book
    const BATCH_SIZE: usize = 500;
    let mut all_ids = Vec::with_capacity(books.len());

    for chunk in books.chunks(BATCH_SIZE) {
        let ids = insert_books_chunk(&mut tx, chunk).await?;
        all_ids.extend(ids);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_books_chunk(
    tx: &mut Transaction<'_, Postgres>,
    books: &[BookSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if books.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO books (title, author, isbn, publisher, publication_year, description, \
         total_copies, available_copies, shelf_location, category_id) VALUES ",
    );

    for (i, _) in books.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 10;
        let placeholders: Vec<String> =
            (1..=10).map(|p| format!("${}", param_idx + p)).collect();
        query.push_str(&format!("({})", placeholders.join(", ")));
    }

    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for book in books {
        q = q
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(&book.publisher)
            .bind(book.publication_year)
            .bind(SEED_MARKER)
            .bind(book.total_copies)
            .bind(book.total_copies)
            .bind(&book.shelf_location)
            .bind(book.category_id);
    }

    let ids: Vec<Uuid> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

/// Deletes seeded books by description marker. Issues cascade with them.
pub async fn clear_books(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let deleted = sqlx::query("DELETE FROM books WHERE description = $1")
        .bind(SEED_MARKER)
        .execute(db)
        .await?
        .rows_affected();

    Ok(deleted)
}

/// Deletes seeded book categories. Remaining books keep a NULL category.
pub async fn clear_categories(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let deleted = sqlx::query("DELETE FROM book_categories WHERE description = $1")
        .bind(SEED_MARKER)
        .execute(db)
        .await?
        .rows_affected();

    Ok(deleted)
}
