//! Fake-data seeder for local development.
//!
//! Populates classes, subjects, teachers, students and books with `fake`
//! data, inserted through chunked multi-value INSERT statements.
//!
//! # Module Structure
//!
//! - [`academics`] - Classes and the subject catalogue
//! - [`books`] - Book categories and the book catalogue
//! - [`users`] - Teacher and student accounts with role assignment
//! - [`models`] - Seed row structs, counts and marker constants
//!
//! # Usage
//!
//! ```ignore
//! use slateworks::cli::seeder::{SeedConfig, seed_database};
//!
//! seed_database(&db, SeedConfig::default()).await?;
//! ```
//!
//! # Performance
//!
//! - Parallel data generation using Rayon
//! - Batch inserts with multi-value INSERT statements
//! - Single bcrypt hash reused for all users (cost 4 for speed)
//!
//! Seeded rows carry markers (`description` columns, user email domain) so
//! `clear-seed` can remove them without touching hand-created data.

pub mod academics;
pub mod books;
pub mod models;
pub mod users;

pub use models::SeedConfig;

use bcrypt::hash;
use sqlx::PgPool;
use std::time::Instant;

/// Seeds the database with classes, subjects, teachers, students and books.
pub async fn seed_database(
    db: &PgPool,
    config: SeedConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();

    println!("🌱 Starting database seeding...");
    println!(
        "   - {} classes, {} teachers, {} students, {} books",
        config.classes, config.teachers, config.students, config.books
    );

    let password_hash = hash_password()?;

    let class_ids = academics::seed_classes(db, config.classes).await?;
    academics::seed_subjects(db).await?;

    let teacher_ids = users::seed_teachers(db, config.teachers, &password_hash).await?;
    let student_ids = users::seed_students(db, config.students, &class_ids, &password_hash).await?;

    let book_ids = books::seed_books(db, config.books).await?;

    println!(
        "\n✅ Seeding complete! Created {} classes, {} teachers, {} students, {} books in {:?}",
        class_ids.len(),
        teacher_ids.len(),
        student_ids.len(),
        book_ids.len(),
        start_time.elapsed()
    );
    println!("\n📝 Default password for all seeded users: password123");

    Ok(())
}

/// Clears seeded rows by their markers. Admin accounts are preserved.
pub async fn clear_seeded_data(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    // Users first: staff and student rows cascade with them, classes lose
    // their teacher via SET NULL.
    let users_deleted = users::clear_users(db).await?;
    let classes_deleted = academics::clear_classes(db).await?;
    let subjects_deleted = academics::clear_subjects(db).await?;
    let books_deleted = books::clear_books(db).await?;
    let categories_deleted = books::clear_categories(db).await?;

    println!(
        "   ✓ Deleted {} users, {} classes, {} subjects, {} books, {} book categories in {:?}",
        users_deleted,
        classes_deleted,
        subjects_deleted,
        books_deleted,
        categories_deleted,
        start_time.elapsed()
    );
    println!("✅ Seeded data cleared successfully!");

    Ok(())
}

fn hash_password() -> Result<String, Box<dyn std::error::Error>> {
    println!("🔐 Hashing password...");
    let start = Instant::now();
    // Lower bcrypt cost for seeding (cost 4 = ~6ms vs cost 12 = ~250ms).
    // Real accounts go through hash_password() at DEFAULT_COST.
    let hash = hash("password123", 4).map_err(|e| format!("Failed to hash password: {}", e))?;
    println!("   ✓ Hashed password in {:?}", start.elapsed());
    Ok(hash)
}
