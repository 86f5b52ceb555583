use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{ClassSeed, SEED_ACADEMIC_YEAR, SEED_MARKER};

const SECTIONS: [&str; 4] = ["A", "B", "C", "D"];

const SUBJECTS: [(&str, &str); 10] = [
    ("Mathematics", "MTH101"),
    ("English Language", "ENG101"),
    ("Physics", "PHY101"),
    ("Chemistry", "CHM101"),
    ("Biology", "BIO101"),
    ("History", "HIS101"),
    ("Geography", "GEO101"),
    ("Computer Science", "CSC101"),
    ("Economics", "ECO101"),
    ("Fine Art", "ART101"),
];

/// Seeds classes ("Grade 1 A", "Grade 1 B", ...) for the marker academic
/// year and returns their ids.
pub async fn seed_classes(
    db: &PgPool,
    count: usize,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏫 Seeding {} classes...", count);

    let classes = generate_classes(count);
    let class_ids = insert_classes_batch(db, &classes).await?;

    println!(
        "   ✓ Inserted {} classes in {:?}",
        class_ids.len(),
        start_time.elapsed()
    );

    Ok(class_ids)
}

/// Seeds the fixed subject catalogue. Re-runs skip codes that already exist.
pub async fn seed_subjects(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("📖 Seeding {} subjects...", SUBJECTS.len());

    let mut query =
        String::from("INSERT INTO subjects (name, code, description) VALUES ");

    for (i, _) in SUBJECTS.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 3;
        query.push_str(&format!(
            "(${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3
        ));
    }

    query.push_str(" ON CONFLICT (code) DO NOTHING");

    let mut q = sqlx::query(&query);
    for (name, code) in SUBJECTS {
        q = q.bind(name).bind(code).bind(SEED_MARKER);
    }

    let inserted = q.execute(db).await?.rows_affected();

    println!(
        "   ✓ Inserted {} subjects in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

fn generate_classes(count: usize) -> Vec<ClassSeed> {
    (0..count)
        .map(|i| ClassSeed {
            name: format!("Grade {}", i / SECTIONS.len() + 1),
            section: SECTIONS[i % SECTIONS.len()].to_string(),
            academic_year: SEED_ACADEMIC_YEAR.to_string(),
        })
        .collect()
}

async fn insert_classes_batch(
    db: &PgPool,
    classes: &[ClassSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    const BATCH_SIZE: usize = 500;
    let mut all_ids = Vec::with_capacity(classes.len());

    for chunk in classes.chunks(BATCH_SIZE) {
        let ids = insert_classes_chunk(&mut tx, chunk).await?;
        all_ids.extend(ids);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_classes_chunk(
    tx: &mut Transaction<'_, Postgres>,
    classes: &[ClassSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if classes.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO classes (name, section, academic_year, description) VALUES ",
    );

    for (i, _) in classes.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 4;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4
        ));
    }

    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for class in classes {
        q = q
            .bind(&class.name)
            .bind(&class.section)
            .bind(&class.academic_year)
            .bind(SEED_MARKER);
    }

    let ids: Vec<Uuid> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

/// Deletes seeded classes by description marker.
pub async fn clear_classes(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let deleted = sqlx::query("DELETE FROM classes WHERE description = $1")
        .bind(SEED_MARKER)
        .execute(db)
        .await?
        .rows_affected();

    Ok(deleted)
}

/// Deletes seeded subjects by description marker.
pub async fn clear_subjects(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let deleted = sqlx::query("DELETE FROM subjects WHERE description = $1")
        .bind(SEED_MARKER)
        .execute(db)
        .await?
        .rows_affected();

    Ok(deleted)
}
