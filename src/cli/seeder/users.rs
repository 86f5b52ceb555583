use chrono::NaiveDate;
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StreetName, ZipCode};
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use crate::modules::users::model::system_roles;

use super::models::{SEED_EMAIL_DOMAIN, StaffSeed, StudentSeed, UserSeed};

const GENDERS: [&str; 2] = ["male", "female"];
const QUALIFICATIONS: [&str; 5] = ["B.Ed", "M.Ed", "B.Sc", "M.Sc", "PhD"];
const DEPARTMENTS: [&str; 4] = ["Sciences", "Humanities", "Languages", "Sports"];

/// Seeds teacher accounts: one user + one staff row each, `teacher` role
/// assigned.
pub async fn seed_teachers(
    db: &PgPool,
    count: usize,
    password_hash: &str,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🧑‍🏫 Seeding {} teachers...", count);

    let users = generate_users(system_roles::TEACHER, "teacher", count, password_hash);
    let user_ids = insert_users_batch(db, &users).await?;

    let staff = generate_staff(&user_ids);
    insert_staff_batch(db, &staff).await?;

    let user_roles: Vec<(Uuid, Uuid)> = user_ids
        .iter()
        .zip(users.iter())
        .map(|(&id, user)| (id, user.role_id))
        .collect();
    assign_roles_batch(db, &user_roles).await?;

    println!(
        "   ✓ Inserted {} teachers in {:?}",
        user_ids.len(),
        start_time.elapsed()
    );

    Ok(user_ids)
}

/// Seeds student accounts: one user + one student row each, spread
/// round-robin over the given classes, `student` role assigned.
pub async fn seed_students(
    db: &PgPool,
    count: usize,
    class_ids: &[Uuid],
    password_hash: &str,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🧑‍🎓 Seeding {} students...", count);

    let users = generate_users(system_roles::STUDENT, "student", count, password_hash);
    let user_ids = insert_users_batch(db, &users).await?;

    let students = generate_students(&user_ids, class_ids);
    insert_students_batch(db, &students).await?;

    let user_roles: Vec<(Uuid, Uuid)> = user_ids
        .iter()
        .zip(users.iter())
        .map(|(&id, user)| (id, user.role_id))
        .collect();
    assign_roles_batch(db, &user_roles).await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        user_ids.len(),
        start_time.elapsed()
    );

    Ok(user_ids)
}

/// Generates user rows in parallel. The email carries the role slug, a
/// per-run index and the seed marker domain.
fn generate_users(role_id: Uuid, role_slug: &str, count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();

            let email = format!(
                "{}.{}+{}{}@{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                role_slug,
                idx,
                SEED_EMAIL_DOMAIN
            );

            UserSeed {
                first_name,
                last_name,
                email,
                password_hash: password_hash.to_string(),
                role_id,
            }
        })
        .collect()
}

fn generate_staff(user_ids: &[Uuid]) -> Vec<StaffSeed> {
    user_ids
        .par_iter()
        .enumerate()
        .map(|(idx, &user_id)| StaffSeed {
            user_id,
            employee_id: format!("EMP-SEED-{:05}", idx),
            staff_type: "teacher".to_string(),
            qualification: Some(QUALIFICATIONS[idx % QUALIFICATIONS.len()].to_string()),
            department: Some(DEPARTMENTS[idx % DEPARTMENTS.len()].to_string()),
        })
        .collect()
}

fn generate_students(user_ids: &[Uuid], class_ids: &[Uuid]) -> Vec<StudentSeed> {
    user_ids
        .par_iter()
        .enumerate()
        .map(|(idx, &user_id)| {
            let street: String = StreetName().fake();
            let building: String = BuildingNumber().fake();
            let city: String = CityName().fake();
            let zip: String = ZipCode().fake();

            // Bounded modulos keep from_ymd_opt in range.
            let date_of_birth =
                NaiveDate::from_ymd_opt(2008 + (idx % 8) as i32, (idx % 12) as u32 + 1, (idx % 28) as u32 + 1)
                    .unwrap_or_default();

            StudentSeed {
                user_id,
                admission_number: format!("ADM-SEED-{:05}", idx),
                date_of_birth,
                gender: GENDERS[idx % GENDERS.len()].to_string(),
                address: format!("{} {}, {} {}", building, street, city, zip),
                class_id: if class_ids.is_empty() {
                    None
                } else {
                    Some(class_ids[idx % class_ids.len()])
                },
            }
        })
        .collect()
}

/// Inserts users in chunked multi-value INSERT statements inside one
/// transaction, returning the generated ids in input order.
async fn insert_users_batch(
    db: &PgPool,
    users: &[UserSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    // 4 params per user keeps chunks well below the Postgres limit of ~32,767
    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(users.len());

    for chunk in users.chunks(BATCH_SIZE) {
        let ids = insert_users_chunk(&mut tx, chunk).await?;
        all_ids.extend(ids);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut query =
        String::from("INSERT INTO users (first_name, last_name, email, password) VALUES ");

    for (i, _) in users.iter().enumerate() {
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
    for user in users {
        q = q
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash);
    }

    let ids: Vec<Uuid> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

async fn insert_staff_batch(
    db: &PgPool,
    staff: &[StaffSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    const BATCH_SIZE: usize = 1000;

    for chunk in staff.chunks(BATCH_SIZE) {
        insert_staff_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn insert_staff_chunk(
    tx: &mut Transaction<'_, Postgres>,
    staff: &[StaffSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    if staff.is_empty() {
        return Ok(());
    }

    let mut query = String::from(
        "INSERT INTO staff (user_id, employee_id, staff_type, qualification, department) VALUES ",
    );

    for (i, _) in staff.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 5;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5
        ));
    }

    let mut q = sqlx::query(&query);
    for member in staff {
        q = q
            .bind(member.user_id)
            .bind(&member.employee_id)
            .bind(&member.staff_type)
            .bind(&member.qualification)
            .bind(&member.department);
    }

    q.execute(&mut **tx).await?;
    Ok(())
}

async fn insert_students_batch(
    db: &PgPool,
    students: &[StudentSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    const BATCH_SIZE: usize = 1000;

    for chunk in students.chunks(BATCH_SIZE) {
        insert_students_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> Result<(), Box<dyn std::error::Error>> {
    if students.is_empty() {
        return Ok(());
    }

    let mut query = String::from(
        "INSERT INTO students (user_id, admission_number, date_of_birth, gender, address, class_id) VALUES ",
    );

    for (i, _) in students.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 6;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5,
            param_idx + 6
        ));
    }

    let mut q = sqlx::query(&query);
    for student in students {
        q = q
            .bind(student.user_id)
            .bind(&student.admission_number)
            .bind(student.date_of_birth)
            .bind(&student.gender)
            .bind(&student.address)
            .bind(student.class_id);
    }

    q.execute(&mut **tx).await?;
    Ok(())
}

/// Assigns roles in chunked multi-value inserts.
pub async fn assign_roles_batch(
    db: &PgPool,
    user_roles: &[(Uuid, Uuid)],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    const BATCH_SIZE: usize = 2000;

    for chunk in user_roles.chunks(BATCH_SIZE) {
        assign_roles_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn assign_roles_chunk(
    tx: &mut Transaction<'_, Postgres>,
    user_roles: &[(Uuid, Uuid)],
) -> Result<(), Box<dyn std::error::Error>> {
    if user_roles.is_empty() {
        return Ok(());
    }

    let mut query = String::from("INSERT INTO user_roles (user_id, role_id) VALUES ");

    for (i, _) in user_roles.iter().enumerate() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 2;
        query.push_str(&format!("(${}, ${})", param_idx + 1, param_idx + 2));
    }

    query.push_str(" ON CONFLICT (user_id, role_id) DO NOTHING");

    let mut q = sqlx::query(&query);
    for (user_id, role_id) in user_roles {
        q = q.bind(user_id).bind(role_id);
    }

    q.execute(&mut **tx).await?;
    Ok(())
}

/// Deletes seeded users by marker domain. Admin accounts survive even if
/// someone hand-assigned them a seeded email. Staff and student rows go
/// with their users via cascade.
pub async fn clear_users(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let deleted = sqlx::query(
        "DELETE FROM users u
         WHERE u.email LIKE $1
         AND NOT EXISTS (
             SELECT 1 FROM user_roles ur
             WHERE ur.user_id = u.id
             AND ur.role_id = $2
         )",
    )
    .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
    .bind(system_roles::ADMIN)
    .execute(db)
    .await?
    .rows_affected();

    Ok(deleted)
}
