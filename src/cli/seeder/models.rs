use uuid::Uuid;

/// Marker written into `description` columns of seeded rows so `clear-seed`
/// can find them again.
pub const SEED_MARKER: &str = "Seeded by slateworks-cli";

/// Marker domain for seeded user emails.
pub const SEED_EMAIL_DOMAIN: &str = "seed.slateworks.test";

/// Academic year stamped on seeded classes.
pub const SEED_ACADEMIC_YEAR: &str = "2025-2026";

pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: Uuid,
}

pub struct StaffSeed {
    pub user_id: Uuid,
    pub employee_id: String,
    pub staff_type: String,
    pub qualification: Option<String>,
    pub department: Option<String>,
}

pub struct StudentSeed {
    pub user_id: Uuid,
    pub admission_number: String,
    pub date_of_birth: chrono::NaiveDate,
    pub gender: String,
    pub address: String,
    pub class_id: Option<Uuid>,
}

pub struct ClassSeed {
    pub name: String,
    pub section: String,
    pub academic_year: String,
}

pub struct BookSeed {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub publication_year: i32,
    pub total_copies: i32,
    pub shelf_location: String,
    pub category_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct SeedConfig {
    pub students: usize,
    pub teachers: usize,
    pub classes: usize,
    pub books: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            students: 50,
            teachers: 10,
            classes: 6,
            books: 40,
        }
    }
}
