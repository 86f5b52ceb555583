use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use serde_json::json;
use slateworks::config::cors::CorsConfig;
use slateworks::config::email::EmailConfig;
use slateworks::config::jwt::JwtConfig;
use slateworks::router::init_router;
use slateworks::state::AppState;
use slateworks::utils::email::EmailService;
use slateworks::utils::password::hash_password;
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use tower::ServiceExt;
use uuid::Uuid;

/// Well-known system role IDs (must match migration)
pub mod system_roles {
    use uuid::Uuid;
    pub const ADMIN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000001);
    pub const TEACHER: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000002);
    pub const STUDENT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000003);
    pub const LIBRARIAN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000004);
    pub const ACCOUNTANT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000005);
    pub const PARENT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000006);
}

pub async fn setup_test_app(pool: PgPool) -> axum::Router {
    dotenvy::dotenv().ok();
    // Tests never send mail; EmailConfig defaults to disabled without SMTP env
    let email_config = EmailConfig::from_env();
    let state = AppState {
        db: pool.clone(),
        jwt_config: JwtConfig::from_env(),
        email_service: EmailService::new(email_config.clone()),
        email_config,
        cors_config: CorsConfig::from_env(),
        cache: None,
    };
    init_router(state)
}

pub async fn get_auth_token(app: axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub role_ids: Vec<Uuid>,
}

/// Create a test user with the given role slug
/// (`admin`, `teacher`, `student`, `librarian`, `accountant`, `parent`).
pub async fn create_test_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    role: &str,
) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let user_id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (first_name, last_name, email, password)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind("Test")
    .bind("User")
    .bind(email)
    .bind(hashed)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    let role_id = match role {
        "admin" => system_roles::ADMIN,
        "teacher" => system_roles::TEACHER,
        "student" => system_roles::STUDENT,
        "librarian" => system_roles::LIBRARIAN,
        "accountant" => system_roles::ACCOUNTANT,
        "parent" => system_roles::PARENT,
        _ => panic!("Invalid role: {}", role),
    };

    sqlx::query(
        "INSERT INTO user_roles (user_id, role_id)
         VALUES ($1, $2)
         ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(role_id)
    .execute(&mut **tx)
    .await
    .unwrap();

    TestUser {
        id: user_id,
        email: email.to_string(),
        password: password.to_string(),
        role_ids: vec![role_id],
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub struct TestClass {
    pub id: Uuid,
    pub name: String,
}

#[allow(dead_code)]
pub async fn create_test_class(tx: &mut Transaction<'_, Postgres>, name: &str) -> TestClass {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO classes (name, section, academic_year)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(name)
    .bind("A")
    .bind("2025-2026")
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestClass {
        id,
        name: name.to_string(),
    }
}

#[allow(dead_code)]
pub struct TestSubject {
    pub id: Uuid,
    pub code: String,
}

#[allow(dead_code)]
pub async fn create_test_subject(tx: &mut Transaction<'_, Postgres>, name: &str) -> TestSubject {
    let code = format!("SUB-{}", &Uuid::new_v4().simple().to_string()[..8]);
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO subjects (name, code)
         VALUES ($1, $2)
         RETURNING id",
    )
    .bind(name)
    .bind(&code)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestSubject { id, code }
}

#[allow(dead_code)]
pub struct TestStudent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub admission_number: String,
}

/// Create a student record for an existing user.
#[allow(dead_code)]
pub async fn create_test_student(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    class_id: Option<Uuid>,
) -> TestStudent {
    let admission_number = format!("ADM-{}", Uuid::new_v4());

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO students (user_id, admission_number, class_id)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(user_id)
    .bind(&admission_number)
    .bind(class_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestStudent {
        id,
        user_id,
        admission_number,
    }
}

#[allow(dead_code)]
pub struct TestStaff {
    pub id: Uuid,
    pub user_id: Uuid,
    pub employee_id: String,
}

/// Create a staff record for an existing user.
#[allow(dead_code)]
pub async fn create_test_staff(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    staff_type: &str,
) -> TestStaff {
    let employee_id = format!("EMP-{}", Uuid::new_v4());

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO staff (user_id, employee_id, staff_type)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(user_id)
    .bind(&employee_id)
    .bind(staff_type)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestStaff {
        id,
        user_id,
        employee_id,
    }
}

#[allow(dead_code)]
pub struct TestBook {
    pub id: Uuid,
    pub title: String,
}

/// Create a book with the given copy count (available == total).
#[allow(dead_code)]
pub async fn create_test_book(
    tx: &mut Transaction<'_, Postgres>,
    title: &str,
    copies: i32,
) -> TestBook {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO books (title, author, isbn, total_copies, available_copies)
         VALUES ($1, $2, $3, $4, $4)
         RETURNING id",
    )
    .bind(title)
    .bind("Test Author")
    .bind(format!("{}", &Uuid::new_v4().simple().to_string()[..13]))
    .bind(copies)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestBook {
        id,
        title: title.to_string(),
    }
}
