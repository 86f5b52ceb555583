mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    create_test_student, create_test_user, generate_unique_email, get_auth_token, setup_test_app,
};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

/// Creates a fee category and structure through the API; returns the
/// structure id.
async fn create_structure(pool: &PgPool, token: &str, title: &str) -> String {
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/fees/categories")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({"name": format!("{} category", title)})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let category_id = body["id"].as_str().unwrap().to_string();

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/fees/structures")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": title,
                "amount": 1500.0,
                "academic_year": "2025-2026",
                "category_id": category_id
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "./migrations")]

async fn test_fee_category_gates(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let accountant_email = generate_unique_email();
    let student_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &accountant_email, password, "accountant").await;
    create_test_user(&mut tx, &student_email, password, "student").await;
    tx.commit().await.unwrap();

    // Accountants can read categories
    let app = setup_test_app(pool.clone()).await;
    let accountant_token = get_auth_token(app, &accountant_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/fees/categories")
        .header("authorization", format!("Bearer {}", accountant_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // But only admins create them
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/fees/categories")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", accountant_token))
        .body(Body::from(
            serde_json::to_string(&json!({"name": "Tuition"})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Students see none of it
    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &student_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/fees/categories")
        .header("authorization", format!("Bearer {}", student_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]

async fn test_structure_and_due_dates(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, password).await;

    let structure_id = create_structure(&pool, &token, "Term 1 Tuition").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/fees/structures/{}/due-dates", structure_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "due_date": "2026-01-31",
                "grace_period_days": 7,
                "penalty_percentage": 2.5
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/fees/structures/{}/due-dates", structure_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let due_dates = body.as_array().unwrap();
    assert_eq!(due_dates.len(), 1);
    assert_eq!(due_dates[0]["grace_period_days"], 7);

    // Paginated structure listing
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/fees/structures?page=1&limit=10")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]

async fn test_transaction_records_collector(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let accountant_email = generate_unique_email();
    let admin_email = generate_unique_email();
    let password = "testpass123";
    let accountant = create_test_user(&mut tx, &accountant_email, password, "accountant").await;
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    let student_user = create_test_user(&mut tx, &generate_unique_email(), password, "student").await;
    let student = create_test_student(&mut tx, student_user.id, None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let admin_token = get_auth_token(app, &admin_email, password).await;
    let structure_id = create_structure(&pool, &admin_token, "Lab Fee").await;

    let app = setup_test_app(pool.clone()).await;
    let accountant_token = get_auth_token(app, &accountant_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/fees/transactions")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", accountant_token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "fee_structure_id": structure_id,
                "student_id": student.id,
                "amount_paid": 750.0,
                "payment_method": "cash",
                "payment_status": "completed"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["amount_paid"], 750.0);
    assert_eq!(body["collected_by_id"], accountant.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]

async fn test_transaction_rejects_nonpositive_amount(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    let student_user = create_test_user(&mut tx, &generate_unique_email(), password, "student").await;
    let student = create_test_student(&mut tx, student_user.id, None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, password).await;
    let structure_id = create_structure(&pool, &token, "Bus Fee").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/fees/transactions")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "fee_structure_id": structure_id,
                "student_id": student.id,
                "amount_paid": 0.0
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]

async fn test_student_sees_own_transactions(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin_email = generate_unique_email();
    let student_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    let student_user = create_test_user(&mut tx, &student_email, password, "student").await;
    let student = create_test_student(&mut tx, student_user.id, None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let admin_token = get_auth_token(app, &admin_email, password).await;
    let structure_id = create_structure(&pool, &admin_token, "Sports Levy").await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/fees/transactions")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", admin_token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "fee_structure_id": structure_id,
                "student_id": student.id,
                "amount_paid": 200.0,
                "payment_status": "completed"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = setup_test_app(pool.clone()).await;
    let student_token = get_auth_token(app, &student_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/fees/transactions/me")
        .header("authorization", format!("Bearer {}", student_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["amount_paid"], 200.0);

    // The fee desk listing is off-limits to students
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/fees/transactions")
        .header("authorization", format!("Bearer {}", student_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
