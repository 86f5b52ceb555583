mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_test_user, generate_unique_email, get_auth_token, setup_test_app};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]

async fn test_template_crud(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &admin_email, password).await;

    let payload = json!({
        "name": "welcome",
        "subject": "Welcome to Slateworks",
        "body_html": "<p>Hello {{name}}</p>",
        "email_type": "welcome"
    });

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/email/templates")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&payload).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let template_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["name"], "welcome");

    // Duplicate name is rejected
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/email/templates")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&payload).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Template with this name already exists");

    // Update then delete
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/email/templates/{}", template_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({"subject": "Welcome aboard"})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["subject"], "Welcome aboard");

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/email/templates/{}", template_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/email/templates/{}", template_id))
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]

async fn test_templates_admin_only(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &teacher_email, password, "teacher").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &teacher_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/email/templates")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]

async fn test_send_email_queues_notifications(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &teacher_email, password, "teacher").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &teacher_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/email/send")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "to_emails": ["parent1@example.com", "parent2@example.com"],
                "subject": "Field trip reminder",
                "body": "Please sign the permission slip."
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["recipient_email"], "parent1@example.com");
    assert_eq!(body["subject"], "Field trip reminder");

    // One row per recipient; delivery happens in the background, so only
    // the row count is stable here.
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM email_notifications WHERE subject = $1")
            .bind("Field trip reminder")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 2);
}

#[sqlx::test(migrations = "./migrations")]

async fn test_send_email_rejects_empty_recipients(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &teacher_email, password, "teacher").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &teacher_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/email/send")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "to_emails": [],
                "subject": "Empty",
                "body": "No one will read this."
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]

async fn test_notification_access(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let sender_email = generate_unique_email();
    let other_email = generate_unique_email();
    let admin_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &sender_email, password, "teacher").await;
    create_test_user(&mut tx, &other_email, password, "teacher").await;
    create_test_user(&mut tx, &admin_email, password, "admin").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let sender_token = get_auth_token(app, &sender_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/email/send")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", sender_token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "to_emails": ["someone@example.com"],
                "subject": "Private note",
                "body": "For the sender's eyes."
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let notification_id = body["id"].as_str().unwrap().to_string();

    // The sender can read their own notification
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/email/notifications/{}", notification_id))
        .header("authorization", format!("Bearer {}", sender_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Another teacher cannot
    let app = setup_test_app(pool.clone()).await;
    let other_token = get_auth_token(app, &other_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/email/notifications/{}", notification_id))
        .header("authorization", format!("Bearer {}", other_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admins see the full log
    let app = setup_test_app(pool.clone()).await;
    let admin_token = get_auth_token(app, &admin_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/email/notifications")
        .header("authorization", format!("Bearer {}", admin_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(!body["data"].as_array().unwrap().is_empty());
}
