mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_test_user, generate_unique_email, get_auth_token, setup_test_app};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn create_event(
    pool: &PgPool,
    token: &str,
    title: &str,
    is_public: bool,
) -> serde_json::Value {
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/calendar/events")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": title,
                "event_type": "meeting",
                "start_time": "2026-05-04T09:00:00Z",
                "end_time": "2026-05-04T10:00:00Z",
                "is_public": is_public
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[sqlx::test(migrations = "./migrations")]

async fn test_event_creation_and_validation(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let teacher_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &teacher_email, password, "teacher").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = get_auth_token(app, &teacher_email, password).await;

    let event = create_event(&pool, &token, "Parent-Teacher Meeting", true).await;
    assert_eq!(event["title"], "Parent-Teacher Meeting");
    assert_eq!(event["event_type"], "meeting");
    assert_eq!(event["is_public"], true);

    // end before start is rejected
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/calendar/events")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": "Time Travel",
                "event_type": "general",
                "start_time": "2026-05-04T10:00:00Z",
                "end_time": "2026-05-04T09:00:00Z"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown event_type is rejected
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/calendar/events")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(
            serde_json::to_string(&json!({
                "title": "Party",
                "event_type": "rave",
                "start_time": "2026-05-04T09:00:00Z",
                "end_time": "2026-05-04T10:00:00Z"
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]

async fn test_private_event_visibility(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let creator_email = generate_unique_email();
    let other_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &creator_email, password, "teacher").await;
    create_test_user(&mut tx, &other_email, password, "student").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let creator_token = get_auth_token(app, &creator_email, password).await;

    let event = create_event(&pool, &creator_token, "Grade Review", false).await;
    let event_id = event["id"].as_str().unwrap().to_string();

    // Creator sees it in their listing
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/calendar/events")
        .header("authorization", format!("Bearer {}", creator_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["id"] == event_id.as_str())
    );

    // Another user does not
    let app = setup_test_app(pool.clone()).await;
    let other_token = get_auth_token(app, &other_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/calendar/events")
        .header("authorization", format!("Bearer {}", other_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(
        !body["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["id"] == event_id.as_str())
    );

    // And cannot update it either
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/calendar/events/{}", event_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", other_token))
        .body(Body::from(
            serde_json::to_string(&json!({"title": "Hijacked"})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]

async fn test_attendees_and_rsvp(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let creator_email = generate_unique_email();
    let attendee_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &creator_email, password, "teacher").await;
    let attendee = create_test_user(&mut tx, &attendee_email, password, "student").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let creator_token = get_auth_token(app, &creator_email, password).await;

    let event = create_event(&pool, &creator_token, "Sports Day", true).await;
    let event_id = event["id"].as_str().unwrap().to_string();

    // Creator adds the attendee
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/calendar/events/{}/attendees", event_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", creator_token))
        .body(Body::from(
            serde_json::to_string(&json!({"user_id": attendee.id})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "pending");

    // Adding twice is rejected
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/calendar/events/{}/attendees", event_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", creator_token))
        .body(Body::from(
            serde_json::to_string(&json!({"user_id": attendee.id})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Attendee accepts
    let app = setup_test_app(pool.clone()).await;
    let attendee_token = get_auth_token(app, &attendee_email, password).await;

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/calendar/events/{}/attendees/me", event_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", attendee_token))
        .body(Body::from(
            serde_json::to_string(&json!({"status": "accepted"})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "accepted");

    // Unknown RSVP status is rejected
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/calendar/events/{}/attendees/me", event_id))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", attendee_token))
        .body(Body::from(
            serde_json::to_string(&json!({"status": "maybe"})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Attendee removes themselves
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("DELETE")
        .uri(format!(
            "/api/calendar/events/{}/attendees/{}",
            event_id, attendee.id
        ))
        .header("authorization", format!("Bearer {}", attendee_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/calendar/events/{}/attendees", event_id))
        .header("authorization", format!("Bearer {}", creator_token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(body.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]

async fn test_self_join_public_event(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let creator_email = generate_unique_email();
    let joiner_email = generate_unique_email();
    let password = "testpass123";
    create_test_user(&mut tx, &creator_email, password, "teacher").await;
    let joiner = create_test_user(&mut tx, &joiner_email, password, "student").await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let creator_token = get_auth_token(app, &creator_email, password).await;

    let public_event = create_event(&pool, &creator_token, "Open House", true).await;
    let private_event = create_event(&pool, &creator_token, "Staff Only", false).await;

    let app = setup_test_app(pool.clone()).await;
    let joiner_token = get_auth_token(app, &joiner_email, password).await;

    // Anyone may join a public event
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri(format!(
            "/api/calendar/events/{}/attendees",
            public_event["id"].as_str().unwrap()
        ))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", joiner_token))
        .body(Body::from(
            serde_json::to_string(&json!({"user_id": joiner.id})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // But not a private one
    let app = setup_test_app(pool.clone()).await;
    let request = Request::builder()
        .method("POST")
        .uri(format!(
            "/api/calendar/events/{}/attendees",
            private_event["id"].as_str().unwrap()
        ))
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", joiner_token))
        .body(Body::from(
            serde_json::to_string(&json!({"user_id": joiner.id})).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
