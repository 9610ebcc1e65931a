use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, router, AppState, User};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

const ALEX: &str = r#"{"first_name":"Alex","last_name":"Taylor","email":"alex@example.com","phone_number":"1234567890"}"#;

// --- list ---

#[tokio::test]
async fn list_users_empty() {
    let resp = app().oneshot(empty_request("GET", "/users/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["data"], Value::Array(Vec::new()));
    assert_eq!(body["total_count"], 0);
    assert_eq!(body["total_pages"], 0);
}

#[tokio::test]
async fn list_users_paginates_in_insertion_order() {
    let state = AppState::new();
    for i in 0..13 {
        state
            .insert(&format!("User{i}"), "Test", &format!("u{i}@example.com"), "1234567890")
            .await;
    }

    let resp = router(state.clone())
        .oneshot(empty_request("GET", "/users/?page=3&page_size=6"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let data: Vec<User> = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].first_name, "User12");
    assert_eq!(body["total_count"], 13);
    assert_eq!(body["total_pages"], 3);
}

#[tokio::test]
async fn list_users_rejects_page_zero() {
    let resp = app()
        .oneshot(empty_request("GET", "/users/?page=0&page_size=6"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Page must be greater than or equal to 1");
}

#[tokio::test]
async fn list_users_rejects_oversized_page() {
    let resp = app()
        .oneshot(empty_request("GET", "/users/?page=1&page_size=101"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Page size must not exceed 100");
}

// --- create ---

#[tokio::test]
async fn create_user_returns_201_with_envelope() {
    let resp = app().oneshot(json_request("POST", "/users/", ALEX)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "User created successfully");
    let user: User = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(user.first_name, "Alex");
    assert!(user.profile_photo.is_none());
}

#[tokio::test]
async fn create_user_malformed_json_is_rejected() {
    let resp = app()
        .oneshot(json_request("POST", "/users/", r#"{"first_name":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- update ---

#[tokio::test]
async fn update_user_not_found() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/users/00000000-0000-0000-0000-000000000000",
            r#"{"first_name":"Nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn update_user_bad_uuid_returns_400() {
    let resp = app()
        .oneshot(json_request("PUT", "/users/not-a-uuid", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_user_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/users/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- health ---

#[tokio::test]
async fn ping_returns_pong() {
    let resp = app().oneshot(empty_request("GET", "/health/ping")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: String = body_json(resp).await;
    assert_eq!(body, "Pong");
}

#[tokio::test]
async fn database_check_follows_toggle() {
    let state = AppState::new();

    let resp = router(state.clone())
        .oneshot(empty_request("GET", "/health/test-database"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "success");

    state.set_database_available(false);
    let resp = router(state)
        .oneshot(empty_request("GET", "/health/test-database"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "database is unavailable");
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let state = AppState::new();

    // create
    let resp = router(state.clone())
        .oneshot(json_request("POST", "/users/", ALEX))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = body_json(resp).await;
    let created: User = serde_json::from_value(body["data"].clone()).unwrap();
    let id = created.id;

    // update: only the email
    let resp = router(state.clone())
        .oneshot(json_request(
            "PUT",
            &format!("/users/{id}"),
            r#"{"email":"alex.t@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    let updated: User = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(updated.email, "alex.t@example.com");
    assert_eq!(updated.first_name, "Alex"); // unchanged

    // list shows the update
    let resp = router(state.clone())
        .oneshot(empty_request("GET", "/users/?page=1&page_size=6"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    let users: Vec<User> = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(users, vec![updated]);

    // delete
    let resp = router(state.clone())
        .oneshot(empty_request("DELETE", &format!("/users/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // delete again: 404
    let resp = router(state.clone())
        .oneshot(empty_request("DELETE", &format!("/users/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: empty
    let resp = router(state)
        .oneshot(empty_request("GET", "/users/"))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["total_count"], 0);
}
