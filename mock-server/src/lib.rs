use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// Base64 text, stored as received.
    pub profile_photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub profile_photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

/// In-memory store, kept in insertion order.
#[derive(Clone)]
pub struct AppState {
    users: Arc<RwLock<Vec<User>>>,
    database_up: Arc<AtomicBool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            users: Arc::new(RwLock::new(Vec::new())),
            database_up: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `/health/test-database` report failure (or recover).
    pub fn set_database_available(&self, available: bool) {
        self.database_up.store(available, Ordering::SeqCst);
    }

    pub async fn insert(&self, first_name: &str, last_name: &str, email: &str, phone_number: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone_number: phone_number.to_string(),
            profile_photo: None,
        };
        self.users.write().await.push(user.clone());
        user
    }

    /// Demo records for an empty store.
    pub async fn seed(&self) {
        let people = [
            ("Alex", "Taylor", "1234567890"),
            ("Jordan", "Lee", "0987654321"),
            ("Casey", "Morgan", "1122334455"),
            ("Taylor", "Parker", "2233445566"),
            ("Morgan", "Reed", "3344556677"),
            ("Riley", "Quinn", "4455667788"),
            ("Jamie", "Brooks", "5566778899"),
        ];
        if !self.users.read().await.is_empty() {
            return;
        }
        for (first, last, phone) in people {
            let email = format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase());
            self.insert(first, last, &email, phone).await;
        }
    }
}

pub fn app() -> Router {
    router(AppState::new())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/users/", get(list_users).post(create_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/health/ping", get(ping))
        .route("/health/test-database", get(test_database))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

async fn list_users(State(state): State<AppState>, Query(params): Query<Pagination>) -> Response {
    if params.page < 1 {
        return detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Page must be greater than or equal to 1",
        );
    }
    if params.page_size < 1 {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "Page size must be at least 1");
    }
    if params.page_size > 100 {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "Page size must not exceed 100");
    }

    let users = state.users.read().await;
    let offset = (params.page as usize - 1) * params.page_size as usize;
    let data: Vec<User> = users
        .iter()
        .skip(offset)
        .take(params.page_size as usize)
        .cloned()
        .collect();
    let total_count = users.len();
    let total_pages = total_count.div_ceil(params.page_size as usize);

    Json(json!({
        "message": "Users fetched successfully",
        "data": data,
        "total_pages": total_pages,
        "total_count": total_count,
    }))
    .into_response()
}

async fn create_user(State(state): State<AppState>, Json(input): Json<UserInput>) -> Response {
    let user = User {
        id: Uuid::new_v4(),
        first_name: input.first_name.unwrap_or_default(),
        last_name: input.last_name.unwrap_or_default(),
        email: input.email.unwrap_or_default(),
        phone_number: input.phone_number.unwrap_or_default(),
        profile_photo: input.profile_photo,
    };
    info!("Creating user {}", user.id);
    state.users.write().await.push(user.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully", "data": user })),
    )
        .into_response()
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UserInput>,
) -> Response {
    let mut users = state.users.write().await;
    let Some(user) = users.iter_mut().find(|u| u.id == id) else {
        return detail(StatusCode::NOT_FOUND, "User not found");
    };
    if let Some(first_name) = input.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        user.last_name = last_name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(phone_number) = input.phone_number {
        user.phone_number = phone_number;
    }
    if let Some(photo) = input.profile_photo {
        user.profile_photo = Some(photo);
    }
    Json(json!({ "message": "User updated successfully", "data": user.clone() })).into_response()
}

async fn delete_user(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let mut users = state.users.write().await;
    let before = users.len();
    users.retain(|u| u.id != id);
    if users.len() == before {
        return detail(StatusCode::NOT_FOUND, "User not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn ping() -> Json<&'static str> {
    Json("Pong")
}

async fn test_database(State(state): State<AppState>) -> Response {
    if !state.database_up.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "database is unavailable");
    }
    Json(json!({
        "status": "success",
        "message": "Successfully connected to the database",
    }))
    .into_response()
}
