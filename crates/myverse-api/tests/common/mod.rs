//! In-process MyVerse API used by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use myverse_api::{ApiClient, SessionManager};
use myverse_core::models::LoginData;
use myverse_core::routes::Navigator;
use myverse_core::session::SessionStore;
use myverse_core::storage::MemoryStore;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const DEMO_EMAIL: &str = "demo@myverse.com";
pub const DEMO_PASSWORD: &str = "Demo123!";
pub const DEMO_TOKEN: &str = "abc";

type Shared = Arc<MockState>;

#[derive(Default)]
pub struct MockState {
    hits: Mutex<Vec<String>>,
    tokens: Mutex<HashSet<String>>,
    favorites: Mutex<Vec<Value>>,
    preferences: Mutex<Option<Value>>,
    /// Delay for `/content/recommendations`, applied after the auth check.
    pub slow_ms: AtomicU64,
}

impl MockState {
    /// Requests received for `method` + `path` (path without the `/api` prefix).
    pub fn hits(&self, method: &str, path: &str) -> usize {
        let wanted = format!("{method} /api{path}");
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|h| **h == wanted)
            .count()
    }

    pub fn revoke(&self, token: &str) {
        self.tokens.lock().unwrap().remove(token);
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        match token {
            Some(t) if self.tokens.lock().unwrap().contains(t) => Ok(()),
            _ => Err(error(StatusCode::UNAUTHORIZED, "Token has expired")),
        }
    }
}

pub struct TestServer {
    pub base_url: String,
    pub state: Shared,
}

impl TestServer {
    pub async fn new() -> Self {
        let state = Arc::new(MockState::default());
        state.tokens.lock().unwrap().insert(DEMO_TOKEN.to_string());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    /// A fresh, signed-out session against this server.
    pub fn session(&self) -> (SessionManager, Arc<MemoryStore>) {
        self.session_with(Arc::new(MemoryStore::new()))
    }

    pub fn session_with(&self, storage: Arc<MemoryStore>) -> (SessionManager, Arc<MemoryStore>) {
        let store = Arc::new(SessionStore::new(storage.clone()));
        let client = ApiClient::new(
            self.base_url.clone(),
            Duration::from_secs(5),
            store,
            Navigator::default(),
        )
        .unwrap();
        (SessionManager::new(client), storage)
    }

    /// A session signed in as the demo user.
    pub async fn signed_in(&self) -> (SessionManager, Arc<MemoryStore>) {
        let (manager, storage) = self.session();
        manager.initialize().await;
        manager.login(&demo_login()).await.unwrap();
        (manager, storage)
    }
}

pub fn demo_login() -> LoginData {
    LoginData {
        email: DEMO_EMAIL.into(),
        password: DEMO_PASSWORD.into(),
    }
}

pub fn demo_user() -> Value {
    json!({"id": 1, "username": "demo", "email": DEMO_EMAIL, "is_active": true})
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        .route("/api/auth/update-profile", put(update_profile))
        .route("/api/auth/preferences", get(get_preferences).post(save_preferences))
        .route("/api/content/search", get(search))
        .route("/api/content/trending", get(trending))
        .route("/api/content/recommendations", get(recommendations))
        .route("/api/content/favorites", get(list_favorites).post(add_favorite))
        .route("/api/content/favorites/:id", delete(remove_favorite))
        .route("/api/forum/posts", post(create_post))
        .route("/api/forum/posts/:id/comments", post(create_comment))
        .route("/api/forum/stats", get(forum_stats))
        .route("/api/friends", get(friends))
        .route("/api/friends/requests", get(friend_requests))
        .route("/api/friends/request", post(send_request))
        .route("/api/friends/requests/:id/accept", post(accept_request))
        .route("/api/friends/search", get(search_users))
        .route("/api/users/stats", get(user_stats))
        .route("/api/news", get(news))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    state
        .hits
        .lock()
        .unwrap()
        .push(format!("{} {}", req.method(), req.uri().path()));
    next.run(req).await
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["email"] == DEMO_EMAIL && body["password"] == DEMO_PASSWORD {
        state.tokens.lock().unwrap().insert(DEMO_TOKEN.to_string());
        Json(json!({
            "message": "Login successful",
            "access_token": DEMO_TOKEN,
            "user": demo_user(),
        }))
        .into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@myverse.com" {
        return error(StatusCode::BAD_REQUEST, "Email already registered");
    }
    state.tokens.lock().unwrap().insert("new-token".to_string());
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "access_token": "new-token",
            "user": {"id": 2, "username": body["username"], "email": body["email"]},
        })),
    )
        .into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    Json(json!({ "user": demo_user() })).into_response()
}

async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    if body["username"] == "taken" {
        return error(StatusCode::BAD_REQUEST, "Username already taken");
    }
    let mut user = demo_user();
    for field in ["username", "email", "bio", "avatar_url"] {
        if let Some(value) = body.get(field) {
            user[field] = value.clone();
        }
    }
    Json(json!({ "message": "Profile updated", "user": user })).into_response()
}

async fn get_preferences(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    let preferences = state.preferences.lock().unwrap().clone();
    Json(json!({ "preferences": preferences })).into_response()
}

async fn save_preferences(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    let saved = json!({
        "id": 5,
        "user_id": 1,
        "categories": body["categories"],
        "genres": body["genres"],
    });
    *state.preferences.lock().unwrap() = Some(saved.clone());
    Json(json!({ "message": "Preferences saved", "preferences": saved })).into_response()
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
    let q = params.get("q").cloned().unwrap_or_default();
    if q.starts_with("slow") {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    Json(json!({
        "results": [{"id": 603, "title": format!("{q} result"), "type": "movie"}],
        "total_results": 1,
        "query": q,
    }))
    .into_response()
}

async fn trending() -> Response {
    error(StatusCode::SERVICE_UNAVAILABLE, "Trending unavailable")
}

async fn recommendations(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let auth = state.authorize(&headers);
    let delay = state.slow_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if let Err(resp) = auth {
        return resp;
    }
    Json(json!({
        "results": [{"id": "1396", "title": "Breaking Bad", "type": "tv"}],
    }))
    .into_response()
}

async fn list_favorites(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    let favorites = state.favorites.lock().unwrap().clone();
    Json(json!({ "favorites": favorites })).into_response()
}

async fn add_favorite(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    let mut favorites = state.favorites.lock().unwrap();
    let exists = favorites.iter().any(|f| {
        f["content_type"] == body["content_type"] && f["content_id"] == body["content_id"]
    });
    if exists {
        return error(StatusCode::CONFLICT, "Content already in favorites");
    }
    let favorite = json!({
        "id": favorites.len() as i64 + 1,
        "content_type": body["content_type"],
        "content_id": body["content_id"],
        "content_title": body["content_title"],
    });
    favorites.push(favorite.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Added to favorites", "favorite": favorite })),
    )
        .into_response()
}

async fn remove_favorite(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    let mut favorites = state.favorites.lock().unwrap();
    let before = favorites.len();
    favorites.retain(|f| f["id"] != id);
    if favorites.len() == before {
        return error(StatusCode::NOT_FOUND, "Favorite not found");
    }
    Json(json!({ "message": "Removed from favorites" })).into_response()
}

async fn create_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "Post created",
            "post": {"id": 10, "title": body["title"], "content": body["content"]},
        })),
    )
        .into_response()
}

async fn create_comment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "comment": {"id": 1, "content": body["content"], "post_id": post_id},
        })),
    )
        .into_response()
}

async fn forum_stats() -> Response {
    Json(json!({
        "stats": {"total_posts": 3, "total_comments": 8, "total_users": 2},
        "popular_posts": [],
        "recent_posts": [],
    }))
    .into_response()
}

async fn friends(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    Json(json!({ "friends": [{"id": 7, "username": "neo"}] })).into_response()
}

async fn friend_requests(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    Json(json!({
        "requests": [{"id": 21, "sender_id": 8, "sender_username": "trinity", "status": "pending"}],
    }))
    .into_response()
}

async fn send_request(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Friend request sent" })),
    )
        .into_response()
}

async fn accept_request(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    Json(json!({ "message": "Friend request accepted" })).into_response()
}

async fn search_users(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    Json(json!({
        "users": [
            {"id": 9, "username": "morpheus", "friendship_status": "none"},
            {"id": 8, "username": "trinity", "friendship_status": "none"},
        ],
    }))
    .into_response()
}

async fn user_stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    Json(json!({
        "stats": {"favorite_movies": 2, "favorite_series": 1, "favorite_games": 0, "friends": 1},
    }))
    .into_response()
}

async fn news(Query(params): Query<HashMap<String, String>>) -> Response {
    let featured = params.get("featured").is_some_and(|v| v == "true");
    Json(json!({
        "news": [{
            "id": 4,
            "title": "Festival line-up announced",
            "content": "The full line-up is out.",
            "category": "movies",
            "is_featured": featured,
        }],
        "pagination": {"page": 1, "pages": 1, "per_page": 6, "total": 1},
    }))
    .into_response()
}
