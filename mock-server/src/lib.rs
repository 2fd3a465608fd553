use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub invite_code: String,
    pub owner: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserView {
    pub email: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct CreateGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Sessions and groups held in memory. Tokens map to the owning email.
#[derive(Debug, Default)]
pub struct Store {
    pub access_tokens: HashMap<String, String>,
    pub refresh_tokens: HashMap<String, String>,
    pub groups: HashMap<Uuid, Group>,
}

pub type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, &'static str);

const UNAUTHORIZED: Failure = (StatusCode::UNAUTHORIZED, "Unauthorized");

pub fn app() -> Router {
    router(Db::default())
}

/// Build the router over an existing store, so tests can inspect or seed it.
pub fn router(db: Db) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh))
        .route("/api/logout", post(logout))
        .route("/api/groups", get(list_groups).post(create_group))
        .route("/api/groups/{id}", delete(delete_group))
        .route("/admin/expire", post(expire_sessions))
        .route("/admin/revoke", post(revoke_sessions))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value)).path("/").http_only(true).build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

/// Resolve the caller's email from the access cookie.
fn authenticated(store: &Store, jar: &CookieJar) -> Result<String, Failure> {
    jar.get(ACCESS_COOKIE)
        .and_then(|cookie| store.access_tokens.get(cookie.value()))
        .cloned()
        .ok_or(UNAUTHORIZED)
}

async fn health() -> &'static str {
    "OK"
}

async fn login(
    State(db): State<Db>,
    jar: CookieJar,
    Json(input): Json<Login>,
) -> Result<(CookieJar, Json<UserView>), Failure> {
    if input.email.is_empty() || input.password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Email and password are required"));
    }

    let access = new_token();
    let refresh = new_token();
    let mut store = db.write().await;
    store.access_tokens.insert(access.clone(), input.email.clone());
    store.refresh_tokens.insert(refresh.clone(), input.email.clone());
    info!(email = %input.email, "session opened");

    let jar = jar
        .add(session_cookie(ACCESS_COOKIE, access))
        .add(session_cookie(REFRESH_COOKIE, refresh));
    Ok((jar, Json(UserView { email: input.email })))
}

async fn refresh(
    State(db): State<Db>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), Failure> {
    let mut store = db.write().await;
    let email = jar
        .get(REFRESH_COOKIE)
        .and_then(|cookie| store.refresh_tokens.get(cookie.value()))
        .cloned()
        .ok_or(UNAUTHORIZED)?;

    let access = new_token();
    store.access_tokens.insert(access.clone(), email);
    debug!("access token renewed");
    Ok((jar.add(session_cookie(ACCESS_COOKIE, access)), StatusCode::NO_CONTENT))
}

async fn logout(State(db): State<Db>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut store = db.write().await;
    if let Some(cookie) = jar.get(ACCESS_COOKIE) {
        store.access_tokens.remove(cookie.value());
    }
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        store.refresh_tokens.remove(cookie.value());
    }
    let jar = jar
        .remove(removal_cookie(ACCESS_COOKIE))
        .remove(removal_cookie(REFRESH_COOKIE));
    (jar, StatusCode::NO_CONTENT)
}

async fn list_groups(State(db): State<Db>, jar: CookieJar) -> Result<Json<Vec<Group>>, Failure> {
    let store = db.read().await;
    let email = authenticated(&store, &jar)?;
    let mut groups: Vec<Group> = store
        .groups
        .values()
        .filter(|group| group.owner == email)
        .cloned()
        .collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(groups))
}

async fn create_group(
    State(db): State<Db>,
    jar: CookieJar,
    Json(input): Json<CreateGroup>,
) -> Result<(StatusCode, Json<Group>), Failure> {
    let mut store = db.write().await;
    let email = authenticated(&store, &jar)?;
    if input.name.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Group name is required"));
    }

    let id = Uuid::new_v4();
    let group = Group {
        id,
        name: input.name,
        description: input.description,
        invite_code: id.simple().to_string()[..6].to_ascii_uppercase(),
        owner: email,
    };
    store.groups.insert(id, group.clone());
    Ok((StatusCode::CREATED, Json(group)))
}

async fn delete_group(
    State(db): State<Db>,
    jar: CookieJar,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    let email = authenticated(&store, &jar)?;
    let owned = store.groups.get(&id).is_some_and(|group| group.owner == email);
    if !owned {
        return Err((StatusCode::NOT_FOUND, "Group not found"));
    }
    store.groups.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

/// Drop every access token, as if they all timed out.
async fn expire_sessions(State(db): State<Db>) -> StatusCode {
    db.write().await.access_tokens.clear();
    StatusCode::NO_CONTENT
}

/// Drop every access and refresh token, forcing a fresh login.
async fn revoke_sessions(State(db): State<Db>) -> StatusCode {
    let mut store = db.write().await;
    store.access_tokens.clear();
    store.refresh_tokens.clear();
    StatusCode::NO_CONTENT
}
