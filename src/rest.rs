// REST API for the task store.
//
// Routes:
//   GET    /tasks?filter=<name>
//   POST   /tasks
//   GET    /tasks/{id}
//   PUT    /tasks/{id}
//   DELETE /tasks/{id}

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::database::{Database, DatabaseError};
use crate::filters::Filter;
use crate::models::Task;

/// Shared state handed to every handler. SQLite calls are short blocking
/// operations, so a single async mutex around the connection is enough to
/// serialize them.
pub struct AppState {
    db: Mutex<Database>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }
}

pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("REST API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn server_error(err: DatabaseError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "errors": [{ "param": "Server", "msg": err.to_string() }] })),
    )
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Task not found." })),
    )
}

/// 422 payload in the `{errors: [{msg, param}]}` shape the client expects.
fn validation_error(param: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "errors": [{ "msg": "Invalid value", "param": param }] })),
    )
}

/// Required-field validation, run before any store access.
fn validate(task: &Task) -> Result<(), (StatusCode, Json<Value>)> {
    if task.description.trim().is_empty() {
        return Err(validation_error("description"));
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct ListParams {
    filter: Option<String>,
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Task>>, (StatusCode, Json<Value>)> {
    // Unknown filter names fall through to the unfiltered list
    let filter = params.filter.as_deref().and_then(Filter::parse);
    let db = state.db.lock().await;
    match db.get_tasks(filter.as_ref()) {
        Ok(tasks) => Ok(Json(tasks)),
        Err(e) => Err(server_error(e)),
    }
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, (StatusCode, Json<Value>)> {
    let db = state.db.lock().await;
    match db.get_task(id) {
        Ok(Some(task)) => Ok(Json(task)),
        Ok(None) => Err(not_found()),
        Err(e) => Err(server_error(e)),
    }
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(task): Json<Task>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    validate(&task)?;

    let db = state.db.lock().await;
    match db.insert_task(&task) {
        Ok(id) => Ok((
            StatusCode::CREATED,
            [(header::LOCATION, format!("/tasks/{id}"))],
        )),
        Err(e) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(task): Json<Task>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    validate(&task)?;

    let db = state.db.lock().await;
    match db.update_task(id, &task) {
        Ok(true) => Ok(StatusCode::OK),
        Ok(false) => Err(not_found()),
        Err(e) => Err(server_error(e)),
    }
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let db = state.db.lock().await;
    match db.delete_task(id) {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(not_found()),
        Err(e) => Err(server_error(e)),
    }
}
