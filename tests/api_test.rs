// End-to-end tests: real server on an ephemeral port, real SQLite file,
// exercised through the client task manager and raw HTTP.

use std::sync::Arc;

use chrono::{Duration, Utc};
use taskline::rest::{self, AppState};
use taskline::{Database, Task, TaskManager};

async fn spawn_server() -> (String, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tasks.db");
    let db = Database::new(db_path.to_str().unwrap()).unwrap();
    let state = Arc::new(AppState::new(db));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, rest::build_router(state))
            .await
            .unwrap();
    });

    // TempDir must outlive the test or the database file disappears
    (format!("http://{}", addr), dir)
}

#[tokio::test]
async fn add_then_get_round_trips_the_task() {
    let (url, _dir) = spawn_server().await;
    let manager = TaskManager::new(&url);

    let mut task = Task::new("Buy milk".to_string());
    task.private = true;
    let id = manager.add_task(&task).await.unwrap();

    let fetched = manager.get_task(id).await.unwrap();
    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.description, "Buy milk");
    assert!(fetched.private);
    assert!(!fetched.important);
}

#[tokio::test]
async fn post_returns_201_with_location_header() {
    let (url, _dir) = spawn_server().await;

    let response = reqwest::Client::new()
        .post(format!("{url}/tasks"))
        .json(&serde_json::json!({ "description": "Buy milk", "privateTask": true }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("/tasks/"));

    let fetched: Task = reqwest::get(format!("{url}{location}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.description, "Buy milk");
    assert!(fetched.private);
}

#[tokio::test]
async fn post_with_empty_description_is_rejected_before_the_store() {
    let (url, _dir) = spawn_server().await;

    let response = reqwest::Client::new()
        .post(format!("{url}/tasks"))
        .json(&serde_json::json!({ "description": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["param"], "description");

    // Nothing reached the store
    let mut manager = TaskManager::new(&url);
    assert!(manager.get_all_tasks().await.unwrap().is_empty());
}

#[tokio::test]
async fn validation_errors_surface_as_one_joined_message() {
    let (url, _dir) = spawn_server().await;
    let manager = TaskManager::new(&url);

    let err = manager.add_task(&Task::new(String::new())).await.unwrap_err();
    match err {
        taskline::client::ClientError::Validation(msg) => {
            assert!(msg.contains("'description'"), "unexpected message: {msg}");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn put_of_nonexistent_id_is_404() {
    let (url, _dir) = spawn_server().await;

    let response = reqwest::Client::new()
        .put(format!("{url}/tasks/999"))
        .json(&serde_json::json!({ "description": "still valid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Through the client it becomes the NotFound kind
    let manager = TaskManager::new(&url);
    let mut task = Task::new("still valid".to_string());
    task.id = Some(999);
    let err = manager.update_task(&task).await.unwrap_err();
    assert!(matches!(err, taskline::client::ClientError::NotFound));
}

#[tokio::test]
async fn update_replaces_fields_but_not_the_id() {
    let (url, _dir) = spawn_server().await;
    let manager = TaskManager::new(&url);

    let id = manager.add_task(&Task::new("before".to_string())).await.unwrap();

    let mut edited = Task::new("after".to_string());
    edited.id = Some(id);
    edited.important = true;
    manager.update_task(&edited).await.unwrap();

    let fetched = manager.get_task(id).await.unwrap();
    assert_eq!(fetched.id, Some(id));
    assert_eq!(fetched.description, "after");
    assert!(fetched.important);
}

#[tokio::test]
async fn delete_is_204_then_404() {
    let (url, _dir) = spawn_server().await;
    let manager = TaskManager::new(&url);

    let id = manager.add_task(&Task::new("short-lived".to_string())).await.unwrap();

    let response = reqwest::Client::new()
        .delete(format!("{url}/tasks/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    // Deleting again reports not-found, not a store error
    let err = manager.delete_task(id).await.unwrap_err();
    assert!(matches!(err, taskline::client::ClientError::NotFound));

    let response = reqwest::get(format!("{url}/tasks/{id}")).await.unwrap();
    assert_eq!(response.status(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Task not found.");
}

#[tokio::test]
async fn filter_query_narrows_the_list() {
    let (url, _dir) = spawn_server().await;
    let manager = TaskManager::new(&url);

    let mut urgent = Task::new("urgent".to_string());
    urgent.important = true;
    urgent.deadline = Some(Utc::now() + Duration::days(3));
    manager.add_task(&urgent).await.unwrap();
    manager.add_task(&Task::new("plain".to_string())).await.unwrap();

    let important: Vec<Task> = reqwest::get(format!("{url}/tasks?filter=important"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(important.len(), 1);
    assert_eq!(important[0].description, "urgent");
    assert!(important.iter().all(|t| t.important));

    let next_week: Vec<Task> = reqwest::get(format!("{url}/tasks?filter=nextweek"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(next_week.len(), 1);
    assert_eq!(next_week[0].description, "urgent");

    // Unknown filter names return the unfiltered list
    let all: Vec<Task> = reqwest::get(format!("{url}/tasks?filter=bogus"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn client_cache_feeds_the_filter_views() {
    let (url, _dir) = spawn_server().await;
    let mut manager = TaskManager::new(&url);

    let mut chores = Task::new("laundry".to_string());
    chores.project = Some("home".to_string());
    chores.private = true;
    manager.add_task(&chores).await.unwrap();

    let mut report = Task::new("report".to_string());
    report.project = Some("work".to_string());
    report.important = true;
    manager.add_task(&report).await.unwrap();

    manager.get_all_tasks().await.unwrap();

    assert_eq!(manager.projects(), vec!["home".to_string(), "work".to_string()]);
    assert_eq!(manager.by_project("home").len(), 1);
    assert_eq!(manager.important().len(), 1);
    assert_eq!(manager.private_tasks().len(), 1);
    assert_eq!(manager.shared().len(), 1);
}
