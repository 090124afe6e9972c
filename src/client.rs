use chrono::Utc;
use reqwest::{Response, StatusCode};
use thiserror::Error;

use crate::filters;
use crate::models::Task;

/// Unified client-side error, tagged by kind so callers never have to
/// inspect raw response bodies.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server-side field validation failed; the message joins the
    /// per-field errors into one string.
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("task not found")]
    NotFound,
    #[error("server error: {0}")]
    Server(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("cannot parse server response")]
    UnexpectedResponse,
}

/// HTTP mirror of the server contract. Caches the last-fetched task list so
/// the filter views can run synchronously without another round trip; any
/// mutation leaves the cache stale until the caller re-fetches.
pub struct TaskManager {
    http: reqwest::Client,
    base_url: String,
    tasks: Vec<Task>,
}

impl TaskManager {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            tasks: Vec::new(),
        }
    }

    /// Fetch the full task list from the server and replace the cache.
    pub async fn get_all_tasks(&mut self) -> Result<&[Task], ClientError> {
        let response = self
            .http
            .get(format!("{}/tasks", self.base_url))
            .send()
            .await?;
        if response.status().is_success() {
            self.tasks = response
                .json()
                .await
                .map_err(|_| ClientError::UnexpectedResponse)?;
            Ok(&self.tasks)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    /// The cached task list from the last successful fetch.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn important(&self) -> Vec<Task> {
        filters::important(&self.tasks)
    }

    pub fn today(&self) -> Vec<Task> {
        filters::today(&self.tasks, Utc::now())
    }

    pub fn next_week(&self) -> Vec<Task> {
        filters::next_week(&self.tasks, Utc::now())
    }

    pub fn private_tasks(&self) -> Vec<Task> {
        filters::private_tasks(&self.tasks)
    }

    pub fn shared(&self) -> Vec<Task> {
        filters::shared(&self.tasks)
    }

    pub fn projects(&self) -> Vec<String> {
        filters::projects(&self.tasks)
    }

    pub fn by_project(&self, name: &str) -> Vec<Task> {
        filters::by_project(&self.tasks, name)
    }

    /// Fetch a single task by id.
    pub async fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        let response = self
            .http
            .get(format!("{}/tasks/{id}", self.base_url))
            .send()
            .await?;
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|_| ClientError::UnexpectedResponse)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    /// Create a task on the server; returns the id the store assigned,
    /// parsed from the Location header of the 201 response.
    pub async fn add_task(&self, task: &Task) -> Result<i64, ClientError> {
        let response = self
            .http
            .post(format!("{}/tasks", self.base_url))
            .json(task)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|loc| loc.rsplit('/').next())
            .and_then(|id| id.parse().ok())
            .ok_or(ClientError::UnexpectedResponse)
    }

    /// Replace an existing task's fields. The task must carry an id.
    pub async fn update_task(&self, task: &Task) -> Result<(), ClientError> {
        let id = task
            .id
            .ok_or_else(|| ClientError::Validation("task has no id".to_string()))?;
        let response = self
            .http
            .put(format!("{}/tasks/{id}", self.base_url))
            .json(task)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    /// Delete a task by id.
    pub async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}/tasks/{id}", self.base_url))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    /// Normalize a non-success response into a tagged error. Recognizes the
    /// server's `{errors: [{msg, param}]}` and `{error}` payloads; anything
    /// else is an unexpected-response error.
    async fn error_from_response(response: Response) -> ClientError {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return ClientError::NotFound;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return ClientError::UnexpectedResponse,
        };

        if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
            let joined = errors
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!(
                        "{i}. {} for '{}'",
                        e.get("msg").and_then(|m| m.as_str()).unwrap_or("invalid"),
                        e.get("param").and_then(|p| p.as_str()).unwrap_or("?"),
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            return if status == StatusCode::UNPROCESSABLE_ENTITY {
                ClientError::Validation(joined)
            } else {
                ClientError::Server(joined)
            };
        }

        if let Some(message) = body.get("error").and_then(|e| e.as_str()) {
            return ClientError::Server(message.to_string());
        }

        ClientError::UnexpectedResponse
    }
}
