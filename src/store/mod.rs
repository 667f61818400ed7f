pub mod dto;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::models::{NewTaskRequest, Task, TaskId, UpdateTaskRequest};

pub use memory::MemoryTaskStore;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// The remote task store. All reads and writes of tasks go through here.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_tasks(&self) -> Result<Vec<Task>, PlannerError>;
    async fn create_task(&self, request: &NewTaskRequest) -> Result<Task, PlannerError>;
    async fn update_task(&self, id: &TaskId, request: &UpdateTaskRequest) -> Result<Task, PlannerError>;
    async fn delete_task(&self, id: &TaskId) -> Result<(), PlannerError>;
    async fn acknowledge_task(&self, id: &TaskId) -> Result<Task, PlannerError>;
}

pub struct HttpTaskStore {
    client: Client,
    config: StoreConfig,
}

impl HttpTaskStore {
    pub fn new(config: StoreConfig) -> Result<Self, PlannerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PlannerError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response, PlannerError> {
        let response = request.send().await.map_err(|e| {
            warn!("{} failed before a response arrived: {}", operation, e);
            PlannerError::from(e)
        })?;

        let status = response.status();
        debug!("{} -> {}", operation, status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<dto::ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.detail_text());
        warn!("{} rejected with {}: {:?}", operation, status, detail);

        Err(PlannerError::Transport {
            status: Some(status.as_u16()),
            detail,
            reason: format!("Request failed with status code {}", status.as_u16()),
        })
    }

    async fn send_for_task(&self, request: RequestBuilder, operation: &str) -> Result<Task, PlannerError> {
        let response = self.send(request, operation).await?;
        let body: dto::TaskResponse = response.json().await?;
        Ok(body.task)
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn list_tasks(&self) -> Result<Vec<Task>, PlannerError> {
        let request = self.client.get(self.url("/tasks/"));
        let response = self.send(request, "list tasks").await?;
        let body: dto::TaskListResponse = response.json().await?;
        Ok(body.tasks)
    }

    async fn create_task(&self, request: &NewTaskRequest) -> Result<Task, PlannerError> {
        let request = self.client.post(self.url("/tasks/")).json(request);
        self.send_for_task(request, "create task").await
    }

    async fn update_task(&self, id: &TaskId, request: &UpdateTaskRequest) -> Result<Task, PlannerError> {
        let request = self
            .client
            .put(self.url(&format!("/tasks/{}", id)))
            .json(request);
        self.send_for_task(request, "update task").await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), PlannerError> {
        // 204 with no body and 200 with `{}` are both success.
        let request = self.client.delete(self.url(&format!("/tasks/{}", id)));
        self.send(request, "delete task").await?;
        Ok(())
    }

    async fn acknowledge_task(&self, id: &TaskId) -> Result<Task, PlannerError> {
        let request = self
            .client
            .post(self.url(&format!("/tasks/{}/acknowledge", id)));
        self.send_for_task(request, "acknowledge task").await
    }
}
