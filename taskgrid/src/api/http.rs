//! reqwest-backed [`TaskApi`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskgrid_proto::routes::{Endpoint, Method, RouteStyle};
use taskgrid_proto::wire::{CreateColumnRequest, DeleteTaskRequest, ErrorBody, MoveTaskRequest};
use taskgrid_proto::{Column, ColumnId, NewTask, Task, TaskId};
use url::Url;

use super::{ApiError, Operation, TaskApi};
use crate::config::ClientConfig;

/// HTTP client for the task service.
///
/// Holds a pooled [`reqwest::Client`]; cloning is cheap and shares the pool.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    base_url: Url,
    route_style: RouteStyle,
    client: reqwest::Client,
}

impl HttpTaskApi {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the URL does not parse or is
    /// not `http`/`https`, and [`ApiError::ClientSetup`] if the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: &str,
        route_style: RouteStyle,
        request_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "expected an http or https URL".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ApiError::ClientSetup(e.to_string()))?;

        Ok(Self {
            base_url: parsed,
            route_style,
            client,
        })
    }

    /// Creates a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// See [`HttpTaskApi::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.route_style, config.request_timeout)
    }

    /// Returns the base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the route variant in use.
    #[must_use]
    pub const fn route_style(&self) -> RouteStyle {
        self.route_style
    }

    /// Issues one request and returns the body of a success response.
    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        operation: Operation,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = endpoint.url(&self.base_url);
        let mut request = self.client.request(to_reqwest_method(endpoint.method), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let transport = |e: reqwest::Error| ApiError::Transport {
            operation,
            message: e.to_string(),
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;

        tracing::debug!(
            operation = %operation,
            endpoint = %endpoint,
            status = status.as_u16(),
            body_len = bytes.len(),
            "task service responded"
        );

        if !status.is_success() {
            let message = ErrorBody::message_from(&bytes)
                .unwrap_or_else(|| operation.failure_message().to_string());
            return Err(ApiError::Status {
                operation,
                status: status.as_u16(),
                message,
            });
        }

        Ok(bytes.to_vec())
    }

    async fn send_empty(
        &self,
        operation: Operation,
        endpoint: &Endpoint,
    ) -> Result<Vec<u8>, ApiError> {
        self.send::<()>(operation, endpoint, None).await
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Parses a success body into a typed entity.
fn decode<T: DeserializeOwned>(operation: Operation, body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decode {
        operation,
        message: e.to_string(),
    })
}

/// Parses a confirmation body; an empty body counts as `null`.
fn confirmation(operation: Operation, body: &[u8]) -> Result<serde_json::Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    decode(operation, body)
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn fetch_columns(&self) -> Result<Vec<Column>, ApiError> {
        let op = Operation::LoadBoard;
        let body = self.send_empty(op, &Endpoint::list_columns()).await?;
        decode(op, &body)
    }

    async fn create_column(&self, title: &str) -> Result<Column, ApiError> {
        let op = Operation::CreateColumn;
        let request = CreateColumnRequest {
            title: title.to_string(),
        };
        let body = self
            .send(op, &Endpoint::create_column(), Some(&request))
            .await?;
        decode(op, &body)
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<serde_json::Value, ApiError> {
        let op = Operation::DeleteColumn;
        let body = self.send_empty(op, &Endpoint::delete_column(id)).await?;
        confirmation(op, &body)
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        let op = Operation::CreateTask;
        let body = self.send(op, &Endpoint::create_task(), Some(task)).await?;
        decode(op, &body)
    }

    async fn update_task(&self, task: &Task) -> Result<Task, ApiError> {
        let op = Operation::UpdateTask;
        let endpoint = Endpoint::update_task(self.route_style, &task.id);
        let body = self.send(op, &endpoint, Some(task)).await?;
        decode(op, &body)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<serde_json::Value, ApiError> {
        let op = Operation::DeleteTask;
        let endpoint = Endpoint::delete_task(self.route_style, id);
        let body = if self.route_style.delete_sends_body() {
            let request = DeleteTaskRequest { id: id.clone() };
            self.send(op, &endpoint, Some(&request)).await?
        } else {
            self.send_empty(op, &endpoint).await?
        };
        confirmation(op, &body)
    }

    async fn move_task(
        &self,
        id: &TaskId,
        target: &ColumnId,
    ) -> Result<serde_json::Value, ApiError> {
        let op = Operation::MoveTask;
        let request = MoveTaskRequest {
            task_id: id.clone(),
            new_column_id: target.clone(),
        };
        let body = self.send(op, &Endpoint::move_task(), Some(&request)).await?;
        confirmation(op, &body)
    }
}
