//! Client for the remote task service.
//!
//! [`TaskApi`] has one method per remote operation. It performs the network
//! call and nothing else: it never touches local board state, so a failed
//! call cannot leave the board half-updated.

pub mod http;

pub use http::HttpTaskApi;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use taskgrid_proto::{Column, ColumnId, NewTask, Task, TaskId};

/// A remote operation, used to label errors, logs, and notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Fetch every column with its tasks.
    LoadBoard,
    /// Create a column.
    CreateColumn,
    /// Delete a column.
    DeleteColumn,
    /// Create a task.
    CreateTask,
    /// Update a task.
    UpdateTask,
    /// Delete a task.
    DeleteTask,
    /// Move a task to another column.
    MoveTask,
}

impl Operation {
    /// Message used when the service gives no reason of its own.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::LoadBoard => "failed to load columns",
            Self::CreateColumn => "failed to create column",
            Self::DeleteColumn => "failed to delete column",
            Self::CreateTask => "failed to create task",
            Self::UpdateTask => "failed to update task",
            Self::DeleteTask => "failed to delete task",
            Self::MoveTask => "failed to move task",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadBoard => "load board",
            Self::CreateColumn => "create column",
            Self::DeleteColumn => "delete column",
            Self::CreateTask => "create task",
            Self::UpdateTask => "update task",
            Self::DeleteTask => "delete task",
            Self::MoveTask => "move task",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by a [`TaskApi`] call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, I/O).
    #[error("{operation}: request failed: {message}")]
    Transport {
        /// Operation that failed.
        operation: Operation,
        /// Underlying transport error.
        message: String,
    },

    /// The service answered with a non-success status.
    #[error("{operation}: {message} (HTTP {status})")]
    Status {
        /// Operation that failed.
        operation: Operation,
        /// HTTP status code.
        status: u16,
        /// Reason given by the service, or a default per operation.
        message: String,
    },

    /// A success response whose body could not be parsed.
    #[error("{operation}: malformed response: {message}")]
    Decode {
        /// Operation that failed.
        operation: Operation,
        /// Parser error.
        message: String,
    },

    /// The configured base URL is unusable.
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientSetup(String),
}

impl ApiError {
    /// Returns the operation this error belongs to, if any.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. } => Some(*operation),
            Self::InvalidBaseUrl { .. } | Self::ClientSetup(_) => None,
        }
    }
}

/// One method per remote operation of the task service.
///
/// Confirmation-only endpoints return the raw JSON body (`null` when the
/// body is empty).
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `GET /columns`
    async fn fetch_columns(&self) -> Result<Vec<Column>, ApiError>;

    /// `POST /columns`
    async fn create_column(&self, title: &str) -> Result<Column, ApiError>;

    /// `DELETE /columns/{id}`
    async fn delete_column(&self, id: &ColumnId) -> Result<serde_json::Value, ApiError>;

    /// `POST /tasks`
    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError>;

    /// Update route of the configured style; returns the stored task.
    async fn update_task(&self, task: &Task) -> Result<Task, ApiError>;

    /// Delete route of the configured style.
    async fn delete_task(&self, id: &TaskId) -> Result<serde_json::Value, ApiError>;

    /// `POST /movetask`
    async fn move_task(
        &self,
        id: &TaskId,
        target: &ColumnId,
    ) -> Result<serde_json::Value, ApiError>;
}

#[async_trait]
impl<T: TaskApi + ?Sized> TaskApi for Arc<T> {
    async fn fetch_columns(&self) -> Result<Vec<Column>, ApiError> {
        (**self).fetch_columns().await
    }

    async fn create_column(&self, title: &str) -> Result<Column, ApiError> {
        (**self).create_column(title).await
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<serde_json::Value, ApiError> {
        (**self).delete_column(id).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        (**self).create_task(task).await
    }

    async fn update_task(&self, task: &Task) -> Result<Task, ApiError> {
        (**self).update_task(task).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<serde_json::Value, ApiError> {
        (**self).delete_task(id).await
    }

    async fn move_task(
        &self,
        id: &TaskId,
        target: &ColumnId,
    ) -> Result<serde_json::Value, ApiError> {
        (**self).move_task(id, target).await
    }
}
