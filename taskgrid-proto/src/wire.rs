//! JSON request and response bodies that are not plain model types.

use serde::{Deserialize, Serialize};

use crate::model::{ColumnId, TaskId};

/// Body of `POST /columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateColumnRequest {
    /// Title of the new column.
    pub title: String,
}

/// Body of `POST /movetask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    /// Task being moved.
    pub task_id: TaskId,
    /// Column the task moves to.
    pub new_column_id: ColumnId,
}

/// Body of the legacy `DELETE /deletetask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTaskRequest {
    /// Task being deleted.
    pub id: TaskId,
}

/// Error document returned by the service on a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

impl ErrorBody {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Extracts the `error` message from a response body, if it has one.
    #[must_use]
    pub fn message_from(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .map(|b| b.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Confirmation document returned by the reference server for deletes
/// and moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Always `true` on success.
    pub ok: bool,
}
