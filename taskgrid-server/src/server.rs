//! HTTP surface of the reference task service.
//!
//! Serves both route styles under one base path:
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /columns`, `POST /columns` | list, create column |
//! | `DELETE /columns/{id}` | delete column |
//! | `POST /tasks` | create task |
//! | `PATCH /tasks/{id}`, `DELETE /tasks/{id}` | rest update, delete |
//! | `PUT /edittask`, `DELETE /deletetask` | legacy update, delete |
//! | `POST /movetask` | move task |
//!
//! Failures answer with `{"error": "..."}`: 404 for unknown ids, 400 for
//! bodies that do not parse or fail validation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use taskgrid_proto::wire::{
    Confirmation, CreateColumnRequest, DeleteTaskRequest, ErrorBody, MoveTaskRequest,
};
use taskgrid_proto::{Column, ColumnId, NewTask, Task, TaskId};
use tokio::task::JoinHandle;

use crate::store::{MemoryBoard, StoreError};

/// Base path used when none is configured.
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Shared server state: the board and the path it is served under.
pub struct ServerState {
    /// The in-memory board.
    pub board: MemoryBoard,
    base_path: String,
}

impl ServerState {
    /// Creates state serving `board` under `base_path`.
    ///
    /// The base path is normalized to a leading slash and no trailing
    /// slash; `""` and `"/"` serve at the root.
    #[must_use]
    pub fn new(board: MemoryBoard, base_path: &str) -> Self {
        let trimmed = base_path.trim().trim_matches('/');
        let base_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self { board, base_path }
    }

    /// Returns the normalized base path (empty when served at the root).
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(MemoryBoard::seeded(), DEFAULT_BASE_PATH)
    }
}

/// Error response carrying an [`ErrorBody`].
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<StoreError> for HttpError {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::ColumnNotFound(_) | StoreError::TaskNotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(e: JsonRejection) -> Self {
        Self::bad_request(e.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        tracing::debug!(status = %self.status, error = %self.message, "request rejected");
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

type Shared = State<Arc<ServerState>>;
type Body<T> = Result<Json<T>, JsonRejection>;

/// Builds the router for `state`, nested under its base path.
pub fn router(state: Arc<ServerState>) -> axum::Router {
    let base_path = state.base_path().to_string();
    let api = axum::Router::new()
        .route("/columns", get(list_columns).post(create_column))
        .route("/columns/{id}", delete(delete_column))
        .route("/tasks", post(create_task))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .route("/edittask", put(edit_task_legacy))
        .route("/deletetask", delete(delete_task_legacy))
        .route("/movetask", post(move_task))
        .with_state(state);

    if base_path.is_empty() {
        api
    } else {
        axum::Router::new().nest(&base_path, api)
    }
}

/// Starts a server with the seeded demo board under [`DEFAULT_BASE_PATH`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<(SocketAddr, JoinHandle<()>), Box<dyn std::error::Error + Send + Sync>> {
    start_server_with_state(addr, Arc::new(ServerState::default())).await
}

/// Starts a server with a pre-configured [`ServerState`].
///
/// Returns the bound address (useful with port 0) and the serving task.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<ServerState>,
) -> Result<(SocketAddr, JoinHandle<()>), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}

async fn list_columns(State(state): Shared) -> Json<Vec<Column>> {
    Json(state.board.columns().await)
}

async fn create_column(
    State(state): Shared,
    body: Body<CreateColumnRequest>,
) -> Result<Json<Column>, HttpError> {
    let Json(req) = body?;
    let column = state.board.create_column(&req.title).await?;
    tracing::info!(column_id = %column.id, "column created");
    Ok(Json(column))
}

async fn delete_column(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, HttpError> {
    let removed = state.board.delete_column(&ColumnId::new(id)).await?;
    tracing::info!(column_id = %removed.id, tasks = removed.tasks.len(), "column deleted");
    Ok(Json(Confirmation { ok: true }))
}

async fn create_task(
    State(state): Shared,
    body: Body<NewTask>,
) -> Result<Json<Task>, HttpError> {
    let Json(draft) = body?;
    let task = state.board.create_task(draft).await?;
    tracing::info!(task_id = %task.id, column_id = %task.column_id, "task created");
    Ok(Json(task))
}

async fn update_task(
    State(state): Shared,
    Path(id): Path<String>,
    body: Body<Task>,
) -> Result<Json<Task>, HttpError> {
    let Json(mut task) = body?;
    task.id = TaskId::new(id);
    store_update(&state, task).await
}

async fn edit_task_legacy(
    State(state): Shared,
    body: Body<Task>,
) -> Result<Json<Task>, HttpError> {
    let Json(task) = body?;
    store_update(&state, task).await
}

async fn store_update(state: &ServerState, task: Task) -> Result<Json<Task>, HttpError> {
    let task = state.board.update_task(task).await?;
    tracing::info!(task_id = %task.id, "task updated");
    Ok(Json(task))
}

async fn delete_task(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, HttpError> {
    store_delete(&state, &TaskId::new(id)).await
}

async fn delete_task_legacy(
    State(state): Shared,
    body: Body<DeleteTaskRequest>,
) -> Result<Json<Confirmation>, HttpError> {
    let Json(req) = body?;
    store_delete(&state, &req.id).await
}

async fn store_delete(state: &ServerState, id: &TaskId) -> Result<Json<Confirmation>, HttpError> {
    state.board.delete_task(id).await?;
    tracing::info!(task_id = %id, "task deleted");
    Ok(Json(Confirmation { ok: true }))
}

async fn move_task(
    State(state): Shared,
    body: Body<MoveTaskRequest>,
) -> Result<Json<Confirmation>, HttpError> {
    let Json(req) = body?;
    let task = state
        .board
        .move_task(&req.task_id, &req.new_column_id)
        .await?;
    tracing::info!(task_id = %task.id, column_id = %task.column_id, "task moved");
    Ok(Json(Confirmation { ok: true }))
}
