//! Integration tests for the HTTP task client.
//!
//! Runs `HttpTaskApi` against the in-process reference server in both
//! route styles, and against small stub routers for responses the
//! reference server never produces.
//!
//! Verification command: `cargo test --test api_client`

use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use taskgrid::api::{ApiError, HttpTaskApi, Operation, TaskApi};
use taskgrid_proto::{ColumnId, NewTask, RouteStyle, TaskId};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Start the reference server in-process and return its API base URL.
async fn start_service() -> (String, tokio::task::JoinHandle<()>) {
    let (addr, handle) = taskgrid_server::server::start_server("127.0.0.1:0")
        .await
        .expect("failed to start task server");
    (format!("http://{addr}/api"), handle)
}

/// Serve an arbitrary router on an OS-assigned port.
async fn start_stub(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind stub");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/api")
}

fn client(base_url: &str, style: RouteStyle) -> HttpTaskApi {
    HttpTaskApi::new(base_url, style, TIMEOUT).expect("valid base url")
}

// =============================================================================
// Round trips against the reference server
// =============================================================================

#[tokio::test]
async fn fetch_demo_columns() {
    let (url, _handle) = start_service().await;
    let columns = client(&url, RouteStyle::Rest).fetch_columns().await.unwrap();

    let ids: Vec<&str> = columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["todo", "doing", "done"]);
    assert_eq!(columns[0].tasks[0].title, "Design User Interface");
}

#[tokio::test]
async fn create_returns_server_entity() {
    let (url, _handle) = start_service().await;
    let api = client(&url, RouteStyle::Rest);

    let draft = NewTask::new("Write API docs", "doing")
        .with_description("Cover every route")
        .with_due_date("2025-12-01")
        .with_tags(["Docs"]);
    let task = api.create_task(&draft).await.unwrap();

    assert!(!task.id.as_str().is_empty());
    assert_eq!(task.to_draft(), draft);

    let columns = api.fetch_columns().await.unwrap();
    assert!(columns[1].contains(&task.id));
}

async fn update_delete_roundtrip(style: RouteStyle) {
    let (url, _handle) = start_service().await;
    let api = client(&url, style);

    let mut task = api.fetch_columns().await.unwrap()[0].tasks[0].clone();
    task.title = format!("Edited via {style}");
    task.tags.push("Review".to_string());
    let stored = api.update_task(&task).await.unwrap();
    assert_eq!(stored, task);

    api.delete_task(&task.id).await.unwrap();
    let columns = api.fetch_columns().await.unwrap();
    assert!(columns.iter().all(|c| !c.contains(&task.id)));
}

#[tokio::test]
async fn rest_update_and_delete() {
    update_delete_roundtrip(RouteStyle::Rest).await;
}

#[tokio::test]
async fn legacy_update_and_delete() {
    update_delete_roundtrip(RouteStyle::Legacy).await;
}

#[tokio::test]
async fn move_confirms_and_relocates() {
    let (url, _handle) = start_service().await;
    let api = client(&url, RouteStyle::Rest);

    let confirmation = api
        .move_task(&TaskId::from("1"), &ColumnId::from("done"))
        .await
        .unwrap();
    assert_eq!(confirmation["ok"], true);

    let columns = api.fetch_columns().await.unwrap();
    assert!(columns[0].tasks.is_empty());
    let moved = columns[2].task(&TaskId::from("1")).unwrap();
    assert_eq!(moved.column_id, ColumnId::from("done"));
}

#[tokio::test]
async fn column_create_and_delete() {
    let (url, _handle) = start_service().await;
    let api = client(&url, RouteStyle::Rest);

    let column = api.create_column("Review").await.unwrap();
    assert_eq!(column.title, "Review");
    assert!(column.tasks.is_empty());

    api.delete_column(&column.id).await.unwrap();
    assert_eq!(api.fetch_columns().await.unwrap().len(), 3);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn service_error_message_is_kept() {
    let (url, _handle) = start_service().await;
    let api = client(&url, RouteStyle::Rest);

    let err = api
        .move_task(&TaskId::from("1"), &ColumnId::from("archive"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            operation: Operation::MoveTask,
            status: 404,
            message: "column not found: archive".to_string(),
        }
    );
}

#[tokio::test]
async fn invalid_task_is_rejected_by_service() {
    let (url, _handle) = start_service().await;
    let api = client(&url, RouteStyle::Legacy);

    // Sent as-is; only the service validates here.
    let draft = NewTask::new("X", "todo").with_tags(["a", "a"]);
    let err = api.create_task(&draft).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, .. }));
    assert_eq!(err.to_string(), "create task: duplicate tag: a (HTTP 400)");
}

#[tokio::test]
async fn ids_are_percent_encoded() {
    let (url, _handle) = start_service().await;
    let api = client(&url, RouteStyle::Rest);

    let err = api.delete_task(&TaskId::from("a/b c")).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            operation: Operation::DeleteTask,
            status: 404,
            message: "task not found: a/b c".to_string(),
        }
    );
}

#[tokio::test]
async fn error_without_body_uses_default_message() {
    let app = axum::Router::new().route(
        "/api/movetask",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = start_stub(app).await;

    let err = client(&url, RouteStyle::Rest)
        .move_task(&TaskId::from("1"), &ColumnId::from("done"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "move task: failed to move task (HTTP 500)");
}

#[tokio::test]
async fn empty_confirmation_is_null() {
    let app = axum::Router::new().route("/api/movetask", post(|| async { StatusCode::OK }));
    let url = start_stub(app).await;

    let confirmation = client(&url, RouteStyle::Rest)
        .move_task(&TaskId::from("1"), &ColumnId::from("done"))
        .await
        .unwrap();
    assert!(confirmation.is_null());
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let app = axum::Router::new().route("/api/columns", get(|| async { "[{\"id\": 5}]" }));
    let url = start_stub(app).await;

    let err = client(&url, RouteStyle::Rest)
        .fetch_columns()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::Decode {
            operation: Operation::LoadBoard,
            ..
        }
    ));
}

#[tokio::test]
async fn slow_service_times_out() {
    let app = axum::Router::new().route(
        "/api/columns",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "[]"
        }),
    );
    let url = start_stub(app).await;

    let api = HttpTaskApi::new(&url, RouteStyle::Rest, Duration::from_millis(200)).unwrap();
    let err = api.fetch_columns().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
}
