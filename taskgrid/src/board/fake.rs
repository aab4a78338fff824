//! In-memory [`TaskApi`] used by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use taskgrid_proto::{Column, ColumnId, NewTask, Task, TaskId};

use crate::api::{ApiError, Operation, TaskApi};

/// Scriptable fake of the task service.
///
/// Holds its own copy of the board so responses look like a real server's.
/// `fail_next` makes the next call of that operation fail; `delay_moves`
/// and `delay_creates` queue per-call response delays.
#[derive(Default)]
pub struct FakeApi {
    columns: Mutex<Vec<Column>>,
    failures: Mutex<Vec<(Operation, ApiError)>>,
    move_delays: Mutex<VecDeque<Duration>>,
    create_delays: Mutex<VecDeque<Duration>>,
    calls: Mutex<Vec<Operation>>,
    next_id: AtomicU64,
}

impl FakeApi {
    pub fn with_columns(columns: Vec<Column>) -> Self {
        Self {
            columns: Mutex::new(columns),
            next_id: AtomicU64::new(100),
            ..Self::default()
        }
    }

    /// The three demo columns with one task each (`1`, `2`, `3`).
    pub fn demo() -> Self {
        let mut todo = Column::new("todo", "TO DO");
        todo.tasks
            .push(NewTask::new("Design User Interface", "todo").into_task(TaskId::from("1")));
        let mut doing = Column::new("doing", "DOING");
        doing.tasks.push(
            NewTask::new("Develop Authentication Module", "doing").into_task(TaskId::from("2")),
        );
        let mut done = Column::new("done", "DONE");
        done.tasks
            .push(NewTask::new("Research Target Audience", "done").into_task(TaskId::from("3")));
        Self::with_columns(vec![todo, doing, done])
    }

    pub fn fail_next(&self, operation: Operation, status: u16, message: &str) {
        self.failures.lock().push((
            operation,
            ApiError::Status {
                operation,
                status,
                message: message.to_string(),
            },
        ));
    }

    pub fn delay_moves(&self, delays: impl IntoIterator<Item = Duration>) {
        self.move_delays.lock().extend(delays);
    }

    /// Delays are applied after the task is stored, like a slow response.
    pub fn delay_creates(&self, delays: impl IntoIterator<Item = Duration>) {
        self.create_delays.lock().extend(delays);
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().clone()
    }

    fn enter(&self, operation: Operation) -> Result<(), ApiError> {
        self.calls.lock().push(operation);
        let mut failures = self.failures.lock();
        if let Some(pos) = failures.iter().position(|(op, _)| *op == operation) {
            return Err(failures.remove(pos).1);
        }
        Ok(())
    }

    fn not_found(operation: Operation, what: &str) -> ApiError {
        ApiError::Status {
            operation,
            status: 404,
            message: format!("{what} not found"),
        }
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn fetch_columns(&self) -> Result<Vec<Column>, ApiError> {
        self.enter(Operation::LoadBoard)?;
        Ok(self.columns.lock().clone())
    }

    async fn create_column(&self, title: &str) -> Result<Column, ApiError> {
        self.enter(Operation::CreateColumn)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let column = Column::new(format!("col-{id}"), title);
        self.columns.lock().push(column.clone());
        Ok(column)
    }

    async fn delete_column(&self, id: &ColumnId) -> Result<serde_json::Value, ApiError> {
        self.enter(Operation::DeleteColumn)?;
        let mut columns = self.columns.lock();
        let before = columns.len();
        columns.retain(|c| &c.id != id);
        if columns.len() == before {
            return Err(Self::not_found(Operation::DeleteColumn, "column"));
        }
        Ok(serde_json::json!({ "ok": true }))
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.enter(Operation::CreateTask)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = task.clone().into_task(TaskId::new(format!("srv-{id}")));
        {
            let mut columns = self.columns.lock();
            let column = columns
                .iter_mut()
                .find(|c| c.id == task.column_id)
                .ok_or_else(|| Self::not_found(Operation::CreateTask, "column"))?;
            column.tasks.push(created.clone());
        }
        let delay = self.create_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(created)
    }

    async fn update_task(&self, task: &Task) -> Result<Task, ApiError> {
        self.enter(Operation::UpdateTask)?;
        let mut columns = self.columns.lock();
        let slot = columns
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.id == task.id)
            .ok_or_else(|| Self::not_found(Operation::UpdateTask, "task"))?;
        *slot = task.clone();
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<serde_json::Value, ApiError> {
        self.enter(Operation::DeleteTask)?;
        for column in self.columns.lock().iter_mut() {
            column.tasks.retain(|t| &t.id != id);
        }
        Ok(serde_json::Value::Null)
    }

    async fn move_task(
        &self,
        id: &TaskId,
        target: &ColumnId,
    ) -> Result<serde_json::Value, ApiError> {
        self.enter(Operation::MoveTask)?;
        let delay = self.move_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut columns = self.columns.lock();
        if !columns.iter().any(|c| &c.id == target) {
            return Err(Self::not_found(Operation::MoveTask, "column"));
        }
        let mut moved = None;
        for column in columns.iter_mut() {
            if let Some(pos) = column.tasks.iter().position(|t| &t.id == id) {
                moved = Some(column.tasks.remove(pos));
            }
        }
        let mut task = moved.ok_or_else(|| Self::not_found(Operation::MoveTask, "task"))?;
        task.column_id = target.clone();
        if let Some(column) = columns.iter_mut().find(|c| &c.id == target) {
            column.tasks.push(task);
        }
        Ok(serde_json::json!({ "ok": true }))
    }
}
