//! In-memory board held by the reference server.
//!
//! The [`MemoryBoard`] keeps every column and task behind a single
//! [`RwLock`]. Identifiers for new columns and tasks are UUID v7 strings,
//! so they sort by creation time.

use taskgrid_proto::{
    Column, ColumnId, MAX_TASK_TITLE_LENGTH, NewTask, Task, TaskId, ValidationError,
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Errors returned by [`MemoryBoard`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No column with this id.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),
    /// No task with this id.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// The request body failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Thread-safe in-memory board.
pub struct MemoryBoard {
    columns: RwLock<Vec<Column>>,
    max_title_len: usize,
}

impl Default for MemoryBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::with_columns(Vec::new())
    }

    /// Creates a board holding `columns`.
    #[must_use]
    pub fn with_columns(columns: Vec<Column>) -> Self {
        Self {
            columns: RwLock::new(columns),
            max_title_len: MAX_TASK_TITLE_LENGTH,
        }
    }

    /// Creates a board with the three demo columns and one task in each.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_columns(demo_columns())
    }

    /// Returns a copy of every column with its tasks.
    pub async fn columns(&self) -> Vec<Column> {
        self.columns.read().await.clone()
    }

    /// Appends an empty column.
    ///
    /// # Errors
    ///
    /// [`StoreError::Invalid`] if the trimmed title is empty.
    pub async fn create_column(&self, title: &str) -> Result<Column, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::TitleEmpty.into());
        }
        let column = Column::new(new_id(), title);
        self.columns.write().await.push(column.clone());
        Ok(column)
    }

    /// Removes a column and its tasks.
    ///
    /// # Errors
    ///
    /// [`StoreError::ColumnNotFound`] if no such column exists.
    pub async fn delete_column(&self, id: &ColumnId) -> Result<Column, StoreError> {
        let mut columns = self.columns.write().await;
        let pos = columns
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| StoreError::ColumnNotFound(id.clone()))?;
        Ok(columns.remove(pos))
    }

    /// Validates the draft, assigns an id, and appends it to its column.
    ///
    /// # Errors
    ///
    /// [`StoreError::Invalid`] for a bad draft, [`StoreError::ColumnNotFound`]
    /// if its column does not exist.
    pub async fn create_task(&self, draft: NewTask) -> Result<Task, StoreError> {
        let draft = draft.normalized(self.max_title_len)?;
        let mut columns = self.columns.write().await;
        let column = columns
            .iter_mut()
            .find(|c| c.id == draft.column_id)
            .ok_or_else(|| StoreError::ColumnNotFound(draft.column_id.clone()))?;
        let task = draft.into_task(TaskId::new(new_id()));
        column.tasks.push(task.clone());
        Ok(task)
    }

    /// Replaces a task. A changed `column_id` moves it to the end of that
    /// column.
    ///
    /// # Errors
    ///
    /// [`StoreError::Invalid`] for a bad task, [`StoreError::TaskNotFound`]
    /// or [`StoreError::ColumnNotFound`] for unknown ids.
    pub async fn update_task(&self, task: Task) -> Result<Task, StoreError> {
        let task = task.normalized(self.max_title_len)?;
        let mut columns = self.columns.write().await;
        if !columns.iter().any(|c| c.id == task.column_id) {
            return Err(StoreError::ColumnNotFound(task.column_id));
        }
        let current = columns
            .iter()
            .find(|c| c.contains(&task.id))
            .map(|c| c.id.clone())
            .ok_or_else(|| StoreError::TaskNotFound(task.id.clone()))?;

        for column in columns.iter_mut() {
            if current == task.column_id {
                if let Some(slot) = column.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task.clone();
                }
            } else if column.id == current {
                column.tasks.retain(|t| t.id != task.id);
            } else if column.id == task.column_id {
                column.tasks.push(task.clone());
            }
        }
        Ok(task)
    }

    /// Removes a task from whichever column holds it.
    ///
    /// # Errors
    ///
    /// [`StoreError::TaskNotFound`] if no column holds it.
    pub async fn delete_task(&self, id: &TaskId) -> Result<Task, StoreError> {
        let mut columns = self.columns.write().await;
        for column in columns.iter_mut() {
            if let Some(pos) = column.tasks.iter().position(|t| &t.id == id) {
                return Ok(column.tasks.remove(pos));
            }
        }
        Err(StoreError::TaskNotFound(id.clone()))
    }

    /// Moves a task to the end of `target`.
    ///
    /// # Errors
    ///
    /// [`StoreError::ColumnNotFound`] or [`StoreError::TaskNotFound`] for
    /// unknown ids; the board is unchanged.
    pub async fn move_task(&self, id: &TaskId, target: &ColumnId) -> Result<Task, StoreError> {
        let mut columns = self.columns.write().await;
        let target_pos = columns
            .iter()
            .position(|c| &c.id == target)
            .ok_or_else(|| StoreError::ColumnNotFound(target.clone()))?;
        let (from_pos, task_pos) = columns
            .iter()
            .enumerate()
            .find_map(|(i, c)| c.tasks.iter().position(|t| &t.id == id).map(|j| (i, j)))
            .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;

        let mut task = columns[from_pos].tasks.remove(task_pos);
        task.column_id = target.clone();
        columns[target_pos].tasks.push(task.clone());
        drop(columns);
        Ok(task)
    }
}

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

fn demo_columns() -> Vec<Column> {
    let demo = [
        (
            "todo",
            "TO DO",
            "1",
            "Design User Interface",
            "Create wireframes and high-fidelity designs for the app's main screens.",
            &["Design", "Frontend"][..],
        ),
        (
            "doing",
            "DOING",
            "2",
            "Develop Authentication Module",
            "Prepare the server environment and database for app development.",
            &["Backend", "Frontend"][..],
        ),
        (
            "done",
            "DONE",
            "3",
            "Research Target Audience",
            "Gather insights on potential users' needs and behaviors.",
            &["Research"][..],
        ),
    ];

    demo.into_iter()
        .map(|(column_id, column_title, task_id, title, description, tags)| {
            let mut column = Column::new(column_id, column_title);
            column.tasks.push(
                NewTask::new(title, column_id)
                    .with_description(description)
                    .with_tags(tags.iter().copied())
                    .into_task(TaskId::from(task_id)),
            );
            column
        })
        .collect()
}
