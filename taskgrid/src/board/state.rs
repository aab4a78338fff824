//! Pure board state and its reducers.
//!
//! Every reducer borrows the current board and returns a new one, so a
//! snapshot handed to a reader never changes underneath it. Reducers that
//! can reject their input return a [`BoardError`] and produce nothing.

use taskgrid_proto::{Column, ColumnId, Task, TaskId};

use super::BoardError;

/// Columns with their ordered tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Creates a board from a full column set, as returned by the service.
    #[must_use]
    pub const fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Returns the columns in server order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column with the given id.
    #[must_use]
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// Returns the task with the given id, wherever it lives.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.columns.iter().find_map(|c| c.task(id))
    }

    /// Returns the id of the column holding the given task.
    #[must_use]
    pub fn column_of(&self, id: &TaskId) -> Option<&ColumnId> {
        self.columns.iter().find(|c| c.contains(id)).map(|c| &c.id)
    }

    /// Returns the total number of tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// Returns the columns in display order.
    ///
    /// A column titled "todo" (case and spaces ignored) comes first; the
    /// rest keep server order.
    #[must_use]
    pub fn display_order(&self) -> Vec<&Column> {
        let mut ordered: Vec<&Column> = self.columns.iter().collect();
        ordered.sort_by_key(|c| !is_todo_title(&c.title));
        ordered
    }

    /// Appends a server-confirmed task to the column named by its
    /// `column_id`.
    ///
    /// # Errors
    ///
    /// [`BoardError::UnknownColumn`] if that column is not on the board,
    /// [`BoardError::DuplicateTask`] if the id is already taken.
    pub fn with_task_created(&self, task: Task) -> Result<Self, BoardError> {
        if self.task(&task.id).is_some() {
            return Err(BoardError::DuplicateTask(task.id));
        }
        let mut next = self.clone();
        let column = next
            .column_mut(&task.column_id)
            .ok_or_else(|| BoardError::UnknownColumn(task.column_id.clone()))?;
        column.tasks.push(task);
        Ok(next)
    }

    /// Replaces the task with the same id by the server-confirmed version.
    ///
    /// The task keeps its position when its column is unchanged. If the
    /// service reports a different `column_id`, the task moves to the end
    /// of that column. An id that is not on the board leaves it unchanged.
    ///
    /// # Errors
    ///
    /// [`BoardError::UnknownColumn`] if the reported column is not on the
    /// board.
    pub fn with_task_updated(&self, task: Task) -> Result<Self, BoardError> {
        let Some(current) = self.column_of(&task.id) else {
            return Ok(self.clone());
        };
        if current == &task.column_id {
            let mut next = self.clone();
            for column in &mut next.columns {
                for slot in &mut column.tasks {
                    if slot.id == task.id {
                        *slot = task.clone();
                    }
                }
            }
            return Ok(next);
        }
        if self.column(&task.column_id).is_none() {
            return Err(BoardError::UnknownColumn(task.column_id));
        }
        let mut next = self.without_task(&task.id);
        if let Some(column) = next.column_mut(&task.column_id) {
            column.tasks.push(task);
        }
        Ok(next)
    }

    /// Removes the task with the given id from whichever column holds it.
    ///
    /// Removing an absent id returns an identical board.
    #[must_use]
    pub fn without_task(&self, id: &TaskId) -> Self {
        let mut next = self.clone();
        for column in &mut next.columns {
            column.tasks.retain(|t| &t.id != id);
        }
        next
    }

    /// Moves a task to the end of `target`, rewriting its `column_id`.
    ///
    /// A task that is not on the board leaves it unchanged. Moving into
    /// the column that already holds the task moves it to the end.
    ///
    /// # Errors
    ///
    /// [`BoardError::UnknownColumn`] if `target` is not on the board.
    pub fn with_task_moved(&self, id: &TaskId, target: &ColumnId) -> Result<Self, BoardError> {
        if self.column(target).is_none() {
            return Err(BoardError::UnknownColumn(target.clone()));
        }
        let Some(task) = self.task(id) else {
            return Ok(self.clone());
        };
        let moved = Task {
            column_id: target.clone(),
            ..task.clone()
        };
        let mut next = self.without_task(id);
        if let Some(column) = next.column_mut(target) {
            column.tasks.push(moved);
        }
        Ok(next)
    }

    /// Appends a server-confirmed column.
    ///
    /// # Errors
    ///
    /// [`BoardError::DuplicateColumn`] if the id is already taken.
    pub fn with_column_added(&self, column: Column) -> Result<Self, BoardError> {
        if self.column(&column.id).is_some() {
            return Err(BoardError::DuplicateColumn(column.id));
        }
        let mut next = self.clone();
        next.columns.push(column);
        Ok(next)
    }

    /// Removes a column together with its tasks.
    #[must_use]
    pub fn without_column(&self, id: &ColumnId) -> Self {
        let mut next = self.clone();
        next.columns.retain(|c| &c.id != id);
        next
    }

    fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| &c.id == id)
    }
}

fn is_todo_title(title: &str) -> bool {
    title
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .eq("todo".chars())
}
