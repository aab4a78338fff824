//! Board store: remote call first, local patch second.
//!
//! Each mutation entry point validates its input, calls the [`TaskApi`],
//! and only after the service confirms applies the matching [`Board`]
//! reducer to the current snapshot. A failed call leaves the snapshot as
//! it was and is reported through [`BoardStore::settle`]. A confirmed
//! mutation that no longer fits the local board (its column went away
//! while the request was in flight) reloads the board from the service.

use std::sync::Arc;

use parking_lot::RwLock;
use taskgrid_proto::{
    Column, ColumnId, MAX_TASK_TITLE_LENGTH, NewTask, Task, TaskId, ValidationError,
};
use tokio::sync::mpsc;

use super::sequencer::TaskSequencer;
use super::state::Board;
use super::{BoardError, BoardEvent, Notice};
use crate::api::{Operation, TaskApi};

/// Authoritative local mirror of the remote board.
///
/// The board is held as an `Arc<Board>` snapshot. Every settled mutation
/// builds a new board from the current snapshot and swaps it in; readers
/// keep whatever snapshot they already hold.
pub struct BoardStore<A> {
    api: A,
    board: RwLock<Arc<Board>>,
    sequencer: TaskSequencer,
    events: Option<mpsc::UnboundedSender<BoardEvent>>,
    max_title_len: usize,
}

impl<A: TaskApi> BoardStore<A> {
    /// Creates a store with an empty board.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            board: RwLock::new(Arc::new(Board::default())),
            sequencer: TaskSequencer::new(),
            events: None,
            max_title_len: MAX_TASK_TITLE_LENGTH,
        }
    }

    /// Sends every settlement to `events`.
    #[must_use]
    pub fn with_events(mut self, events: mpsc::UnboundedSender<BoardEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Sets the maximum task title length used by validation.
    #[must_use]
    pub const fn with_max_title_len(mut self, max_title_len: usize) -> Self {
        self.max_title_len = max_title_len;
        self
    }

    /// Returns the API client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Returns the current board snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Board> {
        Arc::clone(&self.board.read())
    }

    /// Replaces the whole board with the service's column set.
    ///
    /// # Errors
    ///
    /// [`BoardError::Api`] if the columns cannot be fetched.
    pub async fn load(&self) -> Result<Arc<Board>, BoardError> {
        let result = self.reload().await;
        self.settle(Operation::LoadBoard, result)
    }

    /// Creates a task and appends the task the service returns.
    ///
    /// The service-assigned entity is stored as is; no local id is made up.
    ///
    /// # Errors
    ///
    /// [`BoardError::Invalid`] or [`BoardError::UnknownColumn`] before any
    /// request is sent, [`BoardError::Api`] if the service rejects it.
    pub async fn create_task(&self, draft: NewTask) -> Result<Task, BoardError> {
        let result: Result<_, BoardError> = async {
            let draft = draft.normalized(self.max_title_len)?;
            self.require_column(&draft.column_id)?;
            let created = self.api.create_task(&draft).await?;
            self.commit(|board| board.with_task_created(created.clone()))
                .await?;
            Ok(created)
        }
        .await;
        self.settle(Operation::CreateTask, result)
    }

    /// Sends the full task to the service and stores the returned version.
    ///
    /// # Errors
    ///
    /// [`BoardError::Invalid`] or [`BoardError::UnknownTask`] before any
    /// request is sent, [`BoardError::Api`] if the service rejects it.
    pub async fn update_task(&self, task: Task) -> Result<Task, BoardError> {
        let result: Result<_, BoardError> = async {
            let task = task.normalized(self.max_title_len)?;
            let _permit = self.sequencer.acquire(&task.id).await;
            self.require_task(&task.id)?;
            let stored = self.api.update_task(&task).await?;
            self.commit(|board| board.with_task_updated(stored.clone()))
                .await?;
            Ok(stored)
        }
        .await;
        self.settle(Operation::UpdateTask, result)
    }

    /// Deletes a task and removes it from whichever column holds it.
    ///
    /// Deleting an id that is no longer on the board still asks the
    /// service, and removes nothing locally.
    ///
    /// # Errors
    ///
    /// [`BoardError::Api`] if the service rejects it.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), BoardError> {
        let result: Result<_, BoardError> = async {
            let _permit = self.sequencer.acquire(id).await;
            self.api.delete_task(id).await?;
            self.apply(|board| Ok(board.without_task(id)))
        }
        .await;
        self.settle(Operation::DeleteTask, result)
    }

    /// Moves a task to the end of `target`.
    ///
    /// # Errors
    ///
    /// [`BoardError::UnknownColumn`] before any request is sent if `target`
    /// is not on the board, [`BoardError::Api`] if the service rejects it.
    pub async fn move_task(&self, id: &TaskId, target: &ColumnId) -> Result<(), BoardError> {
        let result: Result<_, BoardError> = async {
            self.require_column(target)?;
            let _permit = self.sequencer.acquire(id).await;
            self.api.move_task(id, target).await?;
            self.commit(|board| board.with_task_moved(id, target)).await
        }
        .await;
        self.settle(Operation::MoveTask, result)
    }

    /// Creates a column and appends the column the service returns.
    ///
    /// # Errors
    ///
    /// [`BoardError::Invalid`] for a blank title, [`BoardError::Api`] if
    /// the service rejects it.
    pub async fn create_column(&self, title: &str) -> Result<Column, BoardError> {
        let result: Result<_, BoardError> = async {
            let title = title.trim();
            if title.is_empty() {
                return Err(ValidationError::TitleEmpty.into());
            }
            let created = self.api.create_column(title).await?;
            self.commit(|board| board.with_column_added(created.clone()))
                .await?;
            Ok(created)
        }
        .await;
        self.settle(Operation::CreateColumn, result)
    }

    /// Deletes a column together with its tasks.
    ///
    /// # Errors
    ///
    /// [`BoardError::Api`] if the service rejects it.
    pub async fn delete_column(&self, id: &ColumnId) -> Result<(), BoardError> {
        let result: Result<_, BoardError> = async {
            self.api.delete_column(id).await?;
            self.apply(|board| Ok(board.without_column(id)))
        }
        .await;
        self.settle(Operation::DeleteColumn, result)
    }

    fn require_column(&self, id: &ColumnId) -> Result<(), BoardError> {
        if self.board.read().column(id).is_some() {
            Ok(())
        } else {
            Err(BoardError::UnknownColumn(id.clone()))
        }
    }

    fn require_task(&self, id: &TaskId) -> Result<(), BoardError> {
        if self.board.read().task(id).is_some() {
            Ok(())
        } else {
            Err(BoardError::UnknownTask(id.clone()))
        }
    }

    /// Builds the next board from the current one and swaps it in.
    fn apply<F>(&self, reduce: F) -> Result<(), BoardError>
    where
        F: FnOnce(&Board) -> Result<Board, BoardError>,
    {
        let mut board = self.board.write();
        let next = reduce(&board)?;
        *board = Arc::new(next);
        drop(board);
        Ok(())
    }

    /// Applies a reducer for a mutation the service already confirmed.
    ///
    /// If the reducer rejects it, the local board has drifted from the
    /// service and is reloaded instead.
    async fn commit<F>(&self, reduce: F) -> Result<(), BoardError>
    where
        F: FnOnce(&Board) -> Result<Board, BoardError>,
    {
        if let Err(e) = self.apply(reduce) {
            tracing::info!(error = %e, "confirmed change does not fit local board, reloading");
            self.reload().await?;
        }
        Ok(())
    }

    async fn reload(&self) -> Result<Arc<Board>, BoardError> {
        let columns = self.api.fetch_columns().await?;
        let board = Arc::new(Board::new(columns));
        *self.board.write() = Arc::clone(&board);
        Ok(board)
    }

    /// Reports the outcome of an operation on the log and event channel.
    fn settle<T>(
        &self,
        operation: Operation,
        result: Result<T, BoardError>,
    ) -> Result<T, BoardError> {
        let event = match &result {
            Ok(_) => {
                tracing::debug!(operation = %operation, "board operation applied");
                BoardEvent::Applied { operation }
            }
            Err(e) => {
                tracing::warn!(operation = %operation, error = %e, "board operation failed");
                BoardEvent::Failed(Notice {
                    operation,
                    message: e.to_string(),
                })
            }
        };
        if let Some(events) = &self.events {
            // A closed receiver means nobody is listening any more.
            let _ = events.send(event);
        }
        result
    }
}
