//! Local mirror of the remote board.
//!
//! [`Board`] is the pure state: an owned list of columns with reducer
//! methods that return a new board. [`BoardStore`] owns the current
//! snapshot, issues API calls, and applies a reducer once the service has
//! confirmed the mutation.

pub mod sequencer;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod fake;

pub use sequencer::{TaskPermit, TaskSequencer};
pub use state::Board;
pub use store::BoardStore;

use taskgrid_proto::{ColumnId, TaskId, ValidationError};

use crate::api::{ApiError, Operation};

/// Errors returned by board operations.
///
/// Whatever the variant, the local board is left as it was before the
/// operation started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The task or column failed validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// A column referenced by the operation does not exist locally.
    #[error("column not found: {0}")]
    UnknownColumn(ColumnId),
    /// A task referenced by the operation does not exist locally.
    #[error("task not found: {0}")]
    UnknownTask(TaskId),
    /// The service returned a task id that is already on the board.
    #[error("task already on the board: {0}")]
    DuplicateTask(TaskId),
    /// The service returned a column id that is already on the board.
    #[error("column already on the board: {0}")]
    DuplicateColumn(ColumnId),
}

/// A failure routed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Operation that failed.
    pub operation: Operation,
    /// Human-readable reason.
    pub message: String,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not {}: {}", self.operation, self.message)
    }
}

/// Settlement of a board operation, sent on the store's event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// The operation succeeded and the board was patched.
    Applied {
        /// Operation that settled.
        operation: Operation,
    },
    /// The operation failed and the board is unchanged.
    Failed(Notice),
}
