//! Subcommands of the `taskgrid` binary.
//!
//! Every command loads the board first, performs at most one mutation
//! through the [`BoardStore`], and prints the outcome.

use std::io::{self, Write};

use chrono::{DateTime, Local, NaiveDate};
use clap::Subcommand;
use taskgrid_proto::{ColumnId, NewTask, TagSet, Task, TaskId};

use crate::api::TaskApi;
use crate::board::{Board, BoardError, BoardStore};

/// Errors returned by [`run`].
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A board operation failed.
    #[error(transparent)]
    Board(#[from] BoardError),
    /// The task to edit is not on the board.
    #[error("task not found: {0}")]
    UnknownTask(TaskId),
    /// Writing the output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    /// Returns `true` if the store already reported this failure on its
    /// event channel.
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::Board(_))
    }
}

/// What the client should do.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the board
    Show,
    /// Create a task
    Add {
        /// Column to create the task in
        column: String,
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,
        /// Tag to attach; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Change fields of an existing task
    Edit {
        /// Task id
        task: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New image URL; an empty value removes it
        #[arg(long)]
        image: Option<String>,
        /// New due date; an empty value removes it
        #[arg(long)]
        due: Option<String>,
        /// Tag to add; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Tag to remove; repeat for several
        #[arg(long = "untag")]
        untags: Vec<String>,
    },
    /// Move a task to the end of another column
    Mv {
        /// Task id
        task: String,
        /// Target column id
        column: String,
    },
    /// Delete a task
    Rm {
        /// Task id
        task: String,
    },
    /// Manage columns
    Column {
        #[command(subcommand)]
        action: ColumnCommand,
    },
}

/// Column subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ColumnCommand {
    /// Create a column
    Add {
        /// Column title
        title: String,
    },
    /// Delete a column and its tasks
    Rm {
        /// Column id
        id: String,
    },
}

/// Loads the board, runs `command`, and writes the result to `out`.
///
/// # Errors
///
/// [`CliError::Board`] if loading or the mutation fails,
/// [`CliError::UnknownTask`] if `edit` names a task that is not on the
/// board, [`CliError::Output`] if `out` cannot be written.
pub async fn run<A, W>(store: &BoardStore<A>, command: Command, out: &mut W) -> Result<(), CliError>
where
    A: TaskApi,
    W: Write,
{
    store.load().await?;

    match command {
        Command::Show => render_board(&store.snapshot(), out)?,
        Command::Add {
            column,
            title,
            description,
            image,
            due,
            tags,
        } => {
            let mut draft = NewTask::new(title, column).with_tags(tags);
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            if let Some(image) = image {
                draft = draft.with_image(image);
            }
            if let Some(due) = due {
                draft = draft.with_due_date(due);
            }
            let task = store.create_task(draft).await?;
            writeln!(out, "created {} in {}", task.id, task.column_id)?;
        }
        Command::Edit {
            task,
            title,
            description,
            image,
            due,
            tags,
            untags,
        } => {
            let id = TaskId::new(task);
            let current = store
                .snapshot()
                .task(&id)
                .cloned()
                .ok_or(CliError::UnknownTask(id))?;
            let edited = apply_edit(current, title, description, image, due, &tags, &untags);
            let task = store.update_task(edited).await?;
            writeln!(out, "updated {}", task.id)?;
        }
        Command::Mv { task, column } => {
            let (id, column) = (TaskId::new(task), ColumnId::new(column));
            store.move_task(&id, &column).await?;
            writeln!(out, "moved {id} to {column}")?;
        }
        Command::Rm { task } => {
            let id = TaskId::new(task);
            store.delete_task(&id).await?;
            writeln!(out, "deleted {id}")?;
        }
        Command::Column {
            action: ColumnCommand::Add { title },
        } => {
            let column = store.create_column(&title).await?;
            writeln!(out, "created column {} ({})", column.id, column.title)?;
        }
        Command::Column {
            action: ColumnCommand::Rm { id },
        } => {
            let id = ColumnId::new(id);
            store.delete_column(&id).await?;
            writeln!(out, "deleted column {id}")?;
        }
    }
    Ok(())
}

fn apply_edit(
    mut task: Task,
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    due: Option<String>,
    tags: &[String],
    untags: &[String],
) -> Task {
    if let Some(title) = title {
        task.title = title;
    }
    if let Some(description) = description {
        task.description = description;
    }
    if let Some(image) = image {
        task.image = Some(image);
    }
    if let Some(due) = due {
        task.due_date = Some(due);
    }
    if !tags.is_empty() || !untags.is_empty() {
        let mut set: TagSet = task.tags.iter().collect();
        for tag in tags {
            set.add(tag);
        }
        for tag in untags {
            set.remove(tag);
        }
        task.tags = set.into_vec();
    }
    task
}

/// Writes the board in display order, one line per task.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn render_board<W: Write>(board: &Board, out: &mut W) -> io::Result<()> {
    for (i, column) in board.display_order().into_iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{} [{}]", column.title, column.id)?;
        if column.tasks.is_empty() {
            writeln!(out, "  (no tasks)")?;
        }
        for task in &column.tasks {
            write!(out, "  {}  {}", task.id, task.title)?;
            for tag in &task.tags {
                write!(out, " #{tag}")?;
            }
            if let Some(due) = task.due_date.as_deref() {
                write!(out, "  due {}", format_due_date(due))?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Formats a due date for display in the local time zone.
///
/// Values that do not parse are shown as given.
#[must_use]
pub fn format_due_date(raw: &str) -> String {
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));
    match date {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}
