//! Shared board model and wire definitions for `TaskGrid`.

pub mod model;
pub mod routes;
pub mod validate;
pub mod wire;

pub use model::{Column, ColumnId, NewTask, Task, TaskId};
pub use routes::{Endpoint, Method, RouteStyle};
pub use validate::{MAX_TASK_TITLE_LENGTH, TagSet, ValidationError};
