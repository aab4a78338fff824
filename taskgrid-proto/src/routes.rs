//! HTTP route table of the task service.
//!
//! Two deployed variants of the service disagree on how tasks are updated
//! and deleted. [`RouteStyle`] selects one; everything else is shared.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::{ColumnId, TaskId};

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which variant of the update/delete routes the service speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStyle {
    /// `PATCH /tasks/{id}` and `DELETE /tasks/{id}`.
    #[default]
    Rest,
    /// `PUT /edittask` and `DELETE /deletetask` with an `{id}` body.
    Legacy,
}

impl RouteStyle {
    /// Returns `true` if deleting a task sends the id in the body.
    #[must_use]
    pub const fn delete_sends_body(self) -> bool {
        matches!(self, Self::Legacy)
    }
}

impl fmt::Display for RouteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => f.write_str("rest"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// Error returned when parsing an unknown route style name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route style '{0}' (expected 'rest' or 'legacy')")]
pub struct UnknownRouteStyle(pub String);

impl FromStr for RouteStyle {
    type Err = UnknownRouteStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "legacy" => Ok(Self::Legacy),
            _ => Err(UnknownRouteStyle(s.to_string())),
        }
    }
}

/// A method plus path relative to the service base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// HTTP method.
    pub method: Method,
    segments: Vec<String>,
}

impl Endpoint {
    fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// `GET /columns`
    #[must_use]
    pub fn list_columns() -> Self {
        Self::new(Method::Get, &["columns"])
    }

    /// `POST /columns`
    #[must_use]
    pub fn create_column() -> Self {
        Self::new(Method::Post, &["columns"])
    }

    /// `DELETE /columns/{id}`
    #[must_use]
    pub fn delete_column(id: &ColumnId) -> Self {
        Self::new(Method::Delete, &["columns", id.as_str()])
    }

    /// `POST /tasks`
    #[must_use]
    pub fn create_task() -> Self {
        Self::new(Method::Post, &["tasks"])
    }

    /// `PATCH /tasks/{id}` or `PUT /edittask`.
    #[must_use]
    pub fn update_task(style: RouteStyle, id: &TaskId) -> Self {
        match style {
            RouteStyle::Rest => Self::new(Method::Patch, &["tasks", id.as_str()]),
            RouteStyle::Legacy => Self::new(Method::Put, &["edittask"]),
        }
    }

    /// `DELETE /tasks/{id}` or `DELETE /deletetask`.
    #[must_use]
    pub fn delete_task(style: RouteStyle, id: &TaskId) -> Self {
        match style {
            RouteStyle::Rest => Self::new(Method::Delete, &["tasks", id.as_str()]),
            RouteStyle::Legacy => Self::new(Method::Delete, &["deletetask"]),
        }
    }

    /// `POST /movetask`
    #[must_use]
    pub fn move_task() -> Self {
        Self::new(Method::Post, &["movetask"])
    }

    /// Returns the unencoded path, e.g. `/tasks/42`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }

    /// Resolves this endpoint against a base URL, percent-encoding ids.
    ///
    /// The base keeps its own path, so `http://host/api` + `/columns`
    /// becomes `http://host/api/columns`.
    #[must_use]
    pub fn url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(&self.segments);
        }
        url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())
    }
}
