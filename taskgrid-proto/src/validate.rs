//! Task field validation and normalization.
//!
//! Applied by the client before a create or update is sent, and by the
//! reference server before a body is accepted.

use chrono::{DateTime, NaiveDate};

use crate::model::{NewTask, Task};

/// Default maximum task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Error returned when a task fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Title is empty after trimming.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Title exceeds the configured maximum length.
    #[error("task title too long ({len} characters, max {max})")]
    TitleTooLong {
        /// Actual length in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
    /// The same tag appears more than once.
    #[error("duplicate tag: {0}")]
    DuplicateTag(String),
    /// Image is not an absolute URL.
    #[error("invalid image url: {0}")]
    InvalidImageUrl(String),
    /// Due date is neither `YYYY-MM-DD` nor RFC 3339.
    #[error("invalid due date: {0}")]
    InvalidDueDate(String),
}

/// Parses a due date written as `YYYY-MM-DD` or as an RFC 3339 timestamp.
#[must_use]
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Ordered tag collection that refuses duplicates.
///
/// Adding an empty or already present tag is a no-op, matching how the
/// task form behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Creates an empty tag set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a tag. Returns `true` if it was inserted.
    pub fn add(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Removes a tag. Returns `true` if it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    /// Returns `true` if the tag is present.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Returns the tags in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the set, returning the ordered tags.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.add(tag.as_ref());
        }
        set
    }
}

/// Normalized field values shared by drafts and full tasks.
struct Fields {
    title: String,
    description: String,
    image: Option<String>,
    due_date: Option<String>,
    tags: Vec<String>,
}

fn normalize_fields(
    title: &str,
    description: &str,
    image: Option<&str>,
    due_date: Option<&str>,
    tags: &[String],
    max_title_len: usize,
) -> Result<Fields, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleEmpty);
    }
    let len = title.chars().count();
    if len > max_title_len {
        return Err(ValidationError::TitleTooLong {
            len,
            max: max_title_len,
        });
    }

    let image = image.map(str::trim).filter(|s| !s.is_empty());
    if let Some(raw) = image {
        url::Url::parse(raw).map_err(|_| ValidationError::InvalidImageUrl(raw.to_string()))?;
    }

    let due_date = due_date.map(str::trim).filter(|s| !s.is_empty());
    if let Some(raw) = due_date
        && parse_due_date(raw).is_none()
    {
        return Err(ValidationError::InvalidDueDate(raw.to_string()));
    }

    let mut set = TagSet::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !set.add(trimmed) {
            return Err(ValidationError::DuplicateTag(trimmed.to_string()));
        }
    }

    Ok(Fields {
        title: title.to_string(),
        description: description.trim().to_string(),
        image: image.map(String::from),
        due_date: due_date.map(String::from),
        tags: set.into_vec(),
    })
}

impl NewTask {
    /// Validates the draft and returns it with trimmed fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn normalized(self, max_title_len: usize) -> Result<Self, ValidationError> {
        let fields = normalize_fields(
            &self.title,
            &self.description,
            self.image.as_deref(),
            self.due_date.as_deref(),
            &self.tags,
            max_title_len,
        )?;
        Ok(Self {
            title: fields.title,
            description: fields.description,
            image: fields.image,
            due_date: fields.due_date,
            tags: fields.tags,
            column_id: self.column_id,
        })
    }
}

impl Task {
    /// Validates the task and returns it with trimmed fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn normalized(self, max_title_len: usize) -> Result<Self, ValidationError> {
        let fields = normalize_fields(
            &self.title,
            &self.description,
            self.image.as_deref(),
            self.due_date.as_deref(),
            &self.tags,
            max_title_len,
        )?;
        Ok(Self {
            id: self.id,
            title: fields.title,
            description: fields.description,
            image: fields.image,
            due_date: fields.due_date,
            tags: fields.tags,
            column_id: self.column_id,
        })
    }
}
