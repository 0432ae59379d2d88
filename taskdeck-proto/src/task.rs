//! Task model shared by the repository, the session and the store codec.
//!
//! A [`Task`] is owned by exactly one user and ordered solely by its
//! creation timestamp. Status only ever moves from
//! [`TaskStatus::Pending`] to [`TaskStatus::Completed`].

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a task.
///
/// New tasks get the text form of a time-ordered UUID (v7), but any string
/// read back from storage is a valid id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self::from_uuid(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// Returns the id as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is open.
    Pending,
    /// Task has been completed. Terminal.
    Completed,
}

impl TaskStatus {
    /// Returns `true` for [`TaskStatus::Pending`].
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// View selector applied to a task collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    /// Only pending tasks.
    #[default]
    Pending,
    /// Only completed tasks.
    Completed,
    /// Every task.
    All,
}

impl TaskFilter {
    /// Returns `true` if a task with `status` is visible under this filter.
    #[must_use]
    pub const fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => matches!(status, TaskStatus::Pending),
            Self::Completed => matches!(status, TaskStatus::Completed),
        }
    }

    /// Display ordering of two tasks under this filter.
    ///
    /// Pending tasks ascend by creation time (oldest open item first) and
    /// completed tasks descend (most recent outcome first).
    ///
    /// Under [`TaskFilter::All`] a mixed pending/completed pair is not
    /// ordered by time: ordering such pairs newest first would conflict
    /// with the ascending pending order and leave no consistent total
    /// order. Instead every pending task precedes every completed one.
    #[must_use]
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Pending => a.created_at.cmp(&b.created_at),
            Self::Completed => b.created_at.cmp(&a.created_at),
            Self::All => match (a.status, b.status) {
                (TaskStatus::Pending, TaskStatus::Pending) => a.created_at.cmp(&b.created_at),
                (TaskStatus::Pending, TaskStatus::Completed) => Ordering::Less,
                (TaskStatus::Completed, TaskStatus::Pending) => Ordering::Greater,
                (TaskStatus::Completed, TaskStatus::Completed) => b.created_at.cmp(&a.created_at),
            },
        }
    }

    /// Sorts `tasks` in place for display under this filter.
    pub fn sort(self, tasks: &mut [Task]) {
        tasks.sort_by(|a, b| self.compare(a, b));
    }
}

impl std::fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Error returned when parsing an unknown filter name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter '{0}' (expected pending, completed or all)")]
pub struct ParseFilterError(String);

impl FromStr for TaskFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "all" => Ok(Self::All),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

/// A user-owned to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within the owner's collection, never reused.
    pub id: TaskId,
    /// Short title.
    pub title: String,
    /// Free text, may be empty.
    #[serde(default)]
    pub description: String,
    /// Set once at creation. The only ordering key.
    pub created_at: DateTime<Utc>,
    /// Current status.
    pub status: TaskStatus,
    /// Owning user. Used for storage partitioning only.
    pub user_id: String,
}

impl Task {
    /// Creates a new pending task created at `created_at`.
    #[must_use]
    pub fn new(
        user_id: &str,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: description.into(),
            created_at,
            status: TaskStatus::Pending,
            user_id: user_id.to_string(),
        }
    }

    /// Returns `true` if the task is still open.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Moves a pending task to completed.
    ///
    /// Returns `false` (and leaves the task untouched) if it was already
    /// completed.
    pub fn complete(&mut self) -> bool {
        if self.is_pending() {
            self.status = TaskStatus::Completed;
            true
        } else {
            false
        }
    }

    /// Shallow-merges the fields present in `patch`.
    ///
    /// Identity, owner and creation time are not patchable, and a completed
    /// task never goes back to pending.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if patch.status == Some(TaskStatus::Completed) {
            self.complete();
        }
    }
}

/// Partial update for [`Task::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Requested status. Only `Completed` has an effect.
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Returns `true` if the patch carries no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// Aggregate counts over a user's full collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Number of tasks.
    pub total: usize,
    /// Number of pending tasks.
    pub pending: usize,
    /// Number of completed tasks.
    pub completed: usize,
}

impl TaskStats {
    /// Counts `tasks` by status.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let pending = tasks.iter().filter(|t| t.is_pending()).count();
        Self {
            total: tasks.len(),
            pending,
            completed: tasks.len() - pending,
        }
    }
}
