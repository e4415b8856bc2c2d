//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its serialized wire shape.
//! - Derive display status (pending/overdue/completed) from stored state.
//! - Validate raw add-form input before a task is constructed.
//!
//! # Invariants
//! - `id` is stable, unique within a collection, and never reused.
//! - `description` is never empty or whitespace-only once stored.
//! - Wire field names (`id`, `task`, `dueDate`, `completed`, `createdAt`)
//!   and their order must not change; prior durable records depend on them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for every task in the collection.
///
/// Holds the epoch-millisecond value of the creation instant (bumped by the
/// engine when two additions share one instant), so newer tasks always carry
/// larger ids. Kept as a type alias to make semantic intent explicit in
/// signatures.
pub type TaskId = i64;

/// Validation error for raw add-form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Description is empty after trimming surrounding whitespace.
    MissingDescription,
    /// Due date is absent or not a well-formed `YYYY-MM-DD` calendar date.
    MissingDate,
    /// Caller declined the past-due-date confirmation gate.
    Cancelled,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDescription => write!(f, "missing description"),
            Self::MissingDate => write!(f, "missing date"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl Error for TaskValidationError {}

/// Derived display status of one task relative to a calendar day.
///
/// Never stored: recomputed from `completed` and `due_date` on every query,
/// so a task flips to `Overdue` the day after its due date passes without
/// any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Not completed, due today or later.
    Pending,
    /// Marked completed, regardless of due date.
    Completed,
    /// Not completed and the due date already passed.
    Overdue,
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Completed => write!(f, "Completed"),
            Self::Overdue => write!(f, "Overdue"),
        }
    }
}

/// View predicate over the task collection.
///
/// Transient display state: switching filters is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    /// Every task.
    All,
    /// Only tasks with `completed == true`.
    Completed,
    /// Only tasks with `completed == false`.
    Pending,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self::All
    }
}

impl TaskFilter {
    /// Returns whether `task` is visible under this filter.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.completed,
            Self::Pending => !task.completed,
        }
    }
}

/// Canonical task record.
///
/// Field order and serde renames define the durable wire shape; see module
/// invariants before touching either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable id derived from the creation instant.
    pub id: TaskId,
    /// Trimmed, non-empty task text. Serialized as `task` to match the
    /// durable record naming.
    #[serde(rename = "task")]
    pub description: String,
    /// Calendar due date, no time component.
    #[serde(rename = "dueDate")]
    pub due_date: NaiveDate,
    /// Completion flag; toggle-only mutation.
    pub completed: bool,
    /// Creation instant. Informational only: list order is insertion order,
    /// with `id` as the tie-break.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new, not-yet-completed task.
    ///
    /// Callers are expected to pass a description that already went through
    /// [`normalize_description`] and an id issued by the engine.
    pub fn new(
        id: TaskId,
        description: impl Into<String>,
        due_date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            due_date,
            completed: false,
            created_at,
        }
    }

    /// Flips the completion flag.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Derives the display status relative to `today`.
    ///
    /// Calendar-day comparison only: a task due `today` is still `Pending`,
    /// a task due yesterday is `Overdue` unless completed.
    pub fn status_on(&self, today: NaiveDate) -> TaskStatus {
        if self.completed {
            TaskStatus::Completed
        } else if self.due_date < today {
            TaskStatus::Overdue
        } else {
            TaskStatus::Pending
        }
    }
}

/// Normalizes raw description input according to the add contract.
///
/// Trims surrounding whitespace; inner whitespace is preserved as typed.
pub fn normalize_description(input: &str) -> Result<String, TaskValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::MissingDescription);
    }
    Ok(trimmed.to_string())
}

/// Parses raw due-date input according to the add contract.
///
/// Accepts `YYYY-MM-DD`; anything absent or malformed maps to
/// [`TaskValidationError::MissingDate`].
pub fn parse_due_date(input: &str) -> Result<NaiveDate, TaskValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::MissingDate);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| TaskValidationError::MissingDate)
}
