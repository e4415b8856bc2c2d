//! Task use-case engine.
//!
//! # Responsibility
//! - Provide add/toggle/delete/clear/filter APIs over the task collection.
//! - Validate raw add-form input and apply the confirmation gates.
//! - Persist the full collection after every successful mutation.
//!
//! # Invariants
//! - New tasks are prepended; stored order is newest-first.
//! - Task ids strictly increase across one engine lifetime.
//! - All reads and mutations serve from memory; the store is only read once,
//!   at load time.

use crate::model::task::{
    normalize_description, parse_due_date, Task, TaskFilter, TaskId, TaskValidationError,
};
use crate::store::todo_store::TodoStore;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error for task use-cases.
#[derive(Debug)]
pub enum EngineError {
    /// New-task input was rejected or the past-due gate was declined.
    Validation(TaskValidationError),
    /// Clear-all requested while the collection is already empty.
    EmptyCollection,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmptyCollection => write!(f, "nothing to delete"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::EmptyCollection => None,
        }
    }
}

impl From<TaskValidationError> for EngineError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Raw new-task input as captured from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskRequest {
    /// Free-form description; surrounding whitespace is ignored.
    pub description: String,
    /// Due date in `YYYY-MM-DD` form.
    pub due_date: String,
    /// Caller acknowledged a due date earlier than today.
    pub past_due_confirmed: bool,
}

/// Task engine facade over store implementations.
pub struct TodoEngine<S: TodoStore> {
    store: S,
    tasks: Vec<Task>,
    filter: TaskFilter,
    last_id: TaskId,
}

impl<S: TodoStore> TodoEngine<S> {
    /// Creates an engine seeded from whatever the store currently holds.
    ///
    /// The presentation filter starts at [`TaskFilter::All`]; the id
    /// watermark is seeded from the largest loaded id.
    pub fn load(store: S) -> Self {
        let tasks = store.load();
        let last_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        info!(
            "event=engine_init module=engine status=ok count={} last_id={last_id}",
            tasks.len()
        );
        Self {
            store,
            tasks,
            filter: TaskFilter::default(),
            last_id,
        }
    }

    /// Validates, creates, and prepends one task, then persists.
    ///
    /// Validation order: description first, then due date, then the past-due
    /// gate. A due date earlier than `reference_now`'s calendar day is only
    /// accepted with `past_due_confirmed` set; a declined gate surfaces as
    /// [`TaskValidationError::Cancelled`].
    pub fn add_task(
        &mut self,
        request: &AddTaskRequest,
        reference_now: DateTime<Utc>,
    ) -> EngineResult<Task> {
        let description = normalize_description(&request.description)?;
        let due_date = parse_due_date(&request.due_date)?;

        if due_date < reference_now.date_naive() && !request.past_due_confirmed {
            return Err(TaskValidationError::Cancelled.into());
        }

        let id = self.next_id(reference_now);
        let task = Task::new(id, description, due_date, reference_now);
        self.tasks.insert(0, task.clone());
        self.persist();
        Ok(task)
    }

    /// Flips the completion flag of one task; returns whether it existed.
    ///
    /// An unknown id changes nothing and skips the persistence write.
    pub fn toggle_completed(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        task.toggle();
        self.persist();
        true
    }

    /// Removes one task when `confirmed`; returns whether anything changed.
    ///
    /// Order of checks matters: an unconfirmed request returns `false`
    /// without looking the id up, so a stale id never surfaces there.
    pub fn delete_task(&mut self, id: TaskId, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            return false;
        }
        self.persist();
        true
    }

    /// Clears the whole collection when `confirmed`; returns the count removed.
    ///
    /// An already-empty collection fails with [`EngineError::EmptyCollection`]
    /// before the confirmation flag is consulted. An unconfirmed request on a
    /// non-empty collection removes nothing and returns `Ok(0)`.
    pub fn delete_all(&mut self, confirmed: bool) -> EngineResult<usize> {
        if self.tasks.is_empty() {
            return Err(EngineError::EmptyCollection);
        }
        if !confirmed {
            return Ok(0);
        }
        let removed = self.tasks.len();
        self.tasks.clear();
        self.persist();
        Ok(removed)
    }

    /// Replaces the active presentation filter. Never persisted.
    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    /// Currently active presentation filter.
    pub fn active_filter(&self) -> TaskFilter {
        self.filter
    }

    /// Tasks visible under the active filter, in stored (newest-first) order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| self.filter.matches(task))
            .collect()
    }

    /// Full collection in stored order, ignoring the filter.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of stored tasks, ignoring the filter.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the collection holds no tasks at all.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Issues the next task id.
    ///
    /// Ids carry the creation instant in epoch milliseconds, bumped past the
    /// watermark when two additions land on the same millisecond (or the
    /// clock reads earlier than an already-issued id). The bump saturates at
    /// the integer ceiling instead of wrapping.
    fn next_id(&mut self, reference_now: DateTime<Utc>) -> TaskId {
        self.last_id = reference_now
            .timestamp_millis()
            .max(self.last_id.saturating_add(1));
        self.last_id
    }

    /// Best-effort write of the full collection.
    ///
    /// A failed write is logged and dropped; callers keep the in-memory
    /// mutation either way.
    fn persist(&self) {
        if let Err(err) = self.store.save(&self.tasks) {
            warn!(
                "event=engine_persist module=engine status=error count={} error={err}",
                self.tasks.len()
            );
        }
    }
}
