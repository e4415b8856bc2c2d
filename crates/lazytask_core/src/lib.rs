//! Core domain logic for LazyTask.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod store;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use engine::todo_engine::{AddTaskRequest, EngineError, EngineResult, TodoEngine};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskFilter, TaskId, TaskStatus, TaskValidationError};
pub use store::todo_store::{
    SqliteTodoStore, StoreError, StoreResult, TodoStore, TODOS_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
