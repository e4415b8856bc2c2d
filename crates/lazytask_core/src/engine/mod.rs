//! Task collection engine.
//!
//! # Responsibility
//! - Own the in-memory task collection and its presentation filter.
//! - Validate additions and gate destructive operations on confirmation.
//!
//! # Invariants
//! - The in-memory collection is the source of truth while the engine lives.
//! - Every successful mutation triggers a whole-collection persistence write.
//! - Persistence failures never roll back in-memory state.

pub mod todo_engine;
