//! Persistence layer for the durable task record.
//!
//! # Responsibility
//! - Define the key-value storage contract the engine persists through.
//! - Isolate SQLite details from engine orchestration.
//!
//! # Invariants
//! - The durable record is replaced wholesale on every save; there are no
//!   incremental writes.
//! - Load never fails: unreadable or unparseable durable state recovers to
//!   the empty collection.

pub mod todo_store;
