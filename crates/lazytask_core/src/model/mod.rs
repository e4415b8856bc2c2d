//! Domain model for the task collection.
//!
//! # Responsibility
//! - Define the canonical task record used by engine and storage.
//! - Keep the serialized wire shape of the durable record stable.
//!
//! # Invariants
//! - Every task is identified by a stable integer `TaskId`.
//! - Completion is the only mutable field; overdue state is derived,
//!   never stored.

pub mod task;
