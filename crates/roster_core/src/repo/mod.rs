//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the student persistence contract used by the roster controller.
//! - Isolate SQLite query details from controller orchestration.
//!
//! # Invariants
//! - Every store failure is logged and returned to the caller.

pub mod student_repo;
