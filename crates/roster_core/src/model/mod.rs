//! Roster domain model.
//!
//! # Responsibility
//! - Define the student record shared by repository, controller and front ends.
//! - Own display rendering of record cells.
//!
//! # Invariants
//! - A student's `id` never changes after construction.

pub mod student;
