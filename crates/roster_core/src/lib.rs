//! Core logic for the student roster.
//! This crate owns the record model, the SQLite store and the controller
//! workflow; front ends only feed it text and render its results.

pub mod auth;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::{AccessGate, AuthError, CredentialChecker, FixedCredentials};
pub use config::RosterConfig;
pub use dispatch::{CommandContext, CommandOutcome, CommandTable};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{display_score, Student, StudentId, StudentValidationError};
pub use repo::student_repo::{RepoError, RepoResult, SqliteStudentRepository, StudentRepository};
pub use service::csv_export::{ExportError, ExportScope, ExportSummary};
pub use service::roster_controller::{ControllerError, FormField, RosterController, RosterForm};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
