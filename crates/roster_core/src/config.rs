//! Runtime settings for a roster session.
//!
//! All paths are derived from one working directory; there are no flags or
//! environment overrides.

use crate::logging::default_log_level;
use crate::service::csv_export::DEFAULT_EXPORT_FILE_NAME;
use std::path::{Path, PathBuf};

/// Database file created next to the export file.
pub const DEFAULT_DB_FILE_NAME: &str = "students.sqlite3";
/// Log directory name under the working directory.
pub const DEFAULT_LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    pub db_path: PathBuf,
    pub export_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: &'static str,
}

impl RosterConfig {
    /// Default layout rooted at `dir`.
    pub fn for_working_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            db_path: dir.join(DEFAULT_DB_FILE_NAME),
            export_path: dir.join(DEFAULT_EXPORT_FILE_NAME),
            log_dir: dir.join(DEFAULT_LOG_DIR_NAME),
            log_level: default_log_level(),
        }
    }
}
