//! CSV export of roster rows.
//!
//! # Responsibility
//! - Write student rows as `id,name,age,course,score` lines.
//!
//! # Invariants
//! - No header row, no quoting or escaping; cells are joined by literal commas.
//! - Every line ends with `\n`, including the last one.
//! - The target file is truncated before writing.

use crate::model::student::Student;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Export file name used when the operator does not pick one.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "students_export.csv";

/// Which rows an export writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    /// Every row from the last refresh, ignoring the filter.
    Full,
    /// Only the rows that pass the active filter.
    Visible,
}

impl ExportScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Visible => "visible",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "full" | "all" => Some(Self::Full),
            "visible" | "view" => Some(Self::Visible),
            _ => None,
        }
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Export failure.
#[derive(Debug)]
pub enum ExportError {
    Io { path: PathBuf, source: io::Error },
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to write `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Renders one student as a CSV line without the trailing newline.
pub fn csv_line(student: &Student) -> String {
    student.cells().join(",")
}

/// Writes `students` to `path`, replacing any previous content.
pub fn write_csv<'a>(
    path: &Path,
    students: impl IntoIterator<Item = &'a Student>,
) -> Result<ExportSummary, ExportError> {
    let io_error = |source: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    let mut rows = 0;
    for student in students {
        writer
            .write_all(csv_line(student).as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(io_error)?;
        rows += 1;
    }
    writer.flush().map_err(io_error)?;

    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows,
    })
}
