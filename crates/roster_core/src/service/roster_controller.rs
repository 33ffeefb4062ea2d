//! Roster use-case controller.
//!
//! # Responsibility
//! - Hold raw form input, the last fetched snapshot and the active filter.
//! - Turn form input into validated students and drive repository calls.
//! - Derive the visible view and export rows to CSV.
//!
//! # Invariants
//! - The snapshot is replaced wholesale on every refresh, in repository order.
//! - The visible view is derived from the snapshot and never written back.
//! - Score range is checked when creating, not when updating.
//! - A failed operation leaves the form untouched so the operator can retry.
//! - A write that reached the store always clears the form, even when the
//!   refresh after it fails; the display is then marked stale.
//! - The filter keyword lives next to its compiled matcher, never in the form.

use crate::model::student::{Student, StudentId, StudentValidationError};
use crate::repo::student_repo::{RepoError, StudentRepository};
use crate::service::csv_export::{write_csv, ExportError, ExportScope, ExportSummary};
use log::{info, warn};
use regex::{Regex, RegexBuilder};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Errors surfaced to the roster front end.
#[derive(Debug)]
pub enum ControllerError {
    /// Form input could not be turned into a student.
    Validation(StudentValidationError),
    /// Store operation failed.
    Persistence(RepoError),
    /// CSV file could not be written.
    Export(ExportError),
    /// Selected row is outside the visible view.
    RowOutOfRange { index: usize, visible: usize },
    /// Dispatch received a command name with no handler.
    UnknownCommand(String),
    /// Command arguments could not be interpreted.
    InvalidArgument {
        command: &'static str,
        message: String,
    },
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::RowOutOfRange { index, visible } => {
                write!(f, "row {index} is out of range ({visible} visible rows)")
            }
            Self::UnknownCommand(name) => write!(f, "unknown command `{name}`"),
            Self::InvalidArgument { command, message } => write!(f, "{command}: {message}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Export(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for ControllerError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

impl From<ExportError> for ControllerError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// One input field of the roster form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Id,
    Name,
    Age,
    Course,
    Score,
}

impl FormField {
    /// Record fields in column order.
    pub const RECORD_FIELDS: [FormField; 5] = [
        FormField::Id,
        FormField::Name,
        FormField::Age,
        FormField::Course,
        FormField::Score,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "age" => Some(Self::Age),
            "course" => Some(Self::Course),
            "score" | "marks" => Some(Self::Score),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "Name",
            Self::Age => "Age",
            Self::Course => "Course",
            Self::Score => "Marks",
        }
    }
}

/// Raw text currently typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterForm {
    pub id: String,
    pub name: String,
    pub age: String,
    pub course: String,
    pub score: String,
}

impl RosterForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Id => &self.id,
            FormField::Name => &self.name,
            FormField::Age => &self.age,
            FormField::Course => &self.course,
            FormField::Score => &self.score,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Id => self.id = value,
            FormField::Name => self.name = value,
            FormField::Age => self.age = value,
            FormField::Course => self.course = value,
            FormField::Score => self.score = value,
        }
    }

    /// Empties every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn parse_id(&self) -> Result<StudentId, StudentValidationError> {
        parse_int("id", &self.id)
    }

    fn parse_student(&self) -> Result<Student, StudentValidationError> {
        Ok(Student::new(
            self.parse_id()?,
            self.name.as_str(),
            parse_int("age", &self.age)?,
            self.course.as_str(),
            parse_score(&self.score)?,
        ))
    }
}

/// Headless roster controller over a student repository.
pub struct RosterController<R: StudentRepository> {
    repo: R,
    form: RosterForm,
    snapshot: Vec<Student>,
    keyword: String,
    matcher: Option<Regex>,
    visible: Vec<usize>,
    stale: bool,
}

impl<R: StudentRepository> RosterController<R> {
    /// Creates a controller with an empty form and an empty display.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            form: RosterForm::default(),
            snapshot: Vec::new(),
            keyword: String::new(),
            matcher: None,
            visible: Vec::new(),
            stale: false,
        }
    }

    /// Creates a controller and loads the current roster.
    ///
    /// A failed initial load is logged and leaves the display empty.
    pub fn open(repo: R) -> Self {
        let mut controller = Self::new(repo);
        if let Err(err) = controller.refresh() {
            warn!("event=roster_open module=controller status=error error={err}");
        }
        controller
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn form(&self) -> &RosterForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RosterForm {
        &mut self.form
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Rows fetched by the last refresh, in repository order.
    pub fn snapshot(&self) -> &[Student] {
        &self.snapshot
    }

    /// Rows of the snapshot that pass the active filter.
    pub fn visible_rows(&self) -> Vec<&Student> {
        self.visible
            .iter()
            .map(|&index| &self.snapshot[index])
            .collect()
    }

    /// Active filter keyword; empty when unfiltered.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// True when a write succeeded but the refresh after it failed, so the
    /// snapshot predates the store. Cleared by the next successful refresh.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Validates the form, inserts the student, then refreshes and clears.
    pub fn create(&mut self) -> Result<Student, ControllerError> {
        let student = self.form.parse_student().map_err(rejected("student_create"))?;
        student
            .validate_score()
            .map_err(rejected("student_create"))?;

        self.repo.add(&student)?;
        self.clear();
        self.refresh_after_write("student_create");
        info!(
            "event=student_create module=controller status=ok id={}",
            student.id()
        );
        Ok(student)
    }

    /// Replaces the stored fields of the form's id, then refreshes and clears.
    ///
    /// Score range is not checked here.
    pub fn update(&mut self) -> Result<Student, ControllerError> {
        let student = self.form.parse_student().map_err(rejected("student_update"))?;

        self.repo.update(&student)?;
        self.clear();
        self.refresh_after_write("student_update");
        info!(
            "event=student_update module=controller status=ok id={}",
            student.id()
        );
        Ok(student)
    }

    /// Deletes the form's id, then refreshes and clears.
    pub fn delete(&mut self) -> Result<StudentId, ControllerError> {
        let id = self.form.parse_id().map_err(rejected("student_delete"))?;

        self.repo.delete_by_id(id)?;
        self.clear();
        self.refresh_after_write("student_delete");
        info!("event=student_delete module=controller status=ok id={id}");
        Ok(id)
    }

    /// Reloads the snapshot from the repository and re-applies the filter.
    ///
    /// Returns the number of fetched rows. On failure the previous snapshot
    /// stays displayed.
    pub fn refresh(&mut self) -> Result<usize, ControllerError> {
        self.snapshot = self.repo.list_all()?;
        self.stale = false;
        self.recompute_visible();
        Ok(self.snapshot.len())
    }

    /// Empties the five record fields of the form. The filter is kept.
    pub fn clear(&mut self) {
        self.form.clear();
    }

    /// Copies the displayed cells of visible row `row_index` into the form.
    pub fn select_row(&mut self, row_index: usize) -> Result<Student, ControllerError> {
        let Some(&snapshot_index) = self.visible.get(row_index) else {
            return Err(ControllerError::RowOutOfRange {
                index: row_index,
                visible: self.visible.len(),
            });
        };

        let student = self.snapshot[snapshot_index].clone();
        for (field, cell) in FormField::RECORD_FIELDS.into_iter().zip(student.cells()) {
            self.form.set(field, cell);
        }
        Ok(student)
    }

    /// Shows only rows with a cell matching `keyword`, case-insensitively.
    ///
    /// The keyword is a regular expression; text that does not compile as one
    /// is matched literally. An empty keyword shows every row. Returns the
    /// number of visible rows.
    pub fn filter(&mut self, keyword: &str) -> usize {
        self.keyword = keyword.to_string();
        self.matcher = build_matcher(keyword);
        self.recompute_visible();
        self.visible.len()
    }

    /// Writes the rows of `scope` to `path` as CSV.
    pub fn export_csv(
        &self,
        path: impl AsRef<Path>,
        scope: ExportScope,
    ) -> Result<ExportSummary, ControllerError> {
        let path = path.as_ref();
        let result = match scope {
            ExportScope::Full => write_csv(path, &self.snapshot),
            ExportScope::Visible => write_csv(path, self.visible_rows()),
        };

        match result {
            Ok(summary) => {
                info!(
                    "event=roster_export module=controller status=ok scope={} rows={}",
                    scope.as_str(),
                    summary.rows
                );
                Ok(summary)
            }
            Err(err) => {
                warn!(
                    "event=roster_export module=controller status=error scope={} error={}",
                    scope.as_str(),
                    err
                );
                Err(err.into())
            }
        }
    }

    // The write is committed; a failed reload only marks the display stale.
    fn refresh_after_write(&mut self, event: &'static str) {
        if let Err(err) = self.refresh() {
            self.stale = true;
            warn!("event={event} module=controller status=stale error={err}");
        }
    }

    fn recompute_visible(&mut self) {
        self.visible = match &self.matcher {
            None => (0..self.snapshot.len()).collect(),
            Some(matcher) => self
                .snapshot
                .iter()
                .enumerate()
                .filter(|(_, student)| student.cells().iter().any(|cell| matcher.is_match(cell)))
                .map(|(index, _)| index)
                .collect(),
        };
    }
}

fn build_matcher(keyword: &str) -> Option<Regex> {
    if keyword.is_empty() {
        return None;
    }

    RegexBuilder::new(keyword)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(keyword))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

fn rejected(event: &'static str) -> impl Fn(StudentValidationError) -> StudentValidationError {
    move |err| {
        warn!("event={event} module=controller status=rejected reason=validation");
        err
    }
}

fn parse_int(field: &'static str, value: &str) -> Result<i32, StudentValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| StudentValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn parse_score(value: &str) -> Result<f64, StudentValidationError> {
    match value.trim().parse::<f64>() {
        Ok(score) if score.is_finite() => Ok(score),
        _ => Err(StudentValidationError::InvalidNumber {
            field: "marks",
            value: value.to_string(),
        }),
    }
}
