//! Student record model.
//!
//! # Responsibility
//! - Hold the five stored attributes of one student.
//! - Render the display cells used by list views, selection and CSV export.
//!
//! # Invariants
//! - `id` is immutable; only the other four fields have mutators.
//! - `score` should lie in `[SCORE_MIN, SCORE_MAX]`. The model does not
//!   enforce this on its own; callers check it with `validate_score`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of a student row.
pub type StudentId = i32;

/// Lowest accepted score.
pub const SCORE_MIN: f64 = 0.0;
/// Highest accepted score.
pub const SCORE_MAX: f64 = 100.0;

/// Column headers of the roster table, in cell order.
pub const COLUMN_HEADERS: [&str; 5] = ["ID", "Name", "Age", "Course", "Marks"];

/// One stored student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    id: StudentId,
    name: String,
    age: i32,
    course: String,
    score: f64,
}

impl Student {
    /// Creates a student without range checks.
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        age: i32,
        course: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            course: course.into(),
            score,
        }
    }

    pub fn id(&self) -> StudentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age;
    }

    pub fn set_course(&mut self, course: impl Into<String>) {
        self.course = course.into();
    }

    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    /// Checks that `score` lies within `[SCORE_MIN, SCORE_MAX]`.
    ///
    /// NaN is rejected.
    pub fn validate_score(&self) -> Result<(), StudentValidationError> {
        if (SCORE_MIN..=SCORE_MAX).contains(&self.score) {
            Ok(())
        } else {
            Err(StudentValidationError::ScoreOutOfRange(self.score))
        }
    }

    /// Renders the five display cells in column order (`COLUMN_HEADERS`).
    pub fn cells(&self) -> [String; 5] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.age.to_string(),
            self.course.clone(),
            display_score(self.score),
        ]
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.id, self.name)
    }
}

/// Formats a score for display.
///
/// Whole numbers keep one decimal place (`91.0`); everything else uses the
/// shortest text that parses back to the same value (`88.5`), so a displayed
/// score can be fed back through the form without losing precision.
pub fn display_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        score.to_string()
    }
}

/// Input validation failures for student fields.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentValidationError {
    /// A numeric field could not be parsed.
    InvalidNumber { field: &'static str, value: String },
    /// Score outside `[SCORE_MIN, SCORE_MAX]`.
    ScoreOutOfRange(f64),
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { field, value } => {
                write!(f, "{field} is not a valid number: \"{value}\"")
            }
            Self::ScoreOutOfRange(score) => write!(
                f,
                "marks must be between {SCORE_MIN}-{SCORE_MAX}, got {}",
                display_score(*score)
            ),
        }
    }
}

impl Error for StudentValidationError {}
