//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Insert, list, update and delete student rows with parameterized SQL.
//! - Scope one connection to each operation for file-backed stores.
//!
//! # Invariants
//! - `list_all` returns rows in storage scan order; no ordering is imposed.
//! - `update` and `delete_by_id` on an absent id are no-ops, not errors.
//! - Failures are logged with `event=student_* status=error` and returned.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::student::{Student, StudentId};
use log::{debug, error};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const STUDENT_SELECT_SQL: &str = "SELECT id, name, age, course, marks FROM students";
const STUDENT_COLUMNS: [&str; 5] = ["id", "name", "age", "course", "marks"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for student store operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Insert rejected because a row with this id already exists.
    DuplicateId(StudentId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "student id {id} already exists"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for student CRUD operations.
pub trait StudentRepository {
    /// Inserts a new row with all five fields.
    fn add(&self, student: &Student) -> RepoResult<()>;
    /// Returns every stored row in storage order.
    fn list_all(&self) -> RepoResult<Vec<Student>>;
    /// Replaces name, age, course and score of the row with the same id.
    fn update(&self, student: &Student) -> RepoResult<()>;
    /// Removes the row with the given id.
    fn delete_by_id(&self, id: StudentId) -> RepoResult<()>;
}

enum ConnectionSource {
    /// Reopened for every operation and dropped before returning.
    File(PathBuf),
    /// Held for the repository lifetime; an in-memory store dies with its connection.
    Memory(Connection),
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository {
    source: ConnectionSource,
}

impl SqliteStudentRepository {
    /// Targets a database file, creating it and its schema when missing.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref().to_path_buf();
        {
            let conn = open_db(&path)?;
            ensure_connection_ready(&conn)?;
        }
        Ok(Self {
            source: ConnectionSource::File(path),
        })
    }

    /// Creates a repository over a private in-memory database.
    pub fn in_memory() -> RepoResult<Self> {
        let conn = open_db_in_memory()?;
        ensure_connection_ready(&conn)?;
        Ok(Self {
            source: ConnectionSource::Memory(conn),
        })
    }

    /// Returns the backing file path, or `None` for in-memory stores.
    pub fn db_path(&self) -> Option<&Path> {
        match &self.source {
            ConnectionSource::File(path) => Some(path.as_path()),
            ConnectionSource::Memory(_) => None,
        }
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> RepoResult<T>) -> RepoResult<T> {
        match &self.source {
            ConnectionSource::File(path) => {
                let conn = open_db(path)?;
                f(&conn)
            }
            ConnectionSource::Memory(conn) => f(conn),
        }
    }
}

impl StudentRepository for SqliteStudentRepository {
    fn add(&self, student: &Student) -> RepoResult<()> {
        let result = self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO students (id, name, age, course, marks)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    student.id(),
                    student.name(),
                    student.age(),
                    student.course(),
                    student.score(),
                ],
            )
            .map_err(|err| map_insert_error(err, student.id()))?;
            Ok(())
        });
        log_outcome("student_add", student.id(), result)
    }

    fn list_all(&self) -> RepoResult<Vec<Student>> {
        let result = self.with_connection(|conn| {
            let mut stmt = conn.prepare(STUDENT_SELECT_SQL)?;
            let mut rows = stmt.query([])?;
            let mut students = Vec::new();
            while let Some(row) = rows.next()? {
                students.push(parse_student_row(row)?);
            }
            Ok(students)
        });

        match &result {
            Ok(students) => debug!(
                "event=student_list module=repo status=ok rows={}",
                students.len()
            ),
            Err(err) => error!("event=student_list module=repo status=error error={err}"),
        }
        result
    }

    fn update(&self, student: &Student) -> RepoResult<()> {
        let result = self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE students
                 SET
                    name = ?1,
                    age = ?2,
                    course = ?3,
                    marks = ?4
                 WHERE id = ?5;",
                params![
                    student.name(),
                    student.age(),
                    student.course(),
                    student.score(),
                    student.id(),
                ],
            )?;
            if changed == 0 {
                debug!(
                    "event=student_update module=repo status=noop id={}",
                    student.id()
                );
            }
            Ok(())
        });
        log_outcome("student_update", student.id(), result)
    }

    fn delete_by_id(&self, id: StudentId) -> RepoResult<()> {
        let result = self.with_connection(|conn| {
            let changed = conn.execute("DELETE FROM students WHERE id = ?1;", [id])?;
            if changed == 0 {
                debug!("event=student_delete module=repo status=noop id={id}");
            }
            Ok(())
        });
        log_outcome("student_delete", id, result)
    }
}

fn log_outcome<T>(event: &str, id: StudentId, result: RepoResult<T>) -> RepoResult<T> {
    match &result {
        Ok(_) => debug!("event={event} module=repo status=ok id={id}"),
        Err(err) => error!("event={event} module=repo status=error id={id} error={err}"),
    }
    result
}

fn map_insert_error(err: rusqlite::Error, id: StudentId) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::DuplicateId(id)
        }
        _ => err.into(),
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id: StudentId = row.get("id")?;
    let name: Option<String> = row.get("name")?;
    let course: Option<String> = row.get("course")?;
    let (Some(name), Some(course)) = (name, course) else {
        return Err(RepoError::InvalidData(format!(
            "student {id} has NULL name or course"
        )));
    };

    Ok(Student::new(
        id,
        name,
        row.get("age")?,
        course,
        row.get("marks")?,
    ))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "students")? {
        return Err(RepoError::MissingRequiredTable("students"));
    }

    for column in STUDENT_COLUMNS {
        if !table_has_column(conn, "students", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "students",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{map_insert_error, RepoError};
    use rusqlite::Connection;

    #[test]
    fn constraint_violation_maps_to_duplicate_id() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t VALUES (7);")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES (7);", []).unwrap_err();

        assert!(matches!(map_insert_error(err, 7), RepoError::DuplicateId(7)));
    }

    #[test]
    fn other_sqlite_errors_stay_db_errors() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn.execute("INSERT INTO missing VALUES (1);", []).unwrap_err();

        assert!(matches!(map_insert_error(err, 1), RepoError::Db(_)));
    }
}
