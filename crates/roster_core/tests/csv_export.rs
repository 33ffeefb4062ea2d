use roster_core::{
    ControllerError, ExportScope, RosterController, SqliteStudentRepository, Student,
    StudentRepository,
};
use std::fs;

fn seeded_controller() -> RosterController<SqliteStudentRepository> {
    let repo = SqliteStudentRepository::in_memory().unwrap();
    repo.add(&Student::new(1, "Alice", 20, "CS", 88.5)).unwrap();
    repo.add(&Student::new(2, "Bob", 22, "EE", 91.0)).unwrap();
    RosterController::open(repo)
}

fn parse_rows(text: &str) -> Vec<Student> {
    text.lines()
        .map(|line| {
            let cells = line.split(',').collect::<Vec<_>>();
            assert_eq!(cells.len(), 5, "unexpected line `{line}`");
            Student::new(
                cells[0].parse().unwrap(),
                cells[1],
                cells[2].parse().unwrap(),
                cells[3],
                cells[4].parse().unwrap(),
            )
        })
        .collect()
}

#[test]
fn full_export_writes_every_row_without_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students_export.csv");
    let controller = seeded_controller();

    let summary = controller.export_csv(&path, ExportScope::Full).unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.path, path);
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "1,Alice,20,CS,88.5\n2,Bob,22,EE,91.0\n");
    assert_eq!(parse_rows(&text), controller.snapshot());
}

#[test]
fn export_scope_selects_filtered_or_full_rows() {
    let dir = tempfile::tempdir().unwrap();
    let visible_path = dir.path().join("visible.csv");
    let full_path = dir.path().join("full.csv");
    let mut controller = seeded_controller();
    controller.filter("bob");

    controller
        .export_csv(&visible_path, ExportScope::Visible)
        .unwrap();
    controller.export_csv(&full_path, ExportScope::Full).unwrap();

    assert_eq!(
        fs::read_to_string(&visible_path).unwrap(),
        "2,Bob,22,EE,91.0\n"
    );
    assert_eq!(parse_rows(&fs::read_to_string(&full_path).unwrap()).len(), 2);
}

#[test]
fn export_overwrites_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("students_export.csv");
    fs::write(&path, "stale\nstale\nstale\n").unwrap();
    let mut controller = seeded_controller();
    controller.filter("alice");

    controller.export_csv(&path, ExportScope::Visible).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "1,Alice,20,CS,88.5\n");
}

#[test]
fn empty_roster_exports_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    let controller = RosterController::new(SqliteStudentRepository::in_memory().unwrap());

    let summary = controller.export_csv(&path, ExportScope::Full).unwrap();

    assert_eq!(summary.rows, 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn unwritable_target_returns_export_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("out.csv");
    let controller = seeded_controller();

    let err = controller.export_csv(&path, ExportScope::Full).unwrap_err();

    assert!(matches!(err, ControllerError::Export(_)));
    assert!(err.to_string().contains("out.csv"));
}
