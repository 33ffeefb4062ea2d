use roster_core::{
    AccessGate, AuthError, FixedCredentials, SqliteStudentRepository, Student, StudentRepository,
};
use std::cell::Cell;

#[test]
fn default_gate_accepts_admin_only() {
    let gate = AccessGate::with_default_credentials();

    assert!(gate.authenticate("admin", "admin123"));
    assert!(!gate.authenticate("admin", "wrong"));
    assert!(!gate.authenticate("root", "admin123"));
}

#[test]
fn unlock_hands_over_loaded_controller() {
    let gate = AccessGate::new(FixedCredentials::new("registrar", "s3cret"));

    let controller = gate
        .unlock("registrar", "s3cret", || {
            let repo = SqliteStudentRepository::in_memory()?;
            repo.add(&Student::new(1, "Alice", 20, "CS", 88.5))?;
            Ok(repo)
        })
        .unwrap();

    assert_eq!(controller.snapshot().len(), 1);
    assert!(controller.form().id.is_empty());
}

#[test]
fn rejected_login_never_opens_store() {
    let gate = AccessGate::with_default_credentials();
    let opened = Cell::new(false);

    let result = gate.unlock("admin", "nope", || {
        opened.set(true);
        SqliteStudentRepository::in_memory()
    });

    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    assert!(!opened.get());
}

#[test]
fn injected_checker_replaces_fixed_pair() {
    let gate = AccessGate::new(|user: &str, password: &str| user == password);

    assert!(gate.authenticate("same", "same"));
    assert!(!gate.authenticate("admin", "admin123"));
}

#[test]
fn store_failure_after_login_is_reported() {
    let gate = AccessGate::with_default_credentials();
    let dir = tempfile::tempdir().unwrap();

    let result = gate.unlock("admin", "admin123", || {
        SqliteStudentRepository::open(dir.path().join("no-such-dir").join("db.sqlite3"))
    });

    assert!(matches!(result, Err(AuthError::Store(_))));
}
