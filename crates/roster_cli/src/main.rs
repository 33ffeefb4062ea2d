//! Terminal front end for the student roster.
//!
//! # Responsibility
//! - Run the login prompt, then a line-oriented command loop.
//! - Render the visible roster table and command outcomes as text.
//!
//! All roster behavior lives in `roster_core`; this binary only reads lines,
//! forwards them to the command table and prints what came back.

use log::error;
use roster_core::model::student::COLUMN_HEADERS;
use roster_core::{
    init_logging, AccessGate, AuthError, CommandContext, CommandOutcome, CommandTable,
    ControllerError, CredentialChecker, FormField, RepoError, RosterConfig, RosterController,
    SqliteStudentRepository, StudentRepository,
};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

const HELP_TEXT: &str = "\
Commands:
  set <id|name|age|course|marks> <value>   fill a form field
  add | update | delete | clear             act on the form
  search [keyword]                          filter rows (empty shows all)
  select <row>                              copy a visible row into the form
  export [full|visible] [path]              write rows as CSV
  refresh | list | form | help | quit";

fn main() -> ExitCode {
    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("cannot resolve working directory: {err}");
            return ExitCode::FAILURE;
        }
    };
    let config = RosterConfig::for_working_dir(&working_dir);
    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("logging disabled: {err}");
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();
    let gate = AccessGate::with_default_credentials();
    let db_path = config.db_path.clone();

    let result = login(&mut input, &mut output, &gate, || {
        SqliteStudentRepository::open(&db_path)
    })
    .and_then(|controller| match controller {
        Some(mut controller) => {
            let table = CommandTable::new(CommandContext {
                export_path: config.export_path.clone(),
            });
            run_session(&mut input, &mut output, &table, &mut controller)
        }
        None => Ok(()),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Prompts until the gate accepts a login or input ends.
///
/// Returns `Ok(None)` on end of input. A store that fails to open after a
/// successful login is reported as an error.
fn login<R, C>(
    input: &mut impl BufRead,
    output: &mut impl Write,
    gate: &AccessGate<C>,
    open_repo: impl Fn() -> Result<R, RepoError>,
) -> io::Result<Option<RosterController<R>>>
where
    R: StudentRepository,
    C: CredentialChecker,
{
    loop {
        let Some(username) = prompt(input, output, "Username: ")? else {
            return Ok(None);
        };
        let Some(password) = prompt(input, output, "Password: ")? else {
            return Ok(None);
        };

        match gate.unlock(&username, &password, &open_repo) {
            Ok(controller) => {
                writeln!(output, "Welcome. Type `help` for commands.")?;
                render_table(output, &controller)?;
                return Ok(Some(controller));
            }
            Err(AuthError::InvalidCredentials) => writeln!(output, "Invalid credentials")?,
            Err(err) => return Err(io::Error::other(err)),
        }
    }
}

fn run_session<R: StudentRepository>(
    input: &mut impl BufRead,
    output: &mut impl Write,
    table: &CommandTable<R>,
    controller: &mut RosterController<R>,
) -> io::Result<()> {
    while let Some(line) = prompt(input, output, "> ")? {
        match line.trim().to_ascii_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => writeln!(output, "{HELP_TEXT}")?,
            "list" => render_table(output, controller)?,
            "form" => render_form(output, controller)?,
            _ => match table.dispatch(controller, &line) {
                Ok(outcome) => render_outcome(output, controller, &outcome)?,
                Err(err @ ControllerError::Export(_)) => writeln!(output, "Export failed: {err}")?,
                Err(err) => writeln!(output, "Error: {err}")?,
            },
        }
    }
    Ok(())
}

fn prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    label: &str,
) -> io::Result<Option<String>> {
    write!(output, "{label}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn render_outcome<R: StudentRepository>(
    output: &mut impl Write,
    controller: &RosterController<R>,
    outcome: &CommandOutcome,
) -> io::Result<()> {
    match outcome {
        CommandOutcome::Created(student) => writeln!(output, "Added {student}.")?,
        CommandOutcome::Updated(student) => writeln!(output, "Updated {student}.")?,
        CommandOutcome::Deleted(id) => writeln!(output, "Deleted {id}.")?,
        CommandOutcome::Cleared => return writeln!(output, "Form cleared."),
        CommandOutcome::Refreshed { rows } => writeln!(output, "Loaded {rows} row(s).")?,
        CommandOutcome::Filtered { visible } => writeln!(output, "{visible} row(s) match.")?,
        CommandOutcome::Selected { row, student } => {
            writeln!(output, "Selected row {row}: {student}.")?;
            return render_form(output, controller);
        }
        CommandOutcome::Exported(summary) => {
            return writeln!(
                output,
                "Exported successfully. ({} row(s) to {})",
                summary.rows,
                summary.path.display()
            );
        }
        CommandOutcome::FieldSet(field) => return writeln!(output, "{} set.", field.label()),
    }
    render_table(output, controller)
}

fn render_table<R: StudentRepository>(
    output: &mut impl Write,
    controller: &RosterController<R>,
) -> io::Result<()> {
    let rows = controller
        .visible_rows()
        .into_iter()
        .enumerate()
        .map(|(index, student)| {
            let mut cells = vec![index.to_string()];
            cells.extend(student.cells());
            cells
        })
        .collect::<Vec<_>>();

    let mut header = vec!["#".to_string()];
    header.extend(COLUMN_HEADERS.iter().map(|title| title.to_string()));

    let mut widths = header.iter().map(|cell| cell.chars().count()).collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(output, &header, &widths)?;
    for row in &rows {
        write_row(output, row, &widths)?;
    }
    if !controller.keyword().is_empty() {
        writeln!(
            output,
            "({} of {} rows match `{}`)",
            rows.len(),
            controller.snapshot().len(),
            controller.keyword()
        )?;
    }
    if controller.is_stale() {
        writeln!(output, "(display may be out of date; run `refresh`)")?;
    }
    Ok(())
}

fn write_row(output: &mut impl Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(output, "{}", line.trim_end())
}

fn render_form<R: StudentRepository>(
    output: &mut impl Write,
    controller: &RosterController<R>,
) -> io::Result<()> {
    let form = controller.form();
    for field in FormField::RECORD_FIELDS {
        writeln!(output, "{:>7}: {}", field.label(), form.get(field))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{login, run_session};
    use roster_core::{
        AccessGate, CommandContext, CommandTable, RosterController, SqliteStudentRepository,
        StudentRepository,
    };
    use std::io::Cursor;

    fn session(script: &str) -> (String, RosterController<SqliteStudentRepository>) {
        let dir = tempfile::tempdir().unwrap();
        let table = CommandTable::new(CommandContext {
            export_path: dir.path().join("students_export.csv"),
        });
        let mut controller = RosterController::new(SqliteStudentRepository::in_memory().unwrap());
        let mut input = Cursor::new(script.to_string());
        let mut output = Vec::new();

        run_session(&mut input, &mut output, &table, &mut controller).unwrap();
        (String::from_utf8(output).unwrap(), controller)
    }

    #[test]
    fn login_retries_until_credentials_are_accepted() {
        let gate = AccessGate::with_default_credentials();
        let mut input = Cursor::new("admin\nwrong\nadmin\nadmin123\n".to_string());
        let mut output = Vec::new();

        let controller = login(&mut input, &mut output, &gate, SqliteStudentRepository::in_memory)
            .unwrap()
            .expect("second attempt should log in");
        let text = String::from_utf8(output).unwrap();

        assert_eq!(text.matches("Invalid credentials").count(), 1);
        assert!(text.contains("Welcome."));
        assert!(controller.snapshot().is_empty());
    }

    #[test]
    fn login_returns_none_when_input_ends() {
        let gate = AccessGate::with_default_credentials();
        let mut input = Cursor::new("admin\n".to_string());
        let mut output = Vec::new();

        let controller =
            login(&mut input, &mut output, &gate, SqliteStudentRepository::in_memory).unwrap();
        assert!(controller.is_none());
    }

    #[test]
    fn session_adds_filters_and_reports_errors() {
        let script = "\
set id 1
set name Alice
set age 20
set course CS
set marks 88.5
add
set id 2
set name Bob
set age 22
set course EE
set marks 91.0
add
search ali
set id x
delete
quit
set id 9
";
        let (text, controller) = session(script);

        assert!(text.contains("Added 1 - Alice."));
        assert!(text.contains("Added 2 - Bob."));
        assert!(text.contains("1 row(s) match."));
        assert!(text.contains("Error: id is not a valid number"));
        assert_eq!(controller.repo().list_all().unwrap().len(), 2);
        assert_eq!(controller.form().id, "x");
    }

    #[test]
    fn builtin_commands_ignore_case() {
        let (text, controller) = session("set id 3\nFORM\nList\nQUIT\nset id 9\n");

        assert!(text.contains("     ID: 3"));
        assert!(text.contains("Marks"));
        assert_eq!(controller.form().id, "3");
    }

    #[test]
    fn search_keyword_keeps_trailing_space() {
        let (text, controller) = session("search ali \nlist\n");

        assert_eq!(controller.keyword(), "ali ");
        assert!(text.contains("0 row(s) match."));
    }

    #[test]
    fn unknown_commands_are_reported_without_ending_session() {
        let (text, _) = session("frobnicate\nlist\n");

        assert!(text.contains("Error: unknown command `frobnicate`"));
        assert!(text.contains("Marks"));
    }
}
