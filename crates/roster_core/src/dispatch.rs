//! Named command dispatch over the roster controller.
//!
//! # Responsibility
//! - Map operation names to controller handlers.
//! - Parse the argument text of each command.
//!
//! # Invariants
//! - Command names are matched case-insensitively.
//! - Argument text after the single separator following a command name is
//!   passed on verbatim, so search keywords and field values keep their
//!   spaces.
//! - Dispatch never touches presentation; outcomes are plain data.

use crate::model::student::{Student, StudentId};
use crate::repo::student_repo::StudentRepository;
use crate::service::csv_export::{ExportScope, ExportSummary};
use crate::service::roster_controller::{ControllerError, FormField, RosterController};
use log::debug;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Handler signature for one roster command.
pub type CommandHandler<R> =
    fn(&mut RosterController<R>, &CommandContext, &str) -> Result<CommandOutcome, ControllerError>;

/// Settings shared by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    /// Target of `export` when no path argument is given.
    pub export_path: PathBuf,
}

/// What a dispatched command did.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Created(Student),
    Updated(Student),
    Deleted(StudentId),
    Cleared,
    Refreshed { rows: usize },
    Filtered { visible: usize },
    Selected { row: usize, student: Student },
    Exported(ExportSummary),
    FieldSet(FormField),
}

/// Operation name → handler table.
pub struct CommandTable<R: StudentRepository> {
    handlers: BTreeMap<&'static str, CommandHandler<R>>,
    context: CommandContext,
}

impl<R: StudentRepository> CommandTable<R> {
    /// Builds the table with every roster command registered.
    pub fn new(context: CommandContext) -> Self {
        let mut table = Self {
            handlers: BTreeMap::new(),
            context,
        };
        table.register("add", handle_add);
        table.register("update", handle_update);
        table.register("delete", handle_delete);
        table.register("clear", handle_clear);
        table.register("refresh", handle_refresh);
        table.register("search", handle_search);
        table.register("select", handle_select);
        table.register("export", handle_export);
        table.register("set", handle_set);
        table
    }

    /// Adds or replaces the handler for `name`.
    pub fn register(&mut self, name: &'static str, handler: CommandHandler<R>) {
        self.handlers.insert(name, handler);
    }

    /// Registered command names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Runs one command line such as `set name Alice` or `export full`.
    ///
    /// Leading whitespace before the command name is skipped. Everything
    /// after the one separator character that ends the name reaches the
    /// handler unchanged.
    pub fn dispatch(
        &self,
        controller: &mut RosterController<R>,
        line: &str,
    ) -> Result<CommandOutcome, ControllerError> {
        let (name, args) = split_word(line.trim_start());
        let name = name.to_ascii_lowercase();

        let handler = self
            .handlers
            .get(name.as_str())
            .ok_or_else(|| ControllerError::UnknownCommand(name.clone()))?;
        debug!("event=command_dispatch module=dispatch command={name}");
        handler(controller, &self.context, args)
    }
}

fn handle_add<R: StudentRepository>(
    controller: &mut RosterController<R>,
    _: &CommandContext,
    _: &str,
) -> Result<CommandOutcome, ControllerError> {
    controller.create().map(CommandOutcome::Created)
}

fn handle_update<R: StudentRepository>(
    controller: &mut RosterController<R>,
    _: &CommandContext,
    _: &str,
) -> Result<CommandOutcome, ControllerError> {
    controller.update().map(CommandOutcome::Updated)
}

fn handle_delete<R: StudentRepository>(
    controller: &mut RosterController<R>,
    _: &CommandContext,
    _: &str,
) -> Result<CommandOutcome, ControllerError> {
    controller.delete().map(CommandOutcome::Deleted)
}

fn handle_clear<R: StudentRepository>(
    controller: &mut RosterController<R>,
    _: &CommandContext,
    _: &str,
) -> Result<CommandOutcome, ControllerError> {
    controller.clear();
    Ok(CommandOutcome::Cleared)
}

fn handle_refresh<R: StudentRepository>(
    controller: &mut RosterController<R>,
    _: &CommandContext,
    _: &str,
) -> Result<CommandOutcome, ControllerError> {
    let rows = controller.refresh()?;
    Ok(CommandOutcome::Refreshed { rows })
}

fn handle_search<R: StudentRepository>(
    controller: &mut RosterController<R>,
    _: &CommandContext,
    args: &str,
) -> Result<CommandOutcome, ControllerError> {
    let visible = controller.filter(args);
    Ok(CommandOutcome::Filtered { visible })
}

fn handle_select<R: StudentRepository>(
    controller: &mut RosterController<R>,
    _: &CommandContext,
    args: &str,
) -> Result<CommandOutcome, ControllerError> {
    let row = args
        .trim()
        .parse::<usize>()
        .map_err(|_| ControllerError::InvalidArgument {
            command: "select",
            message: format!("expected a row number, got `{}`", args.trim()),
        })?;
    let student = controller.select_row(row)?;
    Ok(CommandOutcome::Selected { row, student })
}

/// `export [full|visible] [path]`; defaults to the visible rows and the
/// context's export path.
fn handle_export<R: StudentRepository>(
    controller: &mut RosterController<R>,
    context: &CommandContext,
    args: &str,
) -> Result<CommandOutcome, ControllerError> {
    let args = args.trim();
    let (first, rest) = args
        .split_once(char::is_whitespace)
        .map_or((args, ""), |(first, rest)| (first, rest.trim()));

    let (scope, path) = match ExportScope::parse(first) {
        Some(scope) => (scope, rest),
        None => (ExportScope::Visible, args),
    };
    let path = if path.is_empty() {
        context.export_path.clone()
    } else {
        PathBuf::from(path)
    };

    controller
        .export_csv(path, scope)
        .map(CommandOutcome::Exported)
}

/// `set <field> <value>`; the value is the rest of the line, verbatim.
/// `set search <keyword>` is the same as `search <keyword>`.
fn handle_set<R: StudentRepository>(
    controller: &mut RosterController<R>,
    context: &CommandContext,
    args: &str,
) -> Result<CommandOutcome, ControllerError> {
    let (field_name, value) = split_word(args.trim_start());
    if field_name.eq_ignore_ascii_case("search") {
        return handle_search(controller, context, value);
    }
    let field = FormField::parse(field_name).ok_or_else(|| ControllerError::InvalidArgument {
        command: "set",
        message: format!("unknown field `{field_name}`; expected id|name|age|course|marks|search"),
    })?;

    controller.set_field(field, value);
    Ok(CommandOutcome::FieldSet(field))
}

/// Splits off the first word and drops exactly one separator after it.
fn split_word(text: &str) -> (&str, &str) {
    match text.char_indices().find(|(_, ch)| ch.is_whitespace()) {
        Some((at, separator)) => (&text[..at], &text[at + separator.len_utf8()..]),
        None => (text, ""),
    }
}
