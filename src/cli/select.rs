//! Resolves which tracked project a command operates on.

use crate::cli::console::{strip_markup, ConsoleIo, LogSink};
use crate::error::{AppError, Result};
use crate::models::Project;

pub const ABORTED: &str = "Aborted";
pub const INVALID_PROJECT: &str = "Invalid project";

/// Picks a project from `projects`, either by `explicit_id` or through a numbered menu.
///
/// An explicit id (non-zero) is looked up among all candidates, without any console
/// interaction. Otherwise only projects with GitHub linkage are listed, numbered from 1 in
/// the order given, and the operator's answer picks one.
///
/// On success a single `Processing project: {title}` line goes to `log`.
///
/// # Errors
///
/// * `AppError::Abort("Aborted")` if the answer is empty, `0`, or not a number.
/// * `AppError::Abort("Invalid project")` if the explicit id is unknown or the answer is not
///   a menu position.
/// * I/O errors from `io`.
pub fn select_project(
    explicit_id: Option<i64>,
    projects: &[Project],
    io: &mut dyn ConsoleIo,
    log: &dyn LogSink,
) -> Result<Project> {
    let selected = match explicit_id.filter(|id| *id != 0) {
        // The GitHub linkage filter only applies to the menu.
        Some(id) => projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::abort(INVALID_PROJECT))?,
        None => prompt_for_project(projects, io)?,
    };

    log.info(&strip_markup(&format!(
        "Processing project: <info>{}</info>",
        selected.title
    )));

    Ok(selected)
}

fn prompt_for_project(projects: &[Project], io: &mut dyn ConsoleIo) -> Result<Project> {
    let menu: Vec<&Project> = projects.iter().filter(|p| p.is_selectable()).collect();

    io.write("", true)?;
    io.write("<b>Available projects:</b>", true)?;
    io.write("", true)?;

    for (index, project) in menu.iter().enumerate() {
        io.write(
            &format!("  <b>{}</b> (id: {}) {}", index + 1, project.id, project.title),
            true,
        )?;
    }

    io.write("", true)?;
    io.write("<question>Select a project:</question> ", false)?;

    let choice = parse_choice(&io.read_line()?);
    if choice == 0 {
        return Err(AppError::abort(ABORTED));
    }

    usize::try_from(choice)
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| menu.get(index))
        .map(|project| (*project).clone())
        .ok_or_else(|| AppError::abort(INVALID_PROJECT))
}

/// Reads the leading integer of `input`: optional whitespace, optional sign, digits.
///
/// Anything without leading digits is 0, and trailing garbage is ignored (`"3x"` is 3).
/// Values out of range saturate.
pub fn parse_choice(input: &str) -> i64 {
    let trimmed = input.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];
    if digits.is_empty() {
        return 0;
    }

    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}
