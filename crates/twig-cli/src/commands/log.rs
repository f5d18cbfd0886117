//! `twig log` and `twig global-log` commands - Show commit history.

use std::fmt::{Display, Write as _};

use anyhow::Result;
use chrono::{Local, TimeZone};
use serde::Serialize;
use twig_core::{Commit, ObjectId};

use super::utils::open_repo;
use crate::output;

/// Date layout of log entries, e.g. `Thu Nov 9 20:00:05 2017 -0800`.
const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y %z";

/// One commit as emitted by `--json`.
#[derive(Debug, Serialize)]
struct LogEntry<'a> {
    id: &'a ObjectId,
    #[serde(flatten)]
    commit: &'a Commit,
}

/// Run the log command.
pub fn run(json: bool) -> Result<()> {
    let repo = open_repo()?;
    print_history(&repo.log()?, json)
}

/// Run the global-log command.
pub fn run_global(json: bool) -> Result<()> {
    let repo = open_repo()?;
    print_history(&repo.global_log()?, json)
}

fn print_history(history: &[(ObjectId, Commit)], json: bool) -> Result<()> {
    if json {
        let entries: Vec<LogEntry<'_>> = history
            .iter()
            .map(|(id, commit)| LogEntry { id, commit })
            .collect();
        output::essential(&serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (id, commit) in history {
        output::essential(&format_entry(id, commit, &Local));
    }
    Ok(())
}

/// Render one log entry, timestamps shown in `tz`.
fn format_entry<Tz>(id: &ObjectId, commit: &Commit, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = format!("===\ncommit {id}\n");
    if let (Some(first), Some(second)) = (&commit.parent, &commit.merge_parent) {
        let _ = writeln!(out, "Merge: {} {}", first.short(), second.short());
    }
    let date = commit.timestamp.with_timezone(tz).format(DATE_FORMAT);
    let _ = writeln!(out, "Date: {date}");
    let _ = writeln!(out, "{}", commit.message);
    out
}
