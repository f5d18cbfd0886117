//! `twig status` command - Show branches, staged files and working tree changes.

use anyhow::Result;
use serde::Serialize;
use twig_core::{Modification, StatusReport};

use super::utils::open_repo;
use crate::output;

/// JSON output for the status command.
#[derive(Debug, Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a StatusReport,
    show_untracked: bool,
}

/// Run the status command.
pub fn run(json: bool) -> Result<()> {
    let repo = open_repo()?;
    let show_untracked = repo.config()?.status.show_untracked;
    let report = repo.status()?;

    if json {
        let out = JsonOutput {
            report: &report,
            show_untracked,
        };
        output::essential(&serde_json::to_string_pretty(&out)?);
    } else {
        print_report(&report, show_untracked);
    }

    Ok(())
}

fn print_report(report: &StatusReport, show_untracked: bool) {
    output::essential(&output::section("Branches"));
    for branch in &report.branches {
        output::essential(&output::branch_name(
            branch.as_str(),
            *branch == report.current_branch,
        ));
    }
    output::essential("");

    print_section("Staged Files", report.staged.iter().map(String::as_str));
    print_section("Removed Files", report.removed.iter().map(String::as_str));

    let modifications: Vec<String> = report
        .not_staged
        .iter()
        .map(|(name, change)| match change {
            Modification::Modified => format!("{name} (modified)"),
            Modification::Deleted => format!("{name} (deleted)"),
        })
        .collect();
    print_section(
        "Modifications Not Staged For Commit",
        modifications.iter().map(String::as_str),
    );

    if show_untracked {
        print_section("Untracked Files", report.untracked.iter().map(String::as_str));
    }
}

fn print_section<'a>(title: &str, lines: impl Iterator<Item = &'a str>) {
    output::essential(&output::section(title));
    for line in lines {
        output::essential(line);
    }
    output::essential("");
}
