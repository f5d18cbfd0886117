//! Terminal output formatting utilities.

use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use twig_core::{ColorMode, Repository};

static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Set quiet mode globally. Call once at startup.
pub fn set_quiet(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

/// Apply a configured color mode. `Auto` leaves terminal detection alone.
pub fn set_color_mode(mode: ColorMode) {
    match mode {
        ColorMode::Auto => {}
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
    }
}

/// Apply the color setting of the repository in the current directory, if any.
///
/// A missing repository or unreadable config is not an error here; the
/// command itself reports it.
pub fn apply_repo_color() {
    let Ok(cwd) = std::env::current_dir() else {
        return;
    };
    if let Ok(config) = Repository::open(cwd).and_then(|repo| repo.config()) {
        set_color_mode(config.general.color);
    }
}

/// Print a success message (suppressed in quiet mode).
pub fn success(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "✓".green(), msg);
    }
}

/// Print an error message (always prints to stderr).
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a warning message (always prints to stderr).
pub fn warn(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print an info message (suppressed in quiet mode).
pub fn info(msg: &str) {
    if !is_quiet() {
        println!("{} {}", "→".blue(), msg);
    }
}

/// Print a detail line without prefix (suppressed in quiet mode).
pub fn detail(msg: &str) {
    if !is_quiet() {
        println!("{msg}");
    }
}

/// Print essential output (always prints).
///
/// Use for command results such as log entries and found ids.
pub fn essential(msg: &str) {
    println!("{msg}");
}

/// A section header as used by `status`.
#[must_use]
pub fn section(title: &str) -> String {
    format!("=== {title} ===").bold().to_string()
}

/// A branch name with current indicator.
#[must_use]
pub fn branch_name(name: &str, is_current: bool) -> String {
    if is_current {
        format!("*{}", name.green())
    } else {
        name.to_string()
    }
}

/// A commit id, colored like git does.
#[must_use]
pub fn commit_id(id: &str) -> String {
    id.yellow().to_string()
}
