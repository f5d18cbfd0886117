//! `twig init` command - Create a repository in the current directory.

use anyhow::{Context, Result};
use twig_core::Repository;

use crate::output;

/// Run the init command.
pub fn run(initial_branch: Option<&str>) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let repo = Repository::init(&cwd, initial_branch)?;

    output::success(&format!(
        "Initialized empty Twig repository on branch {}",
        repo.current_branch()?
    ));
    output::info(&format!("State stored in: {}", repo.state().twig_dir().display()));

    Ok(())
}
