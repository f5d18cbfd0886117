//! `twig branch` and `twig rm-branch` commands - Manage branch pointers.

use anyhow::Result;

use super::utils::open_repo_locked;
use crate::output;

/// Run the branch command.
pub fn run(name: &str) -> Result<()> {
    let (repo, _lock) = open_repo_locked()?;
    let head = repo.create_branch(name)?;

    output::success(&format!(
        "Created branch {name} at {}",
        output::commit_id(head.short())
    ));
    Ok(())
}

/// Run the rm-branch command.
pub fn run_remove(name: &str) -> Result<()> {
    let (repo, _lock) = open_repo_locked()?;
    repo.remove_branch(name)?;

    output::success(&format!("Deleted branch {name}"));
    Ok(())
}
