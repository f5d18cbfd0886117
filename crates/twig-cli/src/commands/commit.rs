//! `twig commit` command - Record staged changes.

use anyhow::Result;

use super::utils::open_repo_locked;
use crate::output;

/// Run the commit command.
pub fn run(message: &str) -> Result<()> {
    let (repo, _lock) = open_repo_locked()?;
    let id = repo.commit(message)?;

    output::success(&format!(
        "[{} {}] {}",
        repo.current_branch()?,
        id.short(),
        message
    ));
    Ok(())
}
