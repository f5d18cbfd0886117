//! `twig reset` command - Move the current branch to a commit.

use anyhow::Result;

use super::utils::open_repo_locked;
use crate::output;

/// Run the reset command.
pub fn run(commit: &str) -> Result<()> {
    let (repo, _lock) = open_repo_locked()?;
    let id = repo.reset(commit)?;

    output::success(&format!(
        "{} is now at {}",
        repo.current_branch()?,
        output::commit_id(id.short())
    ));
    Ok(())
}
