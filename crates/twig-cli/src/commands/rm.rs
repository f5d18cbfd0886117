//! `twig rm` command - Unstage a file or stage its removal.

use anyhow::Result;

use super::utils::open_repo_locked;

/// Run the rm command.
pub fn run(file: &str) -> Result<()> {
    let (repo, _lock) = open_repo_locked()?;
    repo.remove(file)?;
    Ok(())
}
