//! `twig add` command - Stage a file.

use anyhow::Result;

use super::utils::open_repo_locked;

/// Run the add command.
pub fn run(file: &str) -> Result<()> {
    let (repo, _lock) = open_repo_locked()?;
    repo.add(file)?;
    Ok(())
}
