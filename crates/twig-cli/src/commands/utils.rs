use anyhow::{Context, Result};
use twig_core::{RepoLock, Repository};

/// Open the repository in the current directory for reading.
pub fn open_repo() -> Result<Repository> {
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    Ok(Repository::open(cwd)?)
}

/// Open the repository and take the exclusive lock for a mutating command.
///
/// The lock is released when the returned guard is dropped.
pub fn open_repo_locked() -> Result<(Repository, RepoLock)> {
    let repo = open_repo()?;
    let lock = repo.lock()?;
    Ok((repo, lock))
}
