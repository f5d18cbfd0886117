//! `twig checkout` command - Switch branches or restore a file.

use anyhow::{Result, bail};

use super::utils::open_repo_locked;
use crate::output;

/// Run the checkout command.
///
/// `target` alone names a branch. With `file` (given after `--`), `target`
/// is an optional commit id and the file is restored from it, or from the
/// head commit when absent.
pub fn run(target: Option<&str>, file: Option<&str>) -> Result<()> {
    let (repo, _lock) = open_repo_locked()?;

    match (target, file) {
        (Some(branch), None) => {
            repo.checkout_branch(branch)?;
            output::success(&format!("Switched to branch {branch}"));
        }
        (None, Some(file)) => repo.checkout_file(file)?,
        (Some(commit), Some(file)) => repo.checkout_file_from(commit, file)?,
        (None, None) => bail!("Usage: twig checkout <branch> | -- <file> | <commit> -- <file>"),
    }

    Ok(())
}
