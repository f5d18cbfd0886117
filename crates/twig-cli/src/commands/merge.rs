//! `twig merge` command - Merge another branch into the current one.

use anyhow::Result;
use twig_core::MergeOutcome;

use super::utils::open_repo_locked;
use crate::output;

/// Run the merge command.
pub fn run(branch: &str, json: bool) -> Result<()> {
    let (repo, _lock) = open_repo_locked()?;
    let outcome = repo.merge(branch)?;

    if json {
        output::essential(&serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        MergeOutcome::AlreadyUpToDate => {
            output::info("Given branch is an ancestor of the current branch.");
        }
        MergeOutcome::FastForward { commit } => {
            output::success("Current branch fast-forwarded.");
            output::detail(&format!("  now at {}", output::commit_id(commit.short())));
        }
        MergeOutcome::Merged { commit } => {
            output::success(&format!(
                "Merged {branch} into {} as {}",
                repo.current_branch()?,
                output::commit_id(commit.short())
            ));
        }
        MergeOutcome::Conflicted { files, .. } => {
            output::warn("Encountered a merge conflict.");
            for file in files {
                output::detail(&format!("  {file}"));
            }
        }
    }

    Ok(())
}
