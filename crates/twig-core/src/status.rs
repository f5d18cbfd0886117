//! Working tree status classification.

use std::collections::BTreeSet;

use serde::Serialize;
use twig_store::{FileMap, ObjectId};

use crate::branch_name::BranchName;
use crate::error::Result;
use crate::repository::Repository;
use crate::staging::StagingArea;

/// Where a single file stands relative to the head commit and staging area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// In the working tree but neither tracked nor staged.
    Untracked,
    /// Staged for addition with content matching the working file.
    StagedAddition,
    /// Staged for removal.
    StagedRemoval,
    /// Tracked and identical to the head commit.
    Tracked,
    /// Tracked or staged, but the working file differs.
    Modified,
    /// Tracked or staged, but the working file is gone.
    Deleted,
}

/// Classify one file name.
///
/// `working` is the blob id the working file would have, or `None` if the
/// file is absent. Returns `None` for a name known to nothing.
#[must_use]
pub fn classify(
    name: &str,
    head: &FileMap,
    staging: &StagingArea,
    working: Option<&ObjectId>,
) -> Option<FileStatus> {
    if staging.is_staged_for_removal(name) {
        return Some(FileStatus::StagedRemoval);
    }

    let expected = staging.addition(name).or_else(|| head.get(name));
    match (expected, working) {
        (Some(_), None) => Some(FileStatus::Deleted),
        (Some(e), Some(w)) if e != w => Some(FileStatus::Modified),
        (Some(_), Some(_)) if staging.is_staged_for_addition(name) => {
            Some(FileStatus::StagedAddition)
        }
        (Some(_), Some(_)) => Some(FileStatus::Tracked),
        (None, Some(_)) => Some(FileStatus::Untracked),
        (None, None) => None,
    }
}

/// How an unstaged change shows up in the status listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modification {
    Modified,
    Deleted,
}

/// Everything `twig status` reports.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// The checked-out branch.
    pub current_branch: BranchName,
    /// All branches, sorted.
    pub branches: Vec<BranchName>,
    /// Files staged for addition.
    pub staged: Vec<String>,
    /// Files staged for removal.
    pub removed: Vec<String>,
    /// Tracked or staged files whose working copy changed.
    pub not_staged: Vec<(String, Modification)>,
    /// Files present only in the working tree.
    pub untracked: Vec<String>,
}

impl Repository {
    /// Classify a single file name.
    ///
    /// # Errors
    /// Returns error if repository state or the working file can't be read.
    pub fn file_status(&self, name: &str) -> Result<Option<FileStatus>> {
        let head = self.head_commit()?;
        let staging = self.state().load_staging()?;
        let working = self.worktree().blob_id(name)?;
        Ok(classify(name, &head.files, &staging, working.as_ref()))
    }

    /// Build the full status report.
    ///
    /// # Errors
    /// Returns error if repository state or the working tree can't be read.
    pub fn status(&self) -> Result<StatusReport> {
        let head = self.head_commit()?;
        let staging = self.state().load_staging()?;

        let mut names: BTreeSet<String> = self.worktree().file_names()?;
        names.extend(head.files.keys().cloned());
        names.extend(staging.additions().keys().cloned());

        let mut not_staged = Vec::new();
        let mut untracked = Vec::new();
        for name in names {
            let working = self.worktree().blob_id(&name)?;
            match classify(&name, &head.files, &staging, working.as_ref()) {
                Some(FileStatus::Modified) => not_staged.push((name, Modification::Modified)),
                Some(FileStatus::Deleted) => not_staged.push((name, Modification::Deleted)),
                Some(FileStatus::Untracked) => untracked.push(name),
                _ => {}
            }
        }

        Ok(StatusReport {
            current_branch: self.current_branch()?,
            branches: self.state().list_branches()?,
            staged: staging.additions().keys().cloned().collect(),
            removed: staging.removals().iter().cloned().collect(),
            not_staged,
            untracked,
        })
    }

    /// Untracked working files that an operation would clobber.
    ///
    /// `incoming` pairs each file name the operation writes or deletes with
    /// the blob it will end up holding (`None` for a deletion or new
    /// content). A [`FileStatus::Untracked`] file is in the way unless it
    /// already holds exactly the incoming blob.
    pub(crate) fn untracked_in_the_way<'a>(
        &self,
        head: &FileMap,
        incoming: impl IntoIterator<Item = (&'a String, Option<&'a ObjectId>)>,
    ) -> Result<Vec<String>> {
        let staging = self.state().load_staging()?;
        let mut in_the_way = Vec::new();

        for (name, blob) in incoming {
            let working = self.worktree().blob_id(name)?;
            let untracked =
                classify(name, head, &staging, working.as_ref()) == Some(FileStatus::Untracked);
            if untracked && working.as_ref() != blob {
                in_the_way.push(name.clone());
            }
        }

        Ok(in_the_way)
    }
}
