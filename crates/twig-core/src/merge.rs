//! Three-way merge of another branch into the current one.
//!
//! Every file name in the split point, current head, or other head is
//! classified by comparing its blob id (or absence) across the three
//! snapshots. Conflicts are recorded in the working tree with markers and
//! committed; they are not an error.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::Serialize;
use twig_store::{Blob, FileMap, ObjectId};

use crate::error::{Error, Result};
use crate::repository::Repository;

/// What the merge does to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeAction {
    /// Keep the current version; nothing to do.
    Keep,
    /// Take the other branch's version.
    Adopt(ObjectId),
    /// The other branch deleted an unchanged file; delete it.
    Remove,
    /// Both sides changed differently. `None` marks a deleted side.
    Conflict {
        current: Option<ObjectId>,
        other: Option<ObjectId>,
    },
}

/// Decide the action for one file from its three versions.
#[must_use]
pub fn classify(
    split: Option<&ObjectId>,
    current: Option<&ObjectId>,
    other: Option<&ObjectId>,
) -> MergeAction {
    if current == other {
        // untouched on both sides, or changed identically (including both deleting)
        MergeAction::Keep
    } else if current == split {
        other.map_or(MergeAction::Remove, |o| MergeAction::Adopt(o.clone()))
    } else if other == split {
        MergeAction::Keep
    } else {
        MergeAction::Conflict {
            current: current.cloned(),
            other: other.cloned(),
        }
    }
}

/// Every file that needs an action, ordered by name. [`MergeAction::Keep`]
/// entries are left out.
#[must_use]
pub fn plan(split: &FileMap, current: &FileMap, other: &FileMap) -> BTreeMap<String, MergeAction> {
    let names: BTreeSet<&String> = split
        .keys()
        .chain(current.keys())
        .chain(other.keys())
        .collect();

    names
        .into_iter()
        .filter_map(|name| {
            let action = classify(split.get(name), current.get(name), other.get(name));
            tracing::trace!(%name, ?action, "classified");
            (action != MergeAction::Keep).then(|| (name.clone(), action))
        })
        .collect()
}

/// Build conflict-marked file content. A deleted side contributes nothing.
#[must_use]
pub fn conflict_content(current: &[u8], other: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(current.len() + other.len() + 32);
    out.extend_from_slice(b"<<<<<<< HEAD\n");
    out.extend_from_slice(current);
    out.extend_from_slice(b"=======\n");
    out.extend_from_slice(other);
    out.extend_from_slice(b">>>>>>>\n");
    out
}

/// Result of [`Repository::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MergeOutcome {
    /// The other branch is an ancestor of the current head.
    AlreadyUpToDate,
    /// The current branch was moved to the other head.
    FastForward { commit: ObjectId },
    /// A clean two-parent merge commit was created.
    Merged { commit: ObjectId },
    /// A two-parent commit was created with conflict markers in `files`.
    Conflicted { commit: ObjectId, files: Vec<String> },
}

impl Repository {
    /// Merge branch `other` into the current branch.
    ///
    /// # Errors
    /// - [`Error::UncommittedChanges`] if anything is staged.
    /// - [`Error::BranchNotFound`] / [`Error::MergeWithSelf`] for a bad target.
    /// - [`Error::UntrackedInTheWay`] if an untracked working file would be
    ///   overwritten or deleted. Nothing is changed in that case.
    /// - [`Error::NoSplitPoint`] if the histories share no commit.
    pub fn merge(&self, other: &str) -> Result<MergeOutcome> {
        if !self.state().load_staging()?.is_empty() {
            return Err(Error::UncommittedChanges);
        }
        let other_branch = self.existing_branch(other).ok_or(Error::BranchNotFound)?;
        let current_branch = self.current_branch()?;
        if other_branch == current_branch {
            return Err(Error::MergeWithSelf);
        }

        let head_id = self.head_id()?;
        let other_id = self.state().branch_head(&other_branch)?;
        let split_id = self.graph().split_point(&head_id, &other_id)?;

        if split_id == other_id {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }
        if split_id == head_id {
            self.replace_worktree(&other_id)?;
            self.state().set_branch_head(&current_branch, &other_id)?;
            tracing::debug!(branch = %current_branch, to = %other_id, "fast-forwarded");
            return Ok(MergeOutcome::FastForward { commit: other_id });
        }

        let split = self.store().commit(&split_id)?;
        let head = self.store().commit(&head_id)?;
        let theirs = self.store().commit(&other_id)?;
        let actions = plan(&split.files, &head.files, &theirs.files);

        let in_the_way = self.untracked_in_the_way(
            &head.files,
            actions.iter().map(|(name, action)| match action {
                MergeAction::Adopt(id) => (name, Some(id)),
                _ => (name, None),
            }),
        )?;
        if !in_the_way.is_empty() {
            return Err(Error::UntrackedInTheWay { files: in_the_way });
        }

        let mut staging = self.state().load_staging()?;
        let mut conflicts = Vec::new();
        for (name, action) in actions {
            match action {
                MergeAction::Keep => {}
                MergeAction::Adopt(blob_id) => {
                    let blob = self.store().blob(&blob_id)?;
                    self.worktree().write(&name, &blob.content)?;
                    staging.stage_addition(name, blob_id);
                }
                MergeAction::Remove => {
                    self.worktree().remove(&name)?;
                    staging.stage_removal(name);
                }
                MergeAction::Conflict { current, other } => {
                    let ours = self.blob_bytes(current.as_ref())?;
                    let theirs = self.blob_bytes(other.as_ref())?;
                    let content = conflict_content(&ours, &theirs);
                    self.worktree().write(&name, &content)?;
                    let blob_id = self.store().put_blob(Blob::new(name.as_str(), content))?;
                    staging.stage_addition(name.clone(), blob_id);
                    conflicts.push(name);
                }
            }
        }
        self.state().save_staging(&staging)?;

        let message = if conflicts.is_empty() {
            format!("Merged {other_branch} into {current_branch}.")
        } else {
            "Encountered a merge conflict.".to_string()
        };
        let commit = self.commit_at(&message, Utc::now(), Some(other_id))?;

        if conflicts.is_empty() {
            Ok(MergeOutcome::Merged { commit })
        } else {
            tracing::debug!(files = ?conflicts, "merge produced conflicts");
            Ok(MergeOutcome::Conflicted {
                commit,
                files: conflicts,
            })
        }
    }

    fn blob_bytes(&self, id: Option<&ObjectId>) -> Result<Vec<u8>> {
        match id {
            Some(id) => Ok(self.store().blob(id)?.content),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use twig_store::Object;

    fn id(content: &str) -> ObjectId {
        Object::from(Blob::new("f", content)).id().unwrap()
    }

    #[test]
    fn test_classify_all_cases() {
        let s = id("split");
        let c = id("current");
        let o = id("other");

        // unchanged in both
        assert_eq!(classify(Some(&s), Some(&s), Some(&s)), MergeAction::Keep);
        // changed only in other
        assert_eq!(classify(Some(&s), Some(&s), Some(&o)), MergeAction::Adopt(o.clone()));
        // deleted only in other
        assert_eq!(classify(Some(&s), Some(&s), None), MergeAction::Remove);
        // changed only in current
        assert_eq!(classify(Some(&s), Some(&c), Some(&s)), MergeAction::Keep);
        // deleted only in current
        assert_eq!(classify(Some(&s), None, Some(&s)), MergeAction::Keep);
        // same change on both sides
        assert_eq!(classify(Some(&s), Some(&c), Some(&c)), MergeAction::Keep);
        // deleted on both sides
        assert_eq!(classify(Some(&s), None, None), MergeAction::Keep);
        // added only in other
        assert_eq!(classify(None, None, Some(&o)), MergeAction::Adopt(o.clone()));
        // added only in current
        assert_eq!(classify(None, Some(&c), None), MergeAction::Keep);
    }

    #[test]
    fn test_classify_conflicts() {
        let s = id("split");
        let c = id("current");
        let o = id("other");

        assert_eq!(
            classify(Some(&s), Some(&c), Some(&o)),
            MergeAction::Conflict {
                current: Some(c.clone()),
                other: Some(o.clone())
            }
        );
        assert_eq!(
            classify(Some(&s), Some(&c), None),
            MergeAction::Conflict {
                current: Some(c.clone()),
                other: None
            }
        );
        assert_eq!(
            classify(Some(&s), None, Some(&o)),
            MergeAction::Conflict {
                current: None,
                other: Some(o.clone())
            }
        );
        assert_eq!(
            classify(None, Some(&c), Some(&o)),
            MergeAction::Conflict {
                current: Some(c),
                other: Some(o)
            }
        );
    }

    #[test]
    fn test_plan_skips_kept_files() {
        let split = FileMap::from([("a".to_string(), id("a")), ("b".to_string(), id("b"))]);
        let current = FileMap::from([("a".to_string(), id("a2")), ("b".to_string(), id("b"))]);
        let other = FileMap::from([("a".to_string(), id("a")), ("c".to_string(), id("c"))]);

        let actions = plan(&split, &current, &other);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions["b"], MergeAction::Remove);
        assert_eq!(actions["c"], MergeAction::Adopt(id("c")));
    }

    #[test]
    fn test_plan_against_graph_split_point() {
        use crate::graph::CommitGraph;
        use crate::traits::CommitSource;
        use crate::traits::memory::MemoryHistory;

        let mut h = MemoryHistory::new();
        let root = h.root();
        let base_files = FileMap::from([("f".to_string(), id("v1"))]);
        let base = h.commit_with_files("base", 10, &[&root], base_files.clone());

        let mut ours = base_files.clone();
        ours.insert("f".to_string(), id("A"));
        let head = h.commit_with_files("ours", 20, &[&base], ours);

        let mut theirs = base_files;
        theirs.insert("g".to_string(), id("g"));
        let other = h.commit_with_files("theirs", 30, &[&base], theirs);

        let split = CommitGraph::new(&h).split_point(&head, &other).unwrap();
        assert_eq!(split, base);

        let load = |id: &ObjectId| h.load_commit(id).unwrap().files;
        let actions = plan(&load(&split), &load(&head), &load(&other));
        assert_eq!(
            actions.into_iter().collect::<Vec<_>>(),
            vec![("g".to_string(), MergeAction::Adopt(id("g")))]
        );
    }

    #[test]
    fn test_conflict_content() {
        assert_eq!(
            conflict_content(b"A\n", b"B\n"),
            b"<<<<<<< HEAD\nA\n=======\nB\n>>>>>>>\n".to_vec()
        );
        assert_eq!(
            conflict_content(b"A\n", b""),
            b"<<<<<<< HEAD\nA\n=======\n>>>>>>>\n".to_vec()
        );
    }

    // === End to end ===

    fn setup_repo() -> (TempDir, Repository) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path(), None).unwrap();
        (temp, repo)
    }

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> ObjectId {
        repo.worktree().write(name, content.as_bytes()).unwrap();
        repo.add(name).unwrap();
        repo.commit(message).unwrap()
    }

    fn read(repo: &Repository, name: &str) -> String {
        String::from_utf8(repo.worktree().read(name).unwrap()).unwrap()
    }

    #[test]
    fn test_merge_preconditions() {
        let (_temp, repo) = setup_repo();
        repo.create_branch("other").unwrap();

        assert!(matches!(repo.merge("master"), Err(Error::MergeWithSelf)));
        assert!(matches!(repo.merge("nope"), Err(Error::BranchNotFound)));

        repo.worktree().write("f.txt", b"x").unwrap();
        repo.add("f.txt").unwrap();
        assert!(matches!(repo.merge("other"), Err(Error::UncommittedChanges)));
    }

    #[test]
    fn test_merge_ancestor_is_up_to_date() {
        let (_temp, repo) = setup_repo();
        repo.create_branch("other").unwrap();
        let head = commit_file(&repo, "f.txt", "x", "c1");

        assert_eq!(repo.merge("other").unwrap(), MergeOutcome::AlreadyUpToDate);
        assert_eq!(repo.head_id().unwrap(), head);

        // also when nothing was committed after branching
        repo.create_branch("same").unwrap();
        assert_eq!(repo.merge("same").unwrap(), MergeOutcome::AlreadyUpToDate);
    }

    #[test]
    fn test_merge_fast_forward() {
        let (_temp, repo) = setup_repo();
        commit_file(&repo, "base.txt", "base", "c1");
        repo.create_branch("other").unwrap();
        repo.checkout_branch("other").unwrap();
        commit_file(&repo, "new.txt", "new", "o1");
        repo.remove("base.txt").unwrap();
        let tip = repo.commit("o2").unwrap();
        repo.checkout_branch("master").unwrap();
        let commits_before = repo.commit_index().unwrap().len();

        assert_eq!(
            repo.merge("other").unwrap(),
            MergeOutcome::FastForward {
                commit: tip.clone()
            }
        );
        assert_eq!(repo.head_id().unwrap(), tip);
        assert_eq!(repo.commit_index().unwrap().len(), commits_before);
        assert_eq!(read(&repo, "new.txt"), "new");
        assert!(!repo.worktree().exists("base.txt"));
    }

    #[test]
    fn test_merge_clean() {
        let (_temp, repo) = setup_repo();
        commit_file(&repo, "a.txt", "a", "base a");
        commit_file(&repo, "b.txt", "b", "base b");
        repo.create_branch("other").unwrap();

        commit_file(&repo, "a.txt", "a master", "edit a");

        repo.checkout_branch("other").unwrap();
        commit_file(&repo, "c.txt", "c", "add c");
        repo.remove("b.txt").unwrap();
        let other_tip = repo.commit("drop b").unwrap();
        repo.checkout_branch("master").unwrap();
        let head_before = repo.head_id().unwrap();

        let MergeOutcome::Merged { commit } = repo.merge("other").unwrap() else {
            panic!("expected a clean merge");
        };

        let merged = repo.store().commit(&commit).unwrap();
        assert_eq!(merged.message, "Merged other into master.");
        assert_eq!(merged.parent, Some(head_before));
        assert_eq!(merged.merge_parent, Some(other_tip));
        let names: Vec<_> = merged.files.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a.txt", "c.txt"]);

        assert_eq!(read(&repo, "a.txt"), "a master");
        assert_eq!(read(&repo, "c.txt"), "c");
        assert!(!repo.worktree().exists("b.txt"));
        assert!(repo.state().load_staging().unwrap().is_empty());
    }

    #[test]
    fn test_merge_conflict() {
        let (_temp, repo) = setup_repo();
        commit_file(&repo, "f.txt", "base\n", "c1");
        repo.create_branch("other").unwrap();
        commit_file(&repo, "f.txt", "A\n", "master edit");
        repo.checkout_branch("other").unwrap();
        commit_file(&repo, "f.txt", "B\n", "other edit");
        repo.checkout_branch("master").unwrap();

        let outcome = repo.merge("other").unwrap();
        let MergeOutcome::Conflicted { commit, files } = outcome else {
            panic!("expected a conflict");
        };
        assert_eq!(files, vec!["f.txt"]);
        assert_eq!(read(&repo, "f.txt"), "<<<<<<< HEAD\nA\n=======\nB\n>>>>>>>\n");

        let merged = repo.store().commit(&commit).unwrap();
        assert_eq!(merged.message, "Encountered a merge conflict.");
        assert!(merged.is_merge());
        let blob = repo.store().blob(&merged.files["f.txt"]).unwrap();
        assert_eq!(blob.content, b"<<<<<<< HEAD\nA\n=======\nB\n>>>>>>>\n");
    }

    #[test]
    fn test_merge_conflict_with_deleted_side() {
        let (_temp, repo) = setup_repo();
        commit_file(&repo, "f.txt", "base\n", "c1");
        repo.create_branch("other").unwrap();
        commit_file(&repo, "f.txt", "A\n", "master edit");
        repo.checkout_branch("other").unwrap();
        repo.remove("f.txt").unwrap();
        repo.commit("other delete").unwrap();
        repo.checkout_branch("master").unwrap();

        assert!(matches!(
            repo.merge("other").unwrap(),
            MergeOutcome::Conflicted { .. }
        ));
        assert_eq!(read(&repo, "f.txt"), "<<<<<<< HEAD\nA\n=======\n>>>>>>>\n");
    }

    #[test]
    fn test_merge_allows_untracked_file_matching_incoming() {
        let (_temp, repo) = setup_repo();
        commit_file(&repo, "base.txt", "base", "c1");
        repo.create_branch("other").unwrap();
        commit_file(&repo, "m.txt", "m", "master edit");
        repo.checkout_branch("other").unwrap();
        commit_file(&repo, "new.txt", "theirs", "other add");
        repo.checkout_branch("master").unwrap();

        repo.worktree().write("new.txt", b"theirs").unwrap();
        assert_eq!(
            repo.file_status("new.txt").unwrap(),
            Some(crate::status::FileStatus::Untracked)
        );

        assert!(matches!(
            repo.merge("other").unwrap(),
            MergeOutcome::Merged { .. }
        ));
        assert!(repo.head_commit().unwrap().files.contains_key("new.txt"));
    }

    #[test]
    fn test_merge_aborts_on_untracked_file() {
        let (_temp, repo) = setup_repo();
        commit_file(&repo, "base.txt", "base", "c1");
        repo.create_branch("other").unwrap();
        commit_file(&repo, "m.txt", "m", "master edit");
        repo.checkout_branch("other").unwrap();
        commit_file(&repo, "new.txt", "theirs", "other add");
        repo.checkout_branch("master").unwrap();

        repo.worktree().write("new.txt", b"mine").unwrap();
        let head = repo.head_id().unwrap();

        assert!(matches!(
            repo.merge("other"),
            Err(Error::UntrackedInTheWay { .. })
        ));
        assert_eq!(repo.head_id().unwrap(), head);
        assert_eq!(read(&repo, "new.txt"), "mine");
        assert!(repo.state().load_staging().unwrap().is_empty());
    }

    #[test]
    fn test_merge_identical_changes_still_commits() {
        let (_temp, repo) = setup_repo();
        commit_file(&repo, "f.txt", "base", "c1");
        repo.create_branch("other").unwrap();
        commit_file(&repo, "f.txt", "same", "master edit");
        repo.checkout_branch("other").unwrap();
        commit_file(&repo, "f.txt", "same", "other edit");
        repo.checkout_branch("master").unwrap();

        let MergeOutcome::Merged { commit } = repo.merge("other").unwrap() else {
            panic!("expected a clean merge");
        };
        assert!(repo.store().commit(&commit).unwrap().is_merge());
    }
}
