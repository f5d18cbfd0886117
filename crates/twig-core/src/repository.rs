//! The repository context.
//!
//! [`Repository`] owns the object store, the control-directory state and
//! the working tree, and every operation goes through it. All precondition
//! checks run before the first durable write.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use twig_store::{Blob, Commit, ObjectId, ObjectStore};

use crate::branch_name::BranchName;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::CommitGraph;
use crate::state::{RepoLock, State};
use crate::worktree::WorkTree;

/// A Twig repository rooted at a working directory.
#[derive(Debug, Clone)]
pub struct Repository {
    state: State,
    store: ObjectStore,
    worktree: WorkTree,
}

impl Repository {
    /// Create a new repository in `workdir` with its initial commit.
    ///
    /// `initial_branch` overrides the configured default branch name.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyInitialized`] if a .twig directory exists.
    pub fn init(workdir: impl AsRef<Path>, initial_branch: Option<&str>) -> Result<Self> {
        let workdir = workdir.as_ref();
        let state = State::new(workdir);
        if state.twig_dir().exists() {
            return Err(Error::AlreadyInitialized);
        }

        let mut config = Config::default();
        let branch = BranchName::new(initial_branch.unwrap_or(&config.general.default_branch))?;
        config.general.default_branch = branch.to_string();

        state.init(&config)?;
        let repo = Self {
            store: ObjectStore::new(state.objects_dir()),
            worktree: WorkTree::new(workdir),
            state,
        };

        let root = repo.store.put_commit(Commit::initial())?;
        repo.register_commit(&root)?;
        repo.state.set_branch_head(&branch, &root)?;
        repo.state.set_current_branch(&branch)?;

        tracing::debug!(%branch, %root, "initialized repository");
        Ok(repo)
    }

    /// Open an existing repository.
    ///
    /// # Errors
    /// Returns [`Error::NotInitialized`] if `workdir` has no .twig directory.
    pub fn open(workdir: impl AsRef<Path>) -> Result<Self> {
        let workdir = workdir.as_ref();
        let state = State::new(workdir);
        if !state.is_initialized() {
            return Err(Error::NotInitialized);
        }

        Ok(Self {
            store: ObjectStore::new(state.objects_dir()),
            worktree: WorkTree::new(workdir),
            state,
        })
    }

    #[must_use]
    pub const fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub const fn store(&self) -> &ObjectStore {
        &self.store
    }

    #[must_use]
    pub const fn worktree(&self) -> &WorkTree {
        &self.worktree
    }

    /// Load the repository config.
    ///
    /// # Errors
    /// Returns error if the config file can't be parsed.
    pub fn config(&self) -> Result<Config> {
        self.state.load_config()
    }

    /// Take the exclusive lock for a mutating command.
    ///
    /// # Errors
    /// Returns [`Error::Locked`] if another process holds it.
    pub fn lock(&self) -> Result<RepoLock> {
        self.state.lock()
    }

    /// Graph view over this repository's commits.
    #[must_use]
    pub const fn graph(&self) -> CommitGraph<'_, ObjectStore> {
        CommitGraph::new(&self.store)
    }

    // === Head ===

    /// Name of the current branch.
    ///
    /// # Errors
    /// Returns error if HEAD can't be read.
    pub fn current_branch(&self) -> Result<BranchName> {
        self.state.current_branch()
    }

    /// Id of the current branch's head commit.
    ///
    /// # Errors
    /// Returns error if HEAD or the branch ref can't be read.
    pub fn head_id(&self) -> Result<ObjectId> {
        self.state.branch_head(&self.current_branch()?)
    }

    /// The current branch's head commit.
    ///
    /// # Errors
    /// Returns error if the commit can't be loaded.
    pub fn head_commit(&self) -> Result<Commit> {
        Ok(self.store.commit(&self.head_id()?)?)
    }

    /// Resolve a full or abbreviated commit id.
    ///
    /// # Errors
    /// Returns [`Error::CommitNotFound`] if nothing (or only a non-commit)
    /// matches, [`Error::AmbiguousCommit`] if several commits match. Blobs
    /// sharing the prefix are ignored.
    pub fn resolve_commit(&self, prefix: &str) -> Result<ObjectId> {
        let id = match self.store.resolve(prefix) {
            Ok(id) => id,
            Err(twig_store::Error::Ambiguous { .. }) => self.resolve_in_commit_index(prefix)?,
            Err(e) => return Err(Error::from_commit_lookup(prefix, e)),
        };
        self.store
            .commit(&id)
            .map_err(|e| Error::from_commit_lookup(prefix, e))?;
        Ok(id)
    }

    fn resolve_in_commit_index(&self, prefix: &str) -> Result<ObjectId> {
        let mut matches: Vec<ObjectId> = self
            .commit_index()?
            .into_iter()
            .filter(|id| id.starts_with(prefix))
            .collect();

        match matches.len() {
            0 => Err(Error::CommitNotFound(prefix.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(Error::AmbiguousCommit {
                prefix: prefix.to_string(),
                matches: n,
            }),
        }
    }

    // === Commit index ===

    /// Ids of every commit ever created.
    ///
    /// If the index file is missing it is rebuilt from all branch tips.
    ///
    /// # Errors
    /// Returns error if the index or any reachable commit can't be read.
    pub fn commit_index(&self) -> Result<BTreeSet<ObjectId>> {
        if let Some(index) = self.state.load_commit_index()? {
            return Ok(index);
        }

        let tips = self
            .state
            .list_branches()?
            .iter()
            .map(|b| self.state.branch_head(b))
            .collect::<Result<Vec<_>>>()?;
        let index = self.graph().all_reachable(&tips)?;
        self.state.save_commit_index(&index)?;

        tracing::info!(commits = index.len(), "rebuilt commit index from branch tips");
        Ok(index)
    }

    fn register_commit(&self, id: &ObjectId) -> Result<()> {
        let mut index = self.commit_index()?;
        if index.insert(id.clone()) {
            self.state.save_commit_index(&index)?;
        }
        Ok(())
    }

    // === Staging ===

    /// Stage a working file for the next commit.
    ///
    /// The blob is always persisted. If the content equals the head
    /// commit's version any pending addition is dropped instead; a pending
    /// removal is always cleared.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] if the file is not in the working tree.
    pub fn add(&self, name: &str) -> Result<()> {
        let blob = self.worktree.blob(name)?;
        let head = self.head_commit()?;
        let mut staging = self.state.load_staging()?;

        let id = self.store.put_blob(blob)?;
        staging.unstage_removal(name);
        if head.files.get(name) == Some(&id) {
            staging.unstage_addition(name);
        } else {
            staging.stage_addition(name, id);
        }

        self.state.save_staging(&staging)
    }

    /// Unstage a file and, if tracked, stage its removal and delete it.
    ///
    /// # Errors
    /// Returns [`Error::NoReasonToRemove`] if the file is neither staged
    /// nor tracked by the head commit.
    pub fn remove(&self, name: &str) -> Result<()> {
        let head = self.head_commit()?;
        let mut staging = self.state.load_staging()?;

        let unstaged = staging.unstage_addition(name);
        let tracked = head.files.contains_key(name);
        if !unstaged && !tracked {
            return Err(Error::NoReasonToRemove);
        }

        if tracked {
            staging.stage_removal(name);
            self.worktree.remove(name)?;
        }

        self.state.save_staging(&staging)
    }

    // === Commits ===

    /// Commit the staging area on the current branch, stamped now.
    ///
    /// # Errors
    /// See [`Repository::commit_at`].
    pub fn commit(&self, message: &str) -> Result<ObjectId> {
        self.commit_at(message, Utc::now(), None)
    }

    /// Create a commit from the head snapshot plus staged changes.
    ///
    /// A `merge_parent` makes this a two-parent merge commit, which is
    /// allowed even when nothing is staged.
    ///
    /// # Errors
    /// Returns [`Error::EmptyMessage`] for a blank message and
    /// [`Error::NothingToCommit`] if nothing is staged.
    pub fn commit_at(
        &self,
        message: &str,
        timestamp: DateTime<Utc>,
        merge_parent: Option<ObjectId>,
    ) -> Result<ObjectId> {
        if message.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }

        let mut staging = self.state.load_staging()?;
        if staging.is_empty() && merge_parent.is_none() {
            return Err(Error::NothingToCommit);
        }

        let branch = self.current_branch()?;
        let parent_id = self.state.branch_head(&branch)?;
        let parent = self.store.commit(&parent_id)?;

        let commit = Commit {
            message: message.to_string(),
            timestamp,
            files: staging.apply_to(&parent.files),
            parent: Some(parent_id),
            merge_parent,
        };

        let id = self.store.put_commit(commit)?;
        self.register_commit(&id)?;
        self.state.set_branch_head(&branch, &id)?;
        staging.clear();
        self.state.save_staging(&staging)?;

        tracing::debug!(%branch, %id, "created commit");
        Ok(id)
    }

    // === History ===

    /// Commits from the head back to the root along first parents.
    ///
    /// # Errors
    /// Returns error if any commit can't be loaded.
    pub fn log(&self) -> Result<Vec<(ObjectId, Commit)>> {
        self.graph().first_parent_history(&self.head_id()?)
    }

    /// Every commit ever made, in id order.
    ///
    /// # Errors
    /// Returns error if any commit can't be loaded.
    pub fn global_log(&self) -> Result<Vec<(ObjectId, Commit)>> {
        self.commit_index()?
            .into_iter()
            .map(|id| {
                let commit = self.store.commit(&id)?;
                Ok((id, commit))
            })
            .collect()
    }

    /// Ids of all commits whose message is exactly `message`.
    ///
    /// # Errors
    /// Returns [`Error::NoCommitWithMessage`] if there are none.
    pub fn find(&self, message: &str) -> Result<Vec<ObjectId>> {
        let ids: Vec<ObjectId> = self
            .global_log()?
            .into_iter()
            .filter(|(_, commit)| commit.message == message)
            .map(|(id, _)| id)
            .collect();

        if ids.is_empty() {
            return Err(Error::NoCommitWithMessage);
        }
        Ok(ids)
    }

    // === Branches ===

    /// Create a branch at the current head commit.
    ///
    /// # Errors
    /// Returns [`Error::BranchExists`] if the name is taken.
    pub fn create_branch(&self, name: &str) -> Result<ObjectId> {
        let branch = BranchName::new(name)?;
        if self.state.branch_exists(&branch) {
            return Err(Error::BranchExists);
        }

        let head = self.head_id()?;
        self.state.set_branch_head(&branch, &head)?;
        Ok(head)
    }

    /// Delete a branch pointer.
    ///
    /// # Errors
    /// Returns [`Error::BranchNotFound`] or [`Error::RemoveCurrentBranch`].
    pub fn remove_branch(&self, name: &str) -> Result<()> {
        let branch = self.existing_branch(name).ok_or(Error::BranchNotFound)?;
        if branch == self.current_branch()? {
            return Err(Error::RemoveCurrentBranch);
        }
        self.state.delete_branch(&branch)
    }

    /// Look up a branch by user-supplied name.
    pub(crate) fn existing_branch(&self, name: &str) -> Option<BranchName> {
        BranchName::new(name)
            .ok()
            .filter(|b| self.state.branch_exists(b))
    }

    // === Checkout and reset ===

    /// Restore one file from the head commit.
    ///
    /// # Errors
    /// Returns [`Error::FileNotInCommit`] if the head does not track it.
    pub fn checkout_file(&self, name: &str) -> Result<()> {
        self.restore_file(&self.head_id()?, name)
    }

    /// Restore one file from a commit given by full or abbreviated id.
    ///
    /// # Errors
    /// Returns [`Error::CommitNotFound`], [`Error::AmbiguousCommit`] or
    /// [`Error::FileNotInCommit`].
    pub fn checkout_file_from(&self, commit: &str, name: &str) -> Result<()> {
        let id = self.resolve_commit(commit)?;
        self.restore_file(&id, name)
    }

    fn restore_file(&self, commit_id: &ObjectId, name: &str) -> Result<()> {
        let commit = self.store.commit(commit_id)?;
        let blob_id = commit.files.get(name).ok_or(Error::FileNotInCommit)?;
        let blob = self.store.blob(blob_id)?;

        let mut staging = self.state.load_staging()?;
        self.worktree.write(name, &blob.content)?;
        if staging.unstage_addition(name) {
            self.state.save_staging(&staging)?;
        }
        Ok(())
    }

    /// Switch to another branch, replacing the working tree with its head.
    ///
    /// # Errors
    /// Returns [`Error::NoSuchBranch`], [`Error::CheckoutCurrentBranch`] or
    /// [`Error::UntrackedInTheWay`].
    pub fn checkout_branch(&self, name: &str) -> Result<()> {
        let branch = self.existing_branch(name).ok_or(Error::NoSuchBranch)?;
        if branch == self.current_branch()? {
            return Err(Error::CheckoutCurrentBranch);
        }

        let target = self.state.branch_head(&branch)?;
        self.replace_worktree(&target)?;
        self.state.set_current_branch(&branch)?;
        Ok(())
    }

    /// Move the current branch to a commit and check out its snapshot.
    ///
    /// # Errors
    /// Returns [`Error::CommitNotFound`], [`Error::AmbiguousCommit`] or
    /// [`Error::UntrackedInTheWay`].
    pub fn reset(&self, commit: &str) -> Result<ObjectId> {
        let target = self.resolve_commit(commit)?;
        self.replace_worktree(&target)?;
        self.state.set_branch_head(&self.current_branch()?, &target)?;
        Ok(target)
    }

    /// Replace every tracked file with the snapshot of `target` and clear
    /// the staging area.
    ///
    /// Fails before touching anything if an untracked file would be
    /// overwritten with different content.
    pub(crate) fn replace_worktree(&self, target: &ObjectId) -> Result<()> {
        let head = self.head_commit()?;
        let target = self.store.commit(target)?;

        let in_the_way = self.untracked_in_the_way(
            &head.files,
            target.files.iter().map(|(name, id)| (name, Some(id))),
        )?;
        if !in_the_way.is_empty() {
            return Err(Error::UntrackedInTheWay { files: in_the_way });
        }

        let blobs = target
            .files
            .iter()
            .map(|(name, id)| Ok((name, self.store.blob(id)?)))
            .collect::<Result<Vec<(&String, Blob)>>>()?;

        for name in head.files.keys() {
            if !target.files.contains_key(name) {
                self.worktree.remove(name)?;
            }
        }
        for (name, blob) in blobs {
            self.worktree.write(name, &blob.content)?;
        }

        let mut staging = self.state.load_staging()?;
        staging.clear();
        self.state.save_staging(&staging)
    }
}
