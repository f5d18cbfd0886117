//! Commit graph queries: ancestry, merge base, reachability.
//!
//! History is a DAG (merge commits have two parents), so every walk uses an
//! explicit worklist and a visited set rather than recursion.

use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use twig_store::{Commit, ObjectId};

use crate::error::{Error, Result};
use crate::traits::CommitSource;

/// Read-only view of the commit graph over a [`CommitSource`].
pub struct CommitGraph<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: CommitSource + ?Sized> CommitGraph<'a, S> {
    /// Create a graph view.
    pub const fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// All commits reachable from `id` through either parent, including `id`.
    ///
    /// # Errors
    /// Returns error if any commit on the way cannot be loaded.
    pub fn ancestors(&self, id: &ObjectId) -> Result<BTreeSet<ObjectId>> {
        self.all_reachable([id])
    }

    /// Union of [`CommitGraph::ancestors`] over a set of tips.
    ///
    /// # Errors
    /// Returns error if any commit on the way cannot be loaded.
    pub fn all_reachable<'t>(
        &self,
        tips: impl IntoIterator<Item = &'t ObjectId>,
    ) -> Result<BTreeSet<ObjectId>> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<ObjectId> = tips.into_iter().cloned().collect();

        while let Some(id) = stack.pop() {
            if visited.contains(&id) {
                continue;
            }
            let commit = self.source.load_commit(&id)?;
            stack.extend(commit.parents().filter(|p| !visited.contains(*p)).cloned());
            visited.insert(id);
        }

        Ok(visited)
    }

    /// Whether `ancestor` is reachable from `descendant`.
    ///
    /// # Errors
    /// Returns error if any commit on the way cannot be loaded.
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> Result<bool> {
        Ok(self.ancestors(descendant)?.contains(ancestor))
    }

    /// The merge base of `head` and `other`.
    ///
    /// Walks breadth-first from `other` and, among visited commits that are
    /// ancestors of `head`, picks the one with the latest timestamp. On equal
    /// timestamps the first one reached wins.
    ///
    /// # Errors
    /// Returns [`Error::NoSplitPoint`] if the two commits share no ancestor.
    pub fn split_point(&self, head: &ObjectId, other: &ObjectId) -> Result<ObjectId> {
        let head_ancestors = self.ancestors(head)?;

        let mut best: Option<(ObjectId, DateTime<Utc>)> = None;
        let mut queue = VecDeque::from([other.clone()]);
        let mut seen = BTreeSet::from([other.clone()]);

        while let Some(id) = queue.pop_front() {
            let commit = self.source.load_commit(&id)?;

            if head_ancestors.contains(&id)
                && best.as_ref().is_none_or(|(_, ts)| commit.timestamp > *ts)
            {
                best = Some((id.clone(), commit.timestamp));
            }

            for parent in commit.parents() {
                if seen.insert(parent.clone()) {
                    queue.push_back(parent.clone());
                }
            }
        }

        let (split, _) = best.ok_or_else(|| Error::NoSplitPoint {
            head: head.to_string(),
            other: other.to_string(),
        })?;
        tracing::debug!(%head, %other, %split, "found split point");
        Ok(split)
    }

    /// Commits from `from` back to the root following first parents only.
    ///
    /// # Errors
    /// Returns error if any commit on the way cannot be loaded.
    pub fn first_parent_history(&self, from: &ObjectId) -> Result<Vec<(ObjectId, Commit)>> {
        let mut history = Vec::new();
        let mut next = Some(from.clone());

        while let Some(id) = next {
            let commit = self.source.load_commit(&id)?;
            next = commit.parent.clone();
            history.push((id, commit));
        }

        Ok(history)
    }
}
