//! The staging area: pending additions and removals for the next commit.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use twig_store::{FileMap, ObjectId};

/// Pending change set consumed by the next commit.
///
/// A name is never staged for addition and removal at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingArea {
    /// File name to the blob id it will have in the next commit.
    #[serde(default)]
    additions: BTreeMap<String, ObjectId>,

    /// File names the next commit will stop tracking.
    #[serde(default)]
    removals: BTreeSet<String>,
}

impl StagingArea {
    /// Create an empty staging area.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            additions: BTreeMap::new(),
            removals: BTreeSet::new(),
        }
    }

    /// Stage `name` with the given blob, replacing any pending removal.
    pub fn stage_addition(&mut self, name: impl Into<String>, blob: ObjectId) {
        let name = name.into();
        self.removals.remove(&name);
        self.additions.insert(name, blob);
    }

    /// Stage `name` for removal, replacing any pending addition.
    pub fn stage_removal(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.additions.remove(&name);
        self.removals.insert(name);
    }

    /// Drop a pending addition. Returns `true` if one existed.
    pub fn unstage_addition(&mut self, name: &str) -> bool {
        self.additions.remove(name).is_some()
    }

    /// Drop a pending removal. Returns `true` if one existed.
    pub fn unstage_removal(&mut self, name: &str) -> bool {
        self.removals.remove(name)
    }

    /// Reset both collections.
    pub fn clear(&mut self) {
        self.additions.clear();
        self.removals.clear();
    }

    /// Whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    #[must_use]
    pub fn is_staged_for_addition(&self, name: &str) -> bool {
        self.additions.contains_key(name)
    }

    #[must_use]
    pub fn is_staged_for_removal(&self, name: &str) -> bool {
        self.removals.contains(name)
    }

    /// Staged in either direction.
    #[must_use]
    pub fn is_staged(&self, name: &str) -> bool {
        self.is_staged_for_addition(name) || self.is_staged_for_removal(name)
    }

    /// The blob staged for `name`, if any.
    #[must_use]
    pub fn addition(&self, name: &str) -> Option<&ObjectId> {
        self.additions.get(name)
    }

    /// Pending additions ordered by name.
    #[must_use]
    pub const fn additions(&self) -> &BTreeMap<String, ObjectId> {
        &self.additions
    }

    /// Pending removals ordered by name.
    #[must_use]
    pub const fn removals(&self) -> &BTreeSet<String> {
        &self.removals
    }

    /// Build the next snapshot: `base` minus removals plus additions.
    #[must_use]
    pub fn apply_to(&self, base: &FileMap) -> FileMap {
        let mut files = base.clone();
        for name in &self.removals {
            files.remove(name);
        }
        for (name, blob) in &self.additions {
            files.insert(name.clone(), blob.clone());
        }
        files
    }
}
