//! Trait abstractions over history storage.
//!
//! Graph traversal and merge classification only need to load commits by
//! id, so they take a [`CommitSource`] instead of a concrete store. Tests
//! use an in-memory implementation.

use twig_store::{Commit, ObjectId, ObjectStore};

use crate::Result;

/// Anything that can load a commit by its full id.
#[allow(clippy::missing_errors_doc)]
pub trait CommitSource {
    /// Load the commit with this exact id.
    fn load_commit(&self, id: &ObjectId) -> Result<Commit>;
}

impl CommitSource for ObjectStore {
    fn load_commit(&self, id: &ObjectId) -> Result<Commit> {
        Ok(self.commit(id)?)
    }
}
