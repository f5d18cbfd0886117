//! # twig-store
//!
//! Content-addressed object storage for Twig.
//! Blobs and commits are hashed over their canonical serialization and
//! persisted exactly once under a path derived from the hash.

mod error;
mod id;
mod object;
mod store;

pub use error::{Error, Result};
pub use id::ObjectId;
pub use object::{Blob, Commit, FileMap, Object, ObjectKind};
pub use store::ObjectStore;
