//! Stored record types: blobs and commits.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::Result;
use crate::id::ObjectId;

/// Snapshot mapping of file name to blob id, ordered by file name.
pub type FileMap = BTreeMap<String, ObjectId>;

/// A snapshot of one file's bytes plus its logical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// File name relative to the working tree root.
    pub name: String,

    /// Raw file content.
    #[serde(with = "hex::serde")]
    pub content: Vec<u8>,
}

impl Blob {
    /// Create a blob from a name and its content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// An immutable history node.
///
/// `files` is always the full tree snapshot at this point in history,
/// never a delta against the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Commit message.
    pub message: String,

    /// Creation time.
    pub timestamp: DateTime<Utc>,

    /// First parent. `None` only for the initial commit.
    pub parent: Option<ObjectId>,

    /// Second parent. Set only on merge commits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_parent: Option<ObjectId>,

    /// Every tracked file name mapped to its blob id.
    pub files: FileMap,
}

impl Commit {
    /// Message of the parentless commit created by `init`.
    pub const INITIAL_MESSAGE: &'static str = "initial commit";

    /// The repository's root commit: no parents, no files, epoch timestamp.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            message: Self::INITIAL_MESSAGE.to_string(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            parent: None,
            merge_parent: None,
            files: FileMap::new(),
        }
    }

    /// Iterate over the parents in order (first parent, then merge parent).
    pub fn parents(&self) -> impl Iterator<Item = &ObjectId> {
        self.parent.iter().chain(self.merge_parent.iter())
    }

    /// Whether this commit has two parents.
    #[must_use]
    pub const fn is_merge(&self) -> bool {
        self.merge_parent.is_some()
    }
}

/// Discriminant of a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Commit,
}

impl ObjectKind {
    /// Name used in the hash header and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any record that can live in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Object {
    Blob(Blob),
    Commit(Commit),
}

impl Object {
    /// The kind of this object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Canonical serialization. Map keys are ordered, so equal records
    /// always produce equal bytes.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Compute the identifier of this object together with its encoding.
    ///
    /// The digest covers `"<kind> <len>\0"` followed by the payload.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn encode_with_id(&self) -> Result<(ObjectId, Vec<u8>)> {
        let payload = self.encode()?;
        Ok((digest(self.kind(), &payload), payload))
    }

    /// Compute the identifier of this object.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn id(&self) -> Result<ObjectId> {
        self.encode_with_id().map(|(id, _)| id)
    }
}

impl From<Blob> for Object {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob)
    }
}

impl From<Commit> for Object {
    fn from(commit: Commit) -> Self {
        Self::Commit(commit)
    }
}

pub(crate) fn digest(kind: ObjectKind, payload: &[u8]) -> ObjectId {
    let header = format!("{} {}\0", kind.as_str(), payload.len());
    let mut hasher = Sha1::new();
    hasher.update(header.as_bytes());
    hasher.update(payload);
    ObjectId::from_digest(&hasher.finalize())
}
