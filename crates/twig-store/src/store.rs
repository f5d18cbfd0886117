//! On-disk content-addressed object store.
//!
//! Objects live at `<root>/<id[0..2]>/<id>`. An object is written once and
//! never rewritten; a second `put` of identical content is a no-op.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::id::{ObjectId, is_lower_hex};
use crate::object::{Blob, Commit, Object, ObjectKind, digest};

/// Number of leading hex characters used as the shard directory name.
pub(crate) const SHARD_LEN: usize = 2;

/// Content-addressed store rooted at an objects directory.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Create a store handle for the given objects directory.
    ///
    /// The directory is not touched until [`ObjectStore::init`] or the
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the objects directory.
    ///
    /// # Errors
    /// Returns error if directory creation fails.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Get the objects directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.root.join(id.shard()).join(id.as_str())
    }

    // === Writing ===

    /// Persist an object and return its id.
    ///
    /// Existing objects are left untouched, so this is idempotent.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn put(&self, object: &Object) -> Result<ObjectId> {
        let (id, payload) = object.encode_with_id()?;
        let path = self.object_path(&id);
        if path.exists() {
            tracing::trace!(%id, "object already stored");
            return Ok(id);
        }

        let shard = self.root.join(id.shard());
        fs::create_dir_all(&shard)?;

        // Write beside the target and rename so readers never see a partial object.
        let mut tmp = NamedTempFile::new_in(&shard)?;
        tmp.write_all(&payload)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        tracing::debug!(%id, kind = %object.kind(), bytes = payload.len(), "stored object");
        Ok(id)
    }

    /// Persist a blob.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn put_blob(&self, blob: Blob) -> Result<ObjectId> {
        self.put(&Object::Blob(blob))
    }

    /// Persist a commit.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn put_commit(&self, commit: Commit) -> Result<ObjectId> {
        self.put(&Object::Commit(commit))
    }

    // === Reading ===

    /// Check whether an object with this exact id is stored.
    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.object_path(id).is_file()
    }

    /// Load an object by exact id.
    ///
    /// The stored bytes are re-hashed and must match `id`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if absent, [`Error::Corrupt`] if the
    /// content does not hash to `id` or cannot be decoded.
    pub fn get(&self, id: &ObjectId) -> Result<Object> {
        let path = self.object_path(id);
        let payload = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let object: Object = serde_json::from_slice(&payload).map_err(|e| Error::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if digest(object.kind(), &payload) != *id {
            return Err(Error::Corrupt {
                path,
                reason: "content does not match object id".into(),
            });
        }

        Ok(object)
    }

    /// Load a blob by exact id.
    ///
    /// # Errors
    /// Returns error if absent or if the object is not a blob.
    pub fn blob(&self, id: &ObjectId) -> Result<Blob> {
        match self.get(id)? {
            Object::Blob(blob) => Ok(blob),
            other => Err(unexpected(id, ObjectKind::Blob, other.kind())),
        }
    }

    /// Load a commit by exact id.
    ///
    /// # Errors
    /// Returns error if absent or if the object is not a commit.
    pub fn commit(&self, id: &ObjectId) -> Result<Commit> {
        match self.get(id)? {
            Object::Commit(commit) => Ok(commit),
            other => Err(unexpected(id, ObjectKind::Commit, other.kind())),
        }
    }

    // === Abbreviated lookup ===

    /// Resolve an abbreviated id to the single stored id it prefixes.
    ///
    /// # Errors
    /// - [`Error::InvalidId`] if the prefix is empty or not lowercase hex.
    /// - [`Error::PrefixTooLong`] if it is longer than a full id.
    /// - [`Error::NotFound`] if nothing matches.
    /// - [`Error::Ambiguous`] if more than one object matches.
    pub fn resolve(&self, prefix: &str) -> Result<ObjectId> {
        if prefix.len() > ObjectId::LEN {
            return Err(Error::PrefixTooLong(prefix.to_string()));
        }
        if prefix.is_empty() || !is_lower_hex(prefix) {
            return Err(Error::InvalidId(prefix.to_string()));
        }

        if prefix.len() == ObjectId::LEN {
            let id = ObjectId::parse(prefix)?;
            return if self.contains(&id) {
                Ok(id)
            } else {
                Err(Error::NotFound(prefix.to_string()))
            };
        }

        let mut matches = self.ids_with_prefix(prefix)?;
        match matches.len() {
            0 => Err(Error::NotFound(prefix.to_string())),
            1 => Ok(matches.remove(0)),
            n => Err(Error::Ambiguous {
                prefix: prefix.to_string(),
                matches: n,
            }),
        }
    }

    /// All stored ids beginning with `prefix`, in sorted order.
    fn ids_with_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        let shards: Vec<PathBuf> = if prefix.len() >= SHARD_LEN {
            vec![self.root.join(&prefix[..SHARD_LEN])]
        } else {
            list_dir(&self.root)?
                .into_iter()
                .filter(|(name, path)| name.starts_with(prefix) && path.is_dir())
                .map(|(_, path)| path)
                .collect()
        };

        let mut ids = Vec::new();
        for shard in shards {
            for (name, _) in list_dir(&shard)? {
                if name.starts_with(prefix) {
                    if let Ok(id) = ObjectId::parse(name) {
                        ids.push(id);
                    }
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

fn unexpected(id: &ObjectId, expected: ObjectKind, found: ObjectKind) -> Error {
    Error::UnexpectedKind {
        id: id.to_string(),
        expected: expected.as_str(),
        found: found.as_str(),
    }
}

/// List entries of a directory as (name, path); a missing directory is empty.
fn list_dir(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };

    Ok(entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(|n| (n.to_string(), e.path())))
        .collect())
}
