//! Working directory access.
//!
//! The working tree is flat: the plain files directly under the root. The
//! control directory and any subdirectories are ignored.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use twig_store::{Blob, Object, ObjectId};

use crate::error::{Error, Result};
use crate::state::State;

/// The user's working directory.
#[derive(Debug, Clone)]
pub struct WorkTree {
    root: PathBuf,
}

impl WorkTree {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        validate_file_name(name)?;
        Ok(self.root.join(name))
    }

    /// Whether `name` is a plain file in the working tree.
    ///
    /// Names that can't live in the working tree root are never present.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_ok_and(|p| p.is_file())
    }

    /// Read a file's bytes.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFileName`] for a name outside the flat tree
    /// and [`Error::FileNotFound`] if the file is missing.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        match fs::read(self.path(name)?) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::FileNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a file into a blob record.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] if the file is missing.
    pub fn blob(&self, name: &str) -> Result<Blob> {
        Ok(Blob::new(name, self.read(name)?))
    }

    /// The id the file would have if it were added now, or `None` if it
    /// does not exist. Nothing is written to the store.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read.
    pub fn blob_id(&self, name: &str) -> Result<Option<ObjectId>> {
        if !self.path(name)?.is_file() {
            return Ok(None);
        }
        Ok(Some(Object::from(self.blob(name)?).id()?))
    }

    /// Create or overwrite a file.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn write(&self, name: &str, content: &[u8]) -> Result<()> {
        fs::write(self.path(name)?, content)?;
        Ok(())
    }

    /// Delete a file if present.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be removed.
    pub fn remove(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path(name)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all plain files in the working tree, sorted.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn file_names(&self) -> Result<BTreeSet<String>> {
        Ok(fs::read_dir(&self.root)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .filter(|name| validate_file_name(name).is_ok())
            .collect())
    }
}

fn invalid(name: &str, reason: &str) -> Error {
    Error::InvalidFileName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Check that `name` denotes a plain file directly in the working tree root.
///
/// # Errors
/// Returns [`Error::InvalidFileName`] for empty names, `.`/`..`, anything
/// with a path separator, absolute paths, and the control directory name.
pub fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, "file name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid(name, "not a file name"));
    }
    if name.contains(['/', '\\']) || Path::new(name).is_absolute() {
        return Err(invalid(name, "only files in the repository root can be tracked"));
    }
    if name == State::DIR_NAME {
        return Err(invalid(name, "the control directory cannot be tracked"));
    }
    if name.contains('\0') {
        return Err(invalid(name, "file name contains a reserved character"));
    }
    Ok(())
}
