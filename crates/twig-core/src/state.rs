//! State persistence for the .twig/ control directory.
//!
//! Layout:
//! - `objects/`        content-addressed blobs and commits
//! - `refs/heads/<b>`  one file per branch holding its head commit id
//! - `HEAD`            name of the current branch
//! - `staging.json`    the staging area
//! - `commits.json`    ids of every commit ever created
//! - `config.toml`     user settings
//! - `lock`            advisory lock held by mutating commands

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use twig_store::ObjectId;

use crate::branch_name::BranchName;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::staging::StagingArea;

/// Manages the .twig/ directory state.
#[derive(Debug, Clone)]
pub struct State {
    /// Path to the .twig/ directory.
    twig_dir: PathBuf,
}

impl State {
    /// Name of the control directory inside the working tree.
    pub const DIR_NAME: &'static str = ".twig";

    const OBJECTS_DIR: &'static str = "objects";
    const HEADS_DIR: &'static str = "refs/heads";
    const HEAD_FILE: &'static str = "HEAD";
    const STAGING_FILE: &'static str = "staging.json";
    const INDEX_FILE: &'static str = "commits.json";
    const CONFIG_FILE: &'static str = "config.toml";
    const LOCK_FILE: &'static str = "lock";

    /// Create a new State instance for the given working tree root.
    #[must_use]
    pub fn new(workdir: impl AsRef<Path>) -> Self {
        Self {
            twig_dir: workdir.as_ref().join(Self::DIR_NAME),
        }
    }

    /// Create the .twig/ directory structure.
    ///
    /// # Errors
    /// Returns [`Error::AlreadyInitialized`] if the directory exists, or an
    /// IO error if creation fails.
    pub fn init(&self, config: &Config) -> Result<()> {
        if self.twig_dir.exists() {
            return Err(Error::AlreadyInitialized);
        }

        fs::create_dir_all(self.objects_dir())?;
        fs::create_dir_all(self.heads_dir())?;
        self.save_staging(&StagingArea::new())?;
        self.save_commit_index(&BTreeSet::new())?;
        self.save_config(config)?;

        Ok(())
    }

    /// Check if twig is initialized here.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.twig_dir.is_dir() && self.head_path().is_file()
    }

    /// Get the path to the .twig directory.
    #[must_use]
    pub fn twig_dir(&self) -> &Path {
        &self.twig_dir
    }

    /// Get the path to the object store directory.
    #[must_use]
    pub fn objects_dir(&self) -> PathBuf {
        self.twig_dir.join(Self::OBJECTS_DIR)
    }

    // === Locking ===

    /// Take the exclusive repository lock.
    ///
    /// The lock is released when the returned guard is dropped.
    ///
    /// # Errors
    /// Returns [`Error::Locked`] if another process holds it.
    pub fn lock(&self) -> Result<RepoLock> {
        let path = self.twig_dir.join(Self::LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        file.try_lock_exclusive().map_err(|_| Error::Locked(path))?;
        Ok(RepoLock { file })
    }

    // === HEAD ===

    fn head_path(&self) -> PathBuf {
        self.twig_dir.join(Self::HEAD_FILE)
    }

    /// Name of the current branch.
    ///
    /// # Errors
    /// Returns error if HEAD is missing or holds an invalid name.
    pub fn current_branch(&self) -> Result<BranchName> {
        let path = self.head_path();
        let content = fs::read_to_string(&path)?;
        BranchName::new(content.trim()).map_err(|e| Error::StateParseError {
            file: path,
            message: e.to_string(),
        })
    }

    /// Point HEAD at a branch.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn set_current_branch(&self, branch: &BranchName) -> Result<()> {
        fs::write(self.head_path(), format!("{branch}\n"))?;
        Ok(())
    }

    // === Branch refs ===

    fn heads_dir(&self) -> PathBuf {
        self.twig_dir.join(Self::HEADS_DIR)
    }

    fn ref_path(&self, branch: &BranchName) -> PathBuf {
        self.heads_dir().join(branch.as_str())
    }

    /// Check if a branch exists.
    #[must_use]
    pub fn branch_exists(&self, branch: &BranchName) -> bool {
        self.ref_path(branch).is_file()
    }

    /// Head commit id of a branch.
    ///
    /// # Errors
    /// Returns [`Error::BranchNotFound`] if there is no such branch.
    pub fn branch_head(&self, branch: &BranchName) -> Result<ObjectId> {
        let path = self.ref_path(branch);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::BranchNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        ObjectId::parse(content.trim()).map_err(|e| Error::StateParseError {
            file: path,
            message: e.to_string(),
        })
    }

    /// Create or move a branch.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn set_branch_head(&self, branch: &BranchName, id: &ObjectId) -> Result<()> {
        fs::write(self.ref_path(branch), format!("{id}\n"))?;
        tracing::debug!(%branch, %id, "moved branch");
        Ok(())
    }

    /// Delete a branch pointer. Commits are never touched.
    ///
    /// # Errors
    /// Returns [`Error::BranchNotFound`] if there is no such branch.
    pub fn delete_branch(&self, branch: &BranchName) -> Result<()> {
        match fs::remove_file(self.ref_path(branch)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::BranchNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// All branches, sorted by name.
    ///
    /// # Errors
    /// Returns error if the refs directory can't be read.
    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let mut branches: Vec<BranchName> = fs::read_dir(self.heads_dir())?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .filter_map(|name| BranchName::new(name).ok())
            .collect();

        branches.sort();
        Ok(branches)
    }

    // === Staging area ===

    fn staging_path(&self) -> PathBuf {
        self.twig_dir.join(Self::STAGING_FILE)
    }

    /// Load the staging area.
    ///
    /// # Errors
    /// Returns error if the file can't be read or parsed.
    pub fn load_staging(&self) -> Result<StagingArea> {
        let content = fs::read_to_string(self.staging_path())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the staging area.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_staging(&self, staging: &StagingArea) -> Result<()> {
        let content = serde_json::to_string_pretty(staging)?;
        fs::write(self.staging_path(), content)?;
        Ok(())
    }

    // === Commit index ===

    fn index_path(&self) -> PathBuf {
        self.twig_dir.join(Self::INDEX_FILE)
    }

    /// Load the set of all known commit ids.
    ///
    /// Returns `None` if the index file is missing.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be read or parsed.
    pub fn load_commit_index(&self) -> Result<Option<BTreeSet<ObjectId>>> {
        let content = match fs::read_to_string(self.index_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Save the set of all known commit ids.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_commit_index(&self, index: &BTreeSet<ObjectId>) -> Result<()> {
        let content = serde_json::to_string_pretty(index)?;
        fs::write(self.index_path(), content)?;
        Ok(())
    }

    // === Config ===

    /// Load the config, falling back to defaults if absent.
    ///
    /// # Errors
    /// Returns error if the file exists but can't be parsed.
    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.twig_dir.join(Self::CONFIG_FILE))
    }

    /// Save the config.
    ///
    /// # Errors
    /// Returns error if serialization or write fails.
    pub fn save_config(&self, config: &Config) -> Result<()> {
        config.save(self.twig_dir.join(Self::CONFIG_FILE))
    }
}

/// Guard for the exclusive repository lock.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
