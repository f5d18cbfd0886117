//! # twig-core
//!
//! Core library for Twig: the repository context, staging area, commit
//! graph queries, branch lifecycle, checkout/reset and three-way merge.

mod branch_name;
pub mod config;
mod error;
mod graph;
pub mod merge;
mod repository;
mod staging;
pub mod state;
pub mod status;
pub mod traits;
mod worktree;

pub use branch_name::BranchName;
pub use config::{ColorMode, Config};
pub use error::{Error, Result};
pub use graph::CommitGraph;
pub use merge::{MergeAction, MergeOutcome};
pub use repository::Repository;
pub use staging::StagingArea;
pub use state::{RepoLock, State};
pub use status::{FileStatus, Modification, StatusReport};
pub use traits::CommitSource;
pub use worktree::{WorkTree, validate_file_name};

pub use twig_store::{Blob, Commit, FileMap, Object, ObjectId, ObjectStore};
