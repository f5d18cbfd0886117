//! Error types for twig-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in twig-core operations.
///
/// The messages of precondition variants are shown to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The .twig directory doesn't exist.
    #[error("Not in an initialized Twig directory.")]
    NotInitialized,

    /// `init` in a directory that already has a .twig directory.
    #[error("A Twig version-control system already exists in the current directory.")]
    AlreadyInitialized,

    /// Another process holds the repository lock.
    #[error("repository is locked by another twig process ({0})")]
    Locked(PathBuf),

    /// File to add is not in the working tree.
    #[error("File does not exist.")]
    FileNotFound,

    /// File name that does not denote a plain file in the working tree root.
    #[error("invalid file name '{name}': {reason}")]
    InvalidFileName {
        /// The rejected name.
        name: String,
        /// Why the name is rejected.
        reason: String,
    },

    /// Commit requested with an empty staging area.
    #[error("No changes added to the commit.")]
    NothingToCommit,

    /// Commit requested with a blank message.
    #[error("Please enter a commit message.")]
    EmptyMessage,

    /// `rm` of a file that is neither staged nor tracked.
    #[error("No reason to remove the file.")]
    NoReasonToRemove,

    /// `find` matched nothing.
    #[error("Found no commit with that message.")]
    NoCommitWithMessage,

    /// File checkout from a commit that does not track the file.
    #[error("File does not exist in that commit.")]
    FileNotInCommit,

    /// Checkout of a branch that does not exist.
    #[error("No such branch exists.")]
    NoSuchBranch,

    /// Branch lookup failed for rm-branch or merge.
    #[error("A branch with that name does not exist.")]
    BranchNotFound,

    /// Branch creation with a name already in use.
    #[error("A branch with that name already exists.")]
    BranchExists,

    /// Invalid branch name.
    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName {
        /// The invalid name.
        name: String,
        /// Why the name is invalid.
        reason: String,
    },

    /// Checkout of the branch that is already current.
    #[error("No need to checkout the current branch.")]
    CheckoutCurrentBranch,

    /// Deleting the current branch.
    #[error("Cannot remove the current branch.")]
    RemoveCurrentBranch,

    /// An untracked working file would be overwritten or removed.
    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedInTheWay {
        /// The offending file names.
        files: Vec<String>,
    },

    /// Merge with a non-empty staging area.
    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    /// Merge of the current branch into itself.
    #[error("Cannot merge a branch with itself.")]
    MergeWithSelf,

    /// No commit matches the given id or prefix.
    #[error("No commit with that id exists.")]
    CommitNotFound(String),

    /// More than one commit matches an abbreviated id.
    #[error("Ambiguous commit id '{prefix}' matches {matches} objects; use more characters.")]
    AmbiguousCommit { prefix: String, matches: usize },

    /// Two commits share no ancestor, which cannot happen in a single-rooted history.
    #[error("no common ancestor between {head} and {other}: history is inconsistent")]
    NoSplitPoint { head: String, other: String },

    /// State file parsing error.
    #[error("failed to parse {file}: {message}")]
    StateParseError { file: PathBuf, message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Object store error.
    #[error("object store error: {0}")]
    Store(#[from] twig_store::Error),
}

impl Error {
    /// Map a store lookup error for a user-supplied commit reference.
    ///
    /// Missing, malformed, and non-commit objects all become
    /// [`Error::CommitNotFound`]; ambiguity stays distinct.
    pub(crate) fn from_commit_lookup(reference: &str, err: twig_store::Error) -> Self {
        use twig_store::Error as S;
        match err {
            S::NotFound(_) | S::InvalidId(_) | S::PrefixTooLong(_) | S::UnexpectedKind { .. } => {
                Self::CommitNotFound(reference.to_string())
            }
            S::Ambiguous { prefix, matches } => Self::AmbiguousCommit { prefix, matches },
            other => Self::Store(other),
        }
    }

    /// Check if this error is a user-facing precondition failure rather
    /// than an unexpected fault.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        !matches!(
            self,
            Self::NoSplitPoint { .. }
                | Self::StateParseError { .. }
                | Self::Io(_)
                | Self::Json(_)
                | Self::Toml(_)
                | Self::Store(_)
        )
    }
}
