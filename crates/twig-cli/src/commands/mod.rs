//! CLI command definitions and implementations.

use clap::{Parser, Subcommand};
use clap_complete::Shell;

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod completions;
pub mod find;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
mod utils;

/// Twig - a small local version-control system.
///
/// Snapshots of a flat working directory, branches, and three-way merge.
#[derive(Parser)]
#[command(name = "twig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress informational output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging (overrides `TWIG_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a repository in the current directory.
    Init {
        /// Name of the first branch (default from config: master).
        #[arg(long, value_name = "NAME")]
        initial_branch: Option<String>,
    },

    /// Stage a file for the next commit.
    Add {
        /// File in the working directory.
        file: String,
    },

    /// Record the staged changes as a new commit.
    Commit {
        /// Commit message.
        message: String,
    },

    /// Unstage a file, and stage its removal if tracked.
    Rm {
        /// File name.
        file: String,
    },

    /// Show history of the current branch, following first parents.
    Log {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show every commit ever made.
    GlobalLog {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print ids of commits with exactly this message.
    Find {
        /// Commit message to match.
        message: String,
    },

    /// Show branches, staged files and working tree changes.
    #[command(alias = "st")]
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Switch branches, or restore a file from a commit.
    ///
    /// Forms: `checkout <branch>`, `checkout -- <file>`,
    /// `checkout <commit> -- <file>`.
    #[command(alias = "co")]
    Checkout {
        /// Branch name, or commit id when a file follows `--`.
        target: Option<String>,

        /// File to restore.
        #[arg(last = true)]
        file: Option<String>,
    },

    /// Create a branch at the current commit.
    Branch {
        /// Name of the new branch.
        name: String,
    },

    /// Delete a branch pointer. Its commits are kept.
    RmBranch {
        /// Name of the branch to delete.
        name: String,
    },

    /// Move the current branch to a commit and check it out.
    Reset {
        /// Full or abbreviated commit id.
        commit: String,
    },

    /// Merge another branch into the current one.
    Merge {
        /// Branch to merge from.
        branch: String,

        /// Output the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}
