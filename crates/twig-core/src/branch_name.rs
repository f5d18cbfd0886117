//! Branch name validation and newtype.
//!
//! Each branch is stored as a single file under `.twig/refs/heads/`, so a
//! [`BranchName`] must be a safe file name as well as unambiguous on the
//! command line.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use twig_store::ObjectId;

use crate::error::Error;

/// A validated branch name.
///
/// # Examples
///
/// ```
/// use twig_core::BranchName;
///
/// assert!(BranchName::new("master").is_ok());
/// assert!(BranchName::new("fix-bug-123").is_ok());
///
/// assert!(BranchName::new("../etc/passwd").is_err());
/// assert!(BranchName::new("feature/auth").is_err());
/// assert!(BranchName::new("name;rm -rf").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBranchName`] if the name is not usable as a
    /// ref file name or could be confused with a commit id or a flag.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        validate_branch_name(&name)?;
        Ok(Self(name))
    }

    /// Get the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for BranchName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for BranchName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BranchName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for BranchName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BranchName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> Error {
    Error::InvalidBranchName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn validate_branch_name(name: &str) -> Result<(), Error> {
    if name.is_empty() {
        return Err(invalid(name, "branch name cannot be empty"));
    }

    if name.starts_with('.') {
        return Err(invalid(name, "branch name cannot start with '.'"));
    }

    if name.starts_with('-') {
        return Err(invalid(name, "branch name cannot start with '-'"));
    }

    #[allow(clippy::case_sensitive_file_extension_comparisons)]
    if name.ends_with(".lock") {
        return Err(invalid(name, "branch name cannot end with '.lock'"));
    }

    // A full-length id would shadow commit lookups on the command line.
    if name.len() >= ObjectId::LEN {
        return Err(invalid(
            name,
            format!("branch name must be shorter than {} characters", ObjectId::LEN),
        ));
    }

    for c in name.chars() {
        if c.is_ascii_control() {
            return Err(invalid(name, "branch name cannot contain control characters"));
        }

        if matches!(c, '/' | '\\') {
            return Err(invalid(name, format!("branch name cannot contain '{c}'")));
        }

        if matches!(c, ' ' | '~' | '^' | ':' | '?' | '*' | '[') {
            return Err(invalid(name, format!("branch name cannot contain '{c}'")));
        }

        if matches!(
            c,
            '$' | ';' | '|' | '&' | '>' | '<' | '`' | '"' | '\'' | '(' | ')' | '{' | '}' | '!'
        ) {
            return Err(invalid(
                name,
                format!("branch name cannot contain shell metacharacter '{c}'"),
            ));
        }
    }

    if name.contains("..") {
        return Err(invalid(name, "branch name cannot contain '..'"));
    }

    Ok(())
}
