//! Object identifier newtype.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// A full object identifier: 40 lowercase hex characters of a SHA-1 digest.
///
/// # Examples
///
/// ```
/// use twig_store::ObjectId;
///
/// let id = ObjectId::parse("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();
/// assert_eq!(id.short(), "da39a3e");
/// assert!(ObjectId::parse("da39").is_err());
/// assert!(ObjectId::parse("DA39A3EE5E6B4B0D3255BFEF95601890AFD80709").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    /// Length of a full identifier in hex characters.
    pub const LEN: usize = 40;

    /// Length of the abbreviated form used in log output.
    pub const SHORT_LEN: usize = 7;

    /// Parse a full identifier.
    ///
    /// # Errors
    /// Returns [`Error::InvalidId`] unless `s` is exactly 40 lowercase hex
    /// characters.
    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.len() != Self::LEN || !is_lower_hex(&s) {
            return Err(Error::InvalidId(s));
        }
        Ok(Self(s))
    }

    pub(crate) fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The abbreviated identifier.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..Self::SHORT_LEN]
    }

    /// The shard directory name for this identifier.
    #[must_use]
    pub(crate) fn shard(&self) -> &str {
        &self.0[..crate::store::SHARD_LEN]
    }

    /// Check whether this identifier starts with `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

/// Check that every character is `0-9` or `a-f`.
pub(crate) fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for ObjectId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ObjectId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(s).map_err(serde::de::Error::custom)
    }
}
