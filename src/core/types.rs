//! core::types
//!
//! Strong types for names and identifiers that cross the engine boundary.
//!
//! # Types
//!
//! - [`BranchName`] - Validated short branch name (`main`, `feature/x`)
//! - [`TagName`] - Validated short tag name (`v1.0.0`)
//! - [`Oid`] - Git object identifier (SHA)
//!
//! # Validation
//!
//! These types enforce validity at construction time. Operations accept
//! plain strings as option values and convert them here, so a malformed
//! name is rejected before the engine touches the repository.
//!
//! # Examples
//!
//! ```
//! use gitvane::core::types::{BranchName, Oid, TagName};
//!
//! let branch = BranchName::new("feature/my-branch").unwrap();
//! assert_eq!(branch.full_name(), "refs/heads/feature/my-branch");
//!
//! let tag = TagName::new("v1.0.0").unwrap();
//! assert_eq!(tag.full_name(), "refs/tags/v1.0.0");
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid tag name: {0}")]
    InvalidTagName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// Check a short ref name against Git's refname rules (see
/// `git check-ref-format`). Returns a description of the first violation.
fn check_short_refname(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".into());
    }

    // "@" alone is reserved
    if name == "@" {
        return Err("name cannot be '@' (reserved)".into());
    }

    if name.starts_with('.') {
        return Err("name cannot start with '.'".into());
    }
    if name.starts_with('-') {
        return Err("name cannot start with '-'".into());
    }

    if name.ends_with(".lock") {
        return Err("name cannot end with '.lock'".into());
    }
    if name.ends_with('/') {
        return Err("name cannot end with '/'".into());
    }

    for forbidden in ["..", "@{", "//"] {
        if name.contains(forbidden) {
            return Err(format!("name cannot contain '{forbidden}'"));
        }
    }

    const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
    for c in INVALID_CHARS {
        if name.contains(c) {
            return Err(format!("name cannot contain '{c}'"));
        }
    }

    if name.chars().any(|c| c.is_ascii_control()) {
        return Err("name cannot contain control characters".into());
    }

    for component in name.split('/').filter(|c| !c.is_empty()) {
        if component.starts_with('.') {
            return Err("path component cannot start with '.'".into());
        }
        if component.ends_with(".lock") {
            return Err("path component cannot end with '.lock'".into());
        }
    }

    Ok(())
}

/// A validated Git branch name (without the `refs/heads/` prefix).
///
/// # Example
///
/// ```
/// use gitvane::core::types::BranchName;
///
/// let name = BranchName::new("feature/my-branch").unwrap();
/// assert_eq!(name.as_str(), "feature/my-branch");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new(".hidden").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// A leading `refs/heads/` is stripped so callers may pass either form.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let short = name.strip_prefix("refs/heads/").unwrap_or(&name);
        check_short_refname(short).map_err(TypeError::InvalidBranchName)?;
        Ok(Self(short.to_string()))
    }

    /// The full ref name, `refs/heads/<name>`.
    pub fn full_name(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated Git tag name (without the `refs/tags/` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Create a new validated tag name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidTagName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        let short = name.strip_prefix("refs/tags/").unwrap_or(&name);
        check_short_refname(short).map_err(TypeError::InvalidTagName)?;
        Ok(Self(short.to_string()))
    }

    /// The full ref name, `refs/tags/<name>`.
    pub fn full_name(&self) -> String {
        format!("refs/tags/{}", self.0)
    }

    /// Get the tag name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TagName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<TagName> for String {
    fn from(name: TagName) -> Self {
        name.0
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use gitvane::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a full hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Wrap hex the engine already produced (libgit2 renders full lowercase hex).
    pub(crate) fn from_engine(hex: String) -> Self {
        Self(hex)
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters, or the full OID if shorter.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn valid_branch_names() {
            assert!(BranchName::new("main").is_ok());
            assert!(BranchName::new("feature/foo").is_ok());
            assert!(BranchName::new("fix-123").is_ok());
            assert!(BranchName::new("user@feature").is_ok());
            assert!(BranchName::new("with.dot").is_ok());
        }

        #[test]
        fn full_ref_prefix_is_stripped() {
            let name = BranchName::new("refs/heads/main").unwrap();
            assert_eq!(name.as_str(), "main");
            assert_eq!(name.full_name(), "refs/heads/main");
        }

        #[test]
        fn structural_violations_rejected() {
            assert!(BranchName::new("").is_err());
            assert!(BranchName::new("@").is_err());
            assert!(BranchName::new(".hidden").is_err());
            assert!(BranchName::new("foo/.hidden").is_err());
            assert!(BranchName::new("-flag").is_err());
            assert!(BranchName::new("branch.lock").is_err());
            assert!(BranchName::new("branch/").is_err());
            assert!(BranchName::new("bad..path").is_err());
            assert!(BranchName::new("foo@{bar").is_err());
            assert!(BranchName::new("foo//bar").is_err());
        }

        #[test]
        fn special_chars_rejected() {
            for name in ["has space", "has~tilde", "has^caret", "has:colon", "has?q", "a*b", "a[b"] {
                assert!(BranchName::new(name).is_err(), "{name} should be rejected");
            }
            assert!(BranchName::new("has\ttab").is_err());
        }

        #[test]
        fn serde_roundtrip() {
            let name = BranchName::new("feature/test").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            let parsed: BranchName = serde_json::from_str(&json).unwrap();
            assert_eq!(name, parsed);
        }
    }

    mod tag_name {
        use super::*;

        #[test]
        fn valid_and_invalid() {
            assert_eq!(TagName::new("v1.0.0").unwrap().full_name(), "refs/tags/v1.0.0");
            assert_eq!(TagName::new("refs/tags/v2").unwrap().as_str(), "v2");
            assert!(matches!(
                TagName::new("bad tag"),
                Err(TypeError::InvalidTagName(_))
            ));
        }
    }

    mod oid {
        use super::*;

        #[test]
        fn normalizes_case() {
            let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn rejects_wrong_length_and_non_hex() {
            assert!(Oid::new("abc").is_err());
            assert!(Oid::new("g".repeat(40)).is_err());
            assert!(Oid::new("a".repeat(64)).is_ok());
        }

        #[test]
        fn short_clamps_to_length() {
            let oid = Oid::new("a".repeat(40)).unwrap();
            assert_eq!(oid.short(7), "aaaaaaa");
            assert_eq!(oid.short(100).len(), 40);
        }
    }
}
