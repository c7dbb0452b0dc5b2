//! git::model
//!
//! Plain data returned by the engine.
//!
//! These types never hold a live `git2` object; everything is copied out of
//! libgit2 before the engine call returns, so results outlive the handle
//! they were read from.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::Oid;

/// A name/email pair, as recorded on commits and annotated tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
}

/// Fallback commit identity used when the repository config has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Information about a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// Parent OIDs (empty for a root commit)
    pub parents: Vec<Oid>,
    /// First line of the commit message
    pub summary: String,
    /// Full commit message
    pub message: String,
    pub author: Person,
    pub committer: Person,
    /// Commit timestamp
    pub time: DateTime<Utc>,
}

/// One side of a status report (index or working tree).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
}

impl Changes {
    /// Total number of changed paths.
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every changed path, sorted.
    pub fn all_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .added
            .iter()
            .chain(&self.modified)
            .chain(&self.removed)
            .map(String::as_str)
            .collect();
        paths.sort_unstable();
        paths
    }
}

/// Working tree status.
///
/// `staged` compares HEAD to the index, `unstaged` compares the index to the
/// working tree. Untracked files are reported as unstaged additions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub staged: Changes,
    pub unstaged: Changes,
    /// Paths with unresolved conflicts
    pub conflicts: Vec<String>,
}

impl Status {
    /// Check if the worktree is completely clean (no changes at all).
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.conflicts.is_empty()
    }
}

/// A local or remote-tracking branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Short name (`main`, `origin/main`)
    pub name: String,
    /// Full ref name (`refs/heads/main`, `refs/remotes/origin/main`)
    pub full_name: String,
    /// Commit the branch points at
    pub target: Option<Oid>,
    /// Upstream branch short name, for local branches that track one
    pub upstream: Option<String>,
}

/// A tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub full_name: String,
    /// Commit the tag ultimately points at
    pub target: Oid,
    /// Message, for annotated tags
    pub message: Option<String>,
    /// Tagger, for annotated tags
    pub tagger: Option<Person>,
}

/// A configured remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub name: String,
    pub url: Option<String>,
    pub push_url: Option<String>,
}

/// Error for a choice string that names no variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not one of: {}", allowed.join(", "))]
pub struct ParseChoiceError {
    pub value: String,
    pub allowed: &'static [&'static str],
}

/// How far `reset` moves state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetMode {
    Soft,
    #[default]
    Mixed,
    Hard,
}

impl ResetMode {
    pub const NAMES: &'static [&'static str] = &["soft", "mixed", "hard"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResetMode::Soft => "soft",
            ResetMode::Mixed => "mixed",
            ResetMode::Hard => "hard",
        }
    }
}

impl FromStr for ResetMode {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft" => Ok(ResetMode::Soft),
            "mixed" => Ok(ResetMode::Mixed),
            "hard" => Ok(ResetMode::Hard),
            _ => Err(ParseChoiceError {
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// Which branches `branch-list` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchListMode {
    #[default]
    Local,
    Remote,
    All,
}

impl BranchListMode {
    pub const NAMES: &'static [&'static str] = &["local", "remote", "all"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchListMode::Local => "local",
            BranchListMode::Remote => "remote",
            BranchListMode::All => "all",
        }
    }
}

impl FromStr for BranchListMode {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(BranchListMode::Local),
            "remote" => Ok(BranchListMode::Remote),
            "all" => Ok(BranchListMode::All),
            _ => Err(ParseChoiceError {
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// Tag download policy for `fetch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMode {
    #[default]
    Auto,
    All,
    None,
}

impl TagMode {
    pub const NAMES: &'static [&'static str] = &["auto", "all", "none"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TagMode::Auto => "auto",
            TagMode::All => "all",
            TagMode::None => "none",
        }
    }
}

impl FromStr for TagMode {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(TagMode::Auto),
            "all" => Ok(TagMode::All),
            "none" => Ok(TagMode::None),
            _ => Err(ParseChoiceError {
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_len_and_paths() {
        let changes = Changes {
            added: vec!["b.txt".into()],
            modified: vec!["a.txt".into()],
            removed: vec![],
        };
        assert_eq!(changes.len(), 2);
        assert!(!changes.is_empty());
        assert_eq!(changes.all_paths(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn default_status_is_clean() {
        assert!(Status::default().is_clean());
        let dirty = Status {
            conflicts: vec!["x".into()],
            ..Default::default()
        };
        assert!(!dirty.is_clean());
    }

    #[test]
    fn choice_round_trip() {
        for name in ResetMode::NAMES {
            assert_eq!(name.parse::<ResetMode>().unwrap().as_str(), *name);
        }
        for name in BranchListMode::NAMES {
            assert_eq!(name.parse::<BranchListMode>().unwrap().as_str(), *name);
        }
        for name in TagMode::NAMES {
            assert_eq!(name.parse::<TagMode>().unwrap().as_str(), *name);
        }
    }

    #[test]
    fn unknown_choice_lists_allowed_values() {
        let err = "medium".parse::<ResetMode>().unwrap_err();
        assert_eq!(err.to_string(), "'medium' is not one of: soft, mixed, hard");
    }
}
