//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and writes
//! flow through this interface. No other module should import `git2`.
//!
//! We use the `git2` crate exclusively (no shelling out to the git CLI).
//!
//! # Responsibilities
//!
//! - Repository discovery, opening, creation and cloning
//! - Index and working tree (add, remove, reset, status)
//! - History (commit, log, head, describe)
//! - Branches, tags and remotes
//! - Network transfer (fetch, push) with credential callbacks
//! - The closable, shared repository handle
//!
//! # Invariants
//!
//! - No other module calls git2 directly
//! - Results are plain data ([`model`]) that outlive the handle
//! - After [`Repository::close`], every handle fails with [`GitError::HandleClosed`]
//!
//! # Example
//!
//! ```ignore
//! use gitvane::git::Git;
//! use std::path::Path;
//!
//! let git = Git::discover(Path::new("."))?;
//! let status = git.status()?;
//! println!("clean: {}", status.is_clean());
//! ```

mod handle;
mod interface;
pub mod model;

pub use handle::{RepoHandle, Repository};
pub use interface::{CommitRequest, Git, GitError, LogQuery, PushRequest, RepoInfo};
pub use model::{
    Branch, BranchListMode, Changes, CommitInfo, Identity, ParseChoiceError, Person, Remote,
    ResetMode, Status, Tag, TagMode,
};
