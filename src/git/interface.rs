//! git::interface
//!
//! Git engine implementation using git2.
//!
//! This module is the **single doorway** to libgit2. Operation routines in
//! [`crate::ops`] call the methods here and never touch `git2` themselves.
//! Every method copies its result out of libgit2 into the plain types of
//! [`super::model`], and normalizes libgit2 failures into [`GitError`].
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested ref or revision does not exist
//! - [`GitError::UnbornHead`]: HEAD points at a branch with no commits yet
//! - [`GitError::PushRejected`]: The remote refused a pushed ref
//! - [`GitError::HandleClosed`]: The repository handle was closed
//!
//! # Example
//!
//! ```ignore
//! use gitvane::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head()?;
//! println!("HEAD is at {}", head.oid.short(7));
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::{
    Branch, BranchListMode, Changes, CommitInfo, Identity, Person, Remote, ResetMode, Status,
    Tag, TagMode,
};
use crate::core::types::{BranchName, Oid, TagName, TypeError};

/// How many times a credentials callback may be asked before giving up.
/// libgit2 keeps re-invoking the callback while authentication fails.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Something being created already exists.
    #[error("already exists: {what}")]
    AlreadyExists {
        /// What collided (ref name, remote name, path)
        what: String,
    },

    /// Requested ref or revision does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// An argument the engine cannot act on.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// No commit identity available.
    #[error("no commit identity: set user.name and user.email, or configure [identity]")]
    MissingIdentity,

    /// HEAD points at a branch without commits.
    #[error("HEAD is unborn (no commits yet)")]
    UnbornHead,

    /// The remote refused to update a ref.
    #[error("push rejected for {refname}: {message}")]
    PushRejected { refname: String, message: String },

    /// The repository handle was closed before or during the call.
    #[error("repository handle is closed")]
    HandleClosed,

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context.contains("ref") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::Exists => GitError::AlreadyExists {
                what: context.to_string(),
            },
            git2::ErrorCode::UnbornBranch => GitError::UnbornHead,
            git2::ErrorCode::InvalidSpec => GitError::InvalidRefName {
                message: format!("{}: {}", context, err.message()),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: err.message().to_string(),
            },
            git2::ErrorCode::Exists => GitError::AlreadyExists {
                what: err.message().to_string(),
            },
            git2::ErrorCode::UnbornBranch => GitError::UnbornHead,
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidBranchName(msg) | TypeError::InvalidTagName(msg) => {
                GitError::InvalidRefName { message: msg }
            }
        }
    }
}

impl From<git2::Oid> for Oid {
    fn from(oid: git2::Oid) -> Self {
        Oid::from_engine(oid.to_string())
    }
}

/// Information about a Git repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to .git directory (the repository itself when bare)
    pub git_dir: PathBuf,
    /// Path to working directory, `None` for bare repositories
    pub work_dir: Option<PathBuf>,
}

/// What `commit` should record.
#[derive(Debug, Clone, Default)]
pub struct CommitRequest<'a> {
    pub message: &'a str,
    /// Paths staged right before committing
    pub paths: &'a [String],
    /// Stage every modified or deleted tracked file first
    pub all: bool,
    /// Replace HEAD instead of adding a child of it
    pub amend: bool,
    pub author_name: Option<&'a str>,
    pub author_email: Option<&'a str>,
    /// Identity used when the repository config has none
    pub fallback_identity: Option<&'a Identity>,
}

/// Which commits `log` walks.
#[derive(Debug, Clone, Default)]
pub struct LogQuery<'a> {
    /// Revisions to start from (default `HEAD`)
    pub includes: &'a [String],
    /// Revisions whose ancestry is hidden
    pub excludes: &'a [String],
    /// Only commits touching these paths
    pub paths: &'a [String],
    pub skip: usize,
    /// `None` for no limit
    pub max_commits: Option<usize>,
}

/// What `push` sends.
#[derive(Debug, Clone, Default)]
pub struct PushRequest<'a> {
    pub remote: &'a str,
    /// Explicit refspecs; the current branch when empty
    pub refspecs: &'a [String],
    /// Push every local branch
    pub all: bool,
    /// Push every tag as well
    pub tags: bool,
    pub force: bool,
    /// Resolve refspecs without contacting the remote
    pub dry_run: bool,
}

/// The Git engine.
///
/// Wraps one open `git2::Repository`. Only [`super::handle`] constructs
/// long-lived instances; operation routines borrow it for one call.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Opening, Creating, Cloning
    // =========================================================================

    /// Open the repository containing `path`.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the working tree.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Open the repository rooted exactly at `path` (no upward search).
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Create a new repository at `path`.
    pub fn init(path: &Path, bare: bool) -> Result<Self, GitError> {
        let result = if bare {
            git2::Repository::init_bare(path)
        } else {
            git2::Repository::init(path)
        };
        let repo = result.map_err(|e| GitError::from_git2(e, &path.display().to_string()))?;
        Ok(Self { repo })
    }

    /// Clone `uri` into `path`.
    ///
    /// With `checkout` false the working tree is left empty. `branch`
    /// selects the branch checked out instead of the remote's HEAD.
    pub fn clone_from(
        uri: &str,
        path: &Path,
        bare: bool,
        checkout: bool,
        branch: Option<&str>,
    ) -> Result<Self, GitError> {
        let mut fetch = git2::FetchOptions::new();
        fetch.remote_callbacks(remote_callbacks());

        let mut builder = git2::build::RepoBuilder::new();
        builder.bare(bare).fetch_options(fetch);
        if let Some(branch) = branch {
            builder.branch(branch);
        }
        if !checkout {
            let mut co = git2::build::CheckoutBuilder::new();
            co.dry_run();
            builder.with_checkout(co);
        }

        let repo = builder
            .clone(uri, path)
            .map_err(|e| GitError::from_git2(e, uri))?;
        Ok(Self { repo })
    }

    /// Get repository information (git_dir and work_dir paths).
    pub fn info(&self) -> RepoInfo {
        RepoInfo {
            git_dir: self.repo.path().to_path_buf(),
            work_dir: self.repo.workdir().map(Path::to_path_buf),
        }
    }

    fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or_else(|| GitError::InvalidArgument {
            message: "operation needs a working tree but the repository is bare".into(),
        })
    }

    // =========================================================================
    // Index
    // =========================================================================

    /// Stage files matching `patterns`.
    ///
    /// With `update`, only files already tracked are staged (modifications
    /// and deletions); new files are left alone.
    pub fn add(&self, patterns: &[String], update: bool) -> Result<(), GitError> {
        self.work_dir()?;
        let mut index = self.repo.index()?;
        if update {
            index.update_all(patterns.iter(), None)?;
        } else {
            index.add_all(patterns.iter(), git2::IndexAddOption::DEFAULT, None)?;
        }
        index.write()?;
        Ok(())
    }

    /// Remove index entries matching `patterns`, and the files themselves
    /// unless `cached`. Returns the removed paths.
    pub fn remove(&self, patterns: &[String], cached: bool) -> Result<Vec<String>, GitError> {
        let work_dir = self.work_dir()?.to_path_buf();
        let mut index = self.repo.index()?;

        let pathspec = git2::Pathspec::new(patterns.iter())?;
        let matched: Vec<String> = pathspec
            .match_index(&index, git2::PathspecFlags::DEFAULT)?
            .entries()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect();

        for path in &matched {
            index.remove_path(Path::new(path))?;
            if !cached {
                let full = work_dir.join(path);
                if full.exists() {
                    std::fs::remove_file(&full).map_err(|e| GitError::AccessError {
                        message: format!("cannot remove {}: {}", full.display(), e),
                    })?;
                }
            }
        }
        index.write()?;
        Ok(matched)
    }

    /// Reset HEAD (and depending on `mode`, index and working tree) to
    /// `target`. With `paths`, only those index entries are reset and HEAD
    /// does not move.
    pub fn reset(&self, target: &str, mode: ResetMode, paths: &[String]) -> Result<(), GitError> {
        let object = self
            .repo
            .revparse_single(target)
            .map_err(|e| GitError::from_git2(e, target))?;

        if !paths.is_empty() {
            if mode != ResetMode::Mixed {
                return Err(GitError::InvalidArgument {
                    message: format!("cannot do a {} reset with paths", mode.as_str()),
                });
            }
            self.repo.reset_default(Some(&object), paths.iter())?;
            return Ok(());
        }

        let kind = match mode {
            ResetMode::Soft => git2::ResetType::Soft,
            ResetMode::Mixed => git2::ResetType::Mixed,
            ResetMode::Hard => git2::ResetType::Hard,
        };
        self.repo.reset(&object, kind, None)?;
        Ok(())
    }

    // =========================================================================
    // Commits
    // =========================================================================

    /// Record a commit from the index and return it.
    pub fn commit(&self, request: &CommitRequest<'_>) -> Result<CommitInfo, GitError> {
        let mut index = self.repo.index()?;
        if request.all {
            index.update_all(["*"].iter(), None)?;
        }
        if !request.paths.is_empty() {
            index.add_all(request.paths.iter(), git2::IndexAddOption::DEFAULT, None)?;
        }
        index.write()?;

        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;

        let committer = self.signature(request.fallback_identity)?;
        let author = match (request.author_name, request.author_email) {
            (None, None) => committer.clone(),
            (name, email) => git2::Signature::now(
                name.unwrap_or_else(|| committer.name().unwrap_or("")),
                email.unwrap_or_else(|| committer.email().unwrap_or("")),
            )?,
        };

        let head = self.head_commit()?;
        let oid = if request.amend {
            let head = head.ok_or(GitError::UnbornHead)?;
            head.amend(
                Some("HEAD"),
                Some(&author),
                Some(&committer),
                None,
                Some(request.message),
                Some(&tree),
            )?
        } else {
            let parents: Vec<&git2::Commit<'_>> = head.iter().collect();
            self.repo.commit(
                Some("HEAD"),
                &author,
                &committer,
                request.message,
                &tree,
                &parents,
            )?
        };

        self.commit_info(&Oid::from(oid))
    }

    /// Commit signature from repository config, else the fallback identity.
    fn signature(&self, fallback: Option<&Identity>) -> Result<git2::Signature<'static>, GitError> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(e) if e.code() == git2::ErrorCode::NotFound => match fallback {
                Some(identity) => Ok(git2::Signature::now(&identity.name, &identity.email)?),
                None => Err(GitError::MissingIdentity),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// HEAD commit, or `None` while HEAD is unborn.
    fn head_commit(&self) -> Result<Option<git2::Commit<'_>>, GitError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e)
                if e.code() == git2::ErrorCode::UnbornBranch
                    || e.code() == git2::ErrorCode::NotFound =>
            {
                Ok(None)
            }
            Err(e) => Err(GitError::from_git2(e, "HEAD")),
        }
    }

    /// The commit HEAD points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::UnbornHead`] in a repository without commits
    pub fn head(&self) -> Result<CommitInfo, GitError> {
        let commit = self.head_commit()?.ok_or(GitError::UnbornHead)?;
        Ok(to_commit_info(&commit))
    }

    /// Get information about a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        let commit = self
            .repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        Ok(to_commit_info(&commit))
    }

    fn resolve_commit(&self, revision: &str) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| match e.code() {
                git2::ErrorCode::NotFound | git2::ErrorCode::InvalidSpec => {
                    GitError::RefNotFound {
                        refname: revision.to_string(),
                    }
                }
                _ => GitError::from_git2(e, revision),
            })
    }

    /// Walk history, newest first.
    ///
    /// With no includes the walk starts at HEAD; an unborn HEAD yields an
    /// empty history rather than an error.
    pub fn log(&self, query: &LogQuery<'_>) -> Result<Vec<CommitInfo>, GitError> {
        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        if query.includes.is_empty() {
            match self.head_commit()? {
                Some(head) => walk.push(head.id())?,
                None => return Ok(Vec::new()),
            }
        } else {
            for include in query.includes {
                walk.push(self.resolve_commit(include)?.id())?;
            }
        }
        for exclude in query.excludes {
            walk.hide(self.resolve_commit(exclude)?.id())?;
        }

        let limit = query.max_commits.unwrap_or(usize::MAX);
        let mut commits = Vec::new();
        let mut skipped = 0;
        for oid in walk {
            if commits.len() >= limit {
                break;
            }
            let commit = self.repo.find_commit(oid?)?;
            if !query.paths.is_empty() && !self.touches_paths(&commit, query.paths)? {
                continue;
            }
            if skipped < query.skip {
                skipped += 1;
                continue;
            }
            commits.push(to_commit_info(&commit));
        }
        Ok(commits)
    }

    /// Whether `commit` changes any of `paths` relative to its first parent.
    fn touches_paths(&self, commit: &git2::Commit<'_>, paths: &[String]) -> Result<bool, GitError> {
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let mut opts = git2::DiffOptions::new();
        for path in paths {
            opts.pathspec(path);
        }
        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
        Ok(diff.deltas().len() > 0)
    }

    /// Describe a commit relative to the nearest reachable tag.
    ///
    /// Returns `None` when no tag is reachable.
    pub fn describe(
        &self,
        revision: &str,
        include_lightweight: bool,
        long: bool,
    ) -> Result<Option<String>, GitError> {
        let commit = self.resolve_commit(revision)?;
        let mut opts = git2::DescribeOptions::new();
        if include_lightweight {
            opts.describe_tags();
        }
        let description = match commit.as_object().describe(&opts) {
            Ok(d) => d,
            // No tags at all is reported under the describe class, not as NotFound
            Err(e)
                if e.code() == git2::ErrorCode::NotFound
                    || e.class() == git2::ErrorClass::Describe =>
            {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };
        let mut format = git2::DescribeFormatOptions::new();
        format.always_use_long_format(long);
        Ok(Some(description.format(Some(&format))?))
    }

    // =========================================================================
    // Working Tree Status
    // =========================================================================

    /// Get working tree status, including untracked files.
    pub fn status(&self) -> Result<Status, GitError> {
        self.work_dir()?;
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let mut result = Status::default();

        for entry in statuses.iter() {
            let Some(path) = entry.path().map(String::from) else {
                continue;
            };
            let s = entry.status();

            if s.is_conflicted() {
                result.conflicts.push(path);
                continue;
            }

            if s.is_index_new() {
                result.staged.added.push(path.clone());
            } else if s.is_index_modified() || s.is_index_renamed() || s.is_index_typechange() {
                result.staged.modified.push(path.clone());
            } else if s.is_index_deleted() {
                result.staged.removed.push(path.clone());
            }

            if s.is_wt_new() {
                result.unstaged.added.push(path);
            } else if s.is_wt_modified() || s.is_wt_renamed() || s.is_wt_typechange() {
                result.unstaged.modified.push(path);
            } else if s.is_wt_deleted() {
                result.unstaged.removed.push(path);
            }
        }

        sort_changes(&mut result.staged);
        sort_changes(&mut result.unstaged);
        result.conflicts.sort();
        Ok(result)
    }

    // =========================================================================
    // Branches
    // =========================================================================

    /// Get the current branch name, if on a branch.
    ///
    /// Returns `None` if HEAD is detached. An unborn branch is reported by name.
    pub fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => match head.shorthand() {
                Some(name) => Ok(Some(BranchName::new(name)?)),
                None => Ok(None),
            },
            Ok(_) => Ok(None),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                match head.symbolic_target() {
                    Some(target) => Ok(Some(BranchName::new(target)?)),
                    None => Ok(None),
                }
            }
            Err(e) => Err(GitError::from_git2(e, "HEAD")),
        }
    }

    /// List branches, sorted by full ref name.
    pub fn branches(&self, mode: BranchListMode) -> Result<Vec<Branch>, GitError> {
        let filter = match mode {
            BranchListMode::Local => Some(git2::BranchType::Local),
            BranchListMode::Remote => Some(git2::BranchType::Remote),
            BranchListMode::All => None,
        };

        let mut result = Vec::new();
        for entry in self.repo.branches(filter)? {
            let (branch, kind) = entry?;
            result.push(to_branch(&branch, kind)?);
        }
        result.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(result)
    }

    /// Create a local branch at `start_point` (default HEAD).
    pub fn create_branch(
        &self,
        name: &BranchName,
        start_point: Option<&str>,
        force: bool,
    ) -> Result<Branch, GitError> {
        let commit = self.resolve_commit(start_point.unwrap_or("HEAD"))?;
        let branch = self
            .repo
            .branch(name.as_str(), &commit, force)
            .map_err(|e| GitError::from_git2(e, &name.full_name()))?;

        // Track a remote-tracking start point, as `git branch --track` does
        if let Some(start) = start_point {
            if self
                .repo
                .find_branch(start, git2::BranchType::Remote)
                .is_ok()
            {
                let mut branch = branch;
                branch.set_upstream(Some(start))?;
                return to_branch(&branch, git2::BranchType::Local);
            }
        }
        to_branch(&branch, git2::BranchType::Local)
    }

    /// Delete local branches. Unless `force`, a branch whose tip is not
    /// reachable from HEAD is refused.
    pub fn delete_branches(&self, names: &[BranchName], force: bool) -> Result<Vec<String>, GitError> {
        let head = self.head_commit()?.map(|c| c.id());
        let mut deleted = Vec::new();

        for name in names {
            let mut branch = self
                .repo
                .find_branch(name.as_str(), git2::BranchType::Local)
                .map_err(|e| GitError::from_git2(e, &name.full_name()))?;

            if !force {
                if let Some(tip) = branch.get().target() {
                    let merged = match head {
                        Some(head) => head == tip || self.repo.graph_descendant_of(head, tip)?,
                        None => false,
                    };
                    if !merged {
                        return Err(GitError::InvalidArgument {
                            message: format!("branch '{}' is not fully merged", name),
                        });
                    }
                }
            }

            branch
                .delete()
                .map_err(|e| GitError::from_git2(e, &name.full_name()))?;
            deleted.push(name.to_string());
        }
        Ok(deleted)
    }

    /// Switch HEAD (and the working tree) to a branch.
    ///
    /// With `create`, the branch is first created at `start_point`. With
    /// `orphan`, HEAD is pointed at a new unborn branch and the working tree
    /// and index are left as they are.
    pub fn checkout(
        &self,
        branch: &BranchName,
        create: bool,
        start_point: Option<&str>,
        orphan: bool,
    ) -> Result<(), GitError> {
        let full = branch.full_name();

        if orphan {
            if self.repo.find_reference(&full).is_ok() {
                return Err(GitError::AlreadyExists { what: full });
            }
            self.repo.set_head(&full)?;
            return Ok(());
        }

        if create {
            self.create_branch(branch, start_point, false)?;
        } else if start_point.is_some() {
            return Err(GitError::InvalidArgument {
                message: "start_point requires create_branch".into(),
            });
        }

        let target = self
            .repo
            .revparse_single(&full)
            .map_err(|e| GitError::from_git2(e, &full))?;
        let mut co = git2::build::CheckoutBuilder::new();
        co.safe();
        self.repo.checkout_tree(&target, Some(&mut co))?;
        self.repo.set_head(&full)?;
        Ok(())
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Create a tag at `points_to` (default HEAD).
    ///
    /// An annotated tag records `message` and the tagger identity; a
    /// lightweight tag is a plain ref.
    pub fn create_tag(
        &self,
        name: &TagName,
        message: Option<&str>,
        points_to: Option<&str>,
        annotate: bool,
        force: bool,
        fallback_identity: Option<&Identity>,
    ) -> Result<Tag, GitError> {
        let revision = points_to.unwrap_or("HEAD");
        let target = self
            .repo
            .revparse_single(revision)
            .map_err(|e| GitError::from_git2(e, revision))?;

        let result = if annotate {
            let tagger = self.signature(fallback_identity)?;
            self.repo
                .tag(name.as_str(), &target, &tagger, message.unwrap_or(""), force)
        } else {
            self.repo.tag_lightweight(name.as_str(), &target, force)
        };
        result.map_err(|e| GitError::from_git2(e, &name.full_name()))?;

        self.read_tag(name.as_str())
    }

    /// List tags, sorted by name.
    pub fn tags(&self) -> Result<Vec<Tag>, GitError> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            tags.push(self.read_tag(name)?);
        }
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    fn read_tag(&self, name: &str) -> Result<Tag, GitError> {
        let full_name = format!("refs/tags/{}", name);
        let reference = self
            .repo
            .find_reference(&full_name)
            .map_err(|e| GitError::from_git2(e, &full_name))?;
        let commit = reference.peel_to_commit()?;

        let (message, tagger) = match reference.target().map(|oid| self.repo.find_tag(oid)) {
            Some(Ok(tag)) => (
                tag.message().map(String::from),
                tag.tagger().map(|sig| to_person(&sig)),
            ),
            _ => (None, None),
        };

        Ok(Tag {
            name: name.to_string(),
            full_name,
            target: Oid::from(commit.id()),
            message,
            tagger,
        })
    }

    /// Delete tags, returning the deleted names.
    pub fn delete_tags(&self, names: &[TagName]) -> Result<Vec<String>, GitError> {
        let mut deleted = Vec::new();
        for name in names {
            self.repo
                .tag_delete(name.as_str())
                .map_err(|e| GitError::from_git2(e, &name.full_name()))?;
            deleted.push(name.to_string());
        }
        Ok(deleted)
    }

    // =========================================================================
    // Remotes
    // =========================================================================

    /// Add a remote.
    pub fn add_remote(&self, name: &str, url: &str, push_url: Option<&str>) -> Result<Remote, GitError> {
        self.repo
            .remote(name, url)
            .map_err(|e| GitError::from_git2(e, &format!("remote '{}'", name)))?;
        if let Some(push_url) = push_url {
            self.repo.remote_set_pushurl(name, Some(push_url))?;
        }
        self.find_remote(name)
    }

    /// List configured remotes, sorted by name.
    pub fn remotes(&self) -> Result<Vec<Remote>, GitError> {
        let names = self.repo.remotes()?;
        let mut remotes = Vec::new();
        for name in names.iter().flatten() {
            remotes.push(self.find_remote(name)?);
        }
        remotes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(remotes)
    }

    fn find_remote(&self, name: &str) -> Result<Remote, GitError> {
        let remote = self
            .repo
            .find_remote(name)
            .map_err(|e| GitError::from_git2(e, &format!("remote ref '{}'", name)))?;
        Ok(Remote {
            name: name.to_string(),
            url: remote.url().map(String::from),
            push_url: remote.pushurl().map(String::from),
        })
    }

    /// Fetch from a remote. Empty `refspecs` uses the remote's configured ones.
    pub fn fetch(
        &self,
        remote: &str,
        refspecs: &[String],
        prune: bool,
        tag_mode: TagMode,
    ) -> Result<(), GitError> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| GitError::from_git2(e, &format!("remote ref '{}'", remote)))?;

        let mut opts = git2::FetchOptions::new();
        opts.remote_callbacks(remote_callbacks());
        if prune {
            opts.prune(git2::FetchPrune::On);
        }
        opts.download_tags(match tag_mode {
            TagMode::Auto => git2::AutotagOption::Auto,
            TagMode::All => git2::AutotagOption::All,
            TagMode::None => git2::AutotagOption::None,
        });

        remote.fetch(refspecs, Some(&mut opts), None)?;
        Ok(())
    }

    /// Push to a remote.
    ///
    /// # Errors
    ///
    /// - [`GitError::PushRejected`] for the first ref the remote refused
    pub fn push(&self, request: &PushRequest<'_>) -> Result<(), GitError> {
        let mut remote = self
            .repo
            .find_remote(request.remote)
            .map_err(|e| GitError::from_git2(e, &format!("remote ref '{}'", request.remote)))?;

        let specs = self.push_refspecs(request)?;
        if request.dry_run || specs.is_empty() {
            return Ok(());
        }

        let mut rejected: Vec<(String, String)> = Vec::new();
        {
            let mut callbacks = remote_callbacks();
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejected.push((refname.to_string(), message.to_string()));
                }
                Ok(())
            });
            let mut opts = git2::PushOptions::new();
            opts.remote_callbacks(callbacks);
            remote.push(&specs, Some(&mut opts))?;
        }

        match rejected.into_iter().next() {
            Some((refname, message)) => Err(GitError::PushRejected { refname, message }),
            None => Ok(()),
        }
    }

    fn push_refspecs(&self, request: &PushRequest<'_>) -> Result<Vec<String>, GitError> {
        let prefix = if request.force { "+" } else { "" };
        let mut refs: Vec<String> = Vec::new();

        if request.all {
            for branch in self.branches(BranchListMode::Local)? {
                refs.push(branch.full_name);
            }
        } else if request.refspecs.is_empty() && !request.tags {
            let branch = self.current_branch()?.ok_or_else(|| GitError::InvalidArgument {
                message: "HEAD is detached; name the refs to push".into(),
            })?;
            refs.push(branch.full_name());
        }
        if request.tags {
            for tag in self.tags()? {
                refs.push(tag.full_name);
            }
        }

        let mut specs: Vec<String> = refs
            .into_iter()
            .map(|r| format!("{prefix}{r}:{r}"))
            .collect();
        for spec in request.refspecs {
            specs.push(if spec.contains(':') {
                format!("{prefix}{spec}")
            } else {
                // a bare branch name pushes to the same name on the remote
                let full = if spec.starts_with("refs/") {
                    spec.clone()
                } else {
                    BranchName::new(spec.as_str())?.full_name()
                };
                format!("{prefix}{full}:{full}")
            });
        }
        Ok(specs)
    }
}

/// Callbacks for network operations: credentials from the SSH agent or the
/// configured credential helper.
fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    let mut attempts = 0;
    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("authentication failed"));
        }
        if allowed.contains(git2::CredentialType::SSH_KEY) {
            if let Some(user) = username_from_url {
                return git2::Cred::ssh_key_from_agent(user);
            }
        }
        if allowed.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
            let config = git2::Config::open_default()?;
            return git2::Cred::credential_helper(&config, url, username_from_url);
        }
        git2::Cred::default()
    });
    callbacks
}

fn to_person(sig: &git2::Signature<'_>) -> Person {
    Person {
        name: sig.name().unwrap_or("").to_string(),
        email: sig.email().unwrap_or("").to_string(),
    }
}

fn to_commit_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let time = chrono::DateTime::from_timestamp(commit.time().seconds(), 0)
        .unwrap_or(chrono::DateTime::UNIX_EPOCH);

    CommitInfo {
        oid: Oid::from(commit.id()),
        parents: commit.parent_ids().map(Oid::from).collect(),
        summary: commit.summary().unwrap_or("").to_string(),
        message: commit.message().unwrap_or("").to_string(),
        author: to_person(&commit.author()),
        committer: to_person(&commit.committer()),
        time,
    }
}

fn to_branch(branch: &git2::Branch<'_>, kind: git2::BranchType) -> Result<Branch, GitError> {
    let reference = branch.get();
    let upstream = match kind {
        git2::BranchType::Local => branch
            .upstream()
            .ok()
            .and_then(|u| u.name().ok().flatten().map(String::from)),
        git2::BranchType::Remote => None,
    };
    Ok(Branch {
        name: branch.name()?.unwrap_or("").to_string(),
        full_name: reference.name().unwrap_or("").to_string(),
        target: reference.target().map(Oid::from),
        upstream,
    })
}

fn sort_changes(changes: &mut Changes) {
    changes.added.sort();
    changes.modified.sort();
    changes.removed.sort();
}
