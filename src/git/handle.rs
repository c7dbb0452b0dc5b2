//! git::handle
//!
//! Owning and shared sides of an open repository.
//!
//! [`Repository`] is what `init`, `open` and `clone` hand back. It is owned by
//! whoever opened it and is the only thing that can close the repository.
//! [`RepoHandle`] is the cheap, clonable view operations are constructed
//! with; it borrows the engine for one call at a time and never closes it.
//!
//! Closing releases the underlying `git2::Repository` exactly once. Every
//! later use of any handle fails with [`GitError::HandleClosed`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::interface::{Git, GitError};
use super::model::Identity;

struct Shared {
    git: Mutex<Option<Git>>,
    git_dir: PathBuf,
    work_dir: Option<PathBuf>,
    identity: RwLock<Option<Identity>>,
}

impl Shared {
    /// Drop the engine. Returns whether this call was the one that closed it.
    fn release(&self) -> bool {
        self.git.lock().take().is_some()
    }
}

/// Shared view of an open repository.
#[derive(Clone)]
pub struct RepoHandle {
    shared: Arc<Shared>,
}

impl RepoHandle {
    /// Run `f` against the engine.
    ///
    /// Calls through clones of the same handle are serialized.
    ///
    /// # Errors
    ///
    /// - [`GitError::HandleClosed`] if the repository was closed
    pub fn with<R>(&self, f: impl FnOnce(&Git) -> Result<R, GitError>) -> Result<R, GitError> {
        let guard = self.shared.git.lock();
        match guard.as_ref() {
            Some(git) => f(git),
            None => Err(GitError::HandleClosed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.git.lock().is_none()
    }

    /// Path to the `.git` directory (the repository itself when bare).
    pub fn git_dir(&self) -> &Path {
        &self.shared.git_dir
    }

    /// Working tree root, `None` for bare repositories.
    pub fn work_dir(&self) -> Option<&Path> {
        self.shared.work_dir.as_deref()
    }

    /// Fallback commit identity, if one was attached.
    pub fn identity(&self) -> Option<Identity> {
        self.shared.identity.read().clone()
    }
}

impl std::fmt::Debug for RepoHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoHandle")
            .field("git_dir", &self.shared.git_dir)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// An open repository, owned by whoever opened it.
///
/// Dropping an unclosed `Repository` closes it.
pub struct Repository {
    handle: RepoHandle,
}

impl Repository {
    pub(crate) fn from_git(git: Git) -> Self {
        let info = git.info();
        Self {
            handle: RepoHandle {
                shared: Arc::new(Shared {
                    git: Mutex::new(Some(git)),
                    git_dir: info.git_dir,
                    work_dir: info.work_dir,
                    identity: RwLock::new(None),
                }),
            },
        }
    }

    /// A shared handle for constructing bound operations.
    pub fn handle(&self) -> RepoHandle {
        self.handle.clone()
    }

    /// Attach the identity commits and tags fall back to when the repository
    /// config defines none.
    pub fn set_identity(&self, identity: Option<Identity>) {
        *self.handle.shared.identity.write() = identity;
    }

    /// Working tree root, or the git dir for bare repositories.
    pub fn root_dir(&self) -> &Path {
        self.handle
            .work_dir()
            .unwrap_or_else(|| self.handle.git_dir())
    }

    pub fn git_dir(&self) -> &Path {
        self.handle.git_dir()
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.handle.work_dir()
    }

    pub fn is_bare(&self) -> bool {
        self.handle.work_dir().is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Release the underlying repository.
    pub fn close(self) {
        // Drop does the work
    }
}

impl Drop for Repository {
    fn drop(&mut self) {
        if self.handle.shared.release() {
            tracing::debug!(git_dir = %self.handle.git_dir().display(), "closed repository");
        }
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root_dir", &self.root_dir())
            .field("closed", &self.is_closed())
            .finish()
    }
}
