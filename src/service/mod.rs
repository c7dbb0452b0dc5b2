//! service
//!
//! Long-lived owner of one repository for host integrations.
//!
//! A [`RepoService`] is built from [`ServiceParams`] and opens its repository
//! lazily, the first time someone leases it. Opening goes through the
//! dispatcher's closure convention with the `open` or `init` operation, so
//! the service is an ordinary client of the operation layer.
//!
//! # Resolution
//!
//! 1. `current_dir` set: search upward from it
//! 2. `directory/.git` exists: open `directory`
//! 3. `init_if_missing`: create a repository in `directory`
//! 4. otherwise: [`ServiceError::NoRepository`]
//!
//! # Access
//!
//! At most one caller uses the repository at a time. [`RepoService::lease`]
//! waits for the current holder; [`RepoService::try_lease`] fails with
//! [`ServiceError::Busy`] instead.
//!
//! ```ignore
//! use gitvane::ops::StatusOp;
//! use gitvane::service::{RepoService, ServiceParams};
//!
//! let service = RepoService::new(ServiceParams::directory("/srv/build").init_if_missing(true));
//! let status = service.lease()?.run::<StatusOp>()?;
//! service.close();
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use thiserror::Error;

use crate::core::config::Config;
use crate::git::{Identity, Repository};
use crate::ops::{DispatchError, Dispatcher, InitOp, OpenOp};

/// Exclusive access to the service's repository.
pub type Lease<'a> = MappedMutexGuard<'a, Repository>;

/// Errors from the repository service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no repository in {dir} (set init_if_missing to create one)")]
    NoRepository { dir: PathBuf },

    #[error("repository service is closed")]
    Closed,

    #[error("repository is in use")]
    Busy,

    #[error("failed to open repository: {0}")]
    Open(#[source] DispatchError),
}

/// Where the service finds its repository.
#[derive(Debug, Clone, Default)]
pub struct ServiceParams {
    /// Search upward from here. Takes precedence over `directory`.
    pub current_dir: Option<PathBuf>,
    /// Repository root.
    pub directory: Option<PathBuf>,
    /// Create the repository in `directory` when it has none.
    pub init_if_missing: bool,
    /// Identity attached to the opened repository.
    pub identity: Option<Identity>,
}

impl ServiceParams {
    /// Discover the repository containing `dir`.
    pub fn discover(dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Use the repository rooted at `dir`.
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn init_if_missing(mut self, init: bool) -> Self {
        self.init_if_missing = init;
        self
    }

    pub fn identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Fill `init_if_missing` and `identity` from configuration.
    pub fn with_config(self, config: &Config) -> Self {
        self.init_if_missing(config.init_if_missing())
            .identity(config.identity())
    }
}

// Mirrors `ServiceState` for queries that must not wait on a lease
const UNOPENED: u8 = 0;
const OPEN: u8 = 1;
const CLOSED: u8 = 2;

enum ServiceState {
    Unopened,
    Open(Repository),
    Closed,
}

/// Serialized, lazily opened access to one repository.
pub struct RepoService {
    params: ServiceParams,
    state: Mutex<ServiceState>,
    status: AtomicU8,
}

impl RepoService {
    pub fn new(params: ServiceParams) -> Self {
        Self {
            params,
            state: Mutex::new(ServiceState::Unopened),
            status: AtomicU8::new(UNOPENED),
        }
    }

    pub fn params(&self) -> &ServiceParams {
        &self.params
    }

    /// Lease the repository, waiting for any current holder.
    ///
    /// Opens the repository on first use.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Closed`] after [`close`](Self::close)
    /// - [`ServiceError::NoRepository`] / [`ServiceError::Open`] if it
    ///   cannot be opened
    pub fn lease(&self) -> Result<Lease<'_>, ServiceError> {
        self.acquire(self.state.lock())
    }

    /// Lease the repository without waiting.
    ///
    /// # Errors
    ///
    /// As [`lease`](Self::lease), plus [`ServiceError::Busy`] when someone
    /// else holds it.
    pub fn try_lease(&self) -> Result<Lease<'_>, ServiceError> {
        let guard = self.state.try_lock().ok_or(ServiceError::Busy)?;
        self.acquire(guard)
    }

    /// Lease the repository, or `None` if it cannot be opened.
    pub fn find(&self) -> Option<Lease<'_>> {
        match self.lease() {
            Ok(lease) => Some(lease),
            Err(err) => {
                tracing::info!(error = %err, "repository unavailable");
                None
            }
        }
    }

    /// Whether the repository has been opened and not yet closed.
    ///
    /// Never waits, so it is safe to call while holding a lease.
    pub fn is_open(&self) -> bool {
        self.status.load(Ordering::Acquire) == OPEN
    }

    /// Never waits, so it is safe to call while holding a lease.
    pub fn is_closed(&self) -> bool {
        self.status.load(Ordering::Acquire) == CLOSED
    }

    /// Close the repository. Later leases fail with [`ServiceError::Closed`].
    ///
    /// Waits for the current lease to be returned, so calling it on a thread
    /// that still holds a lease deadlocks. Closing twice is a no-op.
    pub fn close(&self) {
        let mut state = self.state.lock();
        let previous = std::mem::replace(&mut *state, ServiceState::Closed);
        self.status.store(CLOSED, Ordering::Release);
        drop(state);
        if let ServiceState::Open(repo) = previous {
            tracing::info!(root = %repo.root_dir().display(), "closing repository");
            repo.close();
        }
    }

    fn acquire<'a>(
        &self,
        mut guard: MutexGuard<'a, ServiceState>,
    ) -> Result<Lease<'a>, ServiceError> {
        match *guard {
            ServiceState::Closed => return Err(ServiceError::Closed),
            ServiceState::Unopened => {
                *guard = ServiceState::Open(self.open()?);
                self.status.store(OPEN, Ordering::Release);
            }
            ServiceState::Open(_) => {}
        }

        MutexGuard::try_map(guard, |state| match state {
            ServiceState::Open(repo) => Some(repo),
            _ => None,
        })
        .map_err(|_| ServiceError::Closed)
    }

    fn open(&self) -> Result<Repository, ServiceError> {
        let dispatcher = Dispatcher::global();
        let params = &self.params;

        let repo = if let Some(start) = &params.current_dir {
            dispatcher.run_by::<OpenOp>(None, |op| op.current_dir = Some(start.clone()))
        } else {
            let dir = match &params.directory {
                Some(dir) => dir.clone(),
                None => std::env::current_dir().map_err(|_| ServiceError::NoRepository {
                    dir: PathBuf::from("."),
                })?,
            };
            if has_repository(&dir) {
                dispatcher.run_by::<OpenOp>(None, |op| op.dir = Some(dir))
            } else if params.init_if_missing {
                dispatcher.run_by::<InitOp>(None, |op| op.dir = Some(dir))
            } else {
                return Err(ServiceError::NoRepository { dir });
            }
        }
        .map_err(ServiceError::Open)?;

        repo.set_identity(params.identity.clone());
        tracing::info!(root = %repo.root_dir().display(), "opened repository");
        Ok(repo)
    }
}

impl Drop for RepoService {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for RepoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoService")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn has_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}
