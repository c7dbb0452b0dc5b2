//! ops::facade
//!
//! Typed entry points over the global dispatcher.
//!
//! Standalone operations are free functions returning a [`Repository`];
//! bound operations are methods on [`Repository`] that pass its handle.
//!
//! ```ignore
//! use gitvane::ops::{self, option_map, AddOp, CommitOp};
//!
//! let repo = ops::init(|op| op.dir = Some("/tmp/demo".into()))?;
//! repo.run_by::<AddOp>(|op| op.patterns = vec![".".into()])?;
//! let commit = repo.run_map::<CommitOp>(option_map([("message", "First commit")]))?;
//! println!("{}", commit.oid.short(7));
//! ```

use super::builtin::{BranchListOp, CloneOp, HeadOp, InitOp, LogOp, OpenOp, StatusOp, TagListOp};
use super::dispatch::{Configure, Dispatcher, OptionMap};
use super::error::DispatchError;
use super::operation::OperationKind;
use crate::git::{Branch, CommitInfo, Repository, Status, Tag};

/// Create a repository.
pub fn init(f: impl FnOnce(&mut InitOp)) -> Result<Repository, DispatchError> {
    Dispatcher::global().run_by::<InitOp>(None, f)
}

/// Open a repository.
pub fn open(f: impl FnOnce(&mut OpenOp)) -> Result<Repository, DispatchError> {
    Dispatcher::global().run_by::<OpenOp>(None, f)
}

/// Clone a repository.
pub fn clone(f: impl FnOnce(&mut CloneOp)) -> Result<Repository, DispatchError> {
    Dispatcher::global().run_by::<CloneOp>(None, f)
}

impl Repository {
    /// Run a bound operation with its defaults.
    pub fn run<K: OperationKind>(&self) -> Result<K::Output, DispatchError> {
        Dispatcher::global().run::<K>(Some(&self.handle()))
    }

    /// Run a bound operation with a map of named options.
    pub fn run_map<K: OperationKind>(&self, options: OptionMap) -> Result<K::Output, DispatchError> {
        Dispatcher::global().run_map::<K>(Some(&self.handle()), options)
    }

    /// Run a bound operation configured by an object.
    pub fn run_with<K: OperationKind>(
        &self,
        config: &dyn Configure<K>,
    ) -> Result<K::Output, DispatchError> {
        Dispatcher::global().run_with::<K>(Some(&self.handle()), config)
    }

    /// Run a bound operation configured by a closure.
    pub fn run_by<K: OperationKind>(
        &self,
        f: impl FnOnce(&mut K),
    ) -> Result<K::Output, DispatchError> {
        Dispatcher::global().run_by::<K>(Some(&self.handle()), f)
    }

    pub fn status(&self) -> Result<Status, DispatchError> {
        self.run::<StatusOp>()
    }

    pub fn head(&self) -> Result<CommitInfo, DispatchError> {
        self.run::<HeadOp>()
    }

    /// History from HEAD, newest first.
    pub fn log(&self) -> Result<Vec<CommitInfo>, DispatchError> {
        self.run::<LogOp>()
    }

    /// Local branches.
    pub fn branches(&self) -> Result<Vec<Branch>, DispatchError> {
        self.run::<BranchListOp>()
    }

    pub fn tags(&self) -> Result<Vec<Tag>, DispatchError> {
        self.run::<TagListOp>()
    }
}
