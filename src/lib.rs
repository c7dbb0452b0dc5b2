//! gitvane - Git operations with uniform calling conventions
//!
//! gitvane exposes a catalogue of repository operations (init, open, clone,
//! add, commit, log, branch, tag, fetch, push, ...) that can each be invoked
//! four ways: with no arguments, with a map of named options, with a
//! configuration object, or with a closure. All four reach the same
//! execution path, and map calls are checked against each operation's
//! declared option schema before anything runs.
//!
//! # Architecture
//!
//! - [`cli`] - The `gv` binary: argument parsing and rendering
//! - [`service`] - Serialized, lazily opened repository for host integrations
//! - [`ops`] - Operation registry, descriptors and the invocation dispatcher
//! - [`git`] - Single interface for all Git operations
//! - [`core`] - Validated names, object ids and configuration
//!
//! # Example
//!
//! ```no_run
//! use gitvane::ops::{self, option_map, AddOp, CommitOp};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = ops::open(|op| op.dir = Some("/path/to/repo".into()))?;
//! repo.run_by::<AddOp>(|op| op.patterns = vec![".".to_string()])?;
//! let commit = repo.run_map::<CommitOp>(option_map([("message", "Update")]))?;
//! println!("{}", commit.oid);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod git;
pub mod ops;
pub mod service;
