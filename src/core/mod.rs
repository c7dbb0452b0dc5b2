//! core
//!
//! Strong types and configuration shared by every layer.
//!
//! # Modules
//!
//! - [`types`] - Validated names and object ids: BranchName, TagName, Oid
//! - [`config`] - Configuration schema and loading

pub mod config;
pub mod types;
