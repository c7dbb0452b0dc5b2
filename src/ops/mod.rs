//! ops
//!
//! Operation registry and invocation dispatcher.
//!
//! # Architecture
//!
//! Each repository operation is a type implementing [`Operation`] (dynamic
//! option access and execution) and [`OperationKind`] (name, schema, output
//! type). An [`OperationDescriptor`] records the name, schema and
//! construction rule; the [`Registry`] maps names to descriptors.
//!
//! The [`Dispatcher`] offers four calling conventions for any registered
//! operation:
//!
//! 1. [`Dispatcher::call`]: no arguments, declared defaults
//! 2. [`Dispatcher::call_map`]: a map of named options, schema-validated
//! 3. [`Dispatcher::call_with`]: a [`Configure`] object writing fields directly
//! 4. [`Dispatcher::call_by`]: a closure writing fields directly
//!
//! All four end in the same [`Invocation::execute`].
//!
//! # Errors
//!
//! [`DispatchError::kind`] separates usage errors (unknown operation or
//! option, lifecycle misuse, closed handle), validation errors (missing or
//! mistyped options) and execution errors (the engine failed).

pub mod builtin;
mod descriptor;
mod dispatch;
mod error;
mod facade;
mod operation;
mod output;
mod registry;
mod schema;
pub(crate) mod value;

pub use builtin::{
    AddOp, BranchAddOp, BranchListOp, BranchRemoveOp, CheckoutOp, CloneOp, CommitOp,
    DescribeOp, FetchOp, HeadOp, InitOp, LogOp, OpenOp, PushOp, RemoteAddOp, RemoteListOp,
    RemoveOp, ResetOp, StatusOp, TagAddOp, TagListOp, TagRemoveOp,
};
pub use descriptor::{Factory, OperationDescriptor};
pub use dispatch::{option_map, Configure, Dispatcher, Invocation, OptionMap, Phase};
pub use error::{Convention, DispatchError, ErrorKind};
pub use facade::{clone, init, open};
pub use operation::{Operation, OperationKind};
pub use output::{FromOutput, OpOutput};
pub use registry::Registry;
pub use schema::{set_option, snapshot, OptionError, OptionSchema, OptionSpec, Snapshot};
pub use value::{OptionType, OptionValue};
