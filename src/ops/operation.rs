//! ops::operation
//!
//! The traits every operation implements.
//!
//! # Architecture
//!
//! [`Operation`] is the object-safe side used by the dispatcher: options are
//! written by name and read back by name, and `execute` runs the work once.
//! [`OperationKind`] is the static side used by the typed entry points: it
//! names the operation, declares its schema and the Rust type its output
//! converts to.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Debug)]
//! pub struct HeadOp {
//!     repo: RepoHandle,
//! }
//!
//! impl OperationKind for HeadOp {
//!     const NAME: &'static str = "head";
//!     type Output = CommitInfo;
//!
//!     fn schema() -> OptionSchema {
//!         OptionSchema::new()
//!     }
//! }
//! ```

use std::any::Any;

use super::output::{FromOutput, OpOutput};
use super::schema::{OptionError, OptionSchema};
use super::value::OptionValue;
use crate::git::GitError;

/// A configurable unit of work.
pub trait Operation: Any + Send {
    /// Store an already type-checked value.
    ///
    /// Called by [`super::schema::set_option`]; implementations still reject
    /// names and shapes they do not know.
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError>;

    /// Current value of an option, `None` when unset.
    fn option_value(&self, name: &str) -> Option<OptionValue>;

    /// Run the operation.
    fn execute(&mut self) -> Result<OpOutput, GitError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Static metadata of an operation type.
pub trait OperationKind: Operation + Sized {
    /// Registry name.
    const NAME: &'static str;

    /// What a successful run converts to.
    type Output: FromOutput;

    fn schema() -> OptionSchema;
}

/// Implements the `as_any` pair for an operation type.
macro_rules! impl_any {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}

pub(crate) use impl_any;
