//! ops::descriptor
//!
//! Registered, immutable metadata for one operation.

use super::error::DispatchError;
use super::operation::{Operation, OperationKind};
use super::schema::OptionSchema;
use crate::git::RepoHandle;

/// How an operation instance is constructed.
#[derive(Clone, Copy)]
pub enum Factory {
    /// Needs no repository (`init`, `open`, `clone`).
    Standalone(fn() -> Box<dyn Operation>),
    /// Constructed with a handle to an open repository.
    Bound(fn(RepoHandle) -> Box<dyn Operation>),
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Factory::Standalone(_) => f.write_str("Standalone"),
            Factory::Bound(_) => f.write_str("Bound"),
        }
    }
}

/// Describes one operation: name, option schema and construction rule.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub name: &'static str,
    /// One-line description shown by `gv ops`.
    pub summary: &'static str,
    pub schema: OptionSchema,
    pub factory: Factory,
}

fn make_standalone<T: Operation + Default>() -> Box<dyn Operation> {
    Box::new(T::default())
}

fn make_bound<T: Operation + From<RepoHandle>>(handle: RepoHandle) -> Box<dyn Operation> {
    Box::new(T::from(handle))
}

impl OperationDescriptor {
    pub fn new(
        name: &'static str,
        summary: &'static str,
        schema: OptionSchema,
        factory: Factory,
    ) -> Self {
        Self {
            name,
            summary,
            schema,
            factory,
        }
    }

    /// Descriptor for an operation that needs no repository.
    pub fn standalone<T: OperationKind + Default>(summary: &'static str) -> Self {
        Self::new(
            T::NAME,
            summary,
            T::schema(),
            Factory::Standalone(make_standalone::<T>),
        )
    }

    /// Descriptor for an operation constructed from a repository handle.
    pub fn bound<T: OperationKind + From<RepoHandle>>(summary: &'static str) -> Self {
        Self::new(T::NAME, summary, T::schema(), Factory::Bound(make_bound::<T>))
    }

    pub fn requires_handle(&self) -> bool {
        matches!(self.factory, Factory::Bound(_))
    }

    /// Build a fresh, unconfigured instance.
    ///
    /// Standalone operations ignore `handle`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::HandleRequired`] for a bound operation without a handle
    /// - [`DispatchError::HandleClosed`] for a bound operation with a closed handle
    pub fn construct(
        &self,
        handle: Option<&RepoHandle>,
    ) -> Result<Box<dyn Operation>, DispatchError> {
        match self.factory {
            Factory::Standalone(make) => Ok(make()),
            Factory::Bound(make) => {
                let handle = handle.ok_or(DispatchError::HandleRequired {
                    operation: self.name,
                })?;
                if handle.is_closed() {
                    return Err(DispatchError::HandleClosed {
                        operation: self.name,
                    });
                }
                Ok(make(handle.clone()))
            }
        }
    }
}
