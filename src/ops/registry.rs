//! ops::registry
//!
//! Name to descriptor mapping.
//!
//! The process-wide registry is built with the builtin operations on first
//! use and never mutated afterwards, so concurrent reads need no locking.
//! Separate registries can be built for embedding and tests.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::builtin;
use super::descriptor::OperationDescriptor;
use super::error::DispatchError;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Registered operations, ordered by name.
#[derive(Debug, Default)]
pub struct Registry {
    ops: BTreeMap<&'static str, OperationDescriptor>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every builtin operation.
    pub fn with_builtins() -> Result<Self, DispatchError> {
        let mut registry = Self::new();
        builtin::register_all(&mut registry)?;
        Ok(registry)
    }

    /// The shared registry of builtin operations.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(|| {
            Self::with_builtins().expect("builtin operation names are unique")
        })
    }

    /// Add an operation.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::DuplicateOperation`] if the name is taken
    pub fn register(&mut self, descriptor: OperationDescriptor) -> Result<(), DispatchError> {
        if self.ops.contains_key(descriptor.name) {
            return Err(DispatchError::DuplicateOperation {
                name: descriptor.name,
            });
        }
        self.ops.insert(descriptor.name, descriptor);
        Ok(())
    }

    /// Find an operation by name.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownOperation`] if nothing is registered under `name`
    pub fn lookup(&self, name: &str) -> Result<&OperationDescriptor, DispatchError> {
        self.ops
            .get(name)
            .ok_or_else(|| DispatchError::UnknownOperation {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ops.keys().copied()
    }

    /// Descriptors, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.ops.values()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::descriptor::Factory;
    use crate::ops::{OpOutput, Operation, OptionError, OptionSchema, OptionValue};
    use crate::git::GitError;

    #[derive(Debug, Default)]
    struct Noop;

    impl Operation for Noop {
        fn apply_option(&mut self, name: &str, _: OptionValue) -> Result<(), OptionError> {
            Err(OptionError::Unknown(name.to_string()))
        }

        fn option_value(&self, _: &str) -> Option<OptionValue> {
            None
        }

        fn execute(&mut self) -> Result<OpOutput, GitError> {
            Ok(OpOutput::Unit)
        }

        crate::ops::operation::impl_any!();
    }

    fn noop(name: &'static str) -> OperationDescriptor {
        OperationDescriptor::new(
            name,
            "does nothing",
            OptionSchema::new(),
            Factory::Standalone(|| Box::new(Noop)),
        )
    }

    #[test]
    fn register_then_lookup() {
        let mut registry = Registry::new();
        registry.register(noop("noop")).unwrap();
        assert_eq!(registry.lookup("noop").unwrap().name, "noop");
        assert!(!registry.lookup("noop").unwrap().requires_handle());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = Registry::new();
        registry.register(noop("noop")).unwrap();
        let err = registry.register(noop("noop")).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateOperation { name: "noop" }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_name_is_usage_error() {
        let err = Registry::new().lookup("frobnicate").unwrap_err();
        assert_eq!(err.to_string(), "unknown operation: frobnicate");
        assert_eq!(err.kind(), crate::ops::ErrorKind::Usage);
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = Registry::new();
        registry.register(noop("zeta")).unwrap();
        registry.register(noop("alpha")).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn global_holds_builtins() {
        let registry = Registry::global();
        for name in ["init", "open", "clone", "commit", "log", "add", "push"] {
            assert!(registry.contains(name), "{name} missing");
        }
        assert!(!registry.lookup("init").unwrap().requires_handle());
        assert!(registry.lookup("commit").unwrap().requires_handle());
    }

    #[test]
    fn bound_operation_without_handle() {
        let err = Registry::global()
            .lookup("status")
            .unwrap()
            .construct(None)
            .err()
            .unwrap();
        assert!(matches!(err, DispatchError::HandleRequired { operation: "status" }));
    }
}
