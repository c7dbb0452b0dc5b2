//! ops::dispatch
//!
//! The invocation dispatcher.
//!
//! # Architecture
//!
//! Every call goes through an [`Invocation`]:
//!
//! ```text
//! Constructed -> Configuring -> Configured -> Executing -> Completed | Failed
//! ```
//!
//! Each calling convention is only a different way of leaving
//! `Constructed`. The no-arg and map conventions validate against the schema
//! and write through [`set_option`]; the configuration-object and closure
//! conventions hand the typed instance to caller code and accept whatever
//! state it leaves behind. All four then reach the same
//! [`Invocation::execute`].
//!
//! # Invariants
//!
//! - Configuration happens at most once per instance
//! - `execute` runs the operation at most once
//! - Map validation finishes before any value is written
//! - A validation failure discards the instance (phase `Failed`)
//!
//! # Example
//!
//! ```ignore
//! use gitvane::ops::{option_map, Dispatcher};
//!
//! let dispatcher = Dispatcher::global();
//! let handle = repo.handle();
//!
//! dispatcher.call_map("add", Some(&handle), option_map([("patterns", ".")]))?;
//! dispatcher.call_by("commit", Some(&handle), |op: &mut CommitOp| {
//!     op.message = Some("First commit".into());
//! })?;
//! ```

use std::any::type_name;
use std::collections::BTreeMap;

use super::descriptor::OperationDescriptor;
use super::error::{Convention, DispatchError};
use super::operation::{Operation, OperationKind};
use super::output::{FromOutput, OpOutput};
use super::registry::Registry;
use super::schema::{set_option, snapshot, Snapshot};
use super::value::OptionValue;
use crate::git::{GitError, RepoHandle};

/// Options for the map convention.
pub type OptionMap = BTreeMap<String, OptionValue>;

/// Build an [`OptionMap`] from pairs.
///
/// ```
/// use gitvane::ops::{option_map, OptionValue};
///
/// let map = option_map([("message", OptionValue::from("x")), ("amend", true.into())]);
/// assert_eq!(map.len(), 2);
/// ```
pub fn option_map<K, V, I>(pairs: I) -> OptionMap
where
    K: Into<String>,
    V: Into<OptionValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Configures an instance of `T` directly.
///
/// Implemented for every `Fn(&mut T)`, so a closure and a hand-written
/// configurator type are interchangeable.
pub trait Configure<T> {
    fn configure(&self, op: &mut T);
}

impl<T, F> Configure<T> for F
where
    F: Fn(&mut T),
{
    fn configure(&self, op: &mut T) {
        self(op)
    }
}

/// Where an invocation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Constructed,
    Configuring,
    Configured,
    Executing,
    Completed,
    Failed,
}

/// One call of one operation.
pub struct Invocation<'r> {
    descriptor: &'r OperationDescriptor,
    instance: Box<dyn Operation>,
    phase: Phase,
    convention: Option<Convention>,
}

impl<'r> Invocation<'r> {
    /// Construct a fresh instance of the operation.
    pub fn new(
        descriptor: &'r OperationDescriptor,
        handle: Option<&RepoHandle>,
    ) -> Result<Self, DispatchError> {
        let instance = descriptor.construct(handle)?;
        tracing::debug!(operation = descriptor.name, "constructed operation");
        Ok(Self {
            descriptor,
            instance,
            phase: Phase::Constructed,
            convention: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn descriptor(&self) -> &'r OperationDescriptor {
        self.descriptor
    }

    /// The convention that configured this invocation, once configured.
    pub fn convention(&self) -> Option<Convention> {
        self.convention
    }

    /// The operation instance.
    pub fn instance(&self) -> &dyn Operation {
        self.instance.as_ref()
    }

    /// Current option values, in schema order.
    pub fn snapshot(&self) -> Snapshot {
        snapshot(self.instance.as_ref(), &self.descriptor.schema)
    }

    fn name(&self) -> &'static str {
        self.descriptor.name
    }

    fn begin_configure(&mut self, convention: Convention) -> Result<(), DispatchError> {
        match self.phase {
            Phase::Constructed => {
                self.phase = Phase::Configuring;
                self.convention = Some(convention);
                Ok(())
            }
            Phase::Configuring | Phase::Configured => Err(DispatchError::AlreadyConfigured {
                operation: self.name(),
            }),
            Phase::Executing | Phase::Completed | Phase::Failed => {
                Err(DispatchError::AlreadyExecuted {
                    operation: self.name(),
                })
            }
        }
    }

    fn fail(&mut self, err: DispatchError) -> DispatchError {
        self.phase = Phase::Failed;
        err
    }

    /// Accept the declared defaults. Fails if any option is required.
    pub fn configure_defaults(&mut self) -> Result<(), DispatchError> {
        self.begin_configure(Convention::NoArgs)?;
        let descriptor = self.descriptor;
        if let Some(option) = descriptor.schema.required_names().next() {
            return Err(self.fail(DispatchError::MissingOption {
                operation: self.name(),
                option,
            }));
        }
        self.phase = Phase::Configured;
        Ok(())
    }

    /// Validate a map of options completely, then apply it in schema order.
    ///
    /// Checks run in this order: unknown keys, missing required options,
    /// value types. A required option given as an empty list counts as
    /// missing. Nothing is written unless every check passes.
    pub fn configure_map(&mut self, mut options: OptionMap) -> Result<(), DispatchError> {
        self.begin_configure(Convention::Map)?;
        let descriptor = self.descriptor;
        let schema = &descriptor.schema;

        if let Some(unknown) = options.keys().find(|k| schema.get(k).is_none()) {
            let err = DispatchError::UnknownOption {
                operation: self.name(),
                option: unknown.clone(),
            };
            return Err(self.fail(err));
        }

        // An empty list does not satisfy a required list option
        if let Some(option) = schema
            .iter()
            .filter(|spec| spec.required)
            .find(|spec| match options.get(spec.name) {
                None => true,
                Some(OptionValue::List(items)) => items.is_empty(),
                Some(_) => false,
            })
            .map(|spec| spec.name)
        {
            let err = DispatchError::MissingOption {
                operation: self.name(),
                option,
            };
            return Err(self.fail(err));
        }

        let mut ordered = Vec::with_capacity(options.len());
        for spec in schema.iter() {
            if let Some(value) = options.remove(spec.name) {
                match spec.ty.coerce(spec.name, value) {
                    Ok(value) => ordered.push((spec.name, value)),
                    Err(e) => {
                        let err = DispatchError::from_option(self.name(), e);
                        return Err(self.fail(err));
                    }
                }
            }
        }

        for (name, value) in ordered {
            if let Err(e) = set_option(self.instance.as_mut(), schema, name, value) {
                let err = DispatchError::from_option(self.name(), e);
                return Err(self.fail(err));
            }
        }

        self.phase = Phase::Configured;
        Ok(())
    }

    /// Hand the typed instance to caller code.
    ///
    /// No schema validation runs; the instance's field values after `f`
    /// returns are final.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::InstanceMismatch`] if the instance is not a `T`
    pub fn configure_with<T: Operation>(
        &mut self,
        convention: Convention,
        f: impl FnOnce(&mut T),
    ) -> Result<(), DispatchError> {
        self.begin_configure(convention)?;
        if !self.instance.as_any().is::<T>() {
            let err = DispatchError::InstanceMismatch {
                operation: self.name(),
                expected: type_name::<T>(),
            };
            return Err(self.fail(err));
        }
        if let Some(op) = self.instance.as_any_mut().downcast_mut::<T>() {
            f(op);
        }
        self.phase = Phase::Configured;
        Ok(())
    }

    /// Run the configured operation exactly once.
    ///
    /// Engine failures come back as [`DispatchError::Execution`] tagged with
    /// the operation and convention, except a handle closed mid-call, which
    /// is [`DispatchError::HandleClosed`].
    pub fn execute(&mut self) -> Result<OpOutput, DispatchError> {
        match self.phase {
            Phase::Configured => {}
            Phase::Constructed | Phase::Configuring => {
                return Err(DispatchError::NotConfigured {
                    operation: self.name(),
                })
            }
            Phase::Executing | Phase::Completed | Phase::Failed => {
                return Err(DispatchError::AlreadyExecuted {
                    operation: self.name(),
                })
            }
        }

        // Configured always records its convention
        let convention = self.convention.unwrap_or(Convention::NoArgs);
        self.phase = Phase::Executing;
        tracing::debug!(operation = self.name(), %convention, "executing operation");

        match self.instance.execute() {
            Ok(output) => {
                self.phase = Phase::Completed;
                Ok(output)
            }
            Err(GitError::HandleClosed) => Err(self.fail(DispatchError::HandleClosed {
                operation: self.name(),
            })),
            Err(source) => Err(self.fail(DispatchError::Execution {
                operation: self.name(),
                convention,
                source,
            })),
        }
    }
}

impl std::fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("operation", &self.descriptor.name)
            .field("phase", &self.phase)
            .field("convention", &self.convention)
            .finish()
    }
}

/// Entry points for the four calling conventions.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
}

impl Dispatcher<'static> {
    /// A dispatcher over the builtin operations.
    pub fn global() -> Self {
        Self::new(Registry::global())
    }
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Look up and construct, leaving configuration to the caller.
    pub fn prepare(
        &self,
        name: &str,
        handle: Option<&RepoHandle>,
    ) -> Result<Invocation<'r>, DispatchError> {
        let descriptor = self.registry.lookup(name)?;
        Invocation::new(descriptor, handle)
    }

    /// Run with declared defaults.
    pub fn call(&self, name: &str, handle: Option<&RepoHandle>) -> Result<OpOutput, DispatchError> {
        let mut invocation = self.prepare(name, handle)?;
        invocation.configure_defaults()?;
        invocation.execute()
    }

    /// Run with a map of named options.
    pub fn call_map(
        &self,
        name: &str,
        handle: Option<&RepoHandle>,
        options: OptionMap,
    ) -> Result<OpOutput, DispatchError> {
        let mut invocation = self.prepare(name, handle)?;
        invocation.configure_map(options)?;
        invocation.execute()
    }

    /// Run after a configurator object has set fields directly.
    pub fn call_with<T: Operation>(
        &self,
        name: &str,
        handle: Option<&RepoHandle>,
        config: &dyn Configure<T>,
    ) -> Result<OpOutput, DispatchError> {
        let mut invocation = self.prepare(name, handle)?;
        invocation.configure_with(Convention::Object, |op: &mut T| config.configure(op))?;
        invocation.execute()
    }

    /// Run after a closure has set fields directly.
    pub fn call_by<T: Operation>(
        &self,
        name: &str,
        handle: Option<&RepoHandle>,
        f: impl FnOnce(&mut T),
    ) -> Result<OpOutput, DispatchError> {
        let mut invocation = self.prepare(name, handle)?;
        invocation.configure_with(Convention::Closure, f)?;
        invocation.execute()
    }

    // =========================================================================
    // Typed entry points
    // =========================================================================

    pub fn run<K: OperationKind>(
        &self,
        handle: Option<&RepoHandle>,
    ) -> Result<K::Output, DispatchError> {
        convert::<K>(self.call(K::NAME, handle)?)
    }

    pub fn run_map<K: OperationKind>(
        &self,
        handle: Option<&RepoHandle>,
        options: OptionMap,
    ) -> Result<K::Output, DispatchError> {
        convert::<K>(self.call_map(K::NAME, handle, options)?)
    }

    pub fn run_with<K: OperationKind>(
        &self,
        handle: Option<&RepoHandle>,
        config: &dyn Configure<K>,
    ) -> Result<K::Output, DispatchError> {
        convert::<K>(self.call_with(K::NAME, handle, config)?)
    }

    pub fn run_by<K: OperationKind>(
        &self,
        handle: Option<&RepoHandle>,
        f: impl FnOnce(&mut K),
    ) -> Result<K::Output, DispatchError> {
        convert::<K>(self.call_by(K::NAME, handle, f)?)
    }
}

fn convert<K: OperationKind>(output: OpOutput) -> Result<K::Output, DispatchError> {
    K::Output::from_output(output).map_err(|found| DispatchError::OutputMismatch {
        operation: K::NAME,
        expected: type_name::<K::Output>(),
        found: found.kind(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::descriptor::Factory;
    use crate::ops::operation::impl_any;
    use crate::ops::{OptionError, OptionSchema, OptionType};

    #[derive(Debug, Default, PartialEq)]
    struct Echo {
        text: Option<String>,
        times: i64,
        loud: bool,
        runs: usize,
    }

    impl Operation for Echo {
        fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
            match name {
                "text" => self.text = Some(value.into_string(name)?),
                "times" => self.times = value.into_int(name)?,
                "loud" => self.loud = value.into_bool(name)?,
                _ => return Err(OptionError::Unknown(name.to_string())),
            }
            Ok(())
        }

        fn option_value(&self, name: &str) -> Option<OptionValue> {
            match name {
                "text" => self.text.clone().map(OptionValue::Str),
                "times" => Some(self.times.into()),
                "loud" => Some(self.loud.into()),
                _ => None,
            }
        }

        fn execute(&mut self) -> Result<OpOutput, GitError> {
            self.runs += 1;
            let text = self.text.clone().ok_or_else(|| GitError::InvalidArgument {
                message: "text is required".into(),
            })?;
            let text = if self.loud { text.to_uppercase() } else { text };
            Ok(OpOutput::Text(text.repeat(self.times.max(1) as usize)))
        }

        impl_any!();
    }

    impl OperationKind for Echo {
        const NAME: &'static str = "echo";
        type Output = String;

        fn schema() -> OptionSchema {
            OptionSchema::new()
                .required("text", OptionType::String, "What to say")
                .with_default("times", OptionType::Int, 0, "Repeat count")
                .with_default("loud", OptionType::Bool, false, "Upper-case")
        }
    }

    #[derive(Debug, Default)]
    struct Other;

    impl Operation for Other {
        fn apply_option(&mut self, name: &str, _: OptionValue) -> Result<(), OptionError> {
            Err(OptionError::Unknown(name.to_string()))
        }

        fn option_value(&self, _: &str) -> Option<OptionValue> {
            None
        }

        fn execute(&mut self) -> Result<OpOutput, GitError> {
            Ok(OpOutput::Unit)
        }

        impl_any!();
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(OperationDescriptor::standalone::<Echo>("Repeat text"))
            .unwrap();
        registry
            .register(OperationDescriptor::new(
                "other",
                "Nothing",
                OptionSchema::new(),
                Factory::Standalone(|| Box::new(Other)),
            ))
            .unwrap();
        registry
    }

    mod conventions {
        use super::*;

        #[test]
        fn map_call_applies_and_runs() {
            let registry = registry();
            let out = Dispatcher::new(&registry)
                .run_map::<Echo>(None, option_map([("text", OptionValue::from("hi")), ("times", 2.into())]))
                .unwrap();
            assert_eq!(out, "hihi");
        }

        #[test]
        fn closure_and_object_reach_same_result() {
            let registry = registry();
            let dispatcher = Dispatcher::new(&registry);

            let by_closure = dispatcher
                .run_by::<Echo>(None, |op| {
                    op.text = Some("a".into());
                    op.loud = true;
                })
                .unwrap();

            struct Shout;
            impl Configure<Echo> for Shout {
                fn configure(&self, op: &mut Echo) {
                    op.text = Some("a".into());
                    op.loud = true;
                }
            }
            let by_object = dispatcher.run_with::<Echo>(None, &Shout).unwrap();

            assert_eq!(by_closure, "A");
            assert_eq!(by_closure, by_object);
        }

        #[test]
        fn no_arg_call_with_required_option_fails() {
            let registry = registry();
            let err = Dispatcher::new(&registry).call("echo", None).unwrap_err();
            assert!(matches!(
                err,
                DispatchError::MissingOption { operation: "echo", option: "text" }
            ));
        }

        #[test]
        fn closure_bypasses_required_check() {
            let registry = registry();
            let err = Dispatcher::new(&registry)
                .run_by::<Echo>(None, |_| {})
                .unwrap_err();
            match err {
                DispatchError::Execution { convention, .. } => {
                    assert_eq!(convention, Convention::Closure)
                }
                other => panic!("expected execution error, got {other:?}"),
            }
        }

        #[test]
        fn wrong_instance_type_is_rejected() {
            let registry = registry();
            let err = Dispatcher::new(&registry)
                .call_by("other", None, |op: &mut Echo| op.loud = true)
                .unwrap_err();
            assert!(matches!(err, DispatchError::InstanceMismatch { operation: "other", .. }));
        }

        #[test]
        fn output_mismatch_is_reported() {
            let mut registry = Registry::new();
            registry
                .register(OperationDescriptor::new(
                    "echo",
                    "Echo that returns nothing",
                    Echo::schema(),
                    Factory::Standalone(|| Box::new(Other)),
                ))
                .unwrap();
            let err = Dispatcher::new(&registry)
                .run_map::<Echo>(None, option_map([("text", "x")]))
                .unwrap_err();
            assert!(matches!(err, DispatchError::OutputMismatch { found: "unit", .. }));
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn unknown_key_reported_before_missing_required() {
            let registry = registry();
            let err = Dispatcher::new(&registry)
                .call_map("echo", None, option_map([("bogus", 1)]))
                .unwrap_err();
            assert_eq!(err.to_string(), "unknown option: bogus (operation 'echo')");
        }

        #[test]
        fn type_error_names_option_and_expected_type() {
            let registry = registry();
            let err = Dispatcher::new(&registry)
                .call_map(
                    "echo",
                    None,
                    option_map([("text", OptionValue::from("x")), ("times", "many".into())]),
                )
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "invalid option type: 'times' expects int, got string 'many' (operation 'echo')"
            );
            assert_eq!(err.kind(), crate::ops::ErrorKind::Validation);
        }

        #[test]
        fn failed_validation_writes_nothing() {
            let registry = registry();
            let mut invocation = Dispatcher::new(&registry).prepare("echo", None).unwrap();
            let before = invocation.snapshot();
            let result = invocation.configure_map(option_map([
                ("text", OptionValue::from("x")),
                ("loud", "yes".into()),
            ]));
            assert!(result.is_err());
            assert_eq!(invocation.phase(), Phase::Failed);
            assert_eq!(invocation.snapshot(), before);
        }

        #[test]
        fn unknown_operation() {
            let registry = registry();
            let err = Dispatcher::new(&registry).call("nope", None).unwrap_err();
            assert!(matches!(err, DispatchError::UnknownOperation { .. }));
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn phases_advance_in_order() {
            let registry = registry();
            let mut invocation = Dispatcher::new(&registry).prepare("echo", None).unwrap();
            assert_eq!(invocation.phase(), Phase::Constructed);
            invocation
                .configure_map(option_map([("text", "x")]))
                .unwrap();
            assert_eq!(invocation.phase(), Phase::Configured);
            assert_eq!(invocation.convention(), Some(Convention::Map));
            invocation.execute().unwrap();
            assert_eq!(invocation.phase(), Phase::Completed);
        }

        #[test]
        fn configure_twice_is_rejected() {
            let registry = registry();
            let mut invocation = Dispatcher::new(&registry).prepare("echo", None).unwrap();
            invocation
                .configure_map(option_map([("text", "x")]))
                .unwrap();
            let err = invocation
                .configure_with(Convention::Closure, |op: &mut Echo| op.loud = true)
                .unwrap_err();
            assert!(matches!(err, DispatchError::AlreadyConfigured { .. }));
        }

        #[test]
        fn execute_before_configure_is_rejected() {
            let registry = registry();
            let mut invocation = Dispatcher::new(&registry).prepare("echo", None).unwrap();
            assert!(matches!(
                invocation.execute(),
                Err(DispatchError::NotConfigured { .. })
            ));
        }

        #[test]
        fn second_execute_is_rejected_without_running() {
            let registry = registry();
            let mut invocation = Dispatcher::new(&registry).prepare("echo", None).unwrap();
            invocation
                .configure_map(option_map([("text", "x")]))
                .unwrap();
            invocation.execute().unwrap();
            assert!(matches!(
                invocation.execute(),
                Err(DispatchError::AlreadyExecuted { .. })
            ));
            assert_eq!(invocation.phase(), Phase::Completed);

            let echo = invocation.instance().as_any().downcast_ref::<Echo>().unwrap();
            assert_eq!(echo.runs, 1);
        }

        #[test]
        fn failed_execution_cannot_be_retried() {
            let registry = registry();
            let mut invocation = Dispatcher::new(&registry).prepare("echo", None).unwrap();
            invocation
                .configure_with(Convention::Closure, |_: &mut Echo| {})
                .unwrap();
            assert!(matches!(
                invocation.execute(),
                Err(DispatchError::Execution { .. })
            ));
            assert_eq!(invocation.phase(), Phase::Failed);
            assert!(matches!(
                invocation.execute(),
                Err(DispatchError::AlreadyExecuted { .. })
            ));
        }
    }
}
