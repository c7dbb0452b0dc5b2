//! ops::schema
//!
//! Option schemas and the option application protocol.
//!
//! Every operation declares an ordered [`OptionSchema`]. [`set_option`] is
//! the one way a named, dynamically typed value is written onto an instance:
//! the name is checked against the schema, the value is checked and coerced
//! to the declared type, then [`Operation::apply_option`] stores it.
//!
//! The configuration-object and closure conventions write fields directly
//! and do not pass through here.

use thiserror::Error;

use super::operation::Operation;
use super::value::{OptionType, OptionValue};

/// Errors from writing an option onto an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    Unknown(String),

    #[error("option '{option}' expects {expected}, got {found}")]
    TypeMismatch {
        option: String,
        expected: String,
        found: String,
    },
}

impl OptionError {
    pub(crate) fn mismatch(option: &str, expected: &OptionType, found: &OptionValue) -> Self {
        OptionError::TypeMismatch {
            option: option.to_string(),
            expected: expected.to_string(),
            found: found.describe(),
        }
    }
}

/// One declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub ty: OptionType,
    pub required: bool,
    /// Value a fresh instance holds; `None` when unset by default.
    pub default: Option<OptionValue>,
    pub doc: &'static str,
}

/// Ordered option declarations for one operation.
///
/// # Example
///
/// ```
/// use gitvane::ops::{OptionSchema, OptionType};
///
/// let schema = OptionSchema::new()
///     .required("message", OptionType::String, "Commit message")
///     .with_default("amend", OptionType::Bool, false, "Rewrite HEAD");
///
/// assert_eq!(schema.names().collect::<Vec<_>>(), vec!["message", "amend"]);
/// assert!(schema.get("message").unwrap().required);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSchema {
    specs: Vec<OptionSpec>,
}

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required option.
    pub fn required(self, name: &'static str, ty: OptionType, doc: &'static str) -> Self {
        self.push(OptionSpec {
            name,
            ty,
            required: true,
            default: None,
            doc,
        })
    }

    /// Declare an optional option that is unset by default.
    pub fn optional(self, name: &'static str, ty: OptionType, doc: &'static str) -> Self {
        self.push(OptionSpec {
            name,
            ty,
            required: false,
            default: None,
            doc,
        })
    }

    /// Declare an optional option with a default value.
    pub fn with_default(
        self,
        name: &'static str,
        ty: OptionType,
        default: impl Into<OptionValue>,
        doc: &'static str,
    ) -> Self {
        self.push(OptionSpec {
            name,
            ty,
            required: false,
            default: Some(default.into()),
            doc,
        })
    }

    fn push(mut self, spec: OptionSpec) -> Self {
        debug_assert!(
            self.get(spec.name).is_none(),
            "option '{}' declared twice",
            spec.name
        );
        self.specs.push(spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Declarations in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.specs.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.name)
    }

    /// Required options in schema order.
    pub fn required_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().filter(|s| s.required).map(|s| s.name)
    }

    pub fn has_required(&self) -> bool {
        self.specs.iter().any(|s| s.required)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Write one option onto an instance.
///
/// Writing the same name twice is last-write-wins.
///
/// # Errors
///
/// - [`OptionError::Unknown`] if `name` is not in `schema`
/// - [`OptionError::TypeMismatch`] if `value` is not assignable to the declared type
pub fn set_option(
    op: &mut dyn Operation,
    schema: &OptionSchema,
    name: &str,
    value: OptionValue,
) -> Result<(), OptionError> {
    let spec = schema
        .get(name)
        .ok_or_else(|| OptionError::Unknown(name.to_string()))?;
    let value = spec.ty.coerce(name, value)?;
    op.apply_option(name, value)
}

/// Instance option values in schema order.
pub type Snapshot = Vec<(&'static str, Option<OptionValue>)>;

/// Read back every option value of an instance, in schema order.
pub fn snapshot(op: &dyn Operation, schema: &OptionSchema) -> Snapshot {
    schema
        .names()
        .map(|name| (name, op.option_value(name)))
        .collect()
}
