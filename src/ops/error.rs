//! ops::error
//!
//! Dispatch errors and their classification.

use std::fmt;

use thiserror::Error;

use super::schema::OptionError;
use crate::git::GitError;

/// The argument shape an operation was invoked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Convention {
    /// Bare call, defaults only.
    NoArgs,
    /// Map of named options.
    Map,
    /// A value implementing [`super::Configure`].
    Object,
    /// A closure receiving the instance.
    Closure,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Convention::NoArgs => "no-arg",
            Convention::Map => "map",
            Convention::Object => "configurator",
            Convention::Closure => "closure",
        };
        f.write_str(s)
    }
}

/// Error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Programmer mistakes. Never retried.
    Usage,
    /// Bad input the caller can correct.
    Validation,
    /// The operation itself failed.
    Execution,
}

/// Errors from the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("operation already registered: {name}")]
    DuplicateOperation { name: &'static str },

    #[error("unknown option: {option} (operation '{operation}')")]
    UnknownOption {
        operation: &'static str,
        option: String,
    },

    #[error("missing required option: {option} (operation '{operation}')")]
    MissingOption {
        operation: &'static str,
        option: &'static str,
    },

    #[error("invalid option type: '{option}' expects {expected}, got {found} (operation '{operation}')")]
    InvalidOptionType {
        operation: &'static str,
        option: String,
        expected: String,
        found: String,
    },

    #[error("operation '{operation}' is already configured")]
    AlreadyConfigured { operation: &'static str },

    #[error("operation '{operation}' was executed before being configured")]
    NotConfigured { operation: &'static str },

    #[error("operation '{operation}' was already executed")]
    AlreadyExecuted { operation: &'static str },

    #[error("operation '{operation}' requires an open repository")]
    HandleRequired { operation: &'static str },

    #[error("repository handle is closed (operation '{operation}')")]
    HandleClosed { operation: &'static str },

    #[error("operation '{operation}' cannot be configured as {expected}")]
    InstanceMismatch {
        operation: &'static str,
        expected: &'static str,
    },

    #[error("operation '{operation}' returned {found}, expected {expected}")]
    OutputMismatch {
        operation: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{operation} failed ({convention} call): {source}")]
    Execution {
        operation: &'static str,
        convention: Convention,
        #[source]
        source: GitError,
    },
}

impl DispatchError {
    /// Attach the operation name to a protocol error.
    pub(crate) fn from_option(operation: &'static str, err: OptionError) -> Self {
        match err {
            OptionError::Unknown(option) => DispatchError::UnknownOption { operation, option },
            OptionError::TypeMismatch {
                option,
                expected,
                found,
            } => DispatchError::InvalidOptionType {
                operation,
                option,
                expected,
                found,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::MissingOption { .. } | DispatchError::InvalidOptionType { .. } => {
                ErrorKind::Validation
            }
            DispatchError::Execution { .. } => ErrorKind::Execution,
            _ => ErrorKind::Usage,
        }
    }

    /// Operation the error belongs to, when known.
    pub fn operation(&self) -> Option<&str> {
        match self {
            DispatchError::UnknownOperation { name } => Some(name.as_str()),
            DispatchError::DuplicateOperation { name } => Some(*name),
            DispatchError::UnknownOption { operation, .. }
            | DispatchError::MissingOption { operation, .. }
            | DispatchError::InvalidOptionType { operation, .. }
            | DispatchError::AlreadyConfigured { operation }
            | DispatchError::NotConfigured { operation }
            | DispatchError::AlreadyExecuted { operation }
            | DispatchError::HandleRequired { operation }
            | DispatchError::HandleClosed { operation }
            | DispatchError::InstanceMismatch { operation, .. }
            | DispatchError::OutputMismatch { operation, .. }
            | DispatchError::Execution { operation, .. } => Some(*operation),
        }
    }

    /// The engine failure behind an execution error.
    pub fn git_error(&self) -> Option<&GitError> {
        match self {
            DispatchError::Execution { source, .. } => Some(source),
            _ => None,
        }
    }
}
