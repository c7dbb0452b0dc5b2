//! ops::builtin::inspect
//!
//! Read-only queries: status, head, describe.

use super::str_value;
use crate::git::{CommitInfo, GitError, RepoHandle, Status};
use crate::ops::operation::{impl_any, Operation, OperationKind};
use crate::ops::{OpOutput, OptionError, OptionSchema, OptionType, OptionValue};

fn no_options(name: &str) -> Result<(), OptionError> {
    Err(OptionError::Unknown(name.to_string()))
}

/// Working tree and index status.
#[derive(Debug)]
pub struct StatusOp {
    repo: RepoHandle,
}

impl From<RepoHandle> for StatusOp {
    fn from(repo: RepoHandle) -> Self {
        Self { repo }
    }
}

impl OperationKind for StatusOp {
    const NAME: &'static str = "status";
    type Output = Status;

    fn schema() -> OptionSchema {
        OptionSchema::new()
    }
}

impl Operation for StatusOp {
    fn apply_option(&mut self, name: &str, _: OptionValue) -> Result<(), OptionError> {
        no_options(name)
    }

    fn option_value(&self, _: &str) -> Option<OptionValue> {
        None
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        Ok(OpOutput::Status(self.repo.with(|git| git.status())?))
    }

    impl_any!();
}

/// The commit HEAD points at.
#[derive(Debug)]
pub struct HeadOp {
    repo: RepoHandle,
}

impl From<RepoHandle> for HeadOp {
    fn from(repo: RepoHandle) -> Self {
        Self { repo }
    }
}

impl OperationKind for HeadOp {
    const NAME: &'static str = "head";
    type Output = CommitInfo;

    fn schema() -> OptionSchema {
        OptionSchema::new()
    }
}

impl Operation for HeadOp {
    fn apply_option(&mut self, name: &str, _: OptionValue) -> Result<(), OptionError> {
        no_options(name)
    }

    fn option_value(&self, _: &str) -> Option<OptionValue> {
        None
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        Ok(OpOutput::Commit(self.repo.with(|git| git.head())?))
    }

    impl_any!();
}

/// Name a commit relative to the nearest tag (`v1.2-3-gabc1234`).
///
/// Returns an empty string when no tag is reachable.
#[derive(Debug)]
pub struct DescribeOp {
    repo: RepoHandle,
    /// Commit to describe, `HEAD` when unset.
    pub commit: Option<String>,
    /// Consider lightweight tags too.
    pub tags: bool,
    /// Always use the long format, even on an exact match.
    pub long: bool,
}

impl From<RepoHandle> for DescribeOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            commit: None,
            tags: false,
            long: false,
        }
    }
}

impl OperationKind for DescribeOp {
    const NAME: &'static str = "describe";
    type Output = String;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .optional("commit", OptionType::String, "Commit to describe (default HEAD)")
            .with_default("tags", OptionType::Bool, false, "Include lightweight tags")
            .with_default("long", OptionType::Bool, false, "Always use the long format")
    }
}

impl Operation for DescribeOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "commit" => self.commit = Some(value.into_string(name)?),
            "tags" => self.tags = value.into_bool(name)?,
            "long" => self.long = value.into_bool(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "commit" => str_value(&self.commit),
            "tags" => Some(self.tags.into()),
            "long" => Some(self.long.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let revision = self.commit.as_deref().unwrap_or("HEAD");
        let description = self
            .repo
            .with(|git| git.describe(revision, self.tags, self.long))?;
        Ok(OpOutput::Text(description.unwrap_or_default()))
    }

    impl_any!();
}
