//! ops::builtin::stage
//!
//! Index operations: add, remove, reset.

use super::{non_empty, str_value};
use crate::git::{GitError, RepoHandle, ResetMode};
use crate::ops::operation::{impl_any, Operation, OperationKind};
use crate::ops::value::list_value;
use crate::ops::{OpOutput, OptionError, OptionSchema, OptionType, OptionValue};

/// Stage files.
#[derive(Debug)]
pub struct AddOp {
    repo: RepoHandle,
    /// Pathspecs to stage (`.` for everything).
    pub patterns: Vec<String>,
    /// Only stage files that are already tracked.
    pub update: bool,
}

impl From<RepoHandle> for AddOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            patterns: Vec::new(),
            update: false,
        }
    }
}

impl OperationKind for AddOp {
    const NAME: &'static str = "add";
    type Output = ();

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("patterns", OptionType::StringList, "Pathspecs to stage")
            .with_default("update", OptionType::Bool, false, "Only stage tracked files")
    }
}

impl Operation for AddOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "patterns" => self.patterns = value.into_list(name)?,
            "update" => self.update = value.into_bool(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "patterns" => list_value(&self.patterns),
            "update" => Some(self.update.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let patterns = non_empty(&self.patterns, "patterns")?;
        self.repo.with(|git| git.add(patterns, self.update))?;
        Ok(OpOutput::Unit)
    }

    impl_any!();
}

/// Remove files from the index and, unless cached, the working tree.
///
/// Returns the removed paths.
#[derive(Debug)]
pub struct RemoveOp {
    repo: RepoHandle,
    pub patterns: Vec<String>,
    /// Keep the files on disk.
    pub cached: bool,
}

impl From<RepoHandle> for RemoveOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            patterns: Vec::new(),
            cached: false,
        }
    }
}

impl OperationKind for RemoveOp {
    const NAME: &'static str = "remove";
    type Output = Vec<String>;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("patterns", OptionType::StringList, "Pathspecs to remove")
            .with_default("cached", OptionType::Bool, false, "Only remove from the index")
    }
}

impl Operation for RemoveOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "patterns" => self.patterns = value.into_list(name)?,
            "cached" => self.cached = value.into_bool(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "patterns" => list_value(&self.patterns),
            "cached" => Some(self.cached.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let patterns = non_empty(&self.patterns, "patterns")?;
        let removed = self.repo.with(|git| git.remove(patterns, self.cached))?;
        tracing::debug!(count = removed.len(), "removed paths");
        Ok(OpOutput::Names(removed))
    }

    impl_any!();
}

/// Reset HEAD, the index or individual paths.
#[derive(Debug)]
pub struct ResetOp {
    repo: RepoHandle,
    /// Target revision, `HEAD` when unset.
    pub commit: Option<String>,
    pub mode: ResetMode,
    /// Reset only these index entries.
    pub paths: Vec<String>,
}

impl From<RepoHandle> for ResetOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            commit: None,
            mode: ResetMode::default(),
            paths: Vec::new(),
        }
    }
}

impl OperationKind for ResetOp {
    const NAME: &'static str = "reset";
    type Output = ();

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .optional("commit", OptionType::String, "Revision to reset to (default HEAD)")
            .with_default(
                "mode",
                OptionType::Choice(ResetMode::NAMES),
                ResetMode::default().as_str(),
                "How much state to reset",
            )
            .optional("paths", OptionType::StringList, "Only reset these paths")
    }
}

impl Operation for ResetOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "commit" => self.commit = Some(value.into_string(name)?),
            "mode" => self.mode = value.into_choice(name, ResetMode::NAMES)?,
            "paths" => self.paths = value.into_list(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "commit" => str_value(&self.commit),
            "mode" => Some(self.mode.as_str().into()),
            "paths" => list_value(&self.paths),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let target = self.commit.as_deref().unwrap_or("HEAD");
        self.repo
            .with(|git| git.reset(target, self.mode, &self.paths))?;
        Ok(OpOutput::Unit)
    }

    impl_any!();
}
