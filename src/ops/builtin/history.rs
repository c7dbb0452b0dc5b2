//! ops::builtin::history
//!
//! Recording and reading commits.

use super::{required_str, str_value};
use crate::git::{CommitInfo, CommitRequest, GitError, LogQuery, RepoHandle};
use crate::ops::operation::{impl_any, Operation, OperationKind};
use crate::ops::value::list_value;
use crate::ops::{OpOutput, OptionError, OptionSchema, OptionType, OptionValue};

/// Record a commit.
///
/// `message` is required. Through the map convention a missing message is a
/// validation error; a configurator that leaves it unset gets an execution
/// error instead.
#[derive(Debug)]
pub struct CommitOp {
    repo: RepoHandle,
    pub message: Option<String>,
    /// Stage exactly these paths before committing.
    pub paths: Vec<String>,
    /// Stage modified and deleted tracked files before committing.
    pub all: bool,
    /// Replace HEAD instead of adding a child.
    pub amend: bool,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
}

impl From<RepoHandle> for CommitOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            message: None,
            paths: Vec::new(),
            all: false,
            amend: false,
            author_name: None,
            author_email: None,
        }
    }
}

impl OperationKind for CommitOp {
    const NAME: &'static str = "commit";
    type Output = CommitInfo;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("message", OptionType::String, "Commit message")
            .optional("paths", OptionType::StringList, "Stage these paths first")
            .with_default("all", OptionType::Bool, false, "Stage all tracked changes first")
            .with_default("amend", OptionType::Bool, false, "Rewrite the HEAD commit")
            .optional("author_name", OptionType::String, "Override the author name")
            .optional("author_email", OptionType::String, "Override the author email")
    }
}

impl Operation for CommitOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "message" => self.message = Some(value.into_string(name)?),
            "paths" => self.paths = value.into_list(name)?,
            "all" => self.all = value.into_bool(name)?,
            "amend" => self.amend = value.into_bool(name)?,
            "author_name" => self.author_name = Some(value.into_string(name)?),
            "author_email" => self.author_email = Some(value.into_string(name)?),
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "message" => str_value(&self.message),
            "paths" => list_value(&self.paths),
            "all" => Some(self.all.into()),
            "amend" => Some(self.amend.into()),
            "author_name" => str_value(&self.author_name),
            "author_email" => str_value(&self.author_email),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let message = required_str(&self.message, "message")?;
        let identity = self.repo.identity();
        let request = CommitRequest {
            message,
            paths: &self.paths,
            all: self.all,
            amend: self.amend,
            author_name: self.author_name.as_deref(),
            author_email: self.author_email.as_deref(),
            fallback_identity: identity.as_ref(),
        };
        let commit = self.repo.with(|git| git.commit(&request))?;
        Ok(OpOutput::Commit(commit))
    }

    impl_any!();
}

/// Walk history, newest first.
#[derive(Debug)]
pub struct LogOp {
    repo: RepoHandle,
    /// Revisions to start from, `HEAD` when empty.
    pub includes: Vec<String>,
    /// Revisions whose ancestry is left out.
    pub excludes: Vec<String>,
    /// Only commits touching these paths.
    pub paths: Vec<String>,
    pub skip: i64,
    /// Negative for no limit.
    pub max_commits: i64,
}

impl From<RepoHandle> for LogOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            includes: Vec::new(),
            excludes: Vec::new(),
            paths: Vec::new(),
            skip: 0,
            max_commits: -1,
        }
    }
}

impl OperationKind for LogOp {
    const NAME: &'static str = "log";
    type Output = Vec<CommitInfo>;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .optional("includes", OptionType::StringList, "Start revisions (default HEAD)")
            .optional("excludes", OptionType::StringList, "Hide these revisions and their ancestors")
            .optional("paths", OptionType::StringList, "Only commits touching these paths")
            .with_default("skip", OptionType::Int, 0, "Skip this many commits")
            .with_default("max_commits", OptionType::Int, -1, "Limit the result (-1: no limit)")
    }
}

impl Operation for LogOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "includes" => self.includes = value.into_list(name)?,
            "excludes" => self.excludes = value.into_list(name)?,
            "paths" => self.paths = value.into_list(name)?,
            "skip" => self.skip = value.into_int(name)?,
            "max_commits" => self.max_commits = value.into_int(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "includes" => list_value(&self.includes),
            "excludes" => list_value(&self.excludes),
            "paths" => list_value(&self.paths),
            "skip" => Some(self.skip.into()),
            "max_commits" => Some(self.max_commits.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let skip = usize::try_from(self.skip).map_err(|_| GitError::InvalidArgument {
            message: format!("skip must not be negative (got {})", self.skip),
        })?;
        let query = LogQuery {
            includes: &self.includes,
            excludes: &self.excludes,
            paths: &self.paths,
            skip,
            max_commits: usize::try_from(self.max_commits).ok(),
        };
        let commits = self.repo.with(|git| git.log(&query))?;
        Ok(OpOutput::Commits(commits))
    }

    impl_any!();
}
