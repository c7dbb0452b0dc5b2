//! ops::builtin::remote
//!
//! Remotes and network transfer.

use super::{required_str, str_value};
use crate::git::{GitError, PushRequest, Remote, RepoHandle, TagMode};
use crate::ops::operation::{impl_any, Operation, OperationKind};
use crate::ops::value::list_value;
use crate::ops::{OpOutput, OptionError, OptionSchema, OptionType, OptionValue};

const DEFAULT_REMOTE: &str = "origin";

/// Add a remote.
#[derive(Debug)]
pub struct RemoteAddOp {
    repo: RepoHandle,
    pub name: Option<String>,
    pub url: Option<String>,
    /// Separate URL for pushes.
    pub push_url: Option<String>,
}

impl From<RepoHandle> for RemoteAddOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            name: None,
            url: None,
            push_url: None,
        }
    }
}

impl OperationKind for RemoteAddOp {
    const NAME: &'static str = "remote-add";
    type Output = Remote;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("name", OptionType::String, "Remote name")
            .required("url", OptionType::String, "Fetch URL")
            .optional("push_url", OptionType::String, "Push URL, if different")
    }
}

impl Operation for RemoteAddOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "name" => self.name = Some(value.into_string(name)?),
            "url" => self.url = Some(value.into_string(name)?),
            "push_url" => self.push_url = Some(value.into_string(name)?),
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "name" => str_value(&self.name),
            "url" => str_value(&self.url),
            "push_url" => str_value(&self.push_url),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let name = required_str(&self.name, "name")?;
        let url = required_str(&self.url, "url")?;
        let remote = self
            .repo
            .with(|git| git.add_remote(name, url, self.push_url.as_deref()))?;
        Ok(OpOutput::Remote(remote))
    }

    impl_any!();
}

/// List configured remotes.
#[derive(Debug)]
pub struct RemoteListOp {
    repo: RepoHandle,
}

impl From<RepoHandle> for RemoteListOp {
    fn from(repo: RepoHandle) -> Self {
        Self { repo }
    }
}

impl OperationKind for RemoteListOp {
    const NAME: &'static str = "remote-list";
    type Output = Vec<Remote>;

    fn schema() -> OptionSchema {
        OptionSchema::new()
    }
}

impl Operation for RemoteListOp {
    fn apply_option(&mut self, name: &str, _: OptionValue) -> Result<(), OptionError> {
        Err(OptionError::Unknown(name.to_string()))
    }

    fn option_value(&self, _: &str) -> Option<OptionValue> {
        None
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        Ok(OpOutput::Remotes(self.repo.with(|git| git.remotes())?))
    }

    impl_any!();
}

/// Download objects and refs from a remote.
#[derive(Debug)]
pub struct FetchOp {
    repo: RepoHandle,
    pub remote: String,
    /// Refspecs to fetch; the remote's configured ones when empty.
    pub refspecs: Vec<String>,
    /// Delete remote-tracking refs that no longer exist on the remote.
    pub prune: bool,
    pub tag_mode: TagMode,
}

impl From<RepoHandle> for FetchOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            remote: DEFAULT_REMOTE.to_string(),
            refspecs: Vec::new(),
            prune: false,
            tag_mode: TagMode::default(),
        }
    }
}

impl OperationKind for FetchOp {
    const NAME: &'static str = "fetch";
    type Output = ();

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .with_default("remote", OptionType::String, DEFAULT_REMOTE, "Remote to fetch from")
            .optional("refspecs", OptionType::StringList, "Refspecs (default: configured)")
            .with_default("prune", OptionType::Bool, false, "Prune stale remote-tracking refs")
            .with_default(
                "tag_mode",
                OptionType::Choice(TagMode::NAMES),
                TagMode::default().as_str(),
                "Which tags to download",
            )
    }
}

impl Operation for FetchOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "remote" => self.remote = value.into_string(name)?,
            "refspecs" => self.refspecs = value.into_list(name)?,
            "prune" => self.prune = value.into_bool(name)?,
            "tag_mode" => self.tag_mode = value.into_choice(name, TagMode::NAMES)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "remote" => Some(self.remote.clone().into()),
            "refspecs" => list_value(&self.refspecs),
            "prune" => Some(self.prune.into()),
            "tag_mode" => Some(self.tag_mode.as_str().into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        self.repo
            .with(|git| git.fetch(&self.remote, &self.refspecs, self.prune, self.tag_mode))?;
        Ok(OpOutput::Unit)
    }

    impl_any!();
}

/// Upload refs to a remote.
#[derive(Debug)]
pub struct PushOp {
    repo: RepoHandle,
    pub remote: String,
    /// Refspecs to push; the current branch when empty.
    pub refspecs: Vec<String>,
    /// Push every local branch.
    pub all: bool,
    /// Push every tag.
    pub tags: bool,
    pub force: bool,
    /// Work out what would be pushed without contacting the remote.
    pub dry_run: bool,
}

impl From<RepoHandle> for PushOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            remote: DEFAULT_REMOTE.to_string(),
            refspecs: Vec::new(),
            all: false,
            tags: false,
            force: false,
            dry_run: false,
        }
    }
}

impl OperationKind for PushOp {
    const NAME: &'static str = "push";
    type Output = ();

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .with_default("remote", OptionType::String, DEFAULT_REMOTE, "Remote to push to")
            .optional("refspecs", OptionType::StringList, "Refspecs (default: current branch)")
            .with_default("all", OptionType::Bool, false, "Push all local branches")
            .with_default("tags", OptionType::Bool, false, "Push all tags")
            .with_default("force", OptionType::Bool, false, "Allow non-fast-forward updates")
            .with_default("dry_run", OptionType::Bool, false, "Resolve refs without pushing")
    }
}

impl Operation for PushOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "remote" => self.remote = value.into_string(name)?,
            "refspecs" => self.refspecs = value.into_list(name)?,
            "all" => self.all = value.into_bool(name)?,
            "tags" => self.tags = value.into_bool(name)?,
            "force" => self.force = value.into_bool(name)?,
            "dry_run" => self.dry_run = value.into_bool(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "remote" => Some(self.remote.clone().into()),
            "refspecs" => list_value(&self.refspecs),
            "all" => Some(self.all.into()),
            "tags" => Some(self.tags.into()),
            "force" => Some(self.force.into()),
            "dry_run" => Some(self.dry_run.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let request = PushRequest {
            remote: &self.remote,
            refspecs: &self.refspecs,
            all: self.all,
            tags: self.tags,
            force: self.force,
            dry_run: self.dry_run,
        };
        self.repo.with(|git| git.push(&request))?;
        Ok(OpOutput::Unit)
    }

    impl_any!();
}
