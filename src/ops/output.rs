//! ops::output
//!
//! Results of executed operations.

use serde_json::{json, Value};

use crate::git::{Branch, CommitInfo, Remote, Repository, Status, Tag};

/// What an operation returns.
#[derive(Debug)]
pub enum OpOutput {
    Unit,
    Repository(Repository),
    Commit(CommitInfo),
    Commits(Vec<CommitInfo>),
    Status(Status),
    Branch(Branch),
    Branches(Vec<Branch>),
    Tag(Tag),
    Tags(Vec<Tag>),
    Remote(Remote),
    Remotes(Vec<Remote>),
    Text(String),
    Names(Vec<String>),
}

impl OpOutput {
    /// Variant name, for mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            OpOutput::Unit => "unit",
            OpOutput::Repository(_) => "repository",
            OpOutput::Commit(_) => "commit",
            OpOutput::Commits(_) => "commits",
            OpOutput::Status(_) => "status",
            OpOutput::Branch(_) => "branch",
            OpOutput::Branches(_) => "branches",
            OpOutput::Tag(_) => "tag",
            OpOutput::Tags(_) => "tags",
            OpOutput::Remote(_) => "remote",
            OpOutput::Remotes(_) => "remotes",
            OpOutput::Text(_) => "text",
            OpOutput::Names(_) => "names",
        }
    }

    /// JSON rendering used by `gv --json`.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        Ok(match self {
            OpOutput::Unit => Value::Null,
            OpOutput::Repository(repo) => json!({
                "root_dir": repo.root_dir(),
                "git_dir": repo.git_dir(),
                "bare": repo.is_bare(),
            }),
            OpOutput::Commit(c) => serde_json::to_value(c)?,
            OpOutput::Commits(c) => serde_json::to_value(c)?,
            OpOutput::Status(s) => serde_json::to_value(s)?,
            OpOutput::Branch(b) => serde_json::to_value(b)?,
            OpOutput::Branches(b) => serde_json::to_value(b)?,
            OpOutput::Tag(t) => serde_json::to_value(t)?,
            OpOutput::Tags(t) => serde_json::to_value(t)?,
            OpOutput::Remote(r) => serde_json::to_value(r)?,
            OpOutput::Remotes(r) => serde_json::to_value(r)?,
            OpOutput::Text(t) => Value::String(t.clone()),
            OpOutput::Names(n) => serde_json::to_value(n)?,
        })
    }
}

/// Conversion from an [`OpOutput`] into an operation's declared output type.
pub trait FromOutput: Sized {
    /// Returns the output back when it is the wrong variant.
    fn from_output(output: OpOutput) -> Result<Self, OpOutput>;
}

impl FromOutput for () {
    fn from_output(output: OpOutput) -> Result<Self, OpOutput> {
        match output {
            OpOutput::Unit => Ok(()),
            other => Err(other),
        }
    }
}

macro_rules! from_output {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromOutput for $ty {
                fn from_output(output: OpOutput) -> Result<Self, OpOutput> {
                    match output {
                        OpOutput::$variant(value) => Ok(value),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

from_output! {
    Repository => Repository,
    CommitInfo => Commit,
    Vec<CommitInfo> => Commits,
    Status => Status,
    Branch => Branch,
    Vec<Branch> => Branches,
    Tag => Tag,
    Vec<Tag> => Tags,
    Remote => Remote,
    Vec<Remote> => Remotes,
    String => Text,
    Vec<String> => Names,
}

impl From<Repository> for OpOutput {
    fn from(repo: Repository) -> Self {
        OpOutput::Repository(repo)
    }
}
