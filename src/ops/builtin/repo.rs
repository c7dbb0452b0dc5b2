//! ops::builtin::repo
//!
//! Standalone operations that produce a [`Repository`].

use std::path::PathBuf;

use crate::git::{Git, GitError, Repository};
use crate::ops::operation::{impl_any, Operation, OperationKind};
use crate::ops::{OpOutput, OptionError, OptionSchema, OptionType, OptionValue};

fn path_value(path: &Option<PathBuf>) -> Option<OptionValue> {
    path.as_ref()
        .map(|p| OptionValue::Str(p.to_string_lossy().into_owned()))
}

fn required_path<'a>(path: &'a Option<PathBuf>, option: &str) -> Result<&'a PathBuf, GitError> {
    path.as_ref().ok_or_else(|| GitError::InvalidArgument {
        message: format!("{option} is required"),
    })
}

/// Create a repository.
#[derive(Debug, Default)]
pub struct InitOp {
    pub dir: Option<PathBuf>,
    pub bare: bool,
}

impl OperationKind for InitOp {
    const NAME: &'static str = "init";
    type Output = Repository;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("dir", OptionType::String, "Directory to create the repository in")
            .with_default("bare", OptionType::Bool, false, "Create without a working tree")
    }
}

impl Operation for InitOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "dir" => self.dir = Some(value.into_string(name)?.into()),
            "bare" => self.bare = value.into_bool(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "dir" => path_value(&self.dir),
            "bare" => Some(self.bare.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let dir = required_path(&self.dir, "dir")?;
        let git = Git::init(dir, self.bare)?;
        Ok(Repository::from_git(git).into())
    }

    impl_any!();
}

/// Open an existing repository.
///
/// `dir` opens exactly that repository; `current_dir` searches upward from
/// a directory. With neither, the search starts at the process working
/// directory.
#[derive(Debug, Default)]
pub struct OpenOp {
    pub dir: Option<PathBuf>,
    pub current_dir: Option<PathBuf>,
}

impl OperationKind for OpenOp {
    const NAME: &'static str = "open";
    type Output = Repository;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .optional("dir", OptionType::String, "Repository directory (no upward search)")
            .optional("current_dir", OptionType::String, "Search upward from here")
    }
}

impl Operation for OpenOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "dir" => self.dir = Some(value.into_string(name)?.into()),
            "current_dir" => self.current_dir = Some(value.into_string(name)?.into()),
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "dir" => path_value(&self.dir),
            "current_dir" => path_value(&self.current_dir),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let git = match (&self.dir, &self.current_dir) {
            (Some(dir), _) => Git::open(dir)?,
            (None, Some(start)) => Git::discover(start)?,
            (None, None) => {
                let cwd = std::env::current_dir().map_err(|e| GitError::AccessError {
                    message: format!("cannot read current directory: {e}"),
                })?;
                Git::discover(&cwd)?
            }
        };
        Ok(Repository::from_git(git).into())
    }

    impl_any!();
}

/// Clone a remote repository.
#[derive(Debug)]
pub struct CloneOp {
    pub uri: Option<String>,
    pub dir: Option<PathBuf>,
    pub bare: bool,
    pub checkout: bool,
    /// Branch to check out instead of the remote HEAD.
    pub branch: Option<String>,
}

impl Default for CloneOp {
    fn default() -> Self {
        Self {
            uri: None,
            dir: None,
            bare: false,
            checkout: true,
            branch: None,
        }
    }
}

impl OperationKind for CloneOp {
    const NAME: &'static str = "clone";
    type Output = Repository;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("uri", OptionType::String, "URL or path of the repository to clone")
            .required("dir", OptionType::String, "Destination directory")
            .with_default("bare", OptionType::Bool, false, "Clone without a working tree")
            .with_default("checkout", OptionType::Bool, true, "Populate the working tree")
            .optional("branch", OptionType::String, "Branch to check out")
    }
}

impl Operation for CloneOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "uri" => self.uri = Some(value.into_string(name)?),
            "dir" => self.dir = Some(value.into_string(name)?.into()),
            "bare" => self.bare = value.into_bool(name)?,
            "checkout" => self.checkout = value.into_bool(name)?,
            "branch" => self.branch = Some(value.into_string(name)?),
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "uri" => self.uri.clone().map(OptionValue::Str),
            "dir" => path_value(&self.dir),
            "bare" => Some(self.bare.into()),
            "checkout" => Some(self.checkout.into()),
            "branch" => self.branch.clone().map(OptionValue::Str),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let uri = self.uri.as_deref().ok_or_else(|| GitError::InvalidArgument {
            message: "uri is required".into(),
        })?;
        let dir = required_path(&self.dir, "dir")?;
        let git = Git::clone_from(uri, dir, self.bare, self.checkout, self.branch.as_deref())?;
        Ok(Repository::from_git(git).into())
    }

    impl_any!();
}
