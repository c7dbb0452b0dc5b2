//! ops::builtin::branch
//!
//! Branch management and checkout.

use super::{non_empty, required_str, str_value};
use crate::core::types::BranchName;
use crate::git::{Branch, BranchListMode, GitError, RepoHandle};
use crate::ops::operation::{impl_any, Operation, OperationKind};
use crate::ops::value::list_value;
use crate::ops::{OpOutput, OptionError, OptionSchema, OptionType, OptionValue};

/// Switch to a branch.
#[derive(Debug)]
pub struct CheckoutOp {
    repo: RepoHandle,
    pub branch: Option<String>,
    /// Create the branch first.
    pub create_branch: bool,
    /// Where a created branch starts (default HEAD).
    pub start_point: Option<String>,
    /// Point HEAD at a new branch with no history.
    pub orphan: bool,
}

impl From<RepoHandle> for CheckoutOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            branch: None,
            create_branch: false,
            start_point: None,
            orphan: false,
        }
    }
}

impl OperationKind for CheckoutOp {
    const NAME: &'static str = "checkout";
    type Output = ();

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("branch", OptionType::String, "Branch to switch to")
            .with_default("create_branch", OptionType::Bool, false, "Create the branch first")
            .optional("start_point", OptionType::String, "Start of a created branch")
            .with_default("orphan", OptionType::Bool, false, "Start a branch with no history")
    }
}

impl Operation for CheckoutOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "branch" => self.branch = Some(value.into_string(name)?),
            "create_branch" => self.create_branch = value.into_bool(name)?,
            "start_point" => self.start_point = Some(value.into_string(name)?),
            "orphan" => self.orphan = value.into_bool(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "branch" => str_value(&self.branch),
            "create_branch" => Some(self.create_branch.into()),
            "start_point" => str_value(&self.start_point),
            "orphan" => Some(self.orphan.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let branch = BranchName::new(required_str(&self.branch, "branch")?)?;
        self.repo.with(|git| {
            git.checkout(
                &branch,
                self.create_branch,
                self.start_point.as_deref(),
                self.orphan,
            )
        })?;
        Ok(OpOutput::Unit)
    }

    impl_any!();
}

/// List branches.
#[derive(Debug)]
pub struct BranchListOp {
    repo: RepoHandle,
    pub mode: BranchListMode,
}

impl From<RepoHandle> for BranchListOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            mode: BranchListMode::default(),
        }
    }
}

impl OperationKind for BranchListOp {
    const NAME: &'static str = "branch-list";
    type Output = Vec<Branch>;

    fn schema() -> OptionSchema {
        OptionSchema::new().with_default(
            "mode",
            OptionType::Choice(BranchListMode::NAMES),
            BranchListMode::default().as_str(),
            "Which branches to list",
        )
    }
}

impl Operation for BranchListOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "mode" => self.mode = value.into_choice(name, BranchListMode::NAMES)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "mode" => Some(self.mode.as_str().into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        Ok(OpOutput::Branches(
            self.repo.with(|git| git.branches(self.mode))?,
        ))
    }

    impl_any!();
}

/// Create a branch without switching to it.
#[derive(Debug)]
pub struct BranchAddOp {
    repo: RepoHandle,
    pub name: Option<String>,
    pub start_point: Option<String>,
    /// Move the branch if it already exists.
    pub force: bool,
}

impl From<RepoHandle> for BranchAddOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            name: None,
            start_point: None,
            force: false,
        }
    }
}

impl OperationKind for BranchAddOp {
    const NAME: &'static str = "branch-add";
    type Output = Branch;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("name", OptionType::String, "Branch name")
            .optional("start_point", OptionType::String, "Where the branch starts (default HEAD)")
            .with_default("force", OptionType::Bool, false, "Reset an existing branch")
    }
}

impl Operation for BranchAddOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "name" => self.name = Some(value.into_string(name)?),
            "start_point" => self.start_point = Some(value.into_string(name)?),
            "force" => self.force = value.into_bool(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "name" => str_value(&self.name),
            "start_point" => str_value(&self.start_point),
            "force" => Some(self.force.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let name = BranchName::new(required_str(&self.name, "name")?)?;
        let branch = self
            .repo
            .with(|git| git.create_branch(&name, self.start_point.as_deref(), self.force))?;
        Ok(OpOutput::Branch(branch))
    }

    impl_any!();
}

/// Delete local branches.
#[derive(Debug)]
pub struct BranchRemoveOp {
    repo: RepoHandle,
    pub names: Vec<String>,
    /// Delete even when not merged into HEAD.
    pub force: bool,
}

impl From<RepoHandle> for BranchRemoveOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            names: Vec::new(),
            force: false,
        }
    }
}

impl OperationKind for BranchRemoveOp {
    const NAME: &'static str = "branch-remove";
    type Output = Vec<String>;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("names", OptionType::StringList, "Branches to delete")
            .with_default("force", OptionType::Bool, false, "Delete unmerged branches too")
    }
}

impl Operation for BranchRemoveOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "names" => self.names = value.into_list(name)?,
            "force" => self.force = value.into_bool(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "names" => list_value(&self.names),
            "force" => Some(self.force.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let names = non_empty(&self.names, "names")?
            .iter()
            .map(|n| BranchName::new(n.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let removed = self.repo.with(|git| git.delete_branches(&names, self.force))?;
        Ok(OpOutput::Names(removed))
    }

    impl_any!();
}
