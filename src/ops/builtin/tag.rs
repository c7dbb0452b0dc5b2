//! ops::builtin::tag
//!
//! Tag management.

use super::{non_empty, required_str, str_value};
use crate::core::types::TagName;
use crate::git::{GitError, RepoHandle, Tag};
use crate::ops::operation::{impl_any, Operation, OperationKind};
use crate::ops::value::list_value;
use crate::ops::{OpOutput, OptionError, OptionSchema, OptionType, OptionValue};

/// Create a tag.
#[derive(Debug)]
pub struct TagAddOp {
    repo: RepoHandle,
    pub name: Option<String>,
    pub message: Option<String>,
    /// Revision to tag (default HEAD).
    pub pointsto: Option<String>,
    /// Create an annotated tag object rather than a plain ref.
    pub annotate: bool,
    /// Replace an existing tag.
    pub force: bool,
}

impl From<RepoHandle> for TagAddOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            name: None,
            message: None,
            pointsto: None,
            annotate: true,
            force: false,
        }
    }
}

impl OperationKind for TagAddOp {
    const NAME: &'static str = "tag-add";
    type Output = Tag;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("name", OptionType::String, "Tag name")
            .optional("message", OptionType::String, "Annotation message")
            .optional("pointsto", OptionType::String, "Revision to tag (default HEAD)")
            .with_default("annotate", OptionType::Bool, true, "Create an annotated tag")
            .with_default("force", OptionType::Bool, false, "Replace an existing tag")
    }
}

impl Operation for TagAddOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "name" => self.name = Some(value.into_string(name)?),
            "message" => self.message = Some(value.into_string(name)?),
            "pointsto" => self.pointsto = Some(value.into_string(name)?),
            "annotate" => self.annotate = value.into_bool(name)?,
            "force" => self.force = value.into_bool(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "name" => str_value(&self.name),
            "message" => str_value(&self.message),
            "pointsto" => str_value(&self.pointsto),
            "annotate" => Some(self.annotate.into()),
            "force" => Some(self.force.into()),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let name = TagName::new(required_str(&self.name, "name")?)?;
        let identity = self.repo.identity();
        let tag = self.repo.with(|git| {
            git.create_tag(
                &name,
                self.message.as_deref(),
                self.pointsto.as_deref(),
                self.annotate,
                self.force,
                identity.as_ref(),
            )
        })?;
        Ok(OpOutput::Tag(tag))
    }

    impl_any!();
}

/// List tags.
#[derive(Debug)]
pub struct TagListOp {
    repo: RepoHandle,
}

impl From<RepoHandle> for TagListOp {
    fn from(repo: RepoHandle) -> Self {
        Self { repo }
    }
}

impl OperationKind for TagListOp {
    const NAME: &'static str = "tag-list";
    type Output = Vec<Tag>;

    fn schema() -> OptionSchema {
        OptionSchema::new()
    }
}

impl Operation for TagListOp {
    fn apply_option(&mut self, name: &str, _: OptionValue) -> Result<(), OptionError> {
        Err(OptionError::Unknown(name.to_string()))
    }

    fn option_value(&self, _: &str) -> Option<OptionValue> {
        None
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        Ok(OpOutput::Tags(self.repo.with(|git| git.tags())?))
    }

    impl_any!();
}

/// Delete tags.
#[derive(Debug)]
pub struct TagRemoveOp {
    repo: RepoHandle,
    pub names: Vec<String>,
}

impl From<RepoHandle> for TagRemoveOp {
    fn from(repo: RepoHandle) -> Self {
        Self {
            repo,
            names: Vec::new(),
        }
    }
}

impl OperationKind for TagRemoveOp {
    const NAME: &'static str = "tag-remove";
    type Output = Vec<String>;

    fn schema() -> OptionSchema {
        OptionSchema::new().required("names", OptionType::StringList, "Tags to delete")
    }
}

impl Operation for TagRemoveOp {
    fn apply_option(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        match name {
            "names" => self.names = value.into_list(name)?,
            _ => return Err(OptionError::Unknown(name.to_string())),
        }
        Ok(())
    }

    fn option_value(&self, name: &str) -> Option<OptionValue> {
        match name {
            "names" => list_value(&self.names),
            _ => None,
        }
    }

    fn execute(&mut self) -> Result<OpOutput, GitError> {
        let names = non_empty(&self.names, "names")?
            .iter()
            .map(|n| TagName::new(n.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let removed = self.repo.with(|git| git.delete_tags(&names))?;
        Ok(OpOutput::Names(removed))
    }

    impl_any!();
}
