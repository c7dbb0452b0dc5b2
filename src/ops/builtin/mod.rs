//! ops::builtin
//!
//! The operations every registry built with [`super::Registry::with_builtins`]
//! knows.
//!
//! | Operation | Construction | Output |
//! |-----------|--------------|--------|
//! | `init`, `open`, `clone` | standalone | [`Repository`](crate::git::Repository) |
//! | `add`, `remove`, `reset` | bound | `()` |
//! | `commit`, `head` | bound | [`CommitInfo`](crate::git::CommitInfo) |
//! | `log` | bound | `Vec<CommitInfo>` |
//! | `status` | bound | [`Status`](crate::git::Status) |
//! | `describe` | bound | `String` |
//! | `checkout` | bound | `()` |
//! | `branch-list`, `branch-add`, `branch-remove` | bound | branches / names |
//! | `tag-list`, `tag-add`, `tag-remove` | bound | tags / names |
//! | `remote-list`, `remote-add` | bound | remotes |
//! | `fetch`, `push` | bound | `()` |

mod branch;
mod history;
mod inspect;
mod remote;
mod repo;
mod stage;
mod tag;

pub use branch::{BranchAddOp, BranchListOp, BranchRemoveOp, CheckoutOp};
pub use history::{CommitOp, LogOp};
pub use inspect::{DescribeOp, HeadOp, StatusOp};
pub use remote::{FetchOp, PushOp, RemoteAddOp, RemoteListOp};
pub use repo::{CloneOp, InitOp, OpenOp};
pub use stage::{AddOp, RemoveOp, ResetOp};
pub use tag::{TagAddOp, TagListOp, TagRemoveOp};

use super::descriptor::OperationDescriptor;
use super::error::DispatchError;
use super::registry::Registry;
use super::value::OptionValue;
use crate::git::GitError;

/// Register every builtin operation.
pub fn register_all(registry: &mut Registry) -> Result<(), DispatchError> {
    let descriptors = [
        OperationDescriptor::standalone::<InitOp>("Create a repository"),
        OperationDescriptor::standalone::<OpenOp>("Open an existing repository"),
        OperationDescriptor::standalone::<CloneOp>("Clone a repository"),
        OperationDescriptor::bound::<AddOp>("Stage files"),
        OperationDescriptor::bound::<RemoveOp>("Remove files from the index and working tree"),
        OperationDescriptor::bound::<ResetOp>("Reset HEAD, the index or paths"),
        OperationDescriptor::bound::<CommitOp>("Record a commit"),
        OperationDescriptor::bound::<LogOp>("Show commit history"),
        OperationDescriptor::bound::<StatusOp>("Show working tree status"),
        OperationDescriptor::bound::<HeadOp>("Show the HEAD commit"),
        OperationDescriptor::bound::<DescribeOp>("Describe a commit by its nearest tag"),
        OperationDescriptor::bound::<CheckoutOp>("Switch branches"),
        OperationDescriptor::bound::<BranchListOp>("List branches"),
        OperationDescriptor::bound::<BranchAddOp>("Create a branch"),
        OperationDescriptor::bound::<BranchRemoveOp>("Delete branches"),
        OperationDescriptor::bound::<TagAddOp>("Create a tag"),
        OperationDescriptor::bound::<TagListOp>("List tags"),
        OperationDescriptor::bound::<TagRemoveOp>("Delete tags"),
        OperationDescriptor::bound::<RemoteAddOp>("Add a remote"),
        OperationDescriptor::bound::<RemoteListOp>("List remotes"),
        OperationDescriptor::bound::<FetchOp>("Download from a remote"),
        OperationDescriptor::bound::<PushOp>("Upload to a remote"),
    ];
    for descriptor in descriptors {
        registry.register(descriptor)?;
    }
    Ok(())
}

fn str_value(value: &Option<String>) -> Option<OptionValue> {
    value.clone().map(OptionValue::Str)
}

/// A required string option left unset by a configurator.
fn required_str<'a>(value: &'a Option<String>, option: &str) -> Result<&'a str, GitError> {
    value.as_deref().ok_or_else(|| GitError::InvalidArgument {
        message: format!("{option} is required"),
    })
}

fn non_empty<'a>(list: &'a [String], option: &str) -> Result<&'a [String], GitError> {
    if list.is_empty() {
        Err(GitError::InvalidArgument {
            message: format!("{option} must not be empty"),
        })
    } else {
        Ok(list)
    }
}
