//! cli::render
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Every result is formatted as text or, with `--json`, as JSON. Formatting
//! returns strings so it can be tested; only [`Printer`] writes.

use std::fmt::Display;

use serde_json::{json, Value};

use crate::git::{Branch, CommitInfo, Status};
use crate::ops::{OpOutput, OperationDescriptor, Registry};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Writes results to stdout.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub verbosity: Verbosity,
    pub json: bool,
}

impl Printer {
    /// Print a result line. Always shown.
    pub fn print(&self, message: impl Display) {
        println!("{}", message);
    }

    /// Print a confirmation (respects quiet mode).
    pub fn success(&self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            println!("{}", message);
        }
    }

    pub fn json(&self, value: &Value) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print the result of operation `name`.
    pub fn output(&self, name: &str, output: &OpOutput) -> serde_json::Result<()> {
        if self.json {
            return self.json(&output.to_json()?);
        }
        match format_output(output) {
            Some(text) => self.print(text),
            None => self.success(format!("{name}: done")),
        }
        Ok(())
    }
}

/// Text rendering of an operation result; `None` for results with no content.
pub fn format_output(output: &OpOutput) -> Option<String> {
    let text = match output {
        OpOutput::Unit => return None,
        OpOutput::Repository(repo) => repo.root_dir().display().to_string(),
        OpOutput::Commit(commit) => format_commit(commit),
        OpOutput::Commits(commits) => lines(commits.iter().map(format_commit)),
        OpOutput::Status(status) => format_status(status),
        OpOutput::Branch(branch) => format_branch(branch),
        OpOutput::Branches(branches) => lines(branches.iter().map(format_branch)),
        OpOutput::Tag(tag) => tag.name.clone(),
        OpOutput::Tags(tags) => lines(tags.iter().map(|t| t.name.clone())),
        OpOutput::Remote(remote) => format!("{}\t{}", remote.name, remote.url.as_deref().unwrap_or("")),
        OpOutput::Remotes(remotes) => lines(
            remotes
                .iter()
                .map(|r| format!("{}\t{}", r.name, r.url.as_deref().unwrap_or(""))),
        ),
        OpOutput::Text(text) => text.clone(),
        OpOutput::Names(names) => names.join("\n"),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn lines(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join("\n")
}

/// `<short oid> <first line of message>`
pub fn format_commit(commit: &CommitInfo) -> String {
    format!("{} {}", commit.oid.short(7), commit.summary)
}

fn format_branch(branch: &Branch) -> String {
    match &branch.upstream {
        Some(upstream) => format!("{} -> {}", branch.name, upstream),
        None => branch.name.clone(),
    }
}

/// Porcelain-like status: one line per path, index column then worktree column.
pub fn format_status(status: &Status) -> String {
    if status.is_clean() {
        return "clean".to_string();
    }

    let mut out = Vec::new();
    for (code, paths) in [
        ("A ", &status.staged.added),
        ("M ", &status.staged.modified),
        ("D ", &status.staged.removed),
        (" A", &status.unstaged.added),
        (" M", &status.unstaged.modified),
        (" D", &status.unstaged.removed),
        ("UU", &status.conflicts),
    ] {
        out.extend(paths.iter().map(|path| format!("{code} {path}")));
    }
    out.join("\n")
}

/// Table of registered operations.
pub fn format_operations(registry: &Registry) -> String {
    let width = registry.names().map(str::len).max().unwrap_or(0);
    lines(registry.iter().map(|d| {
        let scope = if d.requires_handle() { "" } else { " (standalone)" };
        format!("{:width$}  {}{}", d.name, d.summary, scope)
    }))
}

pub fn operations_json(registry: &Registry) -> Value {
    Value::Array(
        registry
            .iter()
            .map(|d| {
                json!({
                    "name": d.name,
                    "summary": d.summary,
                    "requires_repository": d.requires_handle(),
                })
            })
            .collect(),
    )
}

/// An operation's summary and option table.
pub fn format_descriptor(descriptor: &OperationDescriptor) -> String {
    let mut out = vec![format!("{}: {}", descriptor.name, descriptor.summary)];
    if descriptor.schema.is_empty() {
        out.push("  (no options)".to_string());
    }
    for spec in descriptor.schema.iter() {
        let detail = if spec.required {
            "required".to_string()
        } else {
            match &spec.default {
                Some(value) => format!("default {value}"),
                None => "optional".to_string(),
            }
        };
        out.push(format!("  {} <{}> [{}]  {}", spec.name, spec.ty, detail, spec.doc));
    }
    out.join("\n")
}

pub fn descriptor_json(descriptor: &OperationDescriptor) -> Value {
    let options: Vec<Value> = descriptor
        .schema
        .iter()
        .map(|spec| {
            json!({
                "name": spec.name,
                "type": spec.ty.to_string(),
                "required": spec.required,
                "default": spec.default,
                "doc": spec.doc,
            })
        })
        .collect();
    json!({
        "name": descriptor.name,
        "summary": descriptor.summary,
        "requires_repository": descriptor.requires_handle(),
        "options": options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Oid;
    use crate::git::{Changes, Person};
    use chrono::Utc;

    fn commit(message: &str) -> CommitInfo {
        let person = Person {
            name: "A".to_string(),
            email: "a@example.com".to_string(),
        };
        CommitInfo {
            oid: Oid::new("abcdef1234567890abcdef1234567890abcdef12").unwrap(),
            parents: vec![],
            summary: message.lines().next().unwrap_or("").to_string(),
            message: message.to_string(),
            author: person.clone(),
            committer: person,
            time: Utc::now(),
        }
    }

    #[test]
    fn verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn commit_line_uses_summary() {
        assert_eq!(format_commit(&commit("Subject\n\nBody")), "abcdef1 Subject");
    }

    #[test]
    fn unit_has_no_text() {
        assert!(format_output(&OpOutput::Unit).is_none());
        assert!(format_output(&OpOutput::Names(vec![])).is_none());
    }

    #[test]
    fn status_lines() {
        let status = Status {
            staged: Changes {
                added: vec!["new.txt".to_string()],
                ..Default::default()
            },
            unstaged: Changes {
                modified: vec!["old.txt".to_string()],
                ..Default::default()
            },
            conflicts: vec![],
        };
        assert_eq!(format_status(&status), "A  new.txt\n M old.txt");
        assert_eq!(format_status(&Status::default()), "clean");
    }

    #[test]
    fn describe_lists_every_option() {
        let descriptor = Registry::global().lookup("commit").unwrap();
        let text = format_descriptor(descriptor);
        assert!(text.starts_with("commit: "));
        assert!(text.contains("message <string> [required]"));
        assert!(text.contains("amend <bool> [default false]"));

        let value = descriptor_json(descriptor);
        assert_eq!(value["options"].as_array().unwrap().len(), descriptor.schema.len());
    }

    #[test]
    fn operations_table_marks_standalone() {
        let text = format_operations(Registry::global());
        assert!(text.lines().any(|l| l.starts_with("init") && l.ends_with("(standalone)")));
        assert!(text.lines().any(|l| l.starts_with("status") && !l.contains("standalone")));
    }
}
