//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands and must come before the
//! operation name:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output
//!
//! # Operation Arguments
//!
//! Anything that is not a builtin command names an operation, followed by
//! `key=value` pairs. See [`parse_options`].

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::ops::{OperationDescriptor, OptionMap, OptionType, OptionValue};

/// gitvane - Git operations with uniform calling conventions
#[derive(Parser, Debug)]
#[command(name = "gv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if gv was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered operations
    #[command(name = "ops")]
    Ops,

    /// Show an operation's options
    #[command(
        name = "describe",
        after_help = "\
EXAMPLES:
    gv describe commit
    gv --json describe push"
    )]
    Describe {
        /// Operation name
        operation: String,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash (add to ~/.bashrc)
    gv completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    gv completion zsh >> ~/.zshrc

    # Fish
    gv completion fish > ~/.config/fish/completions/gv.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Run an operation: gv <operation> [key=value | key]...
    #[command(external_subcommand)]
    Run(Vec<String>),
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build an option map from `key=value` arguments.
///
/// Each value is parsed against the option's declared type:
/// - `bool`: `true` / `false`
/// - `int`: a decimal integer
/// - `list`: comma separated; repeating the key appends
///
/// A bare `key` means `key=true`. Values that do not parse, and keys the
/// operation does not declare, are passed through as strings so the
/// dispatcher reports the problem.
pub fn parse_options(descriptor: &OperationDescriptor, args: &[String]) -> OptionMap {
    let mut options = OptionMap::new();

    for arg in args {
        let (key, raw) = arg.split_once('=').unwrap_or((arg.as_str(), "true"));
        let ty = descriptor.schema.get(key).map(|spec| &spec.ty);
        let value = parse_value(ty, raw);

        let merged = match (options.remove(key), value) {
            (Some(OptionValue::List(mut existing)), OptionValue::List(more)) => {
                existing.extend(more);
                OptionValue::List(existing)
            }
            (_, value) => value,
        };
        options.insert(key.to_string(), merged);
    }

    options
}

fn parse_value(ty: Option<&OptionType>, raw: &str) -> OptionValue {
    match ty {
        Some(OptionType::Bool) => match raw {
            "true" => OptionValue::Bool(true),
            "false" => OptionValue::Bool(false),
            _ => OptionValue::Str(raw.to_string()),
        },
        Some(OptionType::Int) => raw
            .parse()
            .map(OptionValue::Int)
            .unwrap_or_else(|_| OptionValue::Str(raw.to_string())),
        Some(OptionType::StringList) => OptionValue::List(
            raw.split(',')
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => OptionValue::Str(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Registry;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn parse(op: &str, items: &[&str]) -> OptionMap {
        let descriptor = Registry::global().lookup(op).unwrap();
        parse_options(descriptor, &args(items))
    }

    mod parsing {
        use super::*;

        #[test]
        fn typed_values() {
            let options = parse("log", &["skip=2", "max_commits=5", "includes=main,dev"]);
            assert_eq!(options["skip"], OptionValue::Int(2));
            assert_eq!(options["max_commits"], OptionValue::Int(5));
            assert_eq!(
                options["includes"],
                OptionValue::List(vec!["main".into(), "dev".into()])
            );
        }

        #[test]
        fn bare_key_is_true() {
            let options = parse("commit", &["all", "amend=false"]);
            assert_eq!(options["all"], OptionValue::Bool(true));
            assert_eq!(options["amend"], OptionValue::Bool(false));
        }

        #[test]
        fn repeated_list_keys_accumulate() {
            let options = parse("add", &["patterns=a.txt", "patterns=b.txt,c.txt"]);
            assert_eq!(
                options["patterns"],
                OptionValue::List(vec!["a.txt".into(), "b.txt".into(), "c.txt".into()])
            );
        }

        #[test]
        fn message_keeps_equals_signs() {
            let options = parse("commit", &["message=a=b"]);
            assert_eq!(options["message"], OptionValue::Str("a=b".into()));
        }

        #[test]
        fn unparseable_values_pass_through() {
            let options = parse("log", &["skip=lots", "bogus=1"]);
            assert_eq!(options["skip"], OptionValue::Str("lots".into()));
            assert_eq!(options["bogus"], OptionValue::Str("1".into()));
        }
    }

    mod cli {
        use super::*;

        #[test]
        fn operation_becomes_external_subcommand() {
            let cli = Cli::try_parse_from(["gv", "--json", "commit", "message=hi"]).unwrap();
            assert!(cli.json);
            match cli.command {
                Command::Run(argv) => assert_eq!(argv, args(&["commit", "message=hi"])),
                other => panic!("unexpected command: {other:?}"),
            }
        }

        #[test]
        fn builtin_commands_parse() {
            let cli = Cli::try_parse_from(["gv", "describe", "push"]).unwrap();
            assert!(matches!(cli.command, Command::Describe { ref operation } if operation == "push"));

            let cli = Cli::try_parse_from(["gv", "-q", "ops"]).unwrap();
            assert!(cli.quiet);
            assert!(matches!(cli.command, Command::Ops));
        }

        #[test]
        fn command_definition_is_valid() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }
    }
}
