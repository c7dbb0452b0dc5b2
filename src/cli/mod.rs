//! cli
//!
//! Command-line interface for `gv`.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Turn `key=value` arguments into an option map
//! - Run the named operation through the map calling convention
//! - Render the result
//!
//! Standalone operations run without a repository. Bound operations run
//! against the repository containing the working directory, obtained through
//! the [`crate::service`] with identity and policy taken from configuration.

pub mod args;
pub mod render;

pub use args::{Cli, Command, Shell};

use anyhow::{anyhow, Context, Result};
use clap::CommandFactory;
use clap_complete::{generate, shells};

use crate::core::config::Config;
use crate::ops::{Dispatcher, Registry};
use crate::service::{RepoService, ServiceParams};
use render::{Printer, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`, after logging is set
/// up.
pub fn run(cli: Cli) -> Result<()> {
    if let Some(dir) = &cli.cwd {
        std::env::set_current_dir(dir)
            .map_err(|e| anyhow!("cannot change to directory '{}': {e}", dir.display()))?;
    }

    let config = Config::load(None)?;
    let printer = Printer {
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        json: cli.json || config.json_output(),
    };

    match cli.command {
        Command::Ops => list_operations(printer),
        Command::Describe { operation } => describe(printer, &operation),
        Command::Completion { shell } => completion(shell),
        Command::Run(argv) => run_operation(printer, &config, &argv),
    }
}

fn list_operations(printer: Printer) -> Result<()> {
    let registry = Registry::global();
    if printer.json {
        printer.json(&render::operations_json(registry))?;
    } else {
        printer.print(render::format_operations(registry));
    }
    Ok(())
}

fn describe(printer: Printer, name: &str) -> Result<()> {
    let descriptor = Registry::global().lookup(name)?;
    if printer.json {
        printer.json(&render::descriptor_json(descriptor))?;
    } else {
        printer.print(render::format_descriptor(descriptor));
    }
    Ok(())
}

/// Generate shell completion scripts.
fn completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let out = &mut std::io::stdout();

    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, &name, out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, &name, out),
        Shell::Fish => generate(shells::Fish, &mut cmd, &name, out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, &name, out),
    }

    Ok(())
}

fn run_operation(printer: Printer, config: &Config, argv: &[String]) -> Result<()> {
    let (name, rest) = argv
        .split_first()
        .context("no operation given (see `gv ops`)")?;

    let dispatcher = Dispatcher::global();
    let descriptor = dispatcher.registry().lookup(name)?;
    let options = args::parse_options(descriptor, rest);

    if !descriptor.requires_handle() {
        let output = dispatcher.call_map(name, None, options)?;
        printer.output(name, &output)?;
        return Ok(());
    }

    let cwd = std::env::current_dir()
        .map_err(|e| anyhow!("cannot read current directory: {e}"))?;
    let service = RepoService::new(ServiceParams::discover(cwd).with_config(config));
    let repo = service.lease()?;

    let repo_config = Config::load(Some(repo.git_dir()))?;
    if let Some(identity) = repo_config.identity() {
        repo.set_identity(Some(identity));
    }

    let output = dispatcher.call_map(name, Some(&repo.handle()), options)?;
    printer.output(name, &output)?;
    Ok(())
}
